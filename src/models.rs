//! Core data models used throughout the advisor.
//!
//! These types represent the verses read from the dataset, the flattened
//! documents stored in the vector collection, and the JSON bodies exchanged
//! with the front end.

use serde::{Deserialize, Serialize};

/// One verse (shloka) row of the source CSV.
///
/// Column names follow the dataset header verbatim, hence the renames.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VerseRecord {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Chapter")]
    pub chapter: u32,
    #[serde(rename = "Verse")]
    pub verse: u32,
    #[serde(rename = "Shloka")]
    pub shloka: String,
    #[serde(rename = "Transliteration", default)]
    pub transliteration: Option<String>,
    #[serde(rename = "HinMeaning")]
    pub hindi_meaning: String,
    #[serde(rename = "EngMeaning")]
    pub english_meaning: String,
    #[serde(rename = "WordMeaning")]
    pub word_meaning: String,
    #[serde(rename = "context", default)]
    pub context: String,
}

impl VerseRecord {
    /// Render the record as the labeled text block stored in the collection
    /// and shown to the chat model.
    pub fn to_document_text(&self) -> String {
        format!(
            "ID: {}\nChapter: {}\nVerse: {}\nShloka: {}\nHindi Meaning: {}\nEnglish Meaning: {}\nWord Meanings: {}\nContext: {}",
            self.id,
            self.chapter,
            self.verse,
            self.shloka,
            self.hindi_meaning,
            self.english_meaning,
            self.word_meaning,
            self.context,
        )
    }

    pub fn to_indexed_document(&self) -> IndexedDocument {
        IndexedDocument {
            id: self.id.clone(),
            text: self.to_document_text(),
        }
    }
}

/// A flattened verse as stored in the vector collection, keyed by verse ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedDocument {
    pub id: String,
    pub text: String,
}

/// Body of `POST /get_advice`.
///
/// The field is optional so that a missing value reaches the handler and is
/// answered with the "required" message rather than a framework rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdviceRequest {
    #[serde(default)]
    pub life_situation: Option<String>,
}

impl AdviceRequest {
    /// The situation text as sent, or `None` when missing or empty.
    pub fn situation(&self) -> Option<&str> {
        self.life_situation.as_deref().filter(|s| !s.is_empty())
    }
}

/// Body returned by `POST /get_advice`: `{"advice": ...}` or `{"error": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviceResponse {
    Advice(String),
    Error(String),
}

/// Body returned by `GET /get_random_shloka`.
#[derive(Debug, Clone, Serialize)]
pub struct ShlokaResponse {
    pub shloka: String,
}
