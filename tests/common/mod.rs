//! Shared fakes for the integration tests: a deterministic keyword embedder,
//! a scripted chat provider, and dataset fixtures.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use gita_advisor::chat::{ChatError, ChatProvider, ChatRequest};
use gita_advisor::embedding::{Embedder, EmbeddingError};
use gita_advisor::models::IndexedDocument;
use gita_advisor::store::{QueryMatch, StoreError, VectorCollection};

/// Keywords that make up the embedding dimensions.
const VOCABULARY: &[&str] = &[
    "duty", "action", "fear", "mind", "anger", "peace", "self", "death", "grief", "work",
];

/// Embeds a text as keyword counts over [`VOCABULARY`]. Counts calls and
/// embedded texts so tests can assert when re-embedding happens.
#[derive(Default)]
pub struct KeywordEmbedder {
    pub calls: AtomicUsize,
    pub texts_embedded: AtomicUsize,
}

impl KeywordEmbedder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn texts_embedded(&self) -> usize {
        self.texts_embedded.load(Ordering::SeqCst)
    }
}

pub fn keyword_vector(text: &str) -> Vec<f32> {
    let lower = text.to_lowercase();
    VOCABULARY
        .iter()
        .map(|word| lower.matches(word).count() as f32)
        .collect()
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    fn model_name(&self) -> &str {
        "keyword-test"
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.texts_embedded.fetch_add(texts.len(), Ordering::SeqCst);
        Ok(texts.iter().map(|t| keyword_vector(t)).collect())
    }
}

/// Chat provider that replays a fixed reply (or fails) and records requests.
pub struct MockChat {
    reply: Result<String, String>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockChat {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.to_string()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: Err("provider down".to_string()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatProvider for MockChat {
    async fn complete(&self, request: &ChatRequest) -> Result<String, ChatError> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(body) => Err(ChatError::Api {
                status: 503,
                body: body.clone(),
            }),
        }
    }
}

/// Collection that answers every query with a fixed list, in the given order.
pub struct ScriptedCollection {
    pub matches: Vec<QueryMatch>,
}

#[async_trait]
impl VectorCollection for ScriptedCollection {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.matches.len())
    }

    async fn upsert(&self, _docs: &[IndexedDocument]) -> Result<(), StoreError> {
        Ok(())
    }

    async fn query(&self, _text: &str, n_results: usize) -> Result<Vec<QueryMatch>, StoreError> {
        Ok(self.matches.iter().take(n_results).cloned().collect())
    }
}

/// Collection whose every operation fails as if the store were unreachable.
pub struct UnreachableCollection;

#[async_trait]
impl VectorCollection for UnreachableCollection {
    fn name(&self) -> &str {
        "unreachable"
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Err(unreachable_error())
    }

    async fn upsert(&self, _docs: &[IndexedDocument]) -> Result<(), StoreError> {
        Err(unreachable_error())
    }

    async fn query(&self, _text: &str, _n_results: usize) -> Result<Vec<QueryMatch>, StoreError> {
        Err(unreachable_error())
    }
}

fn unreachable_error() -> StoreError {
    StoreError::Embedding(EmbeddingError::Api {
        status: 503,
        body: "store unreachable".to_string(),
    })
}

pub const CSV_HEADER: &str =
    "ID,Chapter,Verse,Shloka,Transliteration,HinMeaning,EngMeaning,WordMeaning,context";

/// Five verses whose English meanings hit distinct vocabulary words.
pub const SAMPLE_ROWS: &[&str] = &[
    "BG2.47,2,47,karmaṇy evādhikāras te,karmany evadhikaras te,कर्म पर अधिकार,You have a right to action and duty alone,karmaṇi: in action,Krishna on duty and work",
    "BG2.56,2,56,duḥkheṣv anudvigna-manāḥ,duhkhesv anudvigna-manah,दुःख में अविचलित,One whose mind is free of fear and anger,manāḥ: mind,The steady mind",
    "BG2.20,2,20,na jāyate mriyate vā,na jayate mriyate va,आत्मा न जन्मता है,The self is never born and knows no death,mriyate: dies,On grief over death",
    "BG6.5,6,5,uddhared ātmanātmānaṁ,uddhared atmanatmanam,अपने द्वारा अपना उद्धार,Lift the self by the self through the mind,ātmanā: by the self,Self-reliance",
    "BG2.66,2,66,nāsti buddhir ayuktasya,nasti buddhir ayuktasya,अशांत को सुख नहीं,Without peace of mind there is no happiness,ayuktasya: of the unsteady,On peace",
];

pub fn write_dataset(dir: &Path, rows: &[&str]) -> PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join("shlokas.csv");
    let mut content = String::from(CSV_HEADER);
    content.push('\n');
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    std::fs::write(&path, content).unwrap();
    path
}
