//! The advisor: retrieval + prompt + chat completion.
//!
//! Two entry points back the HTTP endpoints:
//!
//! - [`Advisor::ask`] answers a free-text situation using the nearest verses.
//!   When no verse is found (or the store fails) it answers with
//!   [`NO_SHLOKAS_FOUND`] and never calls the chat model. Chat failures are
//!   returned to the caller.
//! - [`Advisor::random_shloka`] explains one verse picked at random from a
//!   fresh read of the dataset. It never fails: any error becomes
//!   [`SHLOKA_UNAVAILABLE`].

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::{error, warn};

use crate::chat::{ChatError, ChatProvider, ChatRequest, Message};
use crate::config::Config;
use crate::dataset::{load_dataset, DatasetError};
use crate::prompt::{advice_messages, random_shloka_messages};
use crate::retriever::Retriever;

pub const NO_SHLOKAS_FOUND: &str =
    "I couldn't find any relevant shlokas for your query. Please try again with a different query.";

pub const SHLOKA_UNAVAILABLE: &str =
    "I couldn't find any shlokas at the moment. Please try again later.";

#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Chat(#[from] ChatError),
}

/// Chat parameters and dataset location the advisor needs.
#[derive(Debug, Clone)]
pub struct AdvisorSettings {
    pub model: String,
    pub temperature: f32,
    pub shloka_count: usize,
    pub dataset_path: PathBuf,
}

impl AdvisorSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.chat.model.clone(),
            temperature: config.chat.temperature,
            shloka_count: config.retrieval.shloka_count,
            dataset_path: config.dataset.path.clone(),
        }
    }
}

pub struct Advisor {
    retriever: Retriever,
    chat: Arc<dyn ChatProvider>,
    settings: AdvisorSettings,
}

impl Advisor {
    pub fn new(retriever: Retriever, chat: Arc<dyn ChatProvider>, settings: AdvisorSettings) -> Self {
        Self {
            retriever,
            chat,
            settings,
        }
    }

    /// Answer `query` with the configured number of passages.
    pub async fn advise(&self, query: &str) -> Result<String, AdvisorError> {
        self.ask(query, self.settings.shloka_count).await
    }

    /// Answer `query` using the `shloka_count` nearest verses.
    pub async fn ask(&self, query: &str, shloka_count: usize) -> Result<String, AdvisorError> {
        let passages = match self.retriever.retrieve(query, shloka_count).await {
            Ok(passages) => passages,
            Err(e) => {
                warn!(error = %e, "retrieval failed; answering without passages");
                Vec::new()
            }
        };

        if passages.is_empty() {
            return Ok(NO_SHLOKAS_FOUND.to_string());
        }

        let reply = self.complete(advice_messages(query, &passages)).await?;
        Ok(reply)
    }

    /// Explain one verse picked uniformly at random.
    pub async fn random_shloka(&self) -> String {
        match self.try_random_shloka().await {
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, "failed to produce a random shloka");
                SHLOKA_UNAVAILABLE.to_string()
            }
        }
    }

    async fn try_random_shloka(&self) -> Result<String, AdvisorError> {
        let shloka_text = {
            let dataset = load_dataset(&self.settings.dataset_path)?;
            let record = dataset
                .sample(&mut rand::thread_rng())
                .ok_or_else(|| DatasetError::Empty {
                    path: self.settings.dataset_path.clone(),
                })?;
            record.to_document_text()
        };

        let reply = self.complete(random_shloka_messages(&shloka_text)).await?;
        Ok(reply)
    }

    async fn complete(&self, messages: Vec<Message>) -> Result<String, ChatError> {
        let request = ChatRequest {
            model: self.settings.model.clone(),
            messages,
            temperature: self.settings.temperature,
        };
        self.chat.complete(&request).await
    }
}
