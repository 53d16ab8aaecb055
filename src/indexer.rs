//! Startup indexing of the verse corpus.
//!
//! [`run_startup_indexing`] is the explicit initialization phase the server
//! runs before binding its listener. It never fails: load or store errors
//! are logged and reported as [`IndexOutcome::Failed`], so the service still
//! comes up (with a possibly empty or stale index) and `/health` can say why.

use std::path::Path;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::dataset::load_dataset;
use crate::models::{IndexedDocument, VerseRecord};
use crate::store::{StoreError, VectorCollection};

/// Result of the startup indexing phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum IndexOutcome {
    Ready { documents: usize },
    Failed { documents: usize, reason: String },
}

impl IndexOutcome {
    fn failed(reason: impl Into<String>) -> Self {
        IndexOutcome::Failed {
            documents: 0,
            reason: reason.into(),
        }
    }

    /// Number of documents loaded by this run; zero when it failed.
    pub fn documents_loaded(&self) -> usize {
        match self {
            IndexOutcome::Ready { documents } => *documents,
            IndexOutcome::Failed { .. } => 0,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, IndexOutcome::Ready { .. })
    }
}

/// Render `records` (at most `max_rows` of them) and upsert them in one batch.
///
/// Returns the number of documents sent to the collection.
pub async fn index_corpus(
    records: &[VerseRecord],
    collection: &dyn VectorCollection,
    max_rows: Option<usize>,
) -> Result<usize, StoreError> {
    let limit = max_rows.unwrap_or(records.len()).min(records.len());
    if limit < records.len() {
        warn!(
            indexed = limit,
            total = records.len(),
            "index.max_rows is set; indexing a partial corpus"
        );
    }

    let docs: Vec<IndexedDocument> = records[..limit]
        .iter()
        .map(VerseRecord::to_indexed_document)
        .collect();

    collection.upsert(&docs).await?;
    Ok(docs.len())
}

/// Load the dataset and index it into `collection`.
pub async fn run_startup_indexing(
    dataset_path: &Path,
    collection: &dyn VectorCollection,
    max_rows: Option<usize>,
) -> IndexOutcome {
    info!(
        path = %dataset_path.display(),
        collection = collection.name(),
        "loading Bhagavad Gita dataset into the collection"
    );

    let dataset = match load_dataset(dataset_path) {
        Ok(dataset) => dataset,
        Err(e) => {
            error!(error = %e, "failed to load dataset; serving with the existing index");
            return IndexOutcome::failed(e.to_string());
        }
    };

    match index_corpus(dataset.records(), collection, max_rows).await {
        Ok(documents) => {
            info!(documents, "loaded documents into the collection");
            IndexOutcome::Ready { documents }
        }
        Err(e) => {
            error!(error = %e, "failed to index dataset; serving with the existing index");
            IndexOutcome::failed(e.to_string())
        }
    }
}
