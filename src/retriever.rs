//! Passage retrieval over the verse collection.

use std::sync::Arc;

use tracing::debug;

use crate::store::{StoreError, VectorCollection};

/// Thin wrapper that turns collection hits into passage texts.
#[derive(Clone)]
pub struct Retriever {
    collection: Arc<dyn VectorCollection>,
}

impl Retriever {
    pub fn new(collection: Arc<dyn VectorCollection>) -> Self {
        Self { collection }
    }

    /// Up to `n` passages nearest to `query`, in the collection's ranking.
    ///
    /// `Ok(vec![])` means nothing matched; `Err` means the store itself
    /// failed. Callers that only care about "any passages?" can treat both
    /// alike, but should log the error.
    pub async fn retrieve(&self, query: &str, n: usize) -> Result<Vec<String>, StoreError> {
        let matches = self.collection.query(query, n).await?;
        debug!(
            collection = self.collection.name(),
            requested = n,
            found = matches.len(),
            "retrieved passages"
        );
        Ok(matches.into_iter().map(|m| m.text).collect())
    }
}
