//! Vector collection abstraction.
//!
//! A [`VectorCollection`] is a named set of documents keyed by ID. It embeds
//! text itself (through an [`Embedder`](crate::embedding::Embedder)), so the
//! rest of the crate only deals in strings:
//!
//! | Method | Purpose |
//! |--------|---------|
//! | [`count`](VectorCollection::count) | Number of stored documents |
//! | [`upsert`](VectorCollection::upsert) | Insert or overwrite documents by ID |
//! | [`query`](VectorCollection::query) | Nearest documents to a query text |
//!
//! Two backends exist: [`sqlite::SqliteCollection`] persists to a SQLite
//! file and is what the server uses; [`memory::InMemoryCollection`] keeps
//! everything in a `RwLock<HashMap>` for tests and ephemeral runs.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::models::IndexedDocument;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to prepare store location: {0}")]
    Io(#[from] std::io::Error),

    #[error("embedder returned {got} vectors for {expected} documents")]
    VectorCountMismatch { expected: usize, got: usize },
}

/// A single hit from [`VectorCollection::query`].
#[derive(Debug, Clone, PartialEq)]
pub struct QueryMatch {
    pub id: String,
    pub text: String,
    /// Cosine similarity to the query, higher is closer.
    pub score: f32,
}

#[async_trait]
pub trait VectorCollection: Send + Sync {
    /// Collection name.
    fn name(&self) -> &str;

    /// Number of documents currently stored.
    async fn count(&self) -> Result<usize, StoreError>;

    /// Insert or overwrite documents by ID in one batch.
    ///
    /// Re-upserting an unchanged document is a no-op; a changed text is
    /// re-embedded. When `docs` repeats an ID the last occurrence wins.
    async fn upsert(&self, docs: &[IndexedDocument]) -> Result<(), StoreError>;

    /// Up to `n_results` documents nearest to `text`, nearest first.
    async fn query(&self, text: &str, n_results: usize) -> Result<Vec<QueryMatch>, StoreError>;
}

/// SHA-256 hex digest of a document text; used to skip re-embedding.
pub(crate) fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Collapse repeated IDs so the last occurrence wins, keeping the position
/// of each ID's first appearance.
pub(crate) fn last_wins(docs: &[IndexedDocument]) -> Vec<&IndexedDocument> {
    let mut slot: HashMap<&str, usize> = HashMap::new();
    let mut out: Vec<&IndexedDocument> = Vec::with_capacity(docs.len());
    for doc in docs {
        match slot.get(doc.id.as_str()) {
            Some(&i) => out[i] = doc,
            None => {
                slot.insert(doc.id.as_str(), out.len());
                out.push(doc);
            }
        }
    }
    out
}

/// Sort by descending score, keeping insertion order among ties.
pub(crate) fn rank(mut matches: Vec<QueryMatch>, n_results: usize) -> Vec<QueryMatch> {
    matches.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    matches.truncate(n_results);
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, text: &str) -> IndexedDocument {
        IndexedDocument {
            id: id.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn last_wins_keeps_first_position() {
        let docs = vec![doc("a", "1"), doc("b", "2"), doc("a", "3")];
        let kept = last_wins(&docs);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0], &doc("a", "3"));
        assert_eq!(kept[1], &doc("b", "2"));
    }

    #[test]
    fn rank_orders_and_truncates() {
        let m = |id: &str, score: f32| QueryMatch {
            id: id.to_string(),
            text: String::new(),
            score,
        };
        let ranked = rank(vec![m("a", 0.1), m("b", 0.9), m("c", 0.5), m("d", 0.5)], 3);
        let ids: Vec<&str> = ranked.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "d"]);
    }

    #[test]
    fn content_hash_is_stable() {
        assert_eq!(content_hash("ID: 1"), content_hash("ID: 1"));
        assert_ne!(content_hash("ID: 1"), content_hash("ID: 2"));
        assert_eq!(content_hash("").len(), 64);
    }
}
