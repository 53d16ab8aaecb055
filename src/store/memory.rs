//! In-memory [`VectorCollection`] for tests and ephemeral runs.
//!
//! Documents live in a `HashMap` behind `std::sync::RwLock`; query is
//! brute-force cosine similarity over every stored vector.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::embedding::{cosine_similarity, Embedder};
use crate::models::IndexedDocument;

use super::{content_hash, last_wins, rank, QueryMatch, StoreError, VectorCollection};

struct StoredDoc {
    text: String,
    hash: String,
    vector: Vec<f32>,
    /// Insertion sequence, used to keep tie order stable.
    seq: u64,
}

#[derive(Default)]
struct Inner {
    docs: HashMap<String, StoredDoc>,
    next_seq: u64,
}

pub struct InMemoryCollection {
    name: String,
    embedder: Arc<dyn Embedder>,
    inner: RwLock<Inner>,
}

impl InMemoryCollection {
    pub fn new(name: impl Into<String>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            name: name.into(),
            embedder,
            inner: RwLock::new(Inner::default()),
        }
    }
}

#[async_trait]
impl VectorCollection for InMemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let count = self.inner.read().unwrap().docs.len();
        Ok(count)
    }

    async fn upsert(&self, docs: &[IndexedDocument]) -> Result<(), StoreError> {
        let docs = last_wins(docs);

        let changed: Vec<(&IndexedDocument, String)> = {
            let inner = self.inner.read().unwrap();
            let changed = docs
                .into_iter()
                .map(|d| (d, content_hash(&d.text)))
                .filter(|(d, hash)| inner.docs.get(&d.id).map(|s| &s.hash) != Some(hash))
                .collect();
            changed
        };
        if changed.is_empty() {
            return Ok(());
        }

        let texts: Vec<String> = changed.iter().map(|(d, _)| d.text.clone()).collect();
        let vectors = self.embedder.embed(&texts).await?;
        if vectors.len() != texts.len() {
            return Err(StoreError::VectorCountMismatch {
                expected: texts.len(),
                got: vectors.len(),
            });
        }

        let mut inner = self.inner.write().unwrap();
        for ((doc, hash), vector) in changed.into_iter().zip(vectors) {
            let existing_seq = inner.docs.get(&doc.id).map(|s| s.seq);
            let seq = match existing_seq {
                Some(seq) => seq,
                None => {
                    inner.next_seq += 1;
                    inner.next_seq
                }
            };
            inner.docs.insert(
                doc.id.clone(),
                StoredDoc {
                    text: doc.text.clone(),
                    hash,
                    vector,
                    seq,
                },
            );
        }
        Ok(())
    }

    async fn query(&self, text: &str, n_results: usize) -> Result<Vec<QueryMatch>, StoreError> {
        let is_empty = self.inner.read().unwrap().docs.is_empty();
        if n_results == 0 || is_empty {
            return Ok(Vec::new());
        }

        let query_vec = self.embedder.embed_one(text).await?;

        let inner = self.inner.read().unwrap();
        let mut stored: Vec<(&String, &StoredDoc)> = inner.docs.iter().collect();
        stored.sort_by_key(|(_, s)| s.seq);

        let matches = stored
            .into_iter()
            .map(|(id, s)| QueryMatch {
                id: id.clone(),
                text: s.text.clone(),
                score: cosine_similarity(&query_vec, &s.vector),
            })
            .collect();

        Ok(rank(matches, n_results))
    }
}
