//! SQLite-backed [`VectorCollection`].
//!
//! Documents and their embeddings live in the `documents` table (see
//! [`crate::migrate`]), keyed by `(collection, id)`. Vectors are stored as
//! little-endian f32 BLOBs and searched brute-force with cosine similarity,
//! which is plenty for a corpus of a few hundred verses.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::db;
use crate::embedding::{blob_to_vec, cosine_similarity, vec_to_blob, Embedder};
use crate::migrate::run_migrations;
use crate::models::IndexedDocument;

use super::{content_hash, last_wins, rank, QueryMatch, StoreError, VectorCollection};

pub struct SqliteCollection {
    pool: SqlitePool,
    name: String,
    embedder: Arc<dyn Embedder>,
}

impl SqliteCollection {
    /// Open the database at `path` and get or create the named collection.
    pub async fn open(
        path: &Path,
        name: &str,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, StoreError> {
        let pool = db::connect(path).await?;
        Self::with_pool(pool, name, embedder).await
    }

    /// Get or create the named collection on an existing pool.
    pub async fn with_pool(
        pool: SqlitePool,
        name: &str,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, StoreError> {
        run_migrations(&pool).await?;

        sqlx::query("INSERT INTO collections (name, created_at) VALUES (?, ?) ON CONFLICT(name) DO NOTHING")
            .bind(name)
            .bind(chrono::Utc::now().timestamp())
            .execute(&pool)
            .await?;

        Ok(Self {
            pool,
            name: name.to_string(),
            embedder,
        })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl VectorCollection for SqliteCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE collection = ?")
            .bind(&self.name)
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }

    async fn upsert(&self, docs: &[IndexedDocument]) -> Result<(), StoreError> {
        let docs = last_wins(docs);
        let model = self.embedder.model_name().to_string();

        let rows = sqlx::query("SELECT id, content_hash, model FROM documents WHERE collection = ?")
            .bind(&self.name)
            .fetch_all(&self.pool)
            .await?;
        let existing: HashMap<String, (String, String)> = rows
            .iter()
            .map(|row| {
                (
                    row.get::<String, _>("id"),
                    (row.get("content_hash"), row.get("model")),
                )
            })
            .collect();

        let changed: Vec<(&IndexedDocument, String)> = docs
            .into_iter()
            .map(|d| (d, content_hash(&d.text)))
            .filter(|(d, hash)| match existing.get(&d.id) {
                Some((stored_hash, stored_model)) => stored_hash != hash || *stored_model != model,
                None => true,
            })
            .collect();

        if changed.is_empty() {
            debug!(collection = %self.name, "upsert: nothing changed");
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

        let now = chrono::Utc::now().timestamp();
        let mut tx = self.pool.begin().await?;

        for ((doc, hash), vector) in changed.iter().zip(vectors.iter()) {
            sqlx::query(
                r#"
                INSERT INTO documents (collection, id, document, content_hash, model, embedding, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(collection, id) DO UPDATE SET
                    document = excluded.document,
                    content_hash = excluded.content_hash,
                    model = excluded.model,
                    embedding = excluded.embedding,
                    updated_at = excluded.updated_at
                "#,
            )
            .bind(&self.name)
            .bind(&doc.id)
            .bind(&doc.text)
            .bind(hash)
            .bind(&model)
            .bind(vec_to_blob(vector))
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!(collection = %self.name, upserted = changed.len(), "upsert committed");
        Ok(())
    }

    async fn query(&self, text: &str, n_results: usize) -> Result<Vec<QueryMatch>, StoreError> {
        if n_results == 0 {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(
            "SELECT id, document, embedding FROM documents WHERE collection = ? ORDER BY rowid",
        )
        .bind(&self.name)
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let query_vec = self.embedder.embed_one(text).await?;

        let matches = rows
            .iter()
            .map(|row| {
                let blob: Vec<u8> = row.get("embedding");
                QueryMatch {
                    id: row.get("id"),
                    text: row.get("document"),
                    score: cosine_similarity(&query_vec, &blob_to_vec(&blob)),
                }
            })
            .collect();

        Ok(rank(matches, n_results))
    }
}
