//! Startup indexing against the in-memory and SQLite collections.

mod common;

use std::sync::Arc;

use common::{write_dataset, KeywordEmbedder, UnreachableCollection, SAMPLE_ROWS};
use gita_advisor::dataset::load_dataset;
use gita_advisor::indexer::{index_corpus, run_startup_indexing, IndexOutcome};
use gita_advisor::models::IndexedDocument;
use gita_advisor::store::memory::InMemoryCollection;
use gita_advisor::store::sqlite::SqliteCollection;
use gita_advisor::store::VectorCollection;
use tempfile::TempDir;

#[tokio::test]
async fn startup_indexing_loads_every_row() {
    let tmp = TempDir::new().unwrap();
    let dataset = write_dataset(tmp.path(), SAMPLE_ROWS);
    let collection = InMemoryCollection::new("bhagavad_gita", KeywordEmbedder::new());

    let outcome = run_startup_indexing(&dataset, &collection, None).await;

    assert_eq!(outcome, IndexOutcome::Ready { documents: 5 });
    assert_eq!(collection.count().await.unwrap(), 5);
}

#[tokio::test]
async fn reindexing_same_ids_does_not_grow_collection() {
    let tmp = TempDir::new().unwrap();
    let dataset = write_dataset(tmp.path(), SAMPLE_ROWS);
    let embedder = KeywordEmbedder::new();
    let collection = InMemoryCollection::new("bhagavad_gita", embedder.clone());

    run_startup_indexing(&dataset, &collection, None).await;
    let first = collection.count().await.unwrap();
    run_startup_indexing(&dataset, &collection, None).await;

    assert_eq!(collection.count().await.unwrap(), first);
    // Unchanged documents are not embedded a second time.
    assert_eq!(embedder.texts_embedded(), 5);
}

#[tokio::test]
async fn max_rows_bounds_indexing_volume() {
    let tmp = TempDir::new().unwrap();
    let dataset = write_dataset(tmp.path(), SAMPLE_ROWS);
    let collection = InMemoryCollection::new("bhagavad_gita", KeywordEmbedder::new());

    let outcome = run_startup_indexing(&dataset, &collection, Some(2)).await;

    assert_eq!(outcome.documents_loaded(), 2);
    assert_eq!(collection.count().await.unwrap(), 2);
}

#[tokio::test]
async fn max_rows_larger_than_corpus_indexes_everything() {
    let tmp = TempDir::new().unwrap();
    let dataset = load_dataset(&write_dataset(tmp.path(), SAMPLE_ROWS)).unwrap();
    let collection = InMemoryCollection::new("bhagavad_gita", KeywordEmbedder::new());

    let indexed = index_corpus(dataset.records(), &collection, Some(500))
        .await
        .unwrap();

    assert_eq!(indexed, 5);
}

#[tokio::test]
async fn missing_dataset_reports_failure_with_zero_documents() {
    let tmp = TempDir::new().unwrap();
    let collection = InMemoryCollection::new("bhagavad_gita", KeywordEmbedder::new());

    let outcome = run_startup_indexing(&tmp.path().join("absent.csv"), &collection, None).await;

    assert!(!outcome.is_ready());
    assert_eq!(outcome.documents_loaded(), 0);
    match outcome {
        IndexOutcome::Failed { reason, .. } => assert!(reason.contains("not found")),
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn store_failure_reports_failure_instead_of_panicking() {
    let tmp = TempDir::new().unwrap();
    let dataset = write_dataset(tmp.path(), SAMPLE_ROWS);

    let outcome = run_startup_indexing(&dataset, &UnreachableCollection, None).await;

    assert_eq!(outcome.documents_loaded(), 0);
    assert!(!outcome.is_ready());
}

#[tokio::test]
async fn duplicate_ids_overwrite_silently() {
    let tmp = TempDir::new().unwrap();
    let rows = [
        SAMPLE_ROWS[0],
        "BG2.47,2,47,replacement,,h,Later row about peace,w,c",
    ];
    let dataset = write_dataset(tmp.path(), &rows);
    let collection = InMemoryCollection::new("bhagavad_gita", KeywordEmbedder::new());

    let outcome = run_startup_indexing(&dataset, &collection, None).await;

    assert!(outcome.is_ready());
    assert_eq!(collection.count().await.unwrap(), 1);
    let hits = collection.query("peace", 5).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert!(hits[0].text.contains("Shloka: replacement"));
}

#[tokio::test]
async fn sqlite_collection_is_idempotent_and_persistent() {
    let tmp = TempDir::new().unwrap();
    let dataset = write_dataset(tmp.path(), SAMPLE_ROWS);
    let db_path = tmp.path().join("store").join("index.sqlite");
    let embedder = KeywordEmbedder::new();

    {
        let collection = SqliteCollection::open(&db_path, "bhagavad_gita", embedder.clone())
            .await
            .unwrap();
        run_startup_indexing(&dataset, &collection, None).await;
        run_startup_indexing(&dataset, &collection, None).await;
        assert_eq!(collection.count().await.unwrap(), 5);
        collection.pool().close().await;
    }
    assert_eq!(embedder.texts_embedded(), 5);

    let reopened = SqliteCollection::open(&db_path, "bhagavad_gita", embedder.clone())
        .await
        .unwrap();
    assert_eq!(reopened.count().await.unwrap(), 5);

    let hits = reopened.query("fear and anger", 2).await.unwrap();
    assert_eq!(hits[0].id, "BG2.56");
}

#[tokio::test]
async fn sqlite_collections_are_isolated_by_name() {
    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("index.sqlite");
    let embedder = KeywordEmbedder::new();

    let gita = SqliteCollection::open(&db_path, "bhagavad_gita", embedder.clone())
        .await
        .unwrap();
    let other = SqliteCollection::with_pool(gita.pool().clone(), "other", embedder)
        .await
        .unwrap();

    gita.upsert(&[IndexedDocument {
        id: "BG1.1".to_string(),
        text: "duty".to_string(),
    }])
    .await
    .unwrap();

    assert_eq!(gita.count().await.unwrap(), 1);
    assert_eq!(other.count().await.unwrap(), 0);
    assert!(other.query("duty", 3).await.unwrap().is_empty());
}

#[tokio::test]
async fn changed_text_is_reembedded_under_same_id() {
    let embedder = KeywordEmbedder::new();
    let collection: Arc<dyn VectorCollection> =
        Arc::new(InMemoryCollection::new("bhagavad_gita", embedder.clone()));

    let doc = |text: &str| IndexedDocument {
        id: "BG2.47".to_string(),
        text: text.to_string(),
    };
    collection.upsert(&[doc("about duty")]).await.unwrap();
    collection.upsert(&[doc("about grief")]).await.unwrap();

    assert_eq!(collection.count().await.unwrap(), 1);
    assert_eq!(embedder.texts_embedded(), 2);
    let hits = collection.query("grief", 1).await.unwrap();
    assert_eq!(hits[0].text, "about grief");
}
