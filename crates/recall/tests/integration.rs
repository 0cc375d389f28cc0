//! End-to-end pipeline tests over the SQLite store: ingest → snapshot
//! → retrieve, with a deterministic in-test embedding provider.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tempfile::TempDir;

use recall::config::ChunkingConfig;
use recall::ingest::{ingest_document, IngestRequest};
use recall::sqlite_store::SqliteStore;
use recall::{db, migrate};

use recall_core::embedding::EmbeddingProvider;
use recall_core::models::{Chunk, Modality};
use recall_core::retrieve::retrieve;
use recall_core::store::{ChunkFilter, ChunkStore};

/// Deterministic test provider: a text embeds to normalized counts of
/// four topic markers. Documents about the same topic land close
/// together, so nearest-neighbor results are predictable.
struct TopicProvider;

const TOPICS: [&str; 4] = ["rust", "python", "kubernetes", "espresso"];

#[async_trait]
impl EmbeddingProvider for TopicProvider {
    fn model_name(&self) -> &str {
        "topic-test"
    }

    fn dimension(&self) -> usize {
        TOPICS.len()
    }

    async fn embed(&self, text: &str) -> Result<Option<Vec<f32>>> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        let lower = text.to_lowercase();
        let mut vec = vec![0.0f32; TOPICS.len()];
        for word in lower.split_whitespace() {
            let word = word.trim_matches(|c: char| !c.is_ascii_alphanumeric());
            if let Some(pos) = TOPICS.iter().position(|&t| t == word) {
                vec[pos] += 1.0;
            }
        }
        let norm: f32 = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vec {
                *v /= norm;
            }
        }
        Ok(Some(vec))
    }
}

async fn temp_store() -> (TempDir, SqliteStore) {
    let tmp = TempDir::new().unwrap();
    let pool = db::connect(&tmp.path().join("recall.sqlite")).await.unwrap();
    migrate::run_migrations(&pool).await.unwrap();
    (tmp, SqliteStore::new(pool))
}

fn chunking() -> ChunkingConfig {
    ChunkingConfig {
        size: 1000,
        overlap: 200,
    }
}

async fn ingest_topic_doc(store: &SqliteStore, title: &str, text: &str, modality: Modality) {
    let provider = TopicProvider;
    ingest_document(
        store,
        Some(&provider),
        &chunking(),
        IngestRequest {
            title: title.to_string(),
            text: text.to_string(),
            modality,
            source: None,
            metadata_json: "{}".to_string(),
        },
    )
    .await
    .unwrap();
}

async fn seeded_corpus(store: &SqliteStore) {
    ingest_topic_doc(
        store,
        "borrow checker notes",
        "Notes about rust ownership. The rust borrow checker and rust lifetimes explained.",
        Modality::Markdown,
    )
    .await;
    ingest_topic_doc(
        store,
        "snake handling",
        "A python tutorial covering python generators and python decorators.",
        Modality::Text,
    )
    .await;
    ingest_topic_doc(
        store,
        "cluster ops",
        "Deploying with kubernetes. Scaling kubernetes workloads and kubernetes operators.",
        Modality::Web,
    )
    .await;
}

#[tokio::test]
async fn test_end_to_end_ingest_and_retrieve() {
    let (_tmp, store) = temp_store().await;
    seeded_corpus(&store).await;

    let provider = TopicProvider;
    let candidates = store.fetch_chunks(&ChunkFilter::all()).await.unwrap();
    assert_eq!(candidates.len(), 3);

    let results = retrieve(&provider, "how does rust handle memory", &candidates, 2)
        .await
        .unwrap();
    assert_eq!(results.len(), 2);
    assert!(results[0].chunk.text.contains("borrow checker"));
    assert!(results[0].distance < results[1].distance);
}

#[tokio::test]
async fn test_embeddings_survive_sqlite_roundtrip() {
    let (_tmp, store) = temp_store().await;
    seeded_corpus(&store).await;

    let chunks = store.fetch_chunks(&ChunkFilter::all()).await.unwrap();
    for chunk in &chunks {
        let embedding = chunk.embedding.as_ref().expect("embedding stored");
        assert_eq!(embedding.len(), TopicProvider.dimension());
        let norm: f32 = embedding.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }
}

#[tokio::test]
async fn test_repeated_retrieval_bit_identical() {
    let (_tmp, store) = temp_store().await;
    seeded_corpus(&store).await;

    let provider = TopicProvider;
    let candidates = store.fetch_chunks(&ChunkFilter::all()).await.unwrap();

    let first = retrieve(&provider, "kubernetes and python", &candidates, 3)
        .await
        .unwrap();
    let second = retrieve(&provider, "kubernetes and python", &candidates, 3)
        .await
        .unwrap();

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.chunk.id, b.chunk.id);
        assert_eq!(a.distance.to_bits(), b.distance.to_bits());
    }
}

#[tokio::test]
async fn test_unembedded_chunks_stored_but_never_retrieved() {
    let (_tmp, store) = temp_store().await;
    seeded_corpus(&store).await;

    // Ingest without a provider: stored, pending, unindexable.
    ingest_document(
        &store,
        None,
        &chunking(),
        IngestRequest {
            title: "pending doc".to_string(),
            text: "An unembedded note mentioning rust twice: rust rust.".to_string(),
            modality: Modality::Text,
            source: None,
            metadata_json: "{}".to_string(),
        },
    )
    .await
    .unwrap();

    let candidates = store.fetch_chunks(&ChunkFilter::all()).await.unwrap();
    assert_eq!(candidates.len(), 4);

    let provider = TopicProvider;
    let results = retrieve(&provider, "rust", &candidates, 10).await.unwrap();
    // Only the three embedded chunks are reachable.
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r.chunk.text != "pending doc"));
    assert!(results
        .iter()
        .all(|r| !r.chunk.text.contains("unembedded")));
}

#[tokio::test]
async fn test_sqlite_cascade_delete() {
    let (_tmp, store) = temp_store().await;
    seeded_corpus(&store).await;

    let docs = store.list_documents().await.unwrap();
    let rust_doc = docs
        .iter()
        .find(|d| d.title == "borrow checker notes")
        .unwrap();

    assert!(store.delete_document(&rust_doc.id).await.unwrap());
    assert!(store.get_document(&rust_doc.id).await.unwrap().is_none());

    let chunks = store.fetch_chunks(&ChunkFilter::all()).await.unwrap();
    assert_eq!(chunks.len(), 2);
    assert!(chunks.iter().all(|c| c.document_id != rust_doc.id));

    assert!(!store.delete_document(&rust_doc.id).await.unwrap());
}

#[tokio::test]
async fn test_sqlite_filter_scoping() {
    let (_tmp, store) = temp_store().await;
    seeded_corpus(&store).await;

    let filter = ChunkFilter {
        modality: Some(Modality::Web),
        ..Default::default()
    };
    let chunks = store.fetch_chunks(&filter).await.unwrap();
    assert_eq!(chunks.len(), 1);
    assert!(chunks[0].text.contains("kubernetes"));

    let docs = store.list_documents().await.unwrap();
    let filter = ChunkFilter {
        document_ids: Some(vec![docs[0].id.clone()]),
        ..Default::default()
    };
    let chunks = store.fetch_chunks(&filter).await.unwrap();
    assert!(chunks.iter().all(|c| c.document_id == docs[0].id));

    // Empty document list selects nothing.
    let filter = ChunkFilter {
        document_ids: Some(Vec::new()),
        ..Default::default()
    };
    assert!(store.fetch_chunks(&filter).await.unwrap().is_empty());

    // A date window in the future excludes everything.
    let filter = ChunkFilter {
        created_since: Some(chrono::Utc::now().timestamp() + 86_400),
        ..Default::default()
    };
    assert!(store.fetch_chunks(&filter).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_long_document_ordinals_and_snapshot_order() {
    let (_tmp, store) = temp_store().await;

    // 2500 chars of topic-bearing text produces windows at
    // 0, 800, 1600, 2400 — four chunks with dense ordinals.
    let sentence = "all about rust and more rust here ";
    let text: String = sentence.chars().cycle().take(2500).collect();
    ingest_topic_doc(&store, "long doc", &text, Modality::Text).await;

    let chunks = store.fetch_chunks(&ChunkFilter::all()).await.unwrap();
    assert_eq!(chunks.len(), 4);
    for (i, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.chunk_index, i as i64);
    }
}

#[tokio::test]
async fn test_provider_arc_dyn_compatible() {
    // The CLI hands Arc<dyn EmbeddingProvider> around; make sure the
    // trait object path behaves like the concrete one.
    let provider: Arc<dyn EmbeddingProvider> = Arc::new(TopicProvider);
    let chunk = Chunk {
        id: "c0".to_string(),
        document_id: "d0".to_string(),
        chunk_index: 0,
        text: "rust".to_string(),
        tokens: 1,
        embedding: provider.embed("rust").await.unwrap(),
        created_at: 0,
    };
    let candidates = vec![chunk];
    let results = retrieve(provider.as_ref(), "rust", &candidates, 1)
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].distance < 1e-6);
}
