//! Storage abstraction for Recall.
//!
//! The [`ChunkStore`] trait defines the operations the ingestion and
//! retrieval pipeline need from a persistence backend, enabling
//! pluggable implementations (SQLite, in-memory). Filtering of the
//! chunk snapshot handed to retrieval is a store concern, expressed as
//! a structured [`ChunkFilter`] — the retrieval engine itself never
//! inspects ownership, modality, or dates.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

pub use memory::InMemoryStore;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Chunk, Document, Modality};

/// Structured predicate for selecting the chunk snapshot to search.
///
/// All fields are conjunctive; `None` means "no constraint". Date
/// bounds apply to the parent document's creation time, in unix
/// seconds, inclusive on both ends.
#[derive(Debug, Clone, Default)]
pub struct ChunkFilter {
    /// Restrict to chunks of these documents.
    pub document_ids: Option<Vec<String>>,
    /// Restrict to documents of this modality.
    pub modality: Option<Modality>,
    /// Only documents created at or after this timestamp.
    pub created_since: Option<i64>,
    /// Only documents created at or before this timestamp.
    pub created_until: Option<i64>,
}

impl ChunkFilter {
    /// A filter that selects every stored chunk.
    pub fn all() -> Self {
        Self::default()
    }
}

/// Abstract storage backend for documents and their chunks.
///
/// Chunks are append-only: they are written once during ingestion and
/// removed only by cascading document deletion. `fetch_chunks` returns
/// a deterministic order (document creation time, then document id,
/// then chunk index) so repeated retrievals over an unmodified corpus
/// see an identical snapshot.
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Insert a document. Returns its id.
    async fn insert_document(&self, doc: &Document) -> Result<String>;

    /// Append chunks to a document. Ordinals are the caller's
    /// responsibility and must be dense starting at 0.
    async fn append_chunks(&self, doc_id: &str, chunks: &[Chunk]) -> Result<()>;

    /// Retrieve a document by id.
    async fn get_document(&self, id: &str) -> Result<Option<Document>>;

    /// List all documents, oldest first.
    async fn list_documents(&self) -> Result<Vec<Document>>;

    /// Delete a document and all of its chunks. Returns `false` when
    /// no such document existed.
    async fn delete_document(&self, id: &str) -> Result<bool>;

    /// Fetch the chunk snapshot matching `filter`, in deterministic
    /// order, embeddings included.
    async fn fetch_chunks(&self, filter: &ChunkFilter) -> Result<Vec<Chunk>>;
}
