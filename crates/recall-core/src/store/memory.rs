//! In-memory [`ChunkStore`] implementation for tests and embedded use.
//!
//! Uses `HashMap` and `Vec` behind `std::sync::RwLock` for thread
//! safety. Filtering and ordering match the SQLite backend so both can
//! back the same retrieval pipeline interchangeably.

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Chunk, Document};

use super::{ChunkFilter, ChunkStore};

/// In-memory store backed by `RwLock`-guarded collections.
pub struct InMemoryStore {
    docs: RwLock<HashMap<String, Document>>,
    chunks: RwLock<Vec<Chunk>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(HashMap::new()),
            chunks: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn matches_filter(chunk: &Chunk, doc: &Document, filter: &ChunkFilter) -> bool {
    if let Some(ids) = &filter.document_ids {
        if !ids.iter().any(|id| id == &chunk.document_id) {
            return false;
        }
    }
    if let Some(modality) = filter.modality {
        if doc.modality != modality {
            return false;
        }
    }
    if let Some(since) = filter.created_since {
        if doc.created_at < since {
            return false;
        }
    }
    if let Some(until) = filter.created_until {
        if doc.created_at > until {
            return false;
        }
    }
    true
}

#[async_trait]
impl ChunkStore for InMemoryStore {
    async fn insert_document(&self, doc: &Document) -> Result<String> {
        let mut docs = self.docs.write().unwrap();
        docs.insert(doc.id.clone(), doc.clone());
        Ok(doc.id.clone())
    }

    async fn append_chunks(&self, doc_id: &str, chunks: &[Chunk]) -> Result<()> {
        let mut stored = self.chunks.write().unwrap();
        for c in chunks {
            debug_assert_eq!(c.document_id, doc_id);
            stored.push(c.clone());
        }
        Ok(())
    }

    async fn get_document(&self, id: &str) -> Result<Option<Document>> {
        let docs = self.docs.read().unwrap();
        Ok(docs.get(id).cloned())
    }

    async fn list_documents(&self) -> Result<Vec<Document>> {
        let docs = self.docs.read().unwrap();
        let mut all: Vec<Document> = docs.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn delete_document(&self, id: &str) -> Result<bool> {
        let removed = {
            let mut docs = self.docs.write().unwrap();
            docs.remove(id).is_some()
        };
        if removed {
            let mut chunks = self.chunks.write().unwrap();
            chunks.retain(|c| c.document_id != id);
        }
        Ok(removed)
    }

    async fn fetch_chunks(&self, filter: &ChunkFilter) -> Result<Vec<Chunk>> {
        let docs = self.docs.read().unwrap();
        let chunks = self.chunks.read().unwrap();

        let mut snapshot: Vec<Chunk> = chunks
            .iter()
            .filter(|c| {
                docs.get(&c.document_id)
                    .map(|doc| matches_filter(c, doc, filter))
                    .unwrap_or(false)
            })
            .cloned()
            .collect();

        snapshot.sort_by(|a, b| {
            let da = docs.get(&a.document_id).map(|d| d.created_at).unwrap_or(0);
            let db = docs.get(&b.document_id).map(|d| d.created_at).unwrap_or(0);
            da.cmp(&db)
                .then(a.document_id.cmp(&b.document_id))
                .then(a.chunk_index.cmp(&b.chunk_index))
        });

        Ok(snapshot)
    }
}
