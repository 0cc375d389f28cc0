//! Per-query vector index over chunk embeddings.
//!
//! [`VectorIndex`] is an ephemeral value type: built fresh from a chunk
//! snapshot for a single retrieval call and discarded afterwards, so a
//! search can never observe chunks deleted or re-embedded since the
//! snapshot was taken.
//!
//! Search is a brute-force squared-L2 scan. Exact ranking, no
//! approximation.

use tracing::debug;

use crate::embedding::squared_l2;
use crate::models::Chunk;

/// A search hit: a borrowed chunk and its squared-L2 distance from the
/// query. Lower distance means more relevant.
#[derive(Debug, Clone)]
pub struct ScoredChunk<'a> {
    pub chunk: &'a Chunk,
    pub distance: f32,
}

/// Nearest-neighbor index over a snapshot of chunk vectors.
///
/// The index borrows its chunks — it owns nothing and has no
/// persistence. Chunks whose embedding is missing or of the wrong
/// length are skipped at build time, never surfaced by a search.
pub struct VectorIndex<'a> {
    dimension: usize,
    entries: Vec<(&'a Chunk, &'a [f32])>,
}

impl<'a> VectorIndex<'a> {
    /// Build an index over `chunks` for vectors of length `dimension`.
    ///
    /// Silently drops chunks with absent or wrong-length embeddings —
    /// a noisy corpus degrades retrieval quality, not availability.
    /// Zero valid vectors yields an empty index whose every search
    /// returns no results.
    pub fn build(dimension: usize, chunks: &'a [Chunk]) -> Self {
        let mut entries: Vec<(&'a Chunk, &'a [f32])> = Vec::with_capacity(chunks.len());
        let mut skipped = 0usize;

        for chunk in chunks {
            match chunk.embedding.as_deref() {
                Some(vec) if vec.len() == dimension => entries.push((chunk, vec)),
                _ => skipped += 1,
            }
        }

        if skipped > 0 {
            debug!(
                skipped,
                indexed = entries.len(),
                dimension,
                "skipped chunks with missing or wrong-length embeddings"
            );
        }

        Self { dimension, entries }
    }

    /// Number of indexed vectors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no vectors.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Expected vector dimension.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Return up to `k` chunks nearest to `query`, closest first.
    ///
    /// Ties are broken by original corpus order (stable sort). An empty
    /// index, `k == 0`, or a query of the wrong dimension all yield an
    /// empty result — an unembeddable query is a normal operating
    /// condition, not an error.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<ScoredChunk<'a>> {
        if self.entries.is_empty() || k == 0 {
            return Vec::new();
        }
        if query.len() != self.dimension {
            debug!(
                query_len = query.len(),
                dimension = self.dimension,
                "query dimension mismatch, returning no results"
            );
            return Vec::new();
        }

        let mut scored: Vec<ScoredChunk<'a>> = self
            .entries
            .iter()
            .map(|(chunk, vec)| ScoredChunk {
                chunk,
                distance: squared_l2(query, vec),
            })
            .collect();

        scored.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(k);
        scored
    }
}
