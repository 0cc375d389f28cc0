//! Embedding provider trait and vector utilities.
//!
//! Defines the [`EmbeddingProvider`] trait that all embedding backends
//! implement, plus pure helper functions for vector serialization and
//! distance computation.
//!
//! Concrete provider implementations (OpenAI, disabled, timeout
//! wrapper) live in the `recall` app crate.

use anyhow::Result;
use async_trait::async_trait;

/// Trait for embedding providers.
///
/// The provider's dimension is fixed for its lifetime; every vector it
/// returns has exactly that length. Mixing vectors from providers of
/// different dimensions in one corpus is an error on the caller's side.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Returns the model identifier (e.g. `"text-embedding-3-small"`).
    fn model_name(&self) -> &str;

    /// Returns the embedding vector dimensionality (e.g. `384`).
    fn dimension(&self) -> usize;

    /// Embed a single text.
    ///
    /// Returns `Ok(None)` for empty or whitespace-only input — never a
    /// zero vector, which would wrongly cluster near other
    /// low-magnitude embeddings. Callers treat `None` as "exclude from
    /// index". Transport or backend failures are returned as errors.
    async fn embed(&self, text: &str) -> Result<Option<Vec<f32>>>;
}

/// Compute the squared Euclidean (L2) distance between two vectors.
///
/// This is the ranking signal for retrieval: lower is better. Returns
/// `f32::INFINITY` for vectors of different lengths so a malformed
/// pairing can never outrank a valid one.
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::INFINITY;
    }
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Encode a float vector as a BLOB (little-endian f32 bytes).
///
/// Each `f32` is stored as 4 bytes in little-endian order, producing
/// a BLOB of `vec.len() × 4` bytes.
///
/// # Example
///
/// ```rust
/// use recall_core::embedding::{vec_to_blob, blob_to_vec};
///
/// let v = vec![1.0f32, -2.5, 3.125];
/// let blob = vec_to_blob(&v);
/// assert_eq!(blob.len(), 12); // 3 × 4 bytes
/// assert_eq!(blob_to_vec(&blob), v);
/// ```
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vec.len() * 4);
    for &v in vec {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

/// Decode a BLOB back into a float vector.
///
/// Reverses [`vec_to_blob`]: reads 4-byte little-endian `f32` values
/// from the byte slice.
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_blob_roundtrip() {
        let vec = vec![1.0f32, -2.5, 3.125, 0.0, -0.001];
        let blob = vec_to_blob(&vec);
        let restored = blob_to_vec(&blob);
        assert_eq!(vec, restored);
    }

    #[test]
    fn test_squared_l2_identical() {
        let v = vec![1.0, 2.0, 3.0];
        assert_eq!(squared_l2(&v, &v), 0.0);
    }

    #[test]
    fn test_squared_l2_unit_axes() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        assert!((squared_l2(&a, &b) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_squared_l2_length_mismatch_is_infinite() {
        let a = vec![1.0, 2.0];
        let b = vec![1.0];
        assert_eq!(squared_l2(&a, &b), f32::INFINITY);
    }

    #[test]
    fn test_squared_l2_empty() {
        assert_eq!(squared_l2(&[], &[]), 0.0);
    }
}
