//! Retrieval engine: query → embedding → index build → k-NN search.
//!
//! [`retrieve`] is the unit other code composes against. It takes a
//! pre-filtered chunk snapshot (any scoping by owner, document, or date
//! range is the chunk store's concern, not the engine's), constructs a
//! private [`VectorIndex`] for this call only, and returns ranked
//! `(chunk, distance)` pairs. Repeated calls with the same inputs and a
//! deterministic provider return identical results.

use anyhow::Result;
use tracing::debug;

use crate::embedding::EmbeddingProvider;
use crate::index::{ScoredChunk, VectorIndex};
use crate::models::Chunk;

/// Separator between chunk texts in the assembled grounding context.
const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Answer a query against a candidate chunk snapshot.
///
/// Returns up to `top_k` chunks ordered by ascending squared-L2
/// distance. An unembeddable query (empty text, provider timeout
/// degraded to absent) yields an empty result — "no retrieval possible
/// for this query", reported the same way as "no matches found", never
/// as a failure. Provider transport errors propagate to the caller.
pub async fn retrieve<'a>(
    provider: &dyn EmbeddingProvider,
    query_text: &str,
    candidate_chunks: &'a [Chunk],
    top_k: usize,
) -> Result<Vec<ScoredChunk<'a>>> {
    let query_vec = match provider.embed(query_text).await? {
        Some(vec) => vec,
        None => {
            debug!("query produced no embedding, returning no results");
            return Ok(Vec::new());
        }
    };

    let index = VectorIndex::build(provider.dimension(), candidate_chunks);
    debug!(
        candidates = candidate_chunks.len(),
        indexed = index.len(),
        top_k,
        "running nearest-neighbor search"
    );

    Ok(index.search(&query_vec, top_k))
}

/// Concatenate result chunk texts into a grounding context for a
/// language model, separated by `---` dividers.
///
/// Truncation and any further prompt formatting are the caller's
/// policy.
pub fn assemble_context(results: &[ScoredChunk<'_>]) -> String {
    results
        .iter()
        .map(|r| r.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;

    /// Deterministic test provider: embeds a text as normalized letter
    /// frequencies over a tiny fixed alphabet.
    struct LetterFrequencyProvider {
        alphabet: Vec<char>,
    }

    impl LetterFrequencyProvider {
        fn new() -> Self {
            Self {
                alphabet: vec!['a', 'e', 'i', 'o'],
            }
        }
    }

    #[async_trait]
    impl EmbeddingProvider for LetterFrequencyProvider {
        fn model_name(&self) -> &str {
            "letter-frequency-test"
        }

        fn dimension(&self) -> usize {
            self.alphabet.len()
        }

        async fn embed(&self, text: &str) -> Result<Option<Vec<f32>>> {
            if text.trim().is_empty() {
                return Ok(None);
            }
            let mut vec = vec![0.0f32; self.alphabet.len()];
            for c in text.chars() {
                if let Some(pos) = self.alphabet.iter().position(|&a| a == c) {
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

    /// Provider that always fails, for error-propagation tests.
    struct FailingProvider;

    #[async_trait]
    impl EmbeddingProvider for FailingProvider {
        fn model_name(&self) -> &str {
            "failing-test"
        }
        fn dimension(&self) -> usize {
            4
        }
        async fn embed(&self, _text: &str) -> Result<Option<Vec<f32>>> {
            anyhow::bail!("backend unavailable")
        }
    }

    fn make_chunk(id: &str, text: &str, embedding: Option<Vec<f32>>) -> Chunk {
        Chunk {
            id: id.to_string(),
            document_id: "doc1".to_string(),
            chunk_index: 0,
            text: text.to_string(),
            tokens: text.split_whitespace().count() as i64,
            embedding,
            created_at: 0,
        }
    }

    async fn embedded_corpus(provider: &LetterFrequencyProvider) -> Vec<Chunk> {
        let texts = ["aaaa aaaa", "eeee eeee", "iiii iiii", "oooo oooo"];
        let mut chunks = Vec::new();
        for (i, text) in texts.iter().enumerate() {
            let embedding = provider.embed(text).await.unwrap();
            chunks.push(make_chunk(&format!("c{}", i), text, embedding));
        }
        chunks
    }

    #[tokio::test]
    async fn test_retrieve_ranks_by_distance() {
        let provider = LetterFrequencyProvider::new();
        let chunks = embedded_corpus(&provider).await;

        let results = retrieve(&provider, "aaa e", &chunks, 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.id, "c0");
        assert_eq!(results[1].chunk.id, "c1");
        assert!(results[0].distance < results[1].distance);
    }

    #[tokio::test]
    async fn test_empty_query_returns_empty() {
        let provider = LetterFrequencyProvider::new();
        let chunks = embedded_corpus(&provider).await;

        let results = retrieve(&provider, "   ", &chunks, 5).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_empty_candidate_set_returns_empty() {
        let provider = LetterFrequencyProvider::new();
        let results = retrieve(&provider, "aaaa", &[], 5).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_unembedded_corpus_returns_empty() {
        let provider = LetterFrequencyProvider::new();
        let chunks = vec![
            make_chunk("c0", "aaaa", None),
            make_chunk("c1", "eeee", None),
        ];
        let results = retrieve(&provider, "aaaa", &chunks, 5).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let provider = FailingProvider;
        let chunks = vec![make_chunk("c0", "aaaa", Some(vec![1.0, 0.0, 0.0, 0.0]))];
        assert!(retrieve(&provider, "aaaa", &chunks, 5).await.is_err());
    }

    #[tokio::test]
    async fn test_repeated_calls_identical() {
        let provider = LetterFrequencyProvider::new();
        let chunks = embedded_corpus(&provider).await;

        let first = retrieve(&provider, "ao ao ao", &chunks, 3).await.unwrap();
        let second = retrieve(&provider, "ao ao ao", &chunks, 3).await.unwrap();

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.chunk.id, b.chunk.id);
            assert_eq!(a.distance.to_bits(), b.distance.to_bits());
        }
    }

    #[test]
    fn test_assemble_context_separator() {
        let c0 = make_chunk("c0", "first chunk", None);
        let c1 = make_chunk("c1", "second chunk", None);
        let results = vec![
            ScoredChunk {
                chunk: &c0,
                distance: 0.1,
            },
            ScoredChunk {
                chunk: &c1,
                distance: 0.2,
            },
        ];
        assert_eq!(
            assemble_context(&results),
            "first chunk\n\n---\n\nsecond chunk"
        );
        assert_eq!(assemble_context(&[]), "");
    }
}
