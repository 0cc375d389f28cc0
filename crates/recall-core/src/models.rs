//! Core data models used throughout Recall.
//!
//! These types represent the documents and chunks that flow through the
//! ingestion and retrieval pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The input modality a document was ingested from.
///
/// OCR and transcription happen upstream; by the time a document
/// reaches the store its body is plain text regardless of modality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Pdf,
    Text,
    Image,
    Audio,
    Web,
    Markdown,
    Other,
}

impl Modality {
    /// Stable lowercase encoding used for storage and CLI parsing.
    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Pdf => "pdf",
            Modality::Text => "text",
            Modality::Image => "image",
            Modality::Audio => "audio",
            Modality::Web => "web",
            Modality::Markdown => "markdown",
            Modality::Other => "other",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Modality {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pdf" => Ok(Modality::Pdf),
            "text" => Ok(Modality::Text),
            "image" => Ok(Modality::Image),
            "audio" => Ok(Modality::Audio),
            "web" => Ok(Modality::Web),
            "markdown" => Ok(Modality::Markdown),
            "other" => Ok(Modality::Other),
            other => anyhow::bail!(
                "Unknown modality: '{}'. Must be pdf, text, image, audio, web, markdown, or other.",
                other
            ),
        }
    }
}

/// A document stored in the chunk store.
///
/// Owns an ordered sequence of [`Chunk`]s (1:N); deleting a document
/// cascade-deletes its chunks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Document UUID.
    pub id: String,
    /// Human-readable title (file name, URL, or caller-supplied).
    pub title: String,
    /// Input modality the body text came from.
    pub modality: Modality,
    /// Source locator: file path or URL, when one exists.
    pub source: Option<String>,
    /// Free-form JSON metadata owned by the caller.
    pub metadata_json: String,
    /// Creation timestamp (unix seconds).
    pub created_at: i64,
}

/// A chunk of a document's body text.
///
/// Chunks are append-only: created once during ingestion, never mutated,
/// and destroyed only by cascading document deletion. A chunk whose
/// `embedding` is `None` (or of the wrong length for the active
/// provider) is excluded from indexing but never from storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Chunk UUID.
    pub id: String,
    /// Parent document UUID.
    pub document_id: String,
    /// Zero-based ordinal within the parent document, contiguous with
    /// no gaps, assigned in emission order.
    pub chunk_index: i64,
    /// Normalized chunk text (non-empty).
    pub text: String,
    /// Whitespace word-count approximation of token count.
    pub tokens: i64,
    /// Embedding vector of the provider's dimension, or `None` when
    /// embedding failed or has not run yet.
    pub embedding: Option<Vec<f32>>,
    /// Creation timestamp (unix seconds).
    pub created_at: i64,
}
