//! Ingestion pipeline orchestration.
//!
//! Coordinates the flow: raw input → text extraction → normalization →
//! chunking → embedding → storage. Embedding is inline and non-fatal:
//! a chunk whose embedding fails is stored with `embedding: None` and
//! counted as pending, so a flaky embedding backend degrades retrieval
//! coverage rather than losing data.

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use recall_core::chunk::chunk_text;
use recall_core::embedding::EmbeddingProvider;
use recall_core::models::{Chunk, Document, Modality};
use recall_core::store::ChunkStore;

use crate::config::ChunkingConfig;
use crate::extract;

/// One ingestion request, regardless of where the text came from.
pub struct IngestRequest {
    pub title: String,
    pub text: String,
    pub modality: Modality,
    /// File path or URL the text came from, when one exists.
    pub source: Option<String>,
    /// Caller-owned metadata, stored verbatim.
    pub metadata_json: String,
}

/// Summary of a completed ingestion.
#[derive(Debug)]
pub struct IngestOutcome {
    pub document_id: String,
    pub title: String,
    pub modality: Modality,
    pub chunks_written: u64,
    pub chunks_embedded: u64,
    pub chunks_pending: u64,
}

/// Chunk, embed, and store one document's text.
///
/// Pass `provider = None` when embeddings are disabled; every chunk is
/// then stored unembedded and counted as pending.
pub async fn ingest_document(
    store: &dyn ChunkStore,
    provider: Option<&dyn EmbeddingProvider>,
    chunking: &ChunkingConfig,
    req: IngestRequest,
) -> Result<IngestOutcome> {
    let windows = chunk_text(&req.text, chunking.size, chunking.overlap)?;
    if windows.is_empty() {
        bail!("No text to ingest for '{}'", req.title);
    }

    let now = Utc::now().timestamp();
    let doc = Document {
        id: Uuid::new_v4().to_string(),
        title: req.title.clone(),
        modality: req.modality,
        source: req.source,
        metadata_json: req.metadata_json,
        created_at: now,
    };
    let doc_id = store.insert_document(&doc).await?;

    let mut chunks = Vec::with_capacity(windows.len());
    let mut embedded = 0u64;
    let mut pending = 0u64;

    for (idx, text) in windows.into_iter().enumerate() {
        let embedding = match provider {
            Some(p) => match p.embed(&text).await {
                Ok(vec) => vec,
                Err(e) => {
                    // Absorbed: the chunk is stored, just not indexable yet.
                    warn!(
                        document_id = %doc_id,
                        chunk_index = idx,
                        error = %e,
                        "embedding failed, storing chunk without vector"
                    );
                    None
                }
            },
            None => None,
        };

        match &embedding {
            Some(_) => embedded += 1,
            None => pending += 1,
        }

        chunks.push(Chunk {
            id: Uuid::new_v4().to_string(),
            document_id: doc_id.clone(),
            chunk_index: idx as i64,
            tokens: text.split_whitespace().count() as i64,
            text,
            embedding,
            created_at: now,
        });
    }

    let written = chunks.len() as u64;
    store.append_chunks(&doc_id, &chunks).await?;

    info!(
        document_id = %doc_id,
        modality = %req.modality,
        chunks = written,
        embedded,
        pending,
        "ingested document"
    );

    Ok(IngestOutcome {
        document_id: doc_id,
        title: req.title,
        modality: req.modality,
        chunks_written: written,
        chunks_embedded: embedded,
        chunks_pending: pending,
    })
}

/// Map a file extension to its input modality.
pub fn modality_for_path(path: &Path) -> Modality {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("pdf") => Modality::Pdf,
        Some("md") | Some("markdown") => Modality::Markdown,
        Some("txt") => Modality::Text,
        Some("html") | Some("htm") => Modality::Web,
        _ => Modality::Other,
    }
}

/// Ingest a local file, extracting text according to its type.
pub async fn ingest_file(
    store: &dyn ChunkStore,
    provider: Option<&dyn EmbeddingProvider>,
    chunking: &ChunkingConfig,
    path: &Path,
    title: Option<String>,
) -> Result<IngestOutcome> {
    let modality = modality_for_path(path);

    let text = match modality {
        Modality::Pdf => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            extract::extract_pdf(&bytes)?
        }
        Modality::Web => {
            let html = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            extract::strip_html(&html)
        }
        _ => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
    };

    let title = title.unwrap_or_else(|| {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string())
    });

    ingest_document(
        store,
        provider,
        chunking,
        IngestRequest {
            title,
            text,
            modality,
            source: Some(path.display().to_string()),
            metadata_json: "{}".to_string(),
        },
    )
    .await
}

/// Fetch a web page and ingest its visible text.
pub async fn ingest_url(
    store: &dyn ChunkStore,
    provider: Option<&dyn EmbeddingProvider>,
    chunking: &ChunkingConfig,
    url: &str,
    title: Option<String>,
) -> Result<IngestOutcome> {
    let response = reqwest::get(url)
        .await
        .with_context(|| format!("Failed to fetch {}", url))?;
    if !response.status().is_success() {
        bail!("Fetching {} returned HTTP {}", url, response.status());
    }
    let html = response.text().await?;

    let title = title
        .or_else(|| extract::html_title(&html))
        .unwrap_or_else(|| url.to_string());

    ingest_document(
        store,
        provider,
        chunking,
        IngestRequest {
            title,
            text: extract::strip_html(&html),
            modality: Modality::Web,
            source: Some(url.to_string()),
            metadata_json: "{}".to_string(),
        },
    )
    .await
}

/// Ingest externally produced OCR or speech-transcript text under the
/// Image or Audio modality.
pub async fn ingest_transcript(
    store: &dyn ChunkStore,
    provider: Option<&dyn EmbeddingProvider>,
    chunking: &ChunkingConfig,
    title: String,
    text: String,
    modality: Modality,
    source: Option<String>,
) -> Result<IngestOutcome> {
    if !matches!(modality, Modality::Image | Modality::Audio) {
        bail!(
            "Transcript ingestion expects image or audio modality, got '{}'",
            modality
        );
    }

    ingest_document(
        store,
        provider,
        chunking,
        IngestRequest {
            title,
            text,
            modality,
            source,
            metadata_json: "{}".to_string(),
        },
    )
    .await
}
