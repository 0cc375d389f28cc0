//! Query command: snapshot selection → retrieval → result printing.

use anyhow::{bail, Result};
use chrono::NaiveDate;

use recall_core::models::Modality;
use recall_core::retrieve::{assemble_context, retrieve};
use recall_core::store::{ChunkFilter, ChunkStore};

use crate::config::Config;
use crate::provider::create_provider;

/// CLI-level scoping options, turned into a [`ChunkFilter`] before the
/// retrieval engine ever sees the corpus.
#[derive(Debug, Default)]
pub struct QueryScope {
    pub document_ids: Option<Vec<String>>,
    pub modality: Option<String>,
    pub since: Option<String>,
    pub until: Option<String>,
}

/// Build the structured chunk filter from CLI flags.
///
/// Dates are `YYYY-MM-DD`; `--since` starts at midnight and `--until`
/// runs to the end of its day. Unknown modalities or malformed dates
/// are configuration errors.
pub fn build_filter(scope: &QueryScope) -> Result<ChunkFilter> {
    let modality = scope
        .modality
        .as_deref()
        .map(|s| s.parse::<Modality>())
        .transpose()?;

    let created_since = scope.since.as_deref().map(parse_day_start).transpose()?;
    let created_until = scope.until.as_deref().map(parse_day_end).transpose()?;

    Ok(ChunkFilter {
        document_ids: scope.document_ids.clone(),
        modality,
        created_since,
        created_until,
    })
}

fn parse_day_start(s: &str) -> Result<i64> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")?;
    match date.and_hms_opt(0, 0, 0) {
        Some(dt) => Ok(dt.and_utc().timestamp()),
        None => bail!("Invalid date: {}", s),
    }
}

fn parse_day_end(s: &str) -> Result<i64> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")?;
    match date.and_hms_opt(23, 59, 59) {
        Some(dt) => Ok(dt.and_utc().timestamp()),
        None => bail!("Invalid date: {}", s),
    }
}

/// Run a semantic query against the store and print ranked results.
pub async fn run_query(
    config: &Config,
    store: &dyn ChunkStore,
    query: &str,
    scope: &QueryScope,
    top_k: Option<usize>,
    show_context: bool,
) -> Result<()> {
    if query.trim().is_empty() {
        println!("No results.");
        return Ok(());
    }

    if !config.embedding.is_enabled() {
        bail!("Querying requires embeddings. Set [embedding] provider in config.");
    }

    let filter = build_filter(scope)?;
    let candidates = store.fetch_chunks(&filter).await?;
    let provider = create_provider(&config.embedding)?;

    let top_k = top_k.unwrap_or(config.retrieval.top_k);
    let results = retrieve(provider.as_ref(), query, &candidates, top_k).await?;

    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, result) in results.iter().enumerate() {
        let doc_title = store
            .get_document(&result.chunk.document_id)
            .await?
            .map(|d| d.title)
            .unwrap_or_else(|| "(unknown document)".to_string());

        let excerpt: String = result.chunk.text.chars().take(240).collect();

        println!(
            "{}. [distance {:.4}] {} (chunk {})",
            i + 1,
            result.distance,
            doc_title,
            result.chunk.chunk_index
        );
        println!("    document: {}", result.chunk.document_id);
        println!("    excerpt: \"{}\"", excerpt.replace('\n', " "));
        println!();
    }

    if show_context {
        println!("--- grounding context ---");
        println!("{}", assemble_context(&results));
    }

    Ok(())
}
