//! # Recall CLI (`recall`)
//!
//! The `recall` binary is the primary interface for Recall. It provides
//! commands for database initialization, document ingestion, semantic
//! querying, and corpus management.
//!
//! ## Usage
//!
//! ```bash
//! recall --config ./config/recall.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `recall init` | Create the SQLite database and run schema migrations |
//! | `recall ingest file <path>` | Ingest a local file (txt, md, pdf, html) |
//! | `recall ingest text <title> <text>` | Ingest raw text |
//! | `recall ingest url <url>` | Fetch and ingest a web page |
//! | `recall ingest transcript <path>` | Ingest an OCR/ASR transcript file |
//! | `recall query "<query>"` | Retrieve the chunks nearest to a query |
//! | `recall list` | List ingested documents |
//! | `recall delete <id>` | Delete a document and its chunks |

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use recall::config::{load_config, Config};
use recall::ingest;
use recall::provider::create_provider;
use recall::query::{run_query, QueryScope};
use recall::sqlite_store::SqliteStore;
use recall::{db, migrate};

use recall_core::embedding::EmbeddingProvider;
use recall_core::models::Modality;
use recall_core::store::ChunkStore;

/// Recall CLI — a local-first semantic retrieval engine over
/// heterogeneous documents.
#[derive(Parser)]
#[command(
    name = "recall",
    about = "Recall — a local-first semantic retrieval engine over heterogeneous documents",
    version,
    long_about = "Recall ingests text, Markdown, PDFs, web pages, and externally produced \
    OCR/speech transcripts, splits them into overlapping chunks, embeds each chunk, and \
    answers natural-language queries by nearest-neighbor search over the chunk corpus."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/recall.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the documents and chunks
    /// tables. Idempotent — running it multiple times is safe.
    Init,

    /// Ingest a document into the corpus.
    Ingest {
        #[command(subcommand)]
        source: IngestCommands,
    },

    /// Retrieve the chunks nearest to a natural-language query.
    ///
    /// Prints ranked (distance, document, chunk) results; lower
    /// distance means more relevant. Requires an enabled embedding
    /// provider.
    Query {
        /// The query text.
        query: String,

        /// Number of results to return (default from config).
        #[arg(long)]
        top_k: Option<usize>,

        /// Restrict to one or more document ids.
        #[arg(long = "doc")]
        document_ids: Vec<String>,

        /// Restrict to a modality (pdf, text, image, audio, web, markdown, other).
        #[arg(long)]
        modality: Option<String>,

        /// Only documents created on or after this date (YYYY-MM-DD).
        #[arg(long)]
        since: Option<String>,

        /// Only documents created on or before this date (YYYY-MM-DD).
        #[arg(long)]
        until: Option<String>,

        /// Also print the assembled grounding context.
        #[arg(long)]
        show_context: bool,
    },

    /// List ingested documents, oldest first.
    List,

    /// Delete a document and all of its chunks.
    Delete {
        /// Document id.
        id: String,
    },
}

/// Ingestion sources.
#[derive(Subcommand)]
enum IngestCommands {
    /// Ingest a local file; the extension selects the extractor
    /// (.pdf, .md, .txt, .html, anything else as plain text).
    File {
        path: PathBuf,

        /// Override the document title (defaults to the file name).
        #[arg(long)]
        title: Option<String>,
    },

    /// Ingest raw text supplied on the command line.
    Text {
        title: String,
        text: String,
    },

    /// Fetch a web page and ingest its visible text.
    Url {
        url: String,

        /// Override the document title (defaults to the page title).
        #[arg(long)]
        title: Option<String>,
    },

    /// Ingest an externally produced OCR or speech transcript file.
    Transcript {
        /// Path to the transcript text file.
        path: PathBuf,

        /// Transcript modality: image or audio.
        #[arg(long, default_value = "audio")]
        modality: String,

        /// Override the document title (defaults to the file name).
        #[arg(long)]
        title: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            let pool = db::connect(&config.db.path).await?;
            migrate::run_migrations(&pool).await?;
            pool.close().await;
            println!("Initialized database at {}", config.db.path.display());
            Ok(())
        }
        Commands::Ingest { source } => {
            let store = open_store(&config).await?;
            let provider = ingest_provider(&config)?;
            let provider_ref = provider.as_deref();

            let outcome = match source {
                IngestCommands::File { path, title } => {
                    ingest::ingest_file(&store, provider_ref, &config.chunking, &path, title)
                        .await?
                }
                IngestCommands::Text { title, text } => {
                    ingest::ingest_document(
                        &store,
                        provider_ref,
                        &config.chunking,
                        ingest::IngestRequest {
                            title,
                            text,
                            modality: Modality::Text,
                            source: None,
                            metadata_json: "{}".to_string(),
                        },
                    )
                    .await?
                }
                IngestCommands::Url { url, title } => {
                    ingest::ingest_url(&store, provider_ref, &config.chunking, &url, title).await?
                }
                IngestCommands::Transcript {
                    path,
                    modality,
                    title,
                } => {
                    let modality = modality.parse::<Modality>()?;
                    let text = std::fs::read_to_string(&path)?;
                    let title = title.unwrap_or_else(|| {
                        path.file_name()
                            .map(|n| n.to_string_lossy().into_owned())
                            .unwrap_or_else(|| path.display().to_string())
                    });
                    ingest::ingest_transcript(
                        &store,
                        provider_ref,
                        &config.chunking,
                        title,
                        text,
                        modality,
                        Some(path.display().to_string()),
                    )
                    .await?
                }
            };

            println!("ingested \"{}\" ({})", outcome.title, outcome.modality);
            println!("  document: {}", outcome.document_id);
            println!("  chunks written: {}", outcome.chunks_written);
            if config.embedding.is_enabled() {
                println!("  chunks embedded: {}", outcome.chunks_embedded);
                println!("  chunks pending: {}", outcome.chunks_pending);
            }
            store.pool().close().await;
            Ok(())
        }
        Commands::Query {
            query,
            top_k,
            document_ids,
            modality,
            since,
            until,
            show_context,
        } => {
            let store = open_store(&config).await?;
            let scope = QueryScope {
                document_ids: if document_ids.is_empty() {
                    None
                } else {
                    Some(document_ids)
                },
                modality,
                since,
                until,
            };
            run_query(&config, &store, &query, &scope, top_k, show_context).await?;
            store.pool().close().await;
            Ok(())
        }
        Commands::List => {
            let store = open_store(&config).await?;
            let docs = store.list_documents().await?;
            if docs.is_empty() {
                println!("No documents.");
            }
            for doc in docs {
                let date = chrono::DateTime::from_timestamp(doc.created_at, 0)
                    .map(|dt| dt.format("%Y-%m-%d").to_string())
                    .unwrap_or_default();
                println!("{}  {}  [{}]  {}", doc.id, date, doc.modality, doc.title);
                if let Some(source) = doc.source {
                    println!("    source: {}", source);
                }
            }
            store.pool().close().await;
            Ok(())
        }
        Commands::Delete { id } => {
            let store = open_store(&config).await?;
            if store.delete_document(&id).await? {
                println!("Deleted document {}", id);
            } else {
                println!("No such document: {}", id);
            }
            store.pool().close().await;
            Ok(())
        }
    }
}

async fn open_store(config: &Config) -> Result<SqliteStore> {
    let pool = db::connect(&config.db.path).await?;
    migrate::run_migrations(&pool).await?;
    Ok(SqliteStore::new(pool))
}

fn ingest_provider(config: &Config) -> Result<Option<Arc<dyn EmbeddingProvider>>> {
    if config.embedding.is_enabled() {
        Ok(Some(create_provider(&config.embedding)?))
    } else {
        Ok(None)
    }
}
