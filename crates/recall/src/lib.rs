//! # Recall
//!
//! A local-first semantic retrieval engine over heterogeneous
//! documents. Text, Markdown, PDFs, web pages, and externally produced
//! OCR or speech transcripts are chunked into overlapping windows,
//! embedded, and stored; natural-language queries retrieve the nearest
//! chunks by squared-L2 distance for use as language-model grounding
//! context.
//!
//! The retrieval core (chunker, embedding contract, vector index,
//! retrieval engine, store trait) lives in the `recall-core` crate;
//! this crate adds the SQLite store, embedding providers, ingestion
//! pipeline, and the `recall` CLI.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────┐
//! │  Ingestion   │──▶│   Pipeline   │──▶│  SQLite  │
//! │ file/url/ocr │   │ chunk+embed  │   │  chunks  │
//! └──────────────┘   └──────────────┘   └────┬─────┘
//!                                            │ snapshot
//!                                            ▼
//!                    ┌──────────────┐   ┌──────────┐
//!                    │  VectorIndex │◀──│ retrieve │──▶ ranked chunks
//!                    │  (per query) │   └──────────┘
//!                    └──────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | SQLite connection setup |
//! | [`migrate`] | Schema migrations |
//! | [`sqlite_store`] | SQLite chunk store |
//! | [`provider`] | Embedding providers (OpenAI, disabled, timeout) |
//! | [`extract`] | PDF and HTML text extraction |
//! | [`ingest`] | Ingestion pipeline |
//! | [`query`] | Query command |

pub mod config;
pub mod db;
pub mod extract;
pub mod ingest;
pub mod migrate;
pub mod provider;
pub mod query;
pub mod sqlite_store;
