//! # Recall Core
//!
//! Shared retrieval logic for Recall: data models, text chunking,
//! the embedding-provider trait, the per-query vector index, the
//! retrieval engine, and the chunk-store abstraction.
//!
//! This crate contains no tokio, sqlx, filesystem I/O, or other
//! native-only dependencies. Async seams use `async-trait` so store
//! and embedding backends can live in the application crate.

pub mod chunk;
pub mod embedding;
pub mod index;
pub mod models;
pub mod retrieve;
pub mod store;
