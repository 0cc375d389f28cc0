//! Sliding-window text chunker.
//!
//! Splits normalized document text into overlapping fixed-size windows.
//! Window starts fall at `0, size-overlap, 2*(size-overlap), …` until
//! the start offset reaches the text's character length; each window is
//! the next `size` characters, trimmed of surrounding whitespace.
//! Trimmed windows shorter than [`MIN_CHUNK_CHARS`] are dropped as
//! noise so near-empty fragments are never embedded.
//!
//! Offsets are character-based (not bytes), so multi-byte UTF-8 input
//! never splits inside a code point.
//!
//! # Example
//!
//! ```rust
//! use recall_core::chunk::chunk_text;
//!
//! let text = "x".repeat(2500);
//! let chunks = chunk_text(&text, 1000, 200).unwrap();
//! assert_eq!(chunks.len(), 4); // starts at 0, 800, 1600, 2400
//! ```

use anyhow::{bail, Result};

/// Default window size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Default overlap between consecutive windows in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Minimum trimmed length for a window to be emitted. Anything shorter
/// is treated as noise (stray punctuation, page numbers) and dropped.
pub const MIN_CHUNK_CHARS: usize = 11;

/// Normalize raw text before chunking: strip NUL bytes and convert
/// CRLF / lone CR line endings to LF.
pub fn normalize_text(text: &str) -> String {
    text.replace('\0', "").replace("\r\n", "\n").replace('\r', "\n")
}

/// Split text into overlapping windows of `size` characters.
///
/// The input is normalized first (see [`normalize_text`]). Returns the
/// trimmed window texts in emission order; callers assign chunk
/// ordinals from that order. Deterministic: identical input and
/// parameters always yield identical boundaries and count.
///
/// # Errors
///
/// Fails with a configuration error if `size == 0` or
/// `overlap >= size` — the step would degenerate to zero and the scan
/// would never terminate. Never silently corrected.
pub fn chunk_text(text: &str, size: usize, overlap: usize) -> Result<Vec<String>> {
    if size == 0 {
        bail!("chunking.size must be > 0");
    }
    if overlap >= size {
        bail!(
            "chunking.overlap ({}) must be strictly less than chunking.size ({})",
            overlap,
            size
        );
    }

    let text = normalize_text(text);
    let step = size - overlap;

    // Byte offset of every char boundary, plus the end of the string.
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let n_chars = bounds.len() - 1;

    let mut chunks = Vec::new();
    let mut start = 0usize;
    while start < n_chars {
        let end = (start + size).min(n_chars);
        let window = text[bounds[start]..bounds[end]].trim();
        if window.chars().count() >= MIN_CHUNK_CHARS {
            chunks.push(window.to_string());
        }
        start += step;
    }

    Ok(chunks)
}
