//! Fixed-size sliding-window text chunker.
//!
//! Splits extracted document text into [`TextChunk`]s of at most
//! `chunk_size` characters, with consecutive chunks sharing exactly
//! `overlap` characters. The chunk sequence covers the source text with no
//! gaps, so the original text can always be rebuilt with [`reassemble`].
//!
//! Each chunk carries a SHA-256 hash of its content for staleness detection
//! in the embedding pipeline.
//!
//! # Algorithm
//!
//! 1. Validate parameters: `chunk_size > 0` and `overlap < chunk_size`.
//! 2. Start with cursor `start = 0`.
//! 3. Emit `text[start..min(start + chunk_size, len)]`.
//! 4. Stop once the emitted window reaches the end of the text; otherwise
//!    move the cursor to `end - overlap` and repeat.
//!
//! Offsets are counted in characters, never bytes, so a window never splits
//! a multi-byte UTF-8 sequence.
//!
//! # Example
//!
//! ```rust
//! use maturion_core::chunk::{chunk_text, ChunkParams};
//!
//! let chunks = chunk_text("hello world", &ChunkParams::default()).unwrap();
//! assert_eq!(chunks.len(), 1);
//! assert_eq!(chunks[0].end_offset, 11);
//! ```

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::CoreError;
use crate::models::TextChunk;

/// Default window length in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 2000;

/// Default number of characters shared by consecutive windows.
pub const DEFAULT_OVERLAP: usize = 200;

/// Window parameters for [`chunk_text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkParams {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkParams {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_OVERLAP,
        }
    }
}

impl ChunkParams {
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self, CoreError> {
        let params = Self {
            chunk_size,
            overlap,
        };
        params.validate()?;
        Ok(params)
    }

    /// Reject parameters under which the cursor would never advance.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.chunk_size == 0 {
            return Err(CoreError::InvalidConfiguration(
                "chunk_size must be > 0".to_string(),
            ));
        }
        if self.overlap >= self.chunk_size {
            return Err(CoreError::InvalidConfiguration(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }

    /// Distance between the starts of consecutive chunks.
    pub fn step(&self) -> usize {
        self.chunk_size - self.overlap
    }
}

/// Split `text` into overlapping fixed-size windows.
///
/// Returns chunks with contiguous indices starting at 0. Empty text yields
/// an empty sequence.
///
/// # Guarantees
///
/// - Every chunk holds at most `chunk_size` characters.
/// - Consecutive chunks overlap by exactly `overlap` characters.
/// - The last chunk ends at the end of the text and may be shorter.
/// - No empty trailing chunk is ever produced.
///
/// # Errors
///
/// [`CoreError::InvalidConfiguration`] if `chunk_size == 0` or
/// `overlap >= chunk_size`.
pub fn chunk_text(text: &str, params: &ChunkParams) -> Result<Vec<TextChunk>, CoreError> {
    params.validate()?;

    // Byte position of every char start, plus the end of the text, so that
    // char offset `i` maps to `bounds[i]`.
    let mut bounds: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    let char_len = bounds.len();
    bounds.push(text.len());

    let mut chunks = Vec::with_capacity(char_len.div_ceil(params.step()));
    let mut start = 0usize;

    while start < char_len {
        let end = (start + params.chunk_size).min(char_len);
        let content = &text[bounds[start]..bounds[end]];
        chunks.push(make_chunk(chunks.len(), content, start, end));

        if end == char_len {
            break;
        }
        start = end - params.overlap;
    }

    Ok(chunks)
}

/// Rebuild the source text from a chunk sequence produced with `overlap`.
///
/// Drops the leading `overlap` characters of every chunk after the first.
pub fn reassemble(chunks: &[TextChunk], overlap: usize) -> String {
    let mut out = String::new();
    for (i, chunk) in chunks.iter().enumerate() {
        if i == 0 {
            out.push_str(&chunk.content);
        } else {
            out.extend(chunk.content.chars().skip(overlap));
        }
    }
    out
}

fn make_chunk(index: usize, content: &str, start: usize, end: usize) -> TextChunk {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let hash = format!("{:x}", hasher.finalize());

    TextChunk {
        index,
        content: content.to_string(),
        start_offset: start,
        end_offset: end,
        hash,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(size: usize, overlap: usize) -> ChunkParams {
        ChunkParams {
            chunk_size: size,
            overlap,
        }
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        let chunks = chunk_text("", &ChunkParams::default()).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_small_text_single_chunk() {
        let chunks = chunk_text("hello world", &params(2000, 200)).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].index, 0);
        assert_eq!(chunks[0].content, "hello world");
        assert_eq!(chunks[0].start_offset, 0);
        assert_eq!(chunks[0].end_offset, 11);
    }

    #[test]
    fn test_multi_chunk_offsets() {
        let text = "A".repeat(5000);
        let chunks = chunk_text(&text, &params(2000, 200)).unwrap();
        let ranges: Vec<(usize, usize)> = chunks
            .iter()
            .map(|c| (c.start_offset, c.end_offset))
            .collect();
        assert_eq!(ranges, vec![(0, 2000), (1800, 3800), (3600, 5000)]);
        assert_eq!(chunks[2].content.len(), 1400);
    }

    #[test]
    fn test_overlap_not_smaller_than_size_is_rejected() {
        let err = chunk_text("abc", &params(10, 10)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfiguration(_)));
        let err = chunk_text("abc", &params(10, 25)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_zero_size_is_rejected() {
        let err = chunk_text("", &params(0, 0)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_no_trailing_empty_chunk_on_exact_multiple() {
        // 10 chars, size 4, overlap 2: windows [0,4) [2,6) [4,8) [6,10)
        let chunks = chunk_text("0123456789", &params(4, 2)).unwrap();
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks.last().unwrap().end_offset, 10);
        assert!(chunks.iter().all(|c| !c.content.is_empty()));
    }

    #[test]
    fn test_text_exactly_chunk_size() {
        let chunks = chunk_text("abcd", &params(4, 1)).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "abcd");
    }

    #[test]
    fn test_offsets_match_content_length() {
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(40);
        let chunks = chunk_text(&text, &params(97, 13)).unwrap();
        for (i, c) in chunks.iter().enumerate() {
            assert_eq!(c.index, i);
            assert_eq!(c.end_offset - c.start_offset, c.content.chars().count());
            assert!(c.content.chars().count() <= 97);
        }
        for pair in chunks.windows(2) {
            assert_eq!(pair[0].end_offset - pair[1].start_offset, 13);
        }
    }

    #[test]
    fn test_reassemble_reconstructs_text() {
        let text = "Control objectives must be evidenced.\n\n".repeat(25);
        for (size, overlap) in [(50, 0), (50, 10), (64, 63), (1000, 200)] {
            let chunks = chunk_text(&text, &params(size, overlap)).unwrap();
            assert_eq!(reassemble(&chunks, overlap), text, "size={size} overlap={overlap}");
        }
    }

    #[test]
    fn test_multibyte_utf8_chars() {
        let text = "┌──────────────────┐\n│ Hello wörld ✓    │\n└──────────────────┘";
        let chunks = chunk_text(text, &params(7, 3)).unwrap();
        assert!(chunks.len() > 1);
        for c in &chunks {
            assert!(c.content.chars().count() <= 7);
        }
        assert_eq!(reassemble(&chunks, 3), text);
    }

    #[test]
    fn test_deterministic_hashes() {
        let text = "Alpha beta gamma delta epsilon";
        let c1 = chunk_text(text, &params(8, 2)).unwrap();
        let c2 = chunk_text(text, &params(8, 2)).unwrap();
        assert_eq!(c1, c2);
        assert_eq!(c1[0].hash.len(), 64);
    }
}
