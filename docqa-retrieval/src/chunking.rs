//! Document chunking.
//!
//! This module provides the [`Chunker`] trait and [`SeparatorChunker`], which
//! splits text into bounded-size chunks on a configured separator.

use crate::document::{Chunk, Document};
use crate::error::{Result, RetrievalError};

/// A strategy for splitting documents into chunks.
///
/// Implementations produce [`Chunk`]s carrying text and position but no
/// embeddings; embeddings are attached later by the service. Chunking is a
/// pure function of the document text — calling it twice on the same input
/// yields identical output.
pub trait Chunker: Send + Sync {
    /// Split a document into chunks.
    ///
    /// Returns an empty `Vec` if the document has empty text.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;
}

/// Splits text into chunks of at most `max_size` characters, breaking only
/// at a configured separator. Sizes are measured in characters (Unicode
/// scalar values), not bytes.
///
/// Separator-delimited tokens are accumulated into a buffer; when appending
/// the next token (plus one separator) would exceed `max_size`, the buffer is
/// emitted and a new one started with that token. A single token longer than
/// `max_size` becomes its own oversized chunk rather than being split
/// mid-token. Consecutive chunks do not overlap unless
/// [`with_overlap`](SeparatorChunker::with_overlap) is set.
///
/// Runs of the separator collapse: splitting drops empty tokens, so joining
/// the output chunks with the separator reproduces the input up to separator
/// runs becoming a single separator.
///
/// # Example
///
/// ```rust,ignore
/// use docqa_retrieval::SeparatorChunker;
///
/// let chunker = SeparatorChunker::new(1000, " ")?;
/// let chunks = chunker.chunk(&document);
/// ```
#[derive(Debug, Clone)]
pub struct SeparatorChunker {
    max_size: usize,
    separator: String,
    overlap: usize,
}

impl SeparatorChunker {
    /// Create a new `SeparatorChunker` with no overlap.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::InvalidConfig`] if `max_size` is zero or the
    /// separator is empty.
    pub fn new(max_size: usize, separator: impl Into<String>) -> Result<Self> {
        let separator = separator.into();
        if max_size == 0 {
            return Err(RetrievalError::InvalidConfig(
                "chunk max_size must be greater than zero".to_string(),
            ));
        }
        if separator.is_empty() {
            return Err(RetrievalError::InvalidConfig(
                "chunk separator must not be empty".to_string(),
            ));
        }
        Ok(Self { max_size, separator, overlap: 0 })
    }

    /// Set the number of overlapping characters carried between consecutive
    /// chunks. Overlap is applied at token granularity: the trailing tokens
    /// of the previous chunk totalling at most `overlap` characters seed the
    /// next chunk.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::InvalidConfig`] if `overlap >= max_size`.
    pub fn with_overlap(mut self, overlap: usize) -> Result<Self> {
        if overlap >= self.max_size {
            return Err(RetrievalError::InvalidConfig(format!(
                "chunk_overlap ({overlap}) must be less than max_size ({})",
                self.max_size
            )));
        }
        self.overlap = overlap;
        Ok(self)
    }

    /// Split raw text into chunk strings, without document bookkeeping.
    ///
    /// All lengths are counted in characters, matching the `max_size` and
    /// overlap contracts; byte lengths would pack multibyte text short.
    fn split_text(&self, text: &str) -> Vec<String> {
        let tokens: Vec<&str> =
            text.split(self.separator.as_str()).filter(|t| !t.is_empty()).collect();

        let sep_chars = self.separator.chars().count();
        let mut chunks: Vec<String> = Vec::new();
        // Buffer of tokens for the chunk under construction, with its total
        // character count (tokens + separators between them).
        let mut buffer: Vec<&str> = Vec::new();
        let mut buffer_chars = 0usize;

        for token in tokens {
            let token_chars = token.chars().count();
            let appended_chars = if buffer.is_empty() {
                token_chars
            } else {
                buffer_chars + sep_chars + token_chars
            };

            if appended_chars <= self.max_size {
                buffer_chars = appended_chars;
                buffer.push(token);
                continue;
            }

            // The token does not fit. Flush the current buffer, then either
            // start a fresh buffer with the token or, if the token alone
            // exceeds max_size, emit it as its own oversized chunk.
            if !buffer.is_empty() {
                chunks.push(buffer.join(&self.separator));
            }

            if token_chars > self.max_size {
                chunks.push(token.to_string());
                buffer.clear();
                buffer_chars = 0;
            } else {
                let (mut carried, mut carried_chars) = self.carry_overlap(&buffer);
                // Drop the overlap if it would push the new chunk past the
                // size bound.
                if !carried.is_empty() && carried_chars + sep_chars + token_chars > self.max_size {
                    carried.clear();
                    carried_chars = 0;
                }
                buffer = carried;
                buffer_chars = carried_chars;
                if !buffer.is_empty() {
                    buffer_chars += sep_chars;
                }
                buffer_chars += token_chars;
                buffer.push(token);
            }
        }

        if !buffer.is_empty() {
            chunks.push(buffer.join(&self.separator));
        }

        chunks
    }

    /// Select the trailing tokens of the just-emitted buffer that fit within
    /// the configured overlap budget. Returns the tokens and their joined
    /// character count.
    fn carry_overlap<'a>(&self, emitted: &[&'a str]) -> (Vec<&'a str>, usize) {
        if self.overlap == 0 {
            return (Vec::new(), 0);
        }
        let sep_chars = self.separator.chars().count();
        let mut carried: Vec<&str> = Vec::new();
        let mut carried_chars = 0usize;
        for &token in emitted.iter().rev() {
            let token_chars = token.chars().count();
            let next_chars = if carried.is_empty() {
                token_chars
            } else {
                carried_chars + sep_chars + token_chars
            };
            if next_chars > self.overlap {
                break;
            }
            carried_chars = next_chars;
            carried.push(token);
        }
        carried.reverse();
        (carried, carried_chars)
    }
}

impl Chunker for SeparatorChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        if document.text.is_empty() {
            return Vec::new();
        }

        self.split_text(&document.text)
            .into_iter()
            .enumerate()
            .map(|(seq, text)| Chunk {
                id: format!("{}_{seq}", document.id),
                seq,
                text,
                document_id: document.id.clone(),
            })
            .collect()
    }
}
