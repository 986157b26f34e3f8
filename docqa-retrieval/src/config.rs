//! Configuration for the retrieval service.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RetrievalError};

/// Configuration parameters for a [`RetrievalService`](crate::RetrievalService).
///
/// Defaults match the knowledge base this system was built for: 1000-character
/// chunks split on single spaces with no overlap, top-5 retrieval.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalConfig {
    /// Path to the plain-text corpus document, if one is configured.
    pub corpus_path: Option<PathBuf>,
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
    /// Separator at which chunk boundaries may fall.
    pub separator: String,
    /// Identifier of the embedding model.
    pub embedding_model: String,
    /// Location of the persisted index, if persistence is configured.
    pub index_path: Option<PathBuf>,
    /// Number of top results to return from vector search.
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            corpus_path: None,
            chunk_size: 1000,
            chunk_overlap: 0,
            separator: " ".to_string(),
            embedding_model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            index_path: None,
            top_k: 5,
        }
    }
}

impl RetrievalConfig {
    /// Create a new builder for constructing a [`RetrievalConfig`].
    pub fn builder() -> RetrievalConfigBuilder {
        RetrievalConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`RetrievalConfig`].
#[derive(Debug, Clone, Default)]
pub struct RetrievalConfigBuilder {
    config: RetrievalConfig,
}

impl RetrievalConfigBuilder {
    /// Set the corpus document path.
    pub fn corpus_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.corpus_path = Some(path.into());
        self
    }

    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the separator at which chunk boundaries may fall.
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.config.separator = separator.into();
        self
    }

    /// Set the embedding model identifier.
    pub fn embedding_model(mut self, model: impl Into<String>) -> Self {
        self.config.embedding_model = model.into();
        self
    }

    /// Set the persisted index location.
    pub fn index_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.index_path = Some(path.into());
        self
    }

    /// Set the number of top results to return from vector search.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Build the [`RetrievalConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::InvalidConfig`] if:
    /// - `chunk_size == 0`
    /// - `chunk_overlap >= chunk_size`
    /// - `separator` is empty
    /// - `top_k == 0`
    pub fn build(self) -> Result<RetrievalConfig> {
        if self.config.chunk_size == 0 {
            return Err(RetrievalError::InvalidConfig(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.config.chunk_overlap >= self.config.chunk_size {
            return Err(RetrievalError::InvalidConfig(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.config.chunk_overlap, self.config.chunk_size
            )));
        }
        if self.config.separator.is_empty() {
            return Err(RetrievalError::InvalidConfig("separator must not be empty".to_string()));
        }
        if self.config.top_k == 0 {
            return Err(RetrievalError::InvalidConfig(
                "top_k must be greater than zero".to_string(),
            ));
        }
        Ok(self.config)
    }
}
