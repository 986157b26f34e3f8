//! Error types for the `docqa-retrieval` crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in retrieval operations.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// A configuration validation error (bad chunking parameters, zero top-k, ...).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The external embedding model call failed or returned malformed output.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A vector did not match the index's fixed dimension.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The dimension the index was built with.
        expected: usize,
        /// The offending vector's dimension.
        actual: usize,
    },

    /// Chunk and vector sequences were not the same length during build.
    #[error("Size mismatch: {chunks} chunks but {vectors} vectors")]
    SizeMismatch {
        /// Number of chunks supplied.
        chunks: usize,
        /// Number of vectors supplied.
        vectors: usize,
    },

    /// A search was issued against an index holding zero chunks.
    #[error("Search on empty index")]
    EmptyIndex,

    /// No persisted index exists at the given location.
    #[error("Index not found at {0}")]
    IndexNotFound(PathBuf),

    /// Writing a persisted index to durable storage failed.
    #[error("Failed to persist index at {path}: {message}")]
    Persistence {
        /// Location the index was being written to.
        path: PathBuf,
        /// A description of the I/O or serialization failure.
        message: String,
    },

    /// The persisted index exists but could not be restored.
    #[error("Index at {path} is corrupt: {message}")]
    IndexCorrupt {
        /// Location of the unreadable index.
        path: PathBuf,
        /// A description of what failed to parse or validate.
        message: String,
    },
}

/// A convenience result type for retrieval operations.
pub type Result<T> = std::result::Result<T, RetrievalError>;
