//! Vector index with cosine-similarity search and file persistence.
//!
//! [`VectorIndex`] stores aligned chunk and embedding sequences, built once
//! and immutable afterward. Search is an exhaustive linear scan — acceptable
//! at single-document corpus scale, and swappable for an approximate
//! nearest-neighbor structure behind the same contract if that ever changes.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::document::{Chunk, SearchResult};
use crate::error::{Result, RetrievalError};

/// Version tag for the persisted snapshot format.
const SNAPSHOT_VERSION: u32 = 1;

/// An immutable index of chunks and their embedding vectors.
///
/// Chunks and vectors are held in parallel `Vec`s; position `i` in one
/// corresponds to position `i` in the other, and insertion order is the
/// chunk sequence order. Every vector has the index's fixed dimension.
///
/// # Example
///
/// ```rust,ignore
/// use docqa_retrieval::VectorIndex;
///
/// let index = VectorIndex::build(chunks, vectors)?;
/// let results = index.search(&query_embedding, 5)?;
/// index.save("kb.index.json").await?;
/// ```
#[derive(Debug, Clone)]
pub struct VectorIndex {
    chunks: Vec<Chunk>,
    vectors: Vec<Vec<f32>>,
    dimensions: usize,
}

/// On-disk snapshot of a [`VectorIndex`].
#[derive(Serialize, Deserialize)]
struct IndexSnapshot {
    version: u32,
    dimensions: usize,
    chunks: Vec<Chunk>,
    vectors: Vec<Vec<f32>>,
}

/// Compute cosine similarity between two vectors of equal length.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

impl VectorIndex {
    /// Construct an index from aligned chunk and vector sequences.
    ///
    /// # Errors
    ///
    /// - [`RetrievalError::SizeMismatch`] if the sequences differ in length.
    /// - [`RetrievalError::DimensionMismatch`] if the vectors do not all
    ///   share one dimension, or any vector is zero-length.
    pub fn build(chunks: Vec<Chunk>, vectors: Vec<Vec<f32>>) -> Result<Self> {
        if chunks.len() != vectors.len() {
            return Err(RetrievalError::SizeMismatch {
                chunks: chunks.len(),
                vectors: vectors.len(),
            });
        }

        let dimensions = vectors.first().map(|v| v.len()).unwrap_or(0);
        if !vectors.is_empty() && dimensions == 0 {
            return Err(RetrievalError::DimensionMismatch { expected: 1, actual: 0 });
        }
        for vector in &vectors {
            if vector.len() != dimensions {
                return Err(RetrievalError::DimensionMismatch {
                    expected: dimensions,
                    actual: vector.len(),
                });
            }
        }

        debug!(chunk_count = chunks.len(), dimensions, "built vector index");
        Ok(Self { chunks, vectors, dimensions })
    }

    /// Number of chunks in the index.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the index holds zero chunks.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// The fixed embedding dimension, or 0 for an empty index.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// The stored chunks, in insertion order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Return the `k` chunks most similar to `query`, by descending cosine
    /// similarity. Ties break in favor of the earlier-inserted chunk. If `k`
    /// exceeds the number of stored chunks, all of them are returned.
    ///
    /// # Errors
    ///
    /// - [`RetrievalError::EmptyIndex`] if the index holds zero chunks.
    /// - [`RetrievalError::DimensionMismatch`] if `query` does not have the
    ///   index's dimension.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        if self.chunks.is_empty() {
            return Err(RetrievalError::EmptyIndex);
        }
        if query.len() != self.dimensions {
            return Err(RetrievalError::DimensionMismatch {
                expected: self.dimensions,
                actual: query.len(),
            });
        }

        let mut scored: Vec<SearchResult> = self
            .chunks
            .iter()
            .zip(&self.vectors)
            .map(|(chunk, vector)| SearchResult {
                chunk: chunk.clone(),
                score: cosine_similarity(vector, query),
            })
            .collect();

        // Stable sort: equal scores keep insertion order.
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }

    /// Persist the full index state to `path` as a versioned JSON snapshot.
    ///
    /// Parent directories are created as needed.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let snapshot = IndexSnapshot {
            version: SNAPSHOT_VERSION,
            dimensions: self.dimensions,
            chunks: self.chunks.clone(),
            vectors: self.vectors.clone(),
        };

        let data = serde_json::to_vec(&snapshot).map_err(|e| RetrievalError::Persistence {
            path: path.to_path_buf(),
            message: format!("failed to serialize snapshot: {e}"),
        })?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    RetrievalError::Persistence {
                        path: path.to_path_buf(),
                        message: format!("failed to create index directory: {e}"),
                    }
                })?;
            }
        }
        tokio::fs::write(path, data).await.map_err(|e| RetrievalError::Persistence {
            path: path.to_path_buf(),
            message: format!("failed to write snapshot: {e}"),
        })?;

        info!(path = %path.display(), chunk_count = self.chunks.len(), "saved index");
        Ok(())
    }

    /// Restore an index from a snapshot written by [`save`](VectorIndex::save).
    ///
    /// The restored index is observationally equivalent to the one saved:
    /// same chunks, same vectors, same search results for any query.
    ///
    /// # Errors
    ///
    /// - [`RetrievalError::IndexNotFound`] if nothing exists at `path`.
    /// - [`RetrievalError::IndexCorrupt`] if the snapshot cannot be parsed,
    ///   carries an unknown version, or violates index invariants.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = match tokio::fs::read(path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RetrievalError::IndexNotFound(path.to_path_buf()));
            }
            Err(e) => {
                return Err(RetrievalError::IndexCorrupt {
                    path: path.to_path_buf(),
                    message: format!("failed to read snapshot: {e}"),
                });
            }
        };

        let snapshot: IndexSnapshot =
            serde_json::from_slice(&data).map_err(|e| RetrievalError::IndexCorrupt {
                path: path.to_path_buf(),
                message: format!("failed to parse snapshot: {e}"),
            })?;

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(RetrievalError::IndexCorrupt {
                path: path.to_path_buf(),
                message: format!("unknown snapshot version {}", snapshot.version),
            });
        }

        let index =
            Self::build(snapshot.chunks, snapshot.vectors).map_err(|e| {
                RetrievalError::IndexCorrupt {
                    path: path.to_path_buf(),
                    message: format!("snapshot violates index invariants: {e}"),
                }
            })?;
        if !index.is_empty() && index.dimensions != snapshot.dimensions {
            return Err(RetrievalError::IndexCorrupt {
                path: path.to_path_buf(),
                message: format!(
                    "snapshot declares dimension {} but vectors have {}",
                    snapshot.dimensions, index.dimensions
                ),
            });
        }

        info!(path = %path.display(), chunk_count = index.len(), "loaded index");
        Ok(index)
    }
}
