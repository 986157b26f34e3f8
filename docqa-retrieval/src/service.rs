//! Retrieval service orchestrator.
//!
//! [`RetrievalService`] coordinates the ingestion workflow (chunk → embed →
//! index) and query-time retrieval (embed → search) by composing an
//! [`EmbeddingProvider`], a [`Chunker`], and an optional [`VectorIndex`].
//!
//! # Example
//!
//! ```rust,ignore
//! use docqa_retrieval::{RetrievalService, RetrievalConfig, SeparatorChunker};
//!
//! let service = RetrievalService::builder()
//!     .config(RetrievalConfig::default())
//!     .embedding_provider(Arc::new(provider))
//!     .chunker(Arc::new(SeparatorChunker::new(1000, " ")?))
//!     .build()?;
//!
//! let index = service.build_index(&document).await?;
//! let service = service.attach_index(index);
//! let results = service.retrieve("how do I rotate keys?", 5).await?;
//! ```

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::chunking::Chunker;
use crate::config::RetrievalConfig;
use crate::document::{Document, SearchResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{Result, RetrievalError};
use crate::index::VectorIndex;

/// Observable lifecycle state of a [`RetrievalService`].
///
/// A service is constructed either with an index ([`Ready`](ServiceState::Ready))
/// or without one ([`NoIndexConfigured`](ServiceState::NoIndexConfigured)).
/// The no-index state is an intentional degraded mode, distinct from an empty
/// retrieval result: queries succeed with no context rather than failing.
/// There is no transition back; rebuilding requires a fresh service instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    /// No index is configured; retrieval returns empty results.
    NoIndexConfigured,
    /// An index is attached and retrieval is fully operational.
    Ready,
}

/// The retrieval orchestrator.
///
/// Immutable once built: the attached index is read-only, so concurrent
/// `retrieve` calls are safe to share across tasks behind an `Arc`.
/// Construct one via [`RetrievalService::builder()`].
pub struct RetrievalService {
    config: RetrievalConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    chunker: Arc<dyn Chunker>,
    index: Option<VectorIndex>,
}

impl std::fmt::Debug for RetrievalService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalService")
            .field("config", &self.config)
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

impl RetrievalService {
    /// Create a new [`RetrievalServiceBuilder`].
    pub fn builder() -> RetrievalServiceBuilder {
        RetrievalServiceBuilder::default()
    }

    /// Return a reference to the service configuration.
    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Return a reference to the embedding provider.
    pub fn embedding_provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedding_provider
    }

    /// Return the attached index, if any.
    pub fn index(&self) -> Option<&VectorIndex> {
        self.index.as_ref()
    }

    /// Return the observable lifecycle state.
    pub fn state(&self) -> ServiceState {
        if self.index.is_some() { ServiceState::Ready } else { ServiceState::NoIndexConfigured }
    }

    /// Attach an index, consuming the service and returning one in the
    /// [`Ready`](ServiceState::Ready) state.
    pub fn attach_index(self, index: VectorIndex) -> Self {
        Self { index: Some(index), ..self }
    }

    /// Build an index from a document: chunk → embed → [`VectorIndex::build`].
    ///
    /// All-or-nothing: any failure aborts before an index is returned, so no
    /// partially built index is ever observable. Deterministic for identical
    /// input and embedding model. Does not mutate the service; attach the
    /// result via [`attach_index`](RetrievalService::attach_index) or persist
    /// it with [`VectorIndex::save`].
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::Embedding`] if the provider call fails or
    /// returns the wrong number of vectors, and build-consistency errors
    /// from [`VectorIndex::build`].
    pub async fn build_index(&self, document: &Document) -> Result<VectorIndex> {
        let chunks = self.chunker.chunk(document);
        info!(document.id = %document.id, chunk_count = chunks.len(), "chunked document");

        if chunks.is_empty() {
            return VectorIndex::build(Vec::new(), Vec::new());
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let vectors = self.embedding_provider.embed_batch(&texts).await.inspect_err(|e| {
            error!(document.id = %document.id, error = %e, "embedding failed during indexing");
        })?;

        if vectors.len() != chunks.len() {
            return Err(RetrievalError::Embedding {
                provider: "batch".into(),
                message: format!(
                    "provider returned {} vectors for {} chunks",
                    vectors.len(),
                    chunks.len()
                ),
            });
        }

        let index = VectorIndex::build(chunks, vectors)?;
        info!(document.id = %document.id, chunk_count = index.len(), "built index");
        Ok(index)
    }

    /// Retrieve the `k` chunks most relevant to `query`.
    ///
    /// With no index configured this returns an empty result for any query —
    /// the explicit degraded mode, observable via
    /// [`state`](RetrievalService::state). With an index attached, the query
    /// is embedded and searched; embedding failures propagate to the caller
    /// rather than silently degrading to empty context, and searching a
    /// present-but-empty index fails with [`RetrievalError::EmptyIndex`].
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        let Some(index) = &self.index else {
            debug!("no index configured, returning empty retrieval result");
            return Ok(Vec::new());
        };

        let query_embedding = self.embedding_provider.embed(query).await.inspect_err(|e| {
            error!(error = %e, "embedding failed during query");
        })?;

        let results = index.search(&query_embedding, k)?;
        debug!(result_count = results.len(), "retrieval completed");
        Ok(results)
    }

    /// Return the text of the single most relevant chunk, or an empty string
    /// when no index is configured or nothing is retrieved.
    ///
    /// This is the narrow string boundary consumed by the chat layer; callers
    /// that can use ranked results should prefer
    /// [`retrieve`](RetrievalService::retrieve), which returns the full
    /// top-`k` set (`k` from the configured `top_k`).
    pub async fn context(&self, query: &str) -> Result<String> {
        let results = self.retrieve(query, self.config.top_k).await?;
        Ok(results.into_iter().next().map(|r| r.chunk.text).unwrap_or_default())
    }
}

/// Builder for constructing a [`RetrievalService`].
///
/// `config`, `embedding_provider`, and `chunker` are required; `index` is
/// optional and its absence selects the degraded no-index mode.
#[derive(Default)]
pub struct RetrievalServiceBuilder {
    config: Option<RetrievalConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    chunker: Option<Arc<dyn Chunker>>,
    index: Option<VectorIndex>,
}

impl RetrievalServiceBuilder {
    /// Set the service configuration.
    pub fn config(mut self, config: RetrievalConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Attach a prebuilt or loaded index.
    pub fn index(mut self, index: VectorIndex) -> Self {
        self.index = Some(index);
        self
    }

    /// Build the [`RetrievalService`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::InvalidConfig`] if any required field is
    /// missing.
    pub fn build(self) -> Result<RetrievalService> {
        let config = self
            .config
            .ok_or_else(|| RetrievalError::InvalidConfig("config is required".to_string()))?;
        let embedding_provider = self.embedding_provider.ok_or_else(|| {
            RetrievalError::InvalidConfig("embedding_provider is required".to_string())
        })?;
        let chunker = self
            .chunker
            .ok_or_else(|| RetrievalError::InvalidConfig("chunker is required".to_string()))?;

        Ok(RetrievalService { config, embedding_provider, chunker, index: self.index })
    }
}
