//! # docqa-retrieval
//!
//! The retrieval core behind docqa: split a document corpus into
//! bounded-size chunks, embed them into a vector space, index them for
//! cosine-similarity search, and select the most relevant chunks for a
//! query.
//!
//! ## Overview
//!
//! - [`SeparatorChunker`] — splits text on a separator into chunks of at
//!   most a configured size
//! - [`EmbeddingProvider`] — async trait mapping text to fixed-dimension
//!   vectors; [`HfEmbeddingProvider`] calls the Hugging Face Inference API
//! - [`VectorIndex`] — immutable chunk/vector store with k-nearest-neighbor
//!   search and JSON snapshot persistence
//! - [`RetrievalService`] — orchestrates ingestion (chunk → embed → index)
//!   and retrieval (embed → search), with an explicit degraded mode when no
//!   index is configured
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docqa_retrieval::{
//!     Document, RetrievalConfig, RetrievalService, SeparatorChunker,
//!     hf::HfEmbeddingProvider,
//! };
//!
//! let config = RetrievalConfig::default();
//! let service = RetrievalService::builder()
//!     .config(config.clone())
//!     .embedding_provider(Arc::new(HfEmbeddingProvider::from_env()?))
//!     .chunker(Arc::new(SeparatorChunker::new(config.chunk_size, &config.separator)?))
//!     .build()?;
//!
//! let document = Document::new("kb", std::fs::read_to_string("docs/kb.md")?);
//! let index = service.build_index(&document).await?;
//! index.save("kb.index.json").await?;
//!
//! let service = service.attach_index(index);
//! let results = service.retrieve("how do I rotate keys?", 5).await?;
//! ```

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod hf;
pub mod index;
pub mod service;

pub use chunking::{Chunker, SeparatorChunker};
pub use config::{RetrievalConfig, RetrievalConfigBuilder};
pub use document::{Chunk, Document, SearchResult};
pub use embedding::EmbeddingProvider;
pub use error::{Result, RetrievalError};
pub use hf::HfEmbeddingProvider;
pub use index::VectorIndex;
pub use service::{RetrievalService, RetrievalServiceBuilder, ServiceState};
