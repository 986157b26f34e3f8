//! Embedding provider trait for generating vector embeddings from text.

use async_trait::async_trait;

use crate::error::Result;

/// A provider that generates vector embeddings from text input.
///
/// This is the seam between the retrieval core and the external model: the
/// index and service depend only on this contract, never on a concrete
/// backend. Every vector a provider returns has the dimensionality reported
/// by [`dimensions`](EmbeddingProvider::dimensions), and that value is
/// constant for the lifetime of the provider — an index built against one
/// provider is only searchable with queries embedded by a provider of the
/// same dimension. The default
/// [`embed_batch`](EmbeddingProvider::embed_batch) implementation embeds
/// each input in turn; backends with native batching should override it.
///
/// # Example
///
/// ```rust,ignore
/// use docqa_retrieval::{EmbeddingProvider, HfEmbeddingProvider};
///
/// let provider = HfEmbeddingProvider::from_env()?;
/// let embedding = provider.embed("hello world").await?;
/// assert_eq!(embedding.len(), provider.dimensions());
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs, one vector per
    /// input, preserving order.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Return the dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;
}
