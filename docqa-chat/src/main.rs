//! Interactive documentation Q&A chat.
//!
//! Loads or builds a vector index over a plain-text corpus, then runs a
//! read-eval-print chat loop: each question is answered by a remote chat
//! model, grounded in the most relevant retrieved chunk. With no corpus and
//! no index configured the assistant degrades to context-free answers.

mod answer;
mod session;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use clap::Parser;
use rustyline::error::ReadlineError;
use tracing::{info, warn};

use docqa_retrieval::{
    Document, EmbeddingProvider, HfEmbeddingProvider, RetrievalConfig, RetrievalError,
    RetrievalService, SeparatorChunker, ServiceState, VectorIndex,
};

use crate::answer::{AnswerGenerator, TogetherGenerator};
use crate::session::ConversationSession;

#[derive(Parser, Debug)]
#[command(name = "docqa", about = "Ask questions about a documentation corpus")]
struct Cli {
    /// Plain-text corpus document to index.
    #[arg(long)]
    corpus: Option<PathBuf>,

    /// Location of the persisted index (loaded if present, written after a build).
    #[arg(long)]
    index: Option<PathBuf>,

    /// Maximum chunk size in characters.
    #[arg(long, default_value_t = 1000)]
    chunk_size: usize,

    /// Overlapping characters between consecutive chunks.
    #[arg(long, default_value_t = 0)]
    chunk_overlap: usize,

    /// Separator at which chunk boundaries may fall.
    #[arg(long, default_value = " ")]
    separator: String,

    /// Embedding model identifier.
    #[arg(long, default_value = "sentence-transformers/all-MiniLM-L6-v2")]
    embedding_model: String,

    /// Embedding dimensionality of the chosen model.
    #[arg(long, default_value_t = 384)]
    embedding_dimensions: usize,

    /// Chat model used for answer generation.
    #[arg(long, default_value = "meta-llama/Meta-Llama-3.1-8B-Instruct-Turbo")]
    chat_model: String,

    /// Number of chunks to rank per query.
    #[arg(long, default_value_t = 5)]
    top_k: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config_builder = RetrievalConfig::builder()
        .chunk_size(cli.chunk_size)
        .chunk_overlap(cli.chunk_overlap)
        .separator(cli.separator.clone())
        .embedding_model(cli.embedding_model.clone())
        .top_k(cli.top_k);
    if let Some(corpus) = &cli.corpus {
        config_builder = config_builder.corpus_path(corpus);
    }
    if let Some(index) = &cli.index {
        config_builder = config_builder.index_path(index);
    }
    let config = config_builder.build()?;

    // Retrieval is active only when there is something to search: a loadable
    // index or a corpus to build one from. A configured-but-missing index
    // path with no corpus degrades the same way as no configuration at all,
    // and the degraded path never needs embedding credentials.
    let index_exists = config.index_path.as_ref().is_some_and(|p| p.exists());
    let retrieval_active = index_exists || config.corpus_path.is_some();
    let provider: Arc<dyn EmbeddingProvider> = if retrieval_active {
        let provider = HfEmbeddingProvider::from_env()
            .context("retrieval needs an embedding model; set HF_API_TOKEN")?
            .with_model(config.embedding_model.clone())
            .with_dimensions(cli.embedding_dimensions);
        Arc::new(provider)
    } else {
        Arc::new(DisabledEmbeddings)
    };

    let chunker =
        SeparatorChunker::new(config.chunk_size, &config.separator)?
            .with_overlap(config.chunk_overlap)?;

    let service = RetrievalService::builder()
        .config(config.clone())
        .embedding_provider(provider)
        .chunker(Arc::new(chunker))
        .build()?;

    let service = match resolve_index(&service, &config).await? {
        Some(index) => service.attach_index(index),
        None => service,
    };

    match service.state() {
        ServiceState::Ready => {
            println!("Knowledge base loaded. Answers will use retrieved context.");
        }
        ServiceState::NoIndexConfigured => {
            println!("No knowledge base configured. The assistant will answer without context.");
        }
    }

    let generator = TogetherGenerator::from_env()
        .context("answer generation needs TOGETHER_API_KEY")?
        .with_model(cli.chat_model);

    chat_loop(&service, &generator).await
}

/// Load the persisted index when one exists, otherwise build from the corpus
/// (persisting the result when an index path is configured). `None` selects
/// the degraded no-index mode.
async fn resolve_index(
    service: &RetrievalService,
    config: &RetrievalConfig,
) -> anyhow::Result<Option<VectorIndex>> {
    if let Some(index_path) = &config.index_path {
        if index_path.exists() {
            let index = VectorIndex::load(index_path)
                .await
                .with_context(|| format!("failed to load index from {}", index_path.display()))?;
            return Ok(Some(index));
        }
    }

    let Some(corpus_path) = &config.corpus_path else {
        return Ok(None);
    };

    let text = tokio::fs::read_to_string(corpus_path)
        .await
        .with_context(|| format!("failed to read corpus {}", corpus_path.display()))?;
    let id = corpus_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "corpus".to_string());
    let document = Document::new(id, text);

    info!(corpus = %corpus_path.display(), "building index from corpus");
    let index = service.build_index(&document).await?;

    if let Some(index_path) = &config.index_path {
        index.save(index_path).await?;
    }
    Ok(Some(index))
}

/// Run the interactive loop until EOF or interrupt. Retrieval and generation
/// failures are printed and the session continues.
async fn chat_loop(service: &RetrievalService, generator: &dyn AnswerGenerator) -> anyhow::Result<()> {
    let mut editor = rustyline::DefaultEditor::new()?;
    let mut session = ConversationSession::new();

    loop {
        let line = match editor.readline("you> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(question);
        session.push_user(question);

        let context = match service.context(question).await {
            Ok(context) => context,
            Err(e) => {
                // Losing context silently would misrepresent the answer's
                // grounding; tell the user and take the next question.
                eprintln!("retrieval failed: {e}");
                continue;
            }
        };

        if !context.is_empty() {
            println!("--- retrieved context ---");
            println!("{context}");
            println!("-------------------------");
        }

        match generator.answer(&context, question).await {
            Ok(answer) => {
                println!("{answer}");
                session.push_assistant(answer);
            }
            Err(e) => {
                warn!(error = %e, "answer generation failed");
                eprintln!("error generating response: {e}");
            }
        }
    }

    info!(turns = session.turns().len(), "session ended");
    Ok(())
}

/// Placeholder provider for the degraded no-index mode.
///
/// The service never embeds anything without an index, so this is
/// unreachable in practice; if it is ever called, something wired retrieval
/// up without configuring it, and the error says so instead of sending a
/// request with made-up credentials.
struct DisabledEmbeddings;

#[async_trait]
impl EmbeddingProvider for DisabledEmbeddings {
    async fn embed(&self, _text: &str) -> docqa_retrieval::Result<Vec<f32>> {
        Err(RetrievalError::Embedding {
            provider: "disabled".into(),
            message: "retrieval is not configured".into(),
        })
    }

    fn dimensions(&self) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_embeddings_never_produce_vectors() {
        assert!(matches!(
            DisabledEmbeddings.embed("question").await,
            Err(RetrievalError::Embedding { .. }),
        ));
    }

    #[tokio::test]
    async fn degraded_service_answers_without_embedding_credentials() {
        let config = RetrievalConfig::default();
        let chunker = SeparatorChunker::new(config.chunk_size, &config.separator).unwrap();
        let service = RetrievalService::builder()
            .config(config)
            .embedding_provider(Arc::new(DisabledEmbeddings))
            .chunker(Arc::new(chunker))
            .build()
            .unwrap();

        // No index: queries return empty context without touching the provider.
        assert_eq!(service.state(), ServiceState::NoIndexConfigured);
        assert_eq!(service.context("any question").await.unwrap(), "");
    }
}
