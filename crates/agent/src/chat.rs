//! The chat facade.
//!
//! Wires configuration into a ready [`AgentContext`] and exposes the single
//! entry point callers use: ask a question, get back the question, the
//! surviving documents, and the generated answer.

use crate::context::AgentContext;
use crate::graph;
use crate::state::ChatReply;
use clerk_core::{AppConfig, AppResult};
use clerk_llm::create_client;
use clerk_retrieval::{create_provider, ChunkerConfig, EmbeddingStore, Retriever};

/// A configured chat agent.
pub struct ChatAgent {
    ctx: AgentContext,
}

impl ChatAgent {
    /// Build an agent from loaded configuration.
    ///
    /// Opens the chunk index, ingesting the documents folder first when no
    /// index exists yet.
    pub async fn from_config(config: &AppConfig) -> AppResult<Self> {
        config.ensure_clerk_dir()?;

        let cache_path = config.llm_cache_path();
        let llm = create_client(
            "ollama",
            Some(&config.chat.endpoint),
            Some(cache_path.as_path()),
        )?;

        let embedder = create_provider(&config.embedding, &config.chat.endpoint)?;
        let chunker = ChunkerConfig {
            min_chunk_size: config.retrieval.min_chunk_size,
            breakpoint_percentile: config.retrieval.breakpoint_percentile,
        };

        let docs_dir = config.resolved_docs_dir();
        let store =
            EmbeddingStore::open_or_ingest(&config.index_path(), &docs_dir, embedder, chunker)
                .await?;
        let retriever = Retriever::new(store, config.retrieval.top_k);

        Ok(Self {
            ctx: AgentContext {
                llm,
                retriever,
                chat: config.chat.clone(),
                grade_concurrency: config.retrieval.grade_concurrency,
                evaluate: config.evaluate,
                sql_database: config.sql_database.clone(),
            },
        })
    }

    /// Build an agent directly from a context (used by tests).
    pub fn new(ctx: AgentContext) -> Self {
        Self { ctx }
    }

    /// Answer one question through the orchestration graph.
    pub async fn chat(&self, question: &str) -> AppResult<ChatReply> {
        let state = graph::run(&self.ctx, question).await?;
        // Embedding vectors are index internals; drop them so serialized
        // replies carry only the text and provenance.
        let documents = state
            .documents
            .into_iter()
            .map(|mut chunk| {
                chunk.embedding = None;
                chunk
            })
            .collect();
        Ok(ChatReply {
            question: state.question,
            documents,
            generation: state.generation.unwrap_or_default(),
        })
    }
}
