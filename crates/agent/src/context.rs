//! Dependency container for the orchestrator.
//!
//! Everything the graph nodes need is injected here, so tests can swap the
//! model client for a scripted double and point the retriever at a
//! throwaway index.

use clerk_core::config::ChatModelConfig;
use clerk_llm::{LlmClient, LlmRequest};
use clerk_retrieval::Retriever;
use std::path::PathBuf;
use std::sync::Arc;

/// Shared dependencies for one chat agent.
pub struct AgentContext {
    /// The language model behind every prompt in the graph.
    pub llm: Arc<dyn LlmClient>,
    /// Similarity retrieval over the ingested documents.
    pub retriever: Retriever,
    /// Chat model settings applied to every request.
    pub chat: ChatModelConfig,
    /// Maximum in-flight relevance gradings.
    pub grade_concurrency: usize,
    /// Whether the answer-grader quality gate runs after generation.
    pub evaluate: bool,
    /// SQLite database for the SQL branch; `None` disables routing to SQL.
    pub sql_database: Option<PathBuf>,
}

impl AgentContext {
    /// Build a request with the configured model settings applied.
    pub fn request(&self, prompt: impl Into<String>) -> LlmRequest {
        let mut request = LlmRequest::new(prompt, &self.chat.model)
            .with_temperature(self.chat.temperature)
            .with_keep_alive(self.chat.keep_alive);
        if let Some(num_ctx) = self.chat.num_ctx {
            request = request.with_num_ctx(num_ctx);
        }
        request
    }
}
