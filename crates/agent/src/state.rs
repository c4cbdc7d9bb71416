//! Conversation state flowing through the orchestrator.

use clerk_retrieval::Chunk;
use serde::Serialize;

/// Working state threaded through the graph nodes.
#[derive(Debug, Clone, Default)]
pub struct ChatState {
    /// The user's question, possibly rewritten for retrieval.
    pub question: String,
    /// Retrieved chunks that survived relevance grading.
    pub documents: Vec<Chunk>,
    /// The generated answer, once the generate node has run.
    pub generation: Option<String>,
}

impl ChatState {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            documents: Vec::new(),
            generation: None,
        }
    }
}

/// The result handed back to callers of the chat facade.
#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub question: String,
    pub documents: Vec<Chunk>,
    pub generation: String,
}
