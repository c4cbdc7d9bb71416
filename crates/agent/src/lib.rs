//! Chat orchestration for clerk.
//!
//! Routes a question to the document store or the SQL database, grades
//! retrieved documents for relevance, generates an answer over the
//! survivors, and optionally gates the answer through an evaluation step.

pub mod chat;
pub mod context;
pub mod graph;
pub mod sql;
pub mod state;

#[cfg(test)]
mod tests;

// Re-export main types
pub use chat::ChatAgent;
pub use context::AgentContext;
pub use graph::FALLBACK_ANSWER;
pub use state::{ChatReply, ChatState};
