//! Embedding generation.
//!
//! Provider-agnostic embedding interface with an Ollama implementation and
//! a deterministic mock used by tests.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
