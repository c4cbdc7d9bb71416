//! LLM integration crate for clerk.
//!
//! Provides a provider-agnostic abstraction over local language model
//! runtimes, plus a SQLite response cache.
//!
//! # Example
//! ```no_run
//! use clerk_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::new("Hello, world!", "llama3.2");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use cache::{CachedClient, SqliteCache};
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage, OutputFormat};
pub use factory::create_client;
pub use providers::OllamaClient;
