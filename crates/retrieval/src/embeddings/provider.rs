//! Embedding provider trait and factory.

use clerk_core::config::EmbeddingConfig;
use clerk_core::{AppError, AppResult};
use std::sync::Arc;

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Provider name (e.g., "ollama", "mock")
    fn provider_name(&self) -> &str;

    /// Model identifier
    fn model_name(&self) -> &str;

    /// Embedding vector dimension
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts in order.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Retrieval("No embedding returned".to_string()))
    }
}

/// Create an embedding provider from configuration.
pub fn create_provider(
    config: &EmbeddingConfig,
    endpoint: &str,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "ollama" => Ok(Arc::new(super::providers::OllamaEmbedder::new(
            endpoint,
            &config.model,
            config.dimensions,
        ))),

        "mock" => Ok(Arc::new(super::providers::MockProvider::new(
            config.dimensions,
        ))),

        other => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: ollama, mock",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_config() -> EmbeddingConfig {
        EmbeddingConfig {
            provider: "mock".to_string(),
            model: "trigram".to_string(),
            dimensions: 128,
        }
    }

    #[test]
    fn test_create_mock_provider() {
        let provider = create_provider(&mock_config(), "http://localhost:11434").unwrap();
        assert_eq!(provider.provider_name(), "mock");
        assert_eq!(provider.dimensions(), 128);
    }

    #[test]
    fn test_create_unknown_provider() {
        let mut config = mock_config();
        config.provider = "openai".to_string();
        assert!(create_provider(&config, "http://localhost:11434").is_err());
    }

    #[tokio::test]
    async fn test_embed_single_delegates_to_batch() {
        let provider = create_provider(&mock_config(), "http://localhost:11434").unwrap();
        let embedding = provider.embed("locked cabinets").await.unwrap();
        assert_eq!(embedding.len(), 128);
    }
}
