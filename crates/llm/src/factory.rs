//! LLM client factory.

use crate::cache::CachedClient;
use crate::client::LlmClient;
use crate::providers::OllamaClient;
use clerk_core::{AppError, AppResult};
use std::path::Path;
use std::sync::Arc;

/// Create an LLM client for the given provider name.
///
/// When `cache_path` is set, the client is wrapped in the SQLite response
/// cache so repeated prompts (grading in particular) skip the model.
///
/// # Arguments
/// * `provider` - Provider identifier; "ollama" is the only one implemented
/// * `endpoint` - Optional custom endpoint URL
/// * `cache_path` - Optional path for the response cache
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    cache_path: Option<&Path>,
) -> AppResult<Arc<dyn LlmClient>> {
    let client: Arc<dyn LlmClient> = match provider.to_lowercase().as_str() {
        "ollama" => {
            let base_url = endpoint.unwrap_or("http://localhost:11434");
            Arc::new(OllamaClient::with_base_url(base_url))
        }
        _ => {
            return Err(AppError::Config(format!(
                "Unknown LLM provider: {}. Supported: ollama",
                provider
            )))
        }
    };

    match cache_path {
        Some(path) => Ok(Arc::new(CachedClient::new(client, path)?)),
        None => Ok(client),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_ollama_client() {
        let client = create_client("ollama", None, None).unwrap();
        assert_eq!(client.provider_name(), "ollama");
    }

    #[test]
    fn test_create_with_cache() {
        let dir = tempfile::tempdir().unwrap();
        let client = create_client(
            "ollama",
            Some("http://localhost:8080"),
            Some(&dir.path().join("cache.sqlite")),
        )
        .unwrap();
        assert_eq!(client.provider_name(), "ollama");
    }

    #[test]
    fn test_unknown_provider() {
        let result = create_client("openai", None, None);
        assert!(result.is_err());
    }
}
