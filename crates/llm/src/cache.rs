//! SQLite-backed LLM response cache.
//!
//! Completions are cached process-wide, keyed by a hash of the prompt and
//! its generation parameters. Reads are idempotent; writes replace any
//! existing row for the same key. There is no invalidation policy beyond
//! overwrite-on-rewrite.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use clerk_core::{AppError, AppResult};
use rusqlite::{params, Connection};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// SQLite response cache.
pub struct SqliteCache {
    conn: Mutex<Connection>,
}

impl SqliteCache {
    /// Open (or create) a cache database at the given path.
    pub fn open(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::Llm(format!("Failed to create cache directory: {}", e)))?;
        }

        let conn = Connection::open(path)
            .map_err(|e| AppError::Llm(format!("Failed to open LLM cache: {}", e)))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS responses (
                key TEXT PRIMARY KEY,
                model TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| AppError::Llm(format!("Failed to create cache table: {}", e)))?;

        tracing::debug!("Opened LLM response cache at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> AppResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Llm("LLM cache lock poisoned".to_string()))
    }

    /// Look up a cached completion.
    pub fn get(&self, key: &str) -> AppResult<Option<(String, String)>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT model, content FROM responses WHERE key = ?1")
            .map_err(|e| AppError::Llm(format!("Cache lookup failed: {}", e)))?;

        let mut rows = stmt
            .query(params![key])
            .map_err(|e| AppError::Llm(format!("Cache lookup failed: {}", e)))?;

        match rows
            .next()
            .map_err(|e| AppError::Llm(format!("Cache lookup failed: {}", e)))?
        {
            Some(row) => {
                let model: String = row
                    .get(0)
                    .map_err(|e| AppError::Llm(format!("Cache row decode failed: {}", e)))?;
                let content: String = row
                    .get(1)
                    .map_err(|e| AppError::Llm(format!("Cache row decode failed: {}", e)))?;
                Ok(Some((model, content)))
            }
            None => Ok(None),
        }
    }

    /// Store a completion, replacing any previous entry for the key.
    pub fn put(&self, key: &str, model: &str, content: &str) -> AppResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO responses (key, model, content, created_at)
             VALUES (?1, ?2, ?3, datetime('now'))",
            params![key, model, content],
        )
        .map_err(|e| AppError::Llm(format!("Cache write failed: {}", e)))?;
        Ok(())
    }
}

/// Cache key: sha256 over the request's model, prompts, and parameters.
pub fn request_key(request: &LlmRequest) -> String {
    let mut hasher = Sha256::new();
    hasher.update(request.model.as_bytes());
    hasher.update([0]);
    hasher.update(request.system.as_deref().unwrap_or("").as_bytes());
    hasher.update([0]);
    hasher.update(request.prompt.as_bytes());
    hasher.update([0]);
    hasher.update(
        format!(
            "{:?}|{:?}|{:?}|{:?}",
            request.temperature, request.num_ctx, request.keep_alive, request.format
        )
        .as_bytes(),
    );
    format!("{:x}", hasher.finalize())
}

/// Decorator that serves completions from the cache when possible.
pub struct CachedClient {
    inner: Arc<dyn LlmClient>,
    cache: SqliteCache,
}

impl CachedClient {
    /// Wrap a client with a cache stored at `cache_path`.
    pub fn new(inner: Arc<dyn LlmClient>, cache_path: &Path) -> AppResult<Self> {
        Ok(Self {
            inner,
            cache: SqliteCache::open(cache_path)?,
        })
    }
}

#[async_trait::async_trait]
impl LlmClient for CachedClient {
    fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        let key = request_key(request);

        if let Some((model, content)) = self.cache.get(&key)? {
            tracing::debug!(model = %model, "LLM cache hit");
            return Ok(LlmResponse {
                content,
                model,
                usage: LlmUsage::default(),
                cached: true,
            });
        }

        let response = self.inner.complete(request).await?;
        self.cache.put(&key, &response.model, &response.content)?;
        Ok(response)
    }
}
