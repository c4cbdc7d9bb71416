//! Configuration management for clerk.
//!
//! Configuration is merged from three sources, lowest precedence first:
//! - Built-in defaults
//! - A YAML config file (`.clerk/config.yaml` under the workspace)
//! - Environment variables and command-line flags
//!
//! The workspace directory holds everything mutable: the vector index, the
//! LLM response cache, and the config file itself all live under `.clerk/`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Settings for the chat model used for generation and grading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatModelConfig {
    /// Ollama endpoint
    pub endpoint: String,

    /// Model identifier (e.g., "llama3.2")
    pub model: String,

    /// Sampling temperature; 0 keeps grading deterministic
    pub temperature: f32,

    /// Seconds to keep the model loaded between calls
    #[serde(rename = "keepAlive")]
    pub keep_alive: u64,

    /// Context window in tokens
    #[serde(rename = "numCtx", skip_serializing_if = "Option::is_none")]
    pub num_ctx: Option<u32>,
}

impl Default for ChatModelConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
            temperature: 0.0,
            keep_alive: 10_000,
            num_ctx: None,
        }
    }
}

/// Settings for the embedding model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Provider name: "ollama" or "mock"
    pub provider: String,

    /// Embedding model identifier
    pub model: String,

    /// Expected vector dimension
    pub dimensions: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "mxbai-embed-large".to_string(),
            dimensions: 1024,
        }
    }
}

/// Settings for retrieval and chunking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of chunks pulled per question
    #[serde(rename = "topK")]
    pub top_k: usize,

    /// Minimum chunk size in characters
    #[serde(rename = "minChunkSize")]
    pub min_chunk_size: usize,

    /// Percentile (0-100) of sentence-distance used as a chunk breakpoint
    #[serde(rename = "breakpointPercentile")]
    pub breakpoint_percentile: f32,

    /// Bounded concurrency for per-document grading
    #[serde(rename = "gradeConcurrency")]
    pub grade_concurrency: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 2,
            min_chunk_size: 300,
            breakpoint_percentile: 95.0,
            grade_concurrency: 4,
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Workspace root (contains `.clerk/`)
    pub workspace: PathBuf,

    /// Optional explicit config file path
    #[serde(skip)]
    pub config_file: Option<PathBuf>,

    /// Folder scanned for `.pdf` / `.docx` source documents
    #[serde(rename = "docsDir")]
    pub docs_dir: PathBuf,

    /// Optional SQLite database for the SQL-answering branch
    #[serde(rename = "sqlDatabase", skip_serializing_if = "Option::is_none")]
    pub sql_database: Option<PathBuf>,

    /// Run the answer-grading evaluate step after generate
    #[serde(default)]
    pub evaluate: bool,

    /// Chat model settings
    pub chat: ChatModelConfig,

    /// Embedding settings
    pub embedding: EmbeddingConfig,

    /// Retrieval and chunking settings
    pub retrieval: RetrievalConfig,

    /// Log level override
    #[serde(skip)]
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    #[serde(skip)]
    pub verbose: bool,

    /// Disable colored output
    #[serde(skip)]
    pub no_color: bool,
}

/// Shape of `.clerk/config.yaml`. All sections optional.
#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigFile {
    #[serde(rename = "docsDir")]
    docs_dir: Option<PathBuf>,
    #[serde(rename = "sqlDatabase")]
    sql_database: Option<PathBuf>,
    evaluate: Option<bool>,
    chat: Option<ChatModelConfig>,
    embedding: Option<EmbeddingConfig>,
    retrieval: Option<RetrievalConfig>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            docs_dir: PathBuf::from("data/raw"),
            sql_database: None,
            evaluate: false,
            chat: ChatModelConfig::default(),
            embedding: EmbeddingConfig::default(),
            retrieval: RetrievalConfig::default(),
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and the config file.
    ///
    /// Environment variables:
    /// - `CLERK_WORKSPACE`: workspace path
    /// - `CLERK_CONFIG`: config file path
    /// - `CLERK_MODEL`: chat model identifier
    /// - `CLERK_ENDPOINT`: Ollama endpoint
    /// - `RUST_LOG`: log level
    /// - `NO_COLOR`: disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(workspace) = std::env::var("CLERK_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if let Ok(config_file) = std::env::var("CLERK_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => cf.clone(),
            None => config.workspace.join(".clerk/config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override the YAML file
        if let Ok(model) = std::env::var("CLERK_MODEL") {
            config.chat.model = model;
        }

        if let Ok(endpoint) = std::env::var("CLERK_ENDPOINT") {
            config.chat.endpoint = endpoint;
        }

        config.log_level = std::env::var("RUST_LOG").ok();

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(mut self, path: &PathBuf) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        if let Some(docs_dir) = file.docs_dir {
            self.docs_dir = docs_dir;
        }
        if let Some(sql_database) = file.sql_database {
            self.sql_database = Some(sql_database);
        }
        if let Some(evaluate) = file.evaluate {
            self.evaluate = evaluate;
        }
        if let Some(chat) = file.chat {
            self.chat = chat;
        }
        if let Some(embedding) = file.embedding {
            self.embedding = embedding;
        }
        if let Some(retrieval) = file.retrieval {
            self.retrieval = retrieval;
        }
        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                self.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                self.no_color = !color;
            }
        }

        Ok(self)
    }

    /// Apply CLI flag overrides, which beat both env vars and the file.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        model: Option<String>,
        endpoint: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(model) = model {
            self.chat.model = model;
        }

        if let Some(endpoint) = endpoint {
            self.chat.endpoint = endpoint;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Path to the `.clerk` state directory.
    pub fn clerk_dir(&self) -> PathBuf {
        self.workspace.join(".clerk")
    }

    /// Path to the SQLite vector index.
    pub fn index_path(&self) -> PathBuf {
        self.clerk_dir().join("index.sqlite")
    }

    /// Path to the SQLite LLM response cache.
    pub fn llm_cache_path(&self) -> PathBuf {
        self.clerk_dir().join("llm-cache.sqlite")
    }

    /// Docs folder resolved against the workspace when relative.
    pub fn resolved_docs_dir(&self) -> PathBuf {
        if self.docs_dir.is_absolute() {
            self.docs_dir.clone()
        } else {
            self.workspace.join(&self.docs_dir)
        }
    }

    /// Ensure the `.clerk` directory exists.
    pub fn ensure_clerk_dir(&self) -> AppResult<()> {
        let dir = self.clerk_dir();
        if !dir.exists() {
            std::fs::create_dir_all(&dir).map_err(|e| {
                AppError::Config(format!("Failed to create .clerk directory: {}", e))
            })?;
        }
        Ok(())
    }
}
