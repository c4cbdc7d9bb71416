//! Error types for the clerk assistant.
//!
//! A single unified error enum covers every error category in the
//! application: ingestion, the vector index, grading, the language model,
//! prompts, SQL helpers, and configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for clerk.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
/// Errors are represented and propagated, never panicked on.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Document ingestion errors (missing folder, unreadable file)
    #[error("Ingestion error: {0}")]
    Ingest(String),

    /// The vector index has not been built yet.
    ///
    /// The chat path reacts by ingesting lazily; only read-only commands
    /// surface this to the user.
    #[error("Vector index not found at {0}")]
    IndexMissing(PathBuf),

    /// Embedding store and retrieval errors
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// A grading response that violates the JSON `score` contract.
    ///
    /// Recoverable per item: the orchestrator drops the offending document
    /// and continues.
    #[error("Grading response could not be parsed: {0}")]
    GradeParse(String),

    /// Language model transport or API errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Prompt template errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// SQL helper errors (introspection, validation, execution)
    #[error("SQL error: {0}")]
    Sql(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = AppError::Ingest("folder does not exist".to_string());
        assert_eq!(err.to_string(), "Ingestion error: folder does not exist");

        let err = AppError::IndexMissing(PathBuf::from("/tmp/index.sqlite"));
        assert!(err.to_string().contains("/tmp/index.sqlite"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: AppError = io.into();
        assert!(matches!(err, AppError::Io(_)));
    }
}
