//! Retrieval type definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A raw document produced by ingestion.
///
/// Immutable once handed to the chunker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Extracted plain text
    pub text: String,

    /// Source file the text came from
    pub source: PathBuf,

    /// Page number, when the format distinguishes pages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl Document {
    /// Create a document from raw text with no file provenance.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: PathBuf::new(),
            page: None,
        }
    }
}

/// A bounded slice of a document's text; the unit of embedding and
/// retrieval. Never mutated after indexing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique chunk identifier
    pub id: String,

    /// Source file path (inherited from the document)
    pub source: String,

    /// Page number (inherited from the document)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    /// Ordinal position within the source document
    pub position: u32,

    /// Text content
    pub text: String,

    /// Embedding vector; present once the chunk has been embedded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

/// Counts reported after an ingestion run.
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestStats {
    /// Documents loaded from the source folder
    pub documents: usize,

    /// Chunks written to the index
    pub chunks: usize,
}
