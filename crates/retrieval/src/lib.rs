//! Document ingestion, semantic chunking, and similarity retrieval.

pub mod chunker;
pub mod embeddings;
pub mod index;
pub mod loader;
pub mod store;
pub mod types;

pub use chunker::{chunk_documents, ChunkerConfig};
pub use embeddings::{create_provider, EmbeddingProvider};
pub use index::ChunkIndex;
pub use loader::load_folder;
pub use store::{EmbeddingStore, Retriever};
pub use types::{Chunk, Document, IngestStats};
