//! Ingest command handler.
//!
//! Rebuilds the document index: clears existing chunks, then loads, chunks,
//! embeds and indexes every document in the docs folder.

use clap::Args;
use clerk_core::{config::AppConfig, AppResult};
use clerk_retrieval::{create_provider, ChunkerConfig, EmbeddingStore};
use std::path::PathBuf;

/// Ingest documents into the index
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// Folder of documents to ingest (default: configured docs dir)
    #[arg(short, long)]
    pub docs_dir: Option<PathBuf>,

    /// Delete the index and LLM cache files before ingesting
    #[arg(long)]
    pub reset: bool,
}

impl IngestCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ingest command");

        if self.reset {
            for path in [config.index_path(), config.llm_cache_path()] {
                if path.exists() {
                    std::fs::remove_file(&path)?;
                    tracing::info!("Removed {:?}", path);
                }
            }
        }

        let docs_dir = self
            .docs_dir
            .clone()
            .unwrap_or_else(|| config.resolved_docs_dir());

        let embedder = create_provider(&config.embedding, &config.chat.endpoint)?;
        let chunker = ChunkerConfig {
            min_chunk_size: config.retrieval.min_chunk_size,
            breakpoint_percentile: config.retrieval.breakpoint_percentile,
        };
        let store = EmbeddingStore::open(&config.index_path(), embedder, chunker)?;

        let stats = store.reindex(&docs_dir).await?;

        println!(
            "Indexed {} chunks from {} documents",
            stats.chunks, stats.documents
        );
        Ok(())
    }
}
