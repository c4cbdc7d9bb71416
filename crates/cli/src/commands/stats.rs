//! Stats command handler.

use clap::Args;
use clerk_core::{config::AppConfig, AppError, AppResult};
use clerk_retrieval::ChunkIndex;

/// Show index statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let index_path = config.index_path();
        if !ChunkIndex::exists(&index_path) {
            return Err(AppError::IndexMissing(index_path));
        }

        let index = ChunkIndex::open(&index_path)?;
        let chunks = index.count()?;

        if self.json {
            println!(
                "{}",
                serde_json::json!({
                    "index": index_path.display().to_string(),
                    "chunks": chunks,
                })
            );
        } else {
            println!("Index: {}", index_path.display());
            println!("Chunks: {}", chunks);
        }

        Ok(())
    }
}
