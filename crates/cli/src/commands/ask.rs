//! Ask command handler.
//!
//! Runs one question through the full orchestration graph and prints the
//! answer.

use clap::Args;
use clerk_agent::ChatAgent;
use clerk_core::{config::AppConfig, AppResult};

/// Ask a single question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Run the answer-quality gate after generation
    #[arg(long)]
    pub evaluate: bool,

    /// Print sources alongside the answer
    #[arg(short, long)]
    pub sources: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let mut config = config.clone();
        if self.evaluate {
            config.evaluate = true;
        }

        let agent = ChatAgent::from_config(&config).await?;
        let reply = agent.chat(&self.question).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&reply)?);
            return Ok(());
        }

        println!("{}", reply.generation);

        if self.sources && !reply.documents.is_empty() {
            println!("\nSources:");
            for doc in &reply.documents {
                match doc.page {
                    Some(page) => println!("  - {} (page {})", doc.source, page),
                    None => println!("  - {}", doc.source),
                }
            }
        }

        Ok(())
    }
}
