//! Chat command handler.
//!
//! Interactive loop over stdin. Keeps a display-only transcript; each turn
//! goes through the orchestrator independently.

use clap::Args;
use clerk_agent::ChatAgent;
use clerk_core::{config::AppConfig, AppResult};
use std::io::{self, BufRead, Write};

/// One entry of the display transcript.
#[derive(Debug)]
struct TranscriptEntry {
    role: &'static str,
    content: String,
}

/// Interactive chat session
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Run the answer-quality gate after each generation
    #[arg(long)]
    pub evaluate: bool,
}

impl ChatCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        let mut config = config.clone();
        if self.evaluate {
            config.evaluate = true;
        }

        let agent = ChatAgent::from_config(&config).await?;
        let mut transcript: Vec<TranscriptEntry> = Vec::new();

        println!("Ask about store policies and procedures. Type 'exit' to quit.");

        let stdin = io::stdin();
        loop {
            print!("> ");
            io::stdout().flush()?;

            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                break;
            }
            let question = line.trim();
            if question.is_empty() {
                continue;
            }
            if question.eq_ignore_ascii_case("exit") || question.eq_ignore_ascii_case("quit") {
                break;
            }

            transcript.push(TranscriptEntry {
                role: "user",
                content: question.to_string(),
            });

            match agent.chat(question).await {
                Ok(reply) => {
                    println!("{}\n", reply.generation);
                    transcript.push(TranscriptEntry {
                        role: "assistant",
                        content: reply.generation,
                    });
                }
                Err(e) => {
                    tracing::error!("Chat turn failed: {}", e);
                    println!("Sorry, something went wrong. Please try again.\n");
                }
            }
        }

        tracing::debug!("Session ended after {} transcript entries", transcript.len());
        Ok(())
    }
}
