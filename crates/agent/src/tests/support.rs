//! Test doubles and fixtures shared by the orchestrator tests.

use crate::context::AgentContext;
use async_trait::async_trait;
use clerk_core::config::{ChatModelConfig, EmbeddingConfig};
use clerk_core::AppResult;
use clerk_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use clerk_retrieval::{create_provider, ChunkerConfig, EmbeddingStore, Retriever};
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Model double driven by a closure over the rendered prompt.
pub struct ScriptedClient {
    script: Box<dyn Fn(&str) -> String + Send + Sync>,
    calls: AtomicUsize,
}

impl ScriptedClient {
    pub fn new(script: impl Fn(&str) -> String + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            script: Box::new(script),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let content = (self.script)(&request.prompt);
        Ok(LlmResponse {
            content,
            model: request.model.clone(),
            usage: LlmUsage::default(),
            cached: false,
        })
    }
}

/// Write a minimal DOCX with one paragraph per entry.
pub fn write_docx(path: &Path, paragraphs: &[&str]) {
    let file = std::fs::File::create(path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();

    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p))
        .collect();
    let xml = format!(
        "<?xml version=\"1.0\"?><w:document><w:body>{}</w:body></w:document>",
        body
    );

    writer.start_file("word/document.xml", options).unwrap();
    writer.write_all(xml.as_bytes()).unwrap();
    writer.finish().unwrap();
}

/// Build a context over an index freshly ingested from `docs_dir`.
///
/// Uses the deterministic mock embedder so retrieval ranking is stable.
pub async fn context_over(
    docs_dir: &Path,
    work_dir: &Path,
    top_k: usize,
    llm: Arc<dyn LlmClient>,
) -> AgentContext {
    let embedding = EmbeddingConfig {
        provider: "mock".to_string(),
        model: "mock".to_string(),
        dimensions: 256,
    };
    let embedder = create_provider(&embedding, "http://localhost:11434").unwrap();
    let chunker = ChunkerConfig {
        min_chunk_size: 10,
        breakpoint_percentile: 95.0,
    };

    let store = EmbeddingStore::open_or_ingest(
        &work_dir.join("index.sqlite"),
        docs_dir,
        embedder,
        chunker,
    )
    .await
    .unwrap();

    AgentContext {
        llm,
        retriever: Retriever::new(store, top_k),
        chat: ChatModelConfig::default(),
        grade_concurrency: 4,
        evaluate: false,
        sql_database: None,
    }
}

/// Prompt markers used to dispatch scripted replies.
pub const ROUTER_MARKER: &str = "expert at routing";
pub const RELEVANCE_MARKER: &str = "assessing relevance";
pub const ANSWER_GRADER_MARKER: &str = "answer is useful";
pub const QA_MARKER: &str = "retrieved context to answer";
pub const SQL_MARKER: &str = "generates SQL queries";
