//! Embedding store: ingestion pipeline plus similarity search over the
//! persisted index.

use crate::chunker::{chunk_documents, ChunkerConfig};
use crate::embeddings::EmbeddingProvider;
use crate::index::ChunkIndex;
use crate::loader::load_folder;
use crate::types::{Chunk, IngestStats};
use clerk_core::AppResult;
use std::path::Path;
use std::sync::Arc;

/// Batch size for embedding calls during ingestion.
const EMBED_BATCH_SIZE: usize = 32;

/// The persisted vector store over ingested documents.
pub struct EmbeddingStore {
    index: ChunkIndex,
    embedder: Arc<dyn EmbeddingProvider>,
    chunker: ChunkerConfig,
}

impl EmbeddingStore {
    /// Open the store at `index_path`. The index file is created if absent;
    /// use [`EmbeddingStore::open_or_ingest`] when a missing file should
    /// trigger ingestion instead.
    pub fn open(
        index_path: &Path,
        embedder: Arc<dyn EmbeddingProvider>,
        chunker: ChunkerConfig,
    ) -> AppResult<Self> {
        let index = ChunkIndex::open(index_path)?;
        Ok(Self {
            index,
            embedder,
            chunker,
        })
    }

    /// Open the store, ingesting `docs_dir` first when no index file exists
    /// yet. The existence check must happen before opening, since opening
    /// creates the file.
    pub async fn open_or_ingest(
        index_path: &Path,
        docs_dir: &Path,
        embedder: Arc<dyn EmbeddingProvider>,
        chunker: ChunkerConfig,
    ) -> AppResult<Self> {
        let fresh = !ChunkIndex::exists(index_path);
        let store = Self::open(index_path, embedder, chunker)?;

        if fresh {
            tracing::info!("No index found, ingesting documents from {:?}", docs_dir);
            store.reindex(docs_dir).await?;
        }

        Ok(store)
    }

    /// Rebuild the index from scratch: clear it, then load, chunk, embed and
    /// insert every document under `docs_dir`.
    pub async fn reindex(&self, docs_dir: &Path) -> AppResult<IngestStats> {
        self.index.clear()?;

        let documents = load_folder(docs_dir)?;
        let document_count = documents.len();
        tracing::info!("Loaded {} documents from {:?}", document_count, docs_dir);

        let mut chunks = chunk_documents(&documents, self.embedder.clone(), &self.chunker).await?;
        tracing::info!("Produced {} chunks", chunks.len());

        for batch in chunks.chunks_mut(EMBED_BATCH_SIZE) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let embeddings = self.embedder.embed_batch(&texts).await?;
            for (chunk, embedding) in batch.iter_mut().zip(embeddings) {
                chunk.embedding = Some(embedding);
            }
        }

        for chunk in &chunks {
            self.index.insert(chunk)?;
        }

        let stats = IngestStats {
            documents: document_count,
            chunks: chunks.len(),
        };
        tracing::info!(
            "Indexed {} chunks from {} documents",
            stats.chunks,
            stats.documents
        );
        Ok(stats)
    }

    /// Embed `text` and return the `top_k` most similar chunks, best first.
    pub async fn query(&self, text: &str, top_k: usize) -> AppResult<Vec<Chunk>> {
        let query_embedding = self.embedder.embed(text).await?;
        let results = self.index.query(&query_embedding, top_k)?;
        Ok(results.into_iter().map(|(chunk, _)| chunk).collect())
    }

    /// Number of chunks currently indexed.
    pub fn chunk_count(&self) -> AppResult<u64> {
        self.index.count()
    }
}

/// Thin retrieval handle bound to a configured `top_k`.
pub struct Retriever {
    store: EmbeddingStore,
    top_k: usize,
}

impl Retriever {
    pub fn new(store: EmbeddingStore, top_k: usize) -> Self {
        Self { store, top_k }
    }

    /// Retrieve the chunks most relevant to `question`.
    pub async fn retrieve(&self, question: &str) -> AppResult<Vec<Chunk>> {
        let chunks = self.store.query(question, self.top_k).await?;
        tracing::debug!("Retrieved {} chunks for question", chunks.len());
        Ok(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::MockProvider;
    use crate::loader::write_test_docx;

    fn chunker() -> ChunkerConfig {
        ChunkerConfig {
            min_chunk_size: 10,
            breakpoint_percentile: 95.0,
        }
    }

    #[tokio::test]
    async fn test_reindex_and_query() {
        let dir = tempfile::tempdir().unwrap();
        let docs = dir.path().join("docs");
        std::fs::create_dir_all(&docs).unwrap();
        write_test_docx(
            &docs.join("security.docx"),
            &["Secure high value items by using locked cabinets."],
        );
        write_test_docx(
            &docs.join("rosters.docx"),
            &["Team rosters rotate weekly on the notice board."],
        );

        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(MockProvider::new(256));
        let store = EmbeddingStore::open(&dir.path().join("index.sqlite"), embedder, chunker())
            .unwrap();

        let stats = store.reindex(&docs).await.unwrap();
        assert_eq!(stats.documents, 2);
        assert!(stats.chunks >= 2);

        let results = store.query("how to secure high value items?", 1).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].text.contains("locked cabinets"));
    }

    #[tokio::test]
    async fn test_reindex_clears_previous_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let docs = dir.path().join("docs");
        std::fs::create_dir_all(&docs).unwrap();
        write_test_docx(&docs.join("a.docx"), &["First version of the handbook."]);

        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(MockProvider::new(256));
        let store = EmbeddingStore::open(&dir.path().join("index.sqlite"), embedder, chunker())
            .unwrap();

        store.reindex(&docs).await.unwrap();
        let first = store.chunk_count().unwrap();

        store.reindex(&docs).await.unwrap();
        assert_eq!(store.chunk_count().unwrap(), first);
    }

    #[tokio::test]
    async fn test_open_or_ingest_builds_missing_index() {
        let dir = tempfile::tempdir().unwrap();
        let docs = dir.path().join("docs");
        std::fs::create_dir_all(&docs).unwrap();
        write_test_docx(&docs.join("a.docx"), &["Returns go to the service desk."]);

        let index_path = dir.path().join("index.sqlite");
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(MockProvider::new(256));
        let store =
            EmbeddingStore::open_or_ingest(&index_path, &docs, embedder, chunker())
                .await
                .unwrap();

        assert!(store.chunk_count().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_open_or_ingest_skips_when_index_exists() {
        let dir = tempfile::tempdir().unwrap();
        let docs = dir.path().join("docs");
        std::fs::create_dir_all(&docs).unwrap();
        write_test_docx(&docs.join("a.docx"), &["Returns go to the service desk."]);

        let index_path = dir.path().join("index.sqlite");
        // Existing empty index file means no ingestion
        {
            let embedder: Arc<dyn EmbeddingProvider> = Arc::new(MockProvider::new(256));
            EmbeddingStore::open(&index_path, embedder, chunker()).unwrap();
        }

        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(MockProvider::new(256));
        let store =
            EmbeddingStore::open_or_ingest(&index_path, &docs, embedder, chunker())
                .await
                .unwrap();
        assert_eq!(store.chunk_count().unwrap(), 0);
    }
}
