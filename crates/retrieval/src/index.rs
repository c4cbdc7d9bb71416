//! SQLite-backed vector index.
//!
//! Chunks are stored as rows with their embedding as a little-endian f32
//! BLOB. Queries are a full scan with cosine similarity, which is plenty for
//! the corpus sizes this assistant targets. Ties are left to row order and
//! treated as unstable.

use crate::types::Chunk;
use clerk_core::{AppError, AppResult};
use rusqlite::{params, Connection};
use std::path::Path;

/// The persistent chunk index.
pub struct ChunkIndex {
    conn: Connection,
}

impl ChunkIndex {
    /// Open (or create) the index at the given path.
    pub fn open(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::Retrieval(format!("Failed to create index directory: {}", e))
            })?;
        }

        let conn = Connection::open(path)
            .map_err(|e| AppError::Retrieval(format!("Failed to open index: {}", e)))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS chunks (
                id TEXT PRIMARY KEY,
                source TEXT NOT NULL,
                page INTEGER,
                position INTEGER NOT NULL,
                text TEXT NOT NULL,
                embedding BLOB NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_chunks_source ON chunks(source);
            "#,
        )
        .map_err(|e| AppError::Retrieval(format!("Failed to create index tables: {}", e)))?;

        tracing::debug!("Opened chunk index at {:?}", path);
        Ok(Self { conn })
    }

    /// Whether an index file already exists at the path.
    pub fn exists(path: &Path) -> bool {
        path.exists()
    }

    /// Insert an embedded chunk.
    pub fn insert(&self, chunk: &Chunk) -> AppResult<()> {
        let embedding = chunk.embedding.as_ref().ok_or_else(|| {
            AppError::Retrieval(format!("Chunk {} has no embedding", chunk.id))
        })?;

        self.conn
            .execute(
                "INSERT OR REPLACE INTO chunks
                 (id, source, page, position, text, embedding, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    chunk.id,
                    chunk.source,
                    chunk.page.map(|p| p as i64),
                    chunk.position as i64,
                    chunk.text,
                    embedding_to_bytes(embedding),
                    chrono::Utc::now().to_rfc3339(),
                ],
            )
            .map_err(|e| AppError::Retrieval(format!("Failed to insert chunk: {}", e)))?;

        Ok(())
    }

    /// Top-k most similar chunks to the query embedding, best first.
    pub fn query(&self, query_embedding: &[f32], top_k: usize) -> AppResult<Vec<(Chunk, f32)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, source, page, position, text, embedding FROM chunks")
            .map_err(|e| AppError::Retrieval(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map([], |row| {
                let page: Option<i64> = row.get(2)?;
                let embedding_bytes: Vec<u8> = row.get(5)?;
                Ok(Chunk {
                    id: row.get(0)?,
                    source: row.get(1)?,
                    page: page.map(|p| p as u32),
                    position: row.get::<_, i64>(3)? as u32,
                    text: row.get(4)?,
                    embedding: Some(bytes_to_embedding(&embedding_bytes)),
                })
            })
            .map_err(|e| AppError::Retrieval(format!("Failed to query chunks: {}", e)))?;

        let mut results: Vec<(Chunk, f32)> = Vec::new();
        for row in rows {
            let chunk =
                row.map_err(|e| AppError::Retrieval(format!("Failed to decode chunk: {}", e)))?;
            let score = cosine_similarity(
                query_embedding,
                chunk.embedding.as_deref().unwrap_or_default(),
            );
            results.push((chunk, score));
        }

        // Stable sort keeps row order on ties
        results.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(top_k);

        tracing::debug!("Index query returned {} chunks (top-{})", results.len(), top_k);
        Ok(results)
    }

    /// Number of chunks in the index.
    pub fn count(&self) -> AppResult<u64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM chunks", [], |row| {
                row.get::<_, i64>(0).map(|v| v as u64)
            })
            .map_err(|e| AppError::Retrieval(format!("Failed to count chunks: {}", e)))
    }

    /// Delete every chunk.
    pub fn clear(&self) -> AppResult<()> {
        self.conn
            .execute("DELETE FROM chunks", [])
            .map_err(|e| AppError::Retrieval(format!("Failed to clear index: {}", e)))?;
        tracing::info!("Cleared chunk index");
        Ok(())
    }
}

fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
