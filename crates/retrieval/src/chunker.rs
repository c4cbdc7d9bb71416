//! Semantic chunking.
//!
//! Documents are split at embedding-similarity discontinuities rather than
//! fixed character counts: sentences are embedded, the cosine distance
//! between each consecutive pair is computed, and a breakpoint is placed
//! wherever the distance exceeds a percentile of all distances in the
//! document. Segments shorter than the minimum chunk size are merged into
//! their successor.
//!
//! Sentence spans partition the document text exactly, so concatenating the
//! chunks of a document reconstructs its text byte for byte.

use crate::embeddings::EmbeddingProvider;
use crate::types::{Chunk, Document};
use clerk_core::AppResult;
use std::sync::Arc;

/// Chunker settings.
#[derive(Debug, Clone, Copy)]
pub struct ChunkerConfig {
    /// Minimum chunk size in characters; smaller segments are merged forward
    pub min_chunk_size: usize,

    /// Percentile (0-100) of sentence distances used as the breakpoint
    /// threshold
    pub breakpoint_percentile: f32,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            min_chunk_size: 300,
            breakpoint_percentile: 95.0,
        }
    }
}

/// Split documents into semantically coherent chunks.
///
/// Emits an info-level summary of document and chunk counts. The only error
/// path is a propagated embedding failure.
pub async fn chunk_documents(
    docs: &[Document],
    embedder: Arc<dyn EmbeddingProvider>,
    config: &ChunkerConfig,
) -> AppResult<Vec<Chunk>> {
    let mut chunks = Vec::new();

    for doc in docs {
        let doc_chunks = chunk_document(doc, embedder.as_ref(), config).await?;
        chunks.extend(doc_chunks);
    }

    tracing::info!("Split {} documents into {} chunks", docs.len(), chunks.len());
    Ok(chunks)
}

async fn chunk_document(
    doc: &Document,
    embedder: &dyn EmbeddingProvider,
    config: &ChunkerConfig,
) -> AppResult<Vec<Chunk>> {
    let sentences = split_sentences(&doc.text);

    if sentences.is_empty() {
        return Ok(vec![]);
    }

    let breakpoints = if sentences.len() < 2 {
        vec![]
    } else {
        let texts: Vec<String> = sentences.iter().map(|s| s.to_string()).collect();
        let embeddings = embedder.embed_batch(&texts).await?;
        find_breakpoints(&embeddings, config.breakpoint_percentile)
    };

    let segments = assemble_segments(&sentences, &breakpoints, config.min_chunk_size);

    let chunks: Vec<Chunk> = segments
        .into_iter()
        .enumerate()
        .map(|(position, text)| Chunk {
            id: uuid::Uuid::new_v4().to_string(),
            source: doc.source.to_string_lossy().to_string(),
            page: doc.page,
            position: position as u32,
            text,
            embedding: None,
        })
        .collect();

    tracing::debug!(
        "Chunked {:?}: {} sentences into {} chunks",
        doc.source,
        sentences.len(),
        chunks.len()
    );

    Ok(chunks)
}

/// Split text into sentence spans that partition it exactly.
///
/// A sentence ends after a terminator (`.`, `!`, `?`) or newline followed by
/// whitespace; the whitespace run belongs to the preceding sentence so the
/// spans concatenate back to the input.
fn split_sentences(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return vec![];
    }

    let bytes = text.as_bytes();
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        let is_terminator = matches!(b, b'.' | b'!' | b'?' | b'\n');
        i += 1;

        if is_terminator {
            // Consume the trailing whitespace run into this sentence
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if i > start {
                sentences.push(&text[start..i]);
                start = i;
            }
        }
    }

    if start < text.len() {
        sentences.push(&text[start..]);
    }

    sentences
}

/// Indices after which a new chunk starts, based on cosine distance between
/// consecutive sentence embeddings.
fn find_breakpoints(embeddings: &[Vec<f32>], percentile: f32) -> Vec<usize> {
    let distances: Vec<f32> = embeddings
        .windows(2)
        .map(|pair| 1.0 - cosine_similarity(&pair[0], &pair[1]))
        .collect();

    if distances.is_empty() {
        return vec![];
    }

    let threshold = percentile_of(&distances, percentile);

    distances
        .iter()
        .enumerate()
        .filter(|(_, d)| **d > threshold)
        .map(|(i, _)| i)
        .collect()
}

/// Value at the given percentile (nearest-rank) of an unsorted slice.
fn percentile_of(values: &[f32], percentile: f32) -> f32 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let rank = ((percentile / 100.0) * sorted.len() as f32).ceil() as usize;
    let index = rank.clamp(1, sorted.len()) - 1;
    sorted[index]
}

/// Join sentences into segments at the breakpoints, then merge any segment
/// below the minimum size into its successor (or predecessor for the last).
fn assemble_segments(
    sentences: &[&str],
    breakpoints: &[usize],
    min_chunk_size: usize,
) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();

    for (i, sentence) in sentences.iter().enumerate() {
        current.push_str(sentence);
        if breakpoints.contains(&i) {
            segments.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }

    // Forward-merge undersized segments
    let mut merged: Vec<String> = Vec::with_capacity(segments.len());
    let mut pending = String::new();

    for segment in segments {
        pending.push_str(&segment);
        if pending.chars().count() >= min_chunk_size {
            merged.push(std::mem::take(&mut pending));
        }
    }
    if !pending.is_empty() {
        match merged.last_mut() {
            Some(last) => last.push_str(&pending),
            None => merged.push(pending),
        }
    }

    merged
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::MockProvider;

    fn small_config() -> ChunkerConfig {
        ChunkerConfig {
            min_chunk_size: 10,
            breakpoint_percentile: 50.0,
        }
    }

    #[test]
    fn test_split_sentences_partitions_exactly() {
        let text = "First sentence. Second one! A third? And a trailing fragment";
        let sentences = split_sentences(text);

        assert_eq!(sentences.len(), 4);
        assert_eq!(sentences.concat(), text);
    }

    #[test]
    fn test_split_sentences_newlines() {
        let text = "paragraph one\nparagraph two\n";
        let sentences = split_sentences(text);
        assert_eq!(sentences.concat(), text);
        assert_eq!(sentences.len(), 2);
    }

    #[test]
    fn test_percentile_of() {
        let values = [0.1, 0.2, 0.3, 0.4];
        assert_eq!(percentile_of(&values, 100.0), 0.4);
        assert_eq!(percentile_of(&values, 50.0), 0.2);
    }

    #[tokio::test]
    async fn test_chunks_reconstruct_document() {
        let text = "Refunds require a receipt. Exchanges are allowed within thirty days. \
                    Store opens at nine. High value items go in locked cabinets. \
                    Cabinets are audited weekly.";
        let doc = Document::from_text(text);
        let embedder = Arc::new(MockProvider::new(64));

        let chunks = chunk_documents(&[doc], embedder, &small_config())
            .await
            .unwrap();

        assert!(!chunks.is_empty());
        let rebuilt: String = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(rebuilt, text);

        // Positions are ordinal
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.position as usize, i);
        }
    }

    #[tokio::test]
    async fn test_min_chunk_size_respected() {
        let text = "One. Two. Three. Four. Five. Six. Seven. Eight. Nine. Ten.";
        let doc = Document::from_text(text);
        let embedder = Arc::new(MockProvider::new(64));

        let config = ChunkerConfig {
            min_chunk_size: 20,
            breakpoint_percentile: 10.0,
        };
        let chunks = chunk_documents(&[doc], embedder, &config).await.unwrap();

        // All but possibly the last chunk meet the minimum
        for chunk in &chunks[..chunks.len().saturating_sub(1)] {
            assert!(chunk.text.chars().count() >= 20, "chunk too small: {:?}", chunk.text);
        }
        let rebuilt: String = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(rebuilt, text);
    }

    #[tokio::test]
    async fn test_empty_document_yields_no_chunks() {
        let doc = Document::from_text("");
        let embedder = Arc::new(MockProvider::new(64));
        let chunks = chunk_documents(&[doc], embedder, &small_config())
            .await
            .unwrap();
        assert!(chunks.is_empty());
    }
}
