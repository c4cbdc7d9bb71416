//! Deterministic mock embedding provider.
//!
//! Produces content-dependent vectors from character trigrams and word
//! frequencies. Not semantically meaningful, but consistent: identical text
//! always gets an identical unit vector, and overlapping vocabulary yields
//! correlated vectors. Good enough for index and chunker tests without a
//! model server.

use crate::embeddings::provider::EmbeddingProvider;
use clerk_core::AppResult;
use std::collections::{HashMap, HashSet};

#[derive(Debug)]
pub struct MockProvider {
    dimensions: usize,
}

impl MockProvider {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimensions];

        let stop_words: HashSet<&str> = [
            "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for",
            "to", "of", "in", "and", "or", "but", "with", "by", "from", "this", "that", "be",
            "have", "has", "had", "it", "its", "their", "they", "them",
        ]
        .into_iter()
        .collect();

        let lower = text.to_lowercase();
        let mut word_freq: HashMap<&str, u32> = HashMap::new();
        for word in lower
            .split_whitespace()
            .filter(|w| w.len() > 2 && !stop_words.contains(w))
        {
            *word_freq.entry(word).or_insert(0) += 1;
        }

        for (word, freq) in &word_freq {
            let chars: Vec<char> = word.chars().collect();

            // Trigrams spread each word over several dimensions
            for window in chars.windows(3) {
                let hash = window
                    .iter()
                    .collect::<String>()
                    .bytes()
                    .fold(0u64, |acc, b| acc.wrapping_mul(37).wrapping_add(b as u64));
                embedding[(hash as usize) % self.dimensions] += (*freq as f32).sqrt();
            }

            // The whole word gets one dimension of its own
            let hash = word
                .bytes()
                .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
            embedding[(hash as usize) % self.dimensions] += *freq as f32;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        embedding
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "trigram"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deterministic() {
        let provider = MockProvider::new(128);
        let a = provider.embed("locked cabinets for high value items").await.unwrap();
        let b = provider.embed("locked cabinets for high value items").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_unit_norm() {
        let provider = MockProvider::new(128);
        let embedding = provider.embed("store opening procedure").await.unwrap();
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_different_texts_differ() {
        let provider = MockProvider::new(128);
        let a = provider.embed("refund policy").await.unwrap();
        let b = provider.embed("rostering handbook").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_empty_text_is_zero_vector() {
        let provider = MockProvider::new(128);
        let embedding = provider.embed("").await.unwrap();
        assert!(embedding.iter().all(|&x| x == 0.0));
    }
}
