//! Deterministic offline embedder based on feature hashing.
//!
//! No semantic model: each token is hashed into a dimension with a sign,
//! weighted by term frequency, and the vector is L2-normalized. Texts
//! sharing tokens still land near each other under cosine similarity,
//! which is enough for tests and fully-offline operation.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use sema_core::{EmbedError, EmbeddingGenerator};

/// Hashed bag-of-words embedder. Deterministic for a fixed dimension
/// and input text, with no external dependencies.
pub struct HashEmbedder {
    dimension: usize,
    model_id: String,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            model_id: format!("builtin-hash-{}", dimension),
        }
    }

    fn token_slot(&self, token: &str) -> (usize, f32) {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        let digest = hasher.finalize();

        let bucket = u64::from_le_bytes(digest[0..8].try_into().unwrap());
        let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
        ((bucket % self.dimension as u64) as usize, sign)
    }
}

#[async_trait]
impl EmbeddingGenerator for HashEmbedder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        if text.trim().is_empty() {
            return Err(EmbedError::EmptyInput);
        }

        let mut vector = vec![0.0f32; self.dimension];
        for token in tokenize(text) {
            let (slot, sign) = self.token_slot(&token);
            vector[slot] += sign;
        }

        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }

        Ok(vector)
    }

    async fn is_available(&self) -> bool {
        true
    }
}

/// Lowercased alphanumeric tokens in input order.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
        let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        dot / (na * nb)
    }

    #[tokio::test]
    async fn test_deterministic() {
        let embedder = HashEmbedder::new(128);
        let a = embedder.embed("the quick brown fox").await.unwrap();
        let b = embedder.embed("the quick brown fox").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_identical_text_has_unit_similarity() {
        let embedder = HashEmbedder::new(128);
        let a = embedder.embed("hello world").await.unwrap();
        assert!((cosine(&a, &a) - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_overlapping_text_scores_above_half() {
        let embedder = HashEmbedder::new(384);
        let doc = embedder.embed("hello world").await.unwrap();
        let query = embedder.embed("hello").await.unwrap();

        // One of two tokens shared: cosine ~ 1/sqrt(2)
        assert!(cosine(&doc, &query) >= 0.5);
    }

    #[tokio::test]
    async fn test_disjoint_text_scores_low() {
        let embedder = HashEmbedder::new(384);
        let a = embedder.embed("alpha beta gamma").await.unwrap();
        let b = embedder.embed("seven eight nine").await.unwrap();

        assert!(cosine(&a, &b).abs() < 0.5);
    }

    #[tokio::test]
    async fn test_vectors_are_normalized() {
        let embedder = HashEmbedder::new(64);
        let v = embedder.embed("some text to embed").await.unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_empty_input_rejected() {
        let embedder = HashEmbedder::new(64);
        assert!(matches!(
            embedder.embed("").await.unwrap_err(),
            EmbedError::EmptyInput
        ));
    }

    #[tokio::test]
    async fn test_case_insensitive_tokens() {
        let embedder = HashEmbedder::new(128);
        let a = embedder.embed("Hello World").await.unwrap();
        let b = embedder.embed("hello world").await.unwrap();
        assert_eq!(a, b);
    }
}
