//! Cosine similarity and deterministic result ordering.

use sema_core::{IndexError, IndexHit};
use std::cmp::Ordering;

/// Calculate cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot_product = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for i in 0..a.len() {
        dot_product += a[i] * b[i];
        norm_a += a[i] * a[i];
        norm_b += b[i] * b[i];
    }

    let denominator = norm_a.sqrt() * norm_b.sqrt();
    if denominator == 0.0 {
        return 0.0;
    }

    dot_product / denominator
}

/// Score every candidate against the query vector and return the top_k
/// hits in the corpus-wide deterministic order: score descending, then
/// earliest created_at, then id ascending.
pub(crate) fn rank_hits(
    candidates: impl IntoIterator<Item = IndexHit>,
    top_k: usize,
) -> Result<Vec<IndexHit>, IndexError> {
    if top_k == 0 {
        return Err(IndexError::InvalidTopK { top_k });
    }

    let mut hits: Vec<IndexHit> = candidates.into_iter().collect();

    hits.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.payload.created_at.cmp(&b.payload.created_at))
            .then_with(|| a.id.cmp(&b.id))
    });
    hits.truncate(top_k);

    Ok(hits)
}

/// Encode a vector as little-endian f32 bytes for storage.
pub(crate) fn vector_to_bytes(vector: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vector.len() * 4);
    for value in vector {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Decode a stored little-endian f32 blob back into a vector.
pub(crate) fn vector_from_bytes(bytes: &[u8], dimension: usize) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .take(dimension)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}
