//! Window chunking for over-length text.
//!
//! Long documents are split into ordered, overlapping character windows;
//! each window is embedded separately and the vectors are pooled back
//! into one document-level vector (see [`crate::DocumentEmbedder`]).

use sema_config::EmbeddingConfig;

/// Configuration for window chunking.
#[derive(Debug, Clone)]
pub struct ChunkConfig {
    /// Maximum size of each window in characters.
    pub window_chars: usize,
    /// Characters of overlap between consecutive windows.
    pub overlap_chars: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            window_chars: 2000,
            overlap_chars: 200,
        }
    }
}

impl ChunkConfig {
    pub fn from_embedding_config(config: &EmbeddingConfig) -> Self {
        Self {
            window_chars: config.chunk_chars,
            overlap_chars: config.chunk_overlap,
        }
    }
}

/// Splits text into ordered overlapping windows.
pub struct Chunker {
    config: ChunkConfig,
}

impl Chunker {
    /// Create a new chunker. Overlap must be smaller than the window so
    /// every step makes progress.
    pub fn new(config: ChunkConfig) -> Self {
        assert!(
            config.overlap_chars < config.window_chars,
            "chunk overlap must be smaller than the window"
        );
        Self { config }
    }

    /// Whether the text fits in a single window.
    pub fn fits(&self, text: &str) -> bool {
        text.chars().count() <= self.config.window_chars
    }

    /// Split text into windows, preferring to break at whitespace near
    /// the window end. Windows are returned in document order and cover
    /// the entire input.
    pub fn split(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        if chars.is_empty() {
            return vec![];
        }
        if chars.len() <= self.config.window_chars {
            return vec![text.to_string()];
        }

        let mut windows = Vec::new();
        let mut start = 0;

        while start < chars.len() {
            let hard_end = (start + self.config.window_chars).min(chars.len());

            // Break at the last whitespace in the window when one exists
            // past the overlap region, so words stay intact.
            let end = if hard_end < chars.len() {
                chars[start..hard_end]
                    .iter()
                    .rposition(|c| c.is_whitespace())
                    .map(|pos| start + pos + 1)
                    .filter(|&e| e > start + self.config.overlap_chars)
                    .unwrap_or(hard_end)
            } else {
                hard_end
            };

            windows.push(chars[start..end].iter().collect());

            if end == chars.len() {
                break;
            }
            start = end.saturating_sub(self.config.overlap_chars);
        }

        windows
    }
}
