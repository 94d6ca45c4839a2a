//! PDF text extraction.

use crate::error::{ExtractError, ExtractResult};
use crate::Extraction;
use tracing::debug;

/// Extract text from PDF bytes, preserving page order.
pub fn extract(bytes: &[u8]) -> ExtractResult<Extraction> {
    let raw = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| ExtractError::malformed(format!("failed to extract PDF text: {}", e)))?;

    // Page breaks come through as form feeds
    let pages = raw.matches('\x0C').count().max(1);
    let content = clean_text(&raw);

    debug!("Extracted {} characters from {} PDF page(s)", content.len(), pages);

    Ok(Extraction::new(content).with_metadata("pages", serde_json::json!(pages)))
}

/// Collapse repeated blank lines and normalize page breaks.
fn clean_text(text: &str) -> String {
    text.replace('\x0C', "\n\n")
        .lines()
        .map(|line| line.trim_end())
        .fold(Vec::new(), |mut acc, line| {
            let last_was_empty = acc.last().map(|s: &&str| s.is_empty()).unwrap_or(false);
            if !(line.is_empty() && last_was_empty) {
                acc.push(line);
            }
            acc
        })
        .join("\n")
        .trim()
        .to_string()
}
