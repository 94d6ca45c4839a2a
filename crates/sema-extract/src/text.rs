//! Plain text extraction.

use crate::error::ExtractResult;
use crate::Extraction;

/// Extract plain text. Invalid UTF-8 sequences are replaced, never
/// dropped, so nothing disappears silently.
pub fn extract(bytes: &[u8]) -> ExtractResult<Extraction> {
    let content = String::from_utf8_lossy(bytes).into_owned();
    let lines = content.lines().count();

    Ok(Extraction::new(content).with_metadata("lines", serde_json::json!(lines)))
}
