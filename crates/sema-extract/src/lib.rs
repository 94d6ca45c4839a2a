//! Sema Extract - Format-specific text extraction from raw file bytes.
//!
//! Dispatch is a closed registry keyed by the declared filename extension,
//! never content sniffing: adding a format is an auditable change to
//! [`Format`] and its match arms.

mod error;
mod excel;
mod json;
mod pdf;
mod text;
mod word;

pub use error::{ExtractError, ExtractResult};

use sema_core::Metadata;

/// Extensions accepted by [`Format::from_extension`], in display order.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "txt", "doc", "docx", "xls", "xlsx", "json"];

/// The closed set of supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Pdf,
    Text,
    /// Legacy binary Word (OLE compound file).
    Doc,
    /// Office Open XML Word.
    Docx,
    /// Legacy binary Excel (BIFF8).
    Xls,
    /// Office Open XML Excel.
    Xlsx,
    Json,
}

impl Format {
    /// Resolve a format from a bare file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(Format::Pdf),
            "txt" => Some(Format::Text),
            "doc" => Some(Format::Doc),
            "docx" => Some(Format::Docx),
            "xls" => Some(Format::Xls),
            "xlsx" => Some(Format::Xlsx),
            "json" => Some(Format::Json),
            _ => None,
        }
    }

    /// Resolve a format from a filename, failing with the supported set
    /// listed in the message when the extension is unknown or missing.
    pub fn from_filename(filename: &str) -> ExtractResult<Self> {
        let extension = filename.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");

        Self::from_extension(extension).ok_or_else(|| ExtractError::UnsupportedFormat {
            extension: extension.to_string(),
        })
    }

    /// MIME type recorded in document metadata.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Format::Pdf => "application/pdf",
            Format::Text => "text/plain",
            Format::Doc => "application/msword",
            Format::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Format::Xls => "application/vnd.ms-excel",
            Format::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Format::Json => "application/json",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Pdf => "pdf",
            Format::Text => "text",
            Format::Doc => "doc",
            Format::Docx => "docx",
            Format::Xls => "xls",
            Format::Xlsx => "xlsx",
            Format::Json => "json",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Extracted document content.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Text with the original order of textual units (pages, paragraphs,
    /// rows) preserved.
    pub text: String,
    /// Format-specific counters (pages, sheets, rows, ...).
    pub metadata: Metadata,
}

impl Extraction {
    pub fn new(text: String) -> Self {
        Self {
            text,
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(mut self, key: &str, value: serde_json::Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }
}

/// Extract text from raw bytes declared to be of the given format.
///
/// Bytes that do not parse as the declared format fail with
/// [`ExtractError::Malformed`]; no partial text is returned without an
/// error.
pub fn extract(bytes: &[u8], format: Format) -> ExtractResult<Extraction> {
    match format {
        Format::Pdf => pdf::extract(bytes),
        Format::Text => text::extract(bytes),
        Format::Doc => word::extract_doc(bytes),
        Format::Docx => word::extract_docx(bytes),
        Format::Xls => excel::extract_xls(bytes),
        Format::Xlsx => excel::extract_xlsx(bytes),
        Format::Json => json::extract(bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(Format::from_extension("pdf"), Some(Format::Pdf));
        assert_eq!(Format::from_extension("PDF"), Some(Format::Pdf));
        assert_eq!(Format::from_extension("docx"), Some(Format::Docx));
        assert_eq!(Format::from_extension("xls"), Some(Format::Xls));
        assert_eq!(Format::from_extension("exe"), None);
    }

    #[test]
    fn test_format_from_filename() {
        assert_eq!(Format::from_filename("report.pdf").unwrap(), Format::Pdf);
        assert_eq!(Format::from_filename("a.b.json").unwrap(), Format::Json);

        let err = Format::from_filename("malware.exe").unwrap_err();
        assert!(matches!(
            err,
            ExtractError::UnsupportedFormat { ref extension } if extension == "exe"
        ));
        // The message should tell the caller what is supported
        assert!(err.to_string().contains("pdf"));
    }

    #[test]
    fn test_format_from_filename_without_extension() {
        assert!(Format::from_filename("README").is_err());
    }
}
