//! Word document extraction: OOXML `.docx` and legacy binary `.doc`.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

use crate::error::{ExtractError, ExtractResult};
use crate::Extraction;

/// Extract text from a `.docx` file: a ZIP container whose main part is
/// `word/document.xml`. Paragraph order is preserved.
pub fn extract_docx(bytes: &[u8]) -> ExtractResult<Extraction> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractError::malformed(format!("not a docx container: {}", e)))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|_| ExtractError::malformed("docx container has no word/document.xml"))?
        .read_to_string(&mut xml)
        .map_err(|e| ExtractError::malformed(format!("unreadable word/document.xml: {}", e)))?;

    let paragraphs = parse_document_xml(&xml)?;
    let count = paragraphs.len();

    debug!("Extracted {} paragraph(s) from docx", count);

    Ok(Extraction::new(paragraphs.join("\n"))
        .with_metadata("paragraphs", serde_json::json!(count)))
}

/// Pull the text runs out of `word/document.xml`, one entry per `<w:p>`.
fn parse_document_xml(xml: &str) -> ExtractResult<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"t" => in_text_run = true,
            Ok(Event::End(e)) if e.local_name().as_ref() == b"t" => in_text_run = false,
            Ok(Event::End(e)) if e.local_name().as_ref() == b"p" => {
                paragraphs.push(std::mem::take(&mut current));
            }
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"tab" => current.push('\t'),
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"br" => current.push('\n'),
            Ok(Event::Text(t)) if in_text_run => {
                let run = t
                    .unescape()
                    .map_err(|e| ExtractError::malformed(format!("bad XML text run: {}", e)))?;
                current.push_str(&run);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(ExtractError::malformed(format!(
                    "invalid document.xml: {}",
                    e
                )))
            }
        }
    }

    if !current.is_empty() {
        paragraphs.push(current);
    }

    Ok(paragraphs)
}

// Word 97 FIB offsets in the WordDocument stream
const FIB_MAGIC: u16 = 0xA5EC;
const FIB_FLAGS_OFFSET: usize = 10;
const FIB_FC_MIN_OFFSET: usize = 24;
const FIB_FC_MAC_OFFSET: usize = 28;
const FLAG_COMPLEX: u16 = 0x0004;
const FLAG_EXT_CHAR: u16 = 0x1000;

/// Extract text from a legacy `.doc` file: an OLE compound file whose
/// `WordDocument` stream holds the text range described by the FIB.
///
/// Incrementally-saved (complex) files store text as scattered pieces; we
/// refuse them outright rather than return silently truncated content.
pub fn extract_doc(bytes: &[u8]) -> ExtractResult<Extraction> {
    let mut compound = cfb::CompoundFile::open(Cursor::new(bytes))
        .map_err(|e| ExtractError::malformed(format!("not an OLE compound file: {}", e)))?;

    let mut stream_data = Vec::new();
    compound
        .open_stream("WordDocument")
        .map_err(|_| ExtractError::malformed("compound file has no WordDocument stream"))?
        .read_to_end(&mut stream_data)
        .map_err(|e| ExtractError::malformed(format!("unreadable WordDocument stream: {}", e)))?;

    if stream_data.len() < FIB_FC_MAC_OFFSET + 4 {
        return Err(ExtractError::malformed("WordDocument stream is truncated"));
    }

    let ident = read_u16(&stream_data, 0);
    if ident != FIB_MAGIC {
        return Err(ExtractError::malformed(
            "WordDocument stream is not a Word binary file",
        ));
    }

    let flags = read_u16(&stream_data, FIB_FLAGS_OFFSET);
    if flags & FLAG_COMPLEX != 0 {
        return Err(ExtractError::malformed(
            "incrementally saved .doc files are not supported",
        ));
    }

    let fc_min = read_u32(&stream_data, FIB_FC_MIN_OFFSET) as usize;
    let fc_mac = read_u32(&stream_data, FIB_FC_MAC_OFFSET) as usize;
    if fc_min > fc_mac || fc_mac > stream_data.len() {
        return Err(ExtractError::malformed("text range exceeds stream bounds"));
    }

    let text_bytes = &stream_data[fc_min..fc_mac];
    let raw = if flags & FLAG_EXT_CHAR != 0 {
        decode_utf16_le(text_bytes)?
    } else {
        // 8-bit text; Latin-1 covers the common Windows-1252 subset
        text_bytes.iter().map(|&b| b as char).collect()
    };

    let content = normalize_control_chars(&raw);
    let paragraphs = content.lines().filter(|l| !l.is_empty()).count();

    debug!("Extracted {} character(s) from doc", content.len());

    Ok(Extraction::new(content).with_metadata("paragraphs", serde_json::json!(paragraphs)))
}

fn read_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

fn decode_utf16_le(bytes: &[u8]) -> ExtractResult<String> {
    if bytes.len() % 2 != 0 {
        return Err(ExtractError::malformed("odd-length UTF-16 text range"));
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    Ok(String::from_utf16_lossy(&units))
}

/// Word uses `\r` for paragraph marks, 0x0B for line breaks and 0x07 for
/// table cell marks; everything else non-printable is dropped.
fn normalize_control_chars(raw: &str) -> String {
    raw.chars()
        .filter_map(|c| match c {
            '\r' | '\x0B' => Some('\n'),
            '\x07' => Some('\t'),
            c if c.is_control() && c != '\n' && c != '\t' => None,
            c => Some(c),
        })
        .collect::<String>()
        .trim()
        .to_string()
}
