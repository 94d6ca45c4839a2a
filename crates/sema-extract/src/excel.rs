//! Excel extraction: OOXML `.xlsx` and legacy BIFF8 `.xls`.

use std::io::{Cursor, Read, Seek};

use calamine::{Data, Range, Reader, Xls, Xlsx};
use tracing::debug;

use crate::error::{ExtractError, ExtractResult};
use crate::Extraction;

/// Extract text from an `.xlsx` workbook.
pub fn extract_xlsx(bytes: &[u8]) -> ExtractResult<Extraction> {
    let workbook = Xlsx::new(Cursor::new(bytes))
        .map_err(|e| ExtractError::malformed(format!("not an xlsx workbook: {}", e)))?;
    extract_workbook(workbook)
}

/// Extract text from a legacy `.xls` workbook.
pub fn extract_xls(bytes: &[u8]) -> ExtractResult<Extraction> {
    let workbook = Xls::new(Cursor::new(bytes))
        .map_err(|e| ExtractError::malformed(format!("not an xls workbook: {}", e)))?;
    extract_workbook(workbook)
}

/// Concatenate every sheet in workbook order, cells row-major: TAB
/// between cells, newline between rows, a blank line between sheets.
/// A sheet that fails to parse fails the whole file; content is never
/// dropped silently.
fn extract_workbook<RS, R>(mut workbook: R) -> ExtractResult<Extraction>
where
    RS: Read + Seek,
    R: Reader<RS>,
    R::Error: std::fmt::Display,
{
    let sheet_names = workbook.sheet_names().to_owned();
    let mut sheets = Vec::with_capacity(sheet_names.len());
    let mut total_rows = 0usize;

    for name in &sheet_names {
        let range = workbook
            .worksheet_range(name)
            .map_err(|e| ExtractError::malformed(format!("sheet '{}' failed to parse: {}", name, e)))?;
        total_rows += range.height();
        sheets.push(render_range(&range));
    }

    debug!(
        "Extracted {} row(s) across {} sheet(s)",
        total_rows,
        sheet_names.len()
    );

    Ok(Extraction::new(sheets.join("\n\n"))
        .with_metadata("sheets", serde_json::json!(sheet_names.len()))
        .with_metadata("rows", serde_json::json!(total_rows)))
}

fn render_range(range: &Range<Data>) -> String {
    range
        .rows()
        .map(|row| {
            row.iter()
                .map(render_cell)
                .collect::<Vec<_>>()
                .join("\t")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_cell(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}
