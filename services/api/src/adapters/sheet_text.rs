//! services/api/src/adapters/sheet_text.rs
//!
//! Spreadsheet text extraction (`xls`, `xlsx`), backed by `calamine`.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use doc_summarizer_core::ports::{PortError, PortResult};

/// Flattens every sheet into one line: cells joined with `,`, rows joined
/// with a space. Sheets without rows are skipped.
pub fn extract_sheet_text(data: &[u8]) -> PortResult<String> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(data.to_vec()))
        .map_err(|e| PortError::Extraction(format!("Spreadsheet could not be read: {}", e)))?;

    let mut text = String::new();
    for sheet_name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&sheet_name).map_err(|e| {
            PortError::Extraction(format!("Sheet '{}' could not be read: {}", sheet_name, e))
        })?;

        let rows: Vec<String> = range.rows().map(join_cells).collect();
        if rows.is_empty() {
            continue;
        }
        text.push_str(&rows.join(" "));
        text.push('\n');
    }
    Ok(text)
}

fn join_cells(row: &[Data]) -> String {
    row.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
