//! Tabular readers: delimited text through `csv`, workbooks through `calamine`.
//!
//! Rows are rendered one per line with cells separated by `" | "`.

use calamine::{Reader, Xls, Xlsx};
use std::fmt::Display;
use std::io::{Cursor, Read, Seek};

use super::ExtractionError;

const CELL_SEPARATOR: &str = " | ";

/// Render every CSV record; malformed records are skipped.
pub(super) fn extract_csv(bytes: &[u8]) -> String {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut lines = Vec::new();
    for (index, record) in reader.byte_records().enumerate() {
        match record {
            Ok(record) => {
                let cells: Vec<String> = record
                    .iter()
                    .map(|cell| String::from_utf8_lossy(cell).trim().to_string())
                    .collect();
                if cells.iter().any(|cell| !cell.is_empty()) {
                    lines.push(cells.join(CELL_SEPARATOR));
                }
            }
            Err(error) => {
                tracing::debug!(row = index + 1, error = %error, "Skipping malformed CSV record");
            }
        }
    }
    lines.join("\n")
}

/// Render every sheet of a legacy `.xls` workbook.
pub(super) fn extract_xls(bytes: &[u8]) -> Result<String, ExtractionError> {
    let workbook: Xls<_> = Xls::new(Cursor::new(bytes))
        .map_err(|error| ExtractionError::Spreadsheet(error.to_string()))?;
    Ok(render_workbook(workbook))
}

/// Render every sheet of an `.xlsx` workbook.
pub(super) fn extract_xlsx(bytes: &[u8]) -> Result<String, ExtractionError> {
    let workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
        .map_err(|error| ExtractionError::Spreadsheet(error.to_string()))?;
    Ok(render_workbook(workbook))
}

fn render_workbook<RS, W>(mut workbook: W) -> String
where
    RS: Read + Seek,
    W: Reader<RS>,
    W::Error: Display,
{
    let mut output = String::new();
    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();

    for sheet_name in &sheet_names {
        match workbook.worksheet_range(sheet_name) {
            Ok(range) => {
                output.push_str(&format!("=== Sheet: {sheet_name} ===\n"));
                for row in range.rows() {
                    let cells: Vec<String> = row
                        .iter()
                        .map(|cell| cell.to_string())
                        .filter(|cell| !cell.is_empty())
                        .collect();
                    if !cells.is_empty() {
                        output.push_str(&cells.join(CELL_SEPARATOR));
                        output.push('\n');
                    }
                }
            }
            Err(error) => {
                tracing::debug!(sheet = %sheet_name, error = %error, "Skipping unreadable sheet");
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_rows_render_as_pipe_separated_lines() {
        let text = extract_csv(b"name,score\nAda,10\nGrace,12\n");
        assert_eq!(text, "name | score\nAda | 10\nGrace | 12");
    }

    #[test]
    fn csv_tolerates_ragged_rows_and_blank_lines() {
        let text = extract_csv(b"a,b,c\n\nonly-one\n1,2\n");
        assert_eq!(text, "a | b | c\nonly-one\n1 | 2");
    }

    #[test]
    fn workbooks_reject_garbage() {
        assert!(matches!(
            extract_xlsx(b"definitely not a workbook"),
            Err(ExtractionError::Spreadsheet(_))
        ));
        assert!(matches!(
            extract_xls(b"definitely not a workbook"),
            Err(ExtractionError::Spreadsheet(_))
        ));
    }
}
