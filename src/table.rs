use crate::error::AppError;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Cursor;

/// Maximum accepted upload size (10MB)
///
/// This mirrors the client-side ceiling; the check is advisory and the
/// parsed data is still treated as untrusted.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// A single cell value from a parsed spreadsheet
///
/// Cells are either text or numbers; an absent cell is represented by an
/// empty string so that every row mapping carries an entry for every header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Numeric cell (integers are widened to f64)
    Number(f64),

    /// Text cell; the empty string stands in for a missing cell
    Text(String),
}

impl CellValue {
    /// The value used for cells a short physical row did not supply
    pub fn empty() -> Self {
        CellValue::Text(String::new())
    }

    /// True for the empty-string placeholder
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Text(s) if s.is_empty())
    }

    /// Human-readable rendition, used for labels and prompt text
    pub fn display(&self) -> String {
        match self {
            CellValue::Number(n) => format_number(*n),
            CellValue::Text(s) => s.clone(),
        }
    }
}

/// Format a float the way a spreadsheet shows it: no trailing ".0" on integers
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// In-memory tabular model of the first worksheet of an uploaded workbook
///
/// The first physical row becomes the header list verbatim (no trimming, no
/// deduplication; duplicate headers silently overwrite row-mapping keys).
/// Every following row becomes a mapping from header to cell value; short
/// rows are padded with empty strings so every mapping covers every header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadsheetTable {
    /// Header names in sheet order
    pub headers: Vec<String>,

    /// One mapping per data row, in sheet order
    pub rows: Vec<HashMap<String, CellValue>>,
}

impl SpreadsheetTable {
    /// Parse an Excel workbook buffer into a tabular model
    ///
    /// Only the first worksheet is read; later sheets in a multi-sheet
    /// workbook are silently ignored. Parsing the same buffer repeatedly is
    /// side-effect free.
    ///
    /// # Arguments
    /// * `buffer` - Raw bytes of an `.xlsx`/`.xls` file
    ///
    /// # Returns
    /// * `Result<SpreadsheetTable, AppError>` - The parsed model or a `Parse` error
    ///
    /// # Errors
    /// * `AppError::Parse` when the buffer is not a readable workbook, the
    ///   workbook has no worksheets, or the first worksheet has zero rows
    ///   (a header row with no data rows is *not* an error)
    pub fn from_xlsx(buffer: &[u8]) -> Result<Self, AppError> {
        let cursor = Cursor::new(buffer.to_vec());
        let mut workbook = open_workbook_auto_from_rs(cursor)
            .map_err(|_| AppError::Parse("Failed to parse Excel file.".to_string()))?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| AppError::Parse("No sheets found in Excel file".to_string()))?;

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|_| AppError::Parse("Failed to parse Excel file.".to_string()))?;

        let mut rows_iter = range.rows();
        let header_row = rows_iter
            .next()
            .ok_or_else(|| AppError::Parse("Empty or invalid Excel file.".to_string()))?;

        let headers: Vec<String> = header_row.iter().map(data_to_string).collect();

        let mut rows = Vec::new();
        for physical_row in rows_iter {
            let mut mapping = HashMap::with_capacity(headers.len());
            for (i, header) in headers.iter().enumerate() {
                let value = physical_row
                    .get(i)
                    .map(data_to_cell)
                    .unwrap_or_else(CellValue::empty);
                mapping.insert(header.clone(), value);
            }
            rows.push(mapping);
        }

        Ok(SpreadsheetTable { headers, rows })
    }

    /// Number of data rows (header excluded)
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// True when the table has a header for `name`
    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    /// Cell value for `header` in row `index`, if present
    pub fn cell(&self, index: usize, header: &str) -> Option<&CellValue> {
        self.rows.get(index).and_then(|row| row.get(header))
    }
}

/// Advisory validation of an upload before parsing
///
/// Matches the client-side rules: `.xlsx`/`.xls` only and a 10MB ceiling.
/// Callers must still treat the parsed content as untrusted.
pub fn validate_upload(filename: &str, size: usize) -> Result<(), AppError> {
    let lower = filename.to_lowercase();
    if !lower.ends_with(".xlsx") && !lower.ends_with(".xls") {
        return Err(AppError::Validation(
            "Please upload a valid Excel file (.xlsx or .xls)".to_string(),
        ));
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(AppError::Validation(
            "File size must be less than 10MB".to_string(),
        ));
    }
    Ok(())
}

fn data_to_cell(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) | Data::Empty => CellValue::empty(),
    }
}

fn data_to_string(data: &Data) -> String {
    match data {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_number(*f),
        Data::Bool(b) => b.to_string(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}
