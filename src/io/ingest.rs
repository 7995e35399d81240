//! CSV ingest of catastrophe times.
//!
//! Two layouts are accepted:
//! - **wide**: one column per experimental condition; columns may have
//!   different lengths, so empty cells are skipped silently
//! - **tidy**: one value column plus label columns; `--where col=value`
//!   keeps the rows for one condition
//!
//! Design goals:
//! - **Strict schema** for the requested columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Separation of concerns**: no fitting logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, warn};

use crate::data::sample::Sample;
use crate::domain::{FitConfig, RowFilter};
use crate::error::AppError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: validated sample + bookkeeping.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub sample: Sample,
    pub column: String,
    pub rows_read: usize,
    pub rows_used: usize,
    pub row_errors: Vec<RowError>,
}

/// Load the sample described by `config` (path, column, optional filter).
pub fn load_sample(config: &FitConfig) -> Result<IngestedData, AppError> {
    load_column(&config.csv_path, &config.column, config.filter.as_ref())
}

/// Load one numeric column from a CSV file.
pub fn load_column(path: &Path, column: &str, filter: Option<&RowFilter>) -> Result<IngestedData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    let data = read_column(file, column, filter)?;
    debug!(
        path = %path.display(),
        column,
        rows_read = data.rows_read,
        rows_used = data.rows_used,
        row_errors = data.row_errors.len(),
        "csv ingested"
    );
    Ok(data)
}

/// Like [`load_column`], from any reader.
pub fn read_column<R: Read>(reader: R, column: &str, filter: Option<&RowFilter>) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let value_idx = resolve_column(&header_map, &headers, column)?;
    let filter_idx = match filter {
        Some(f) => Some((resolve_column(&header_map, &headers, &f.column)?, f.value.as_str())),
        None => None,
    };

    let mut values = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                let line = e.position().map_or(idx + 2, |p| p.line() as usize);
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };
        let line = record.position().map_or(idx + 2, |p| p.line() as usize);

        if let Some((fidx, wanted)) = filter_idx {
            if !matches_filter(record.get(fidx), wanted) {
                continue;
            }
        }

        match parse_cell(&record, value_idx) {
            Ok(Some(v)) => values.push(v),
            Ok(None) => {} // ragged column or blank cell
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if !row_errors.is_empty() {
        warn!(count = row_errors.len(), column, "skipped invalid rows");
    }

    let rows_used = values.len();
    if rows_used == 0 {
        let scope = match filter {
            Some(f) => format!(" where {}={}", f.column, f.value),
            None => String::new(),
        };
        return Err(AppError::new(
            3,
            format!("No valid values in column `{column}`{scope}."),
        ));
    }

    let sample = Sample::new(values).map_err(|e| AppError::new(3, format!("Invalid sample: {e}")))?;

    Ok(IngestedData {
        sample,
        column: column.to_string(),
        rows_read,
        rows_used,
        row_errors,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_lowercase()
}

fn resolve_column(
    header_map: &HashMap<String, usize>,
    headers: &StringRecord,
    column: &str,
) -> Result<usize, AppError> {
    if let Some(idx) = header_map.get(&normalize_header_name(column)) {
        return Ok(*idx);
    }
    let available: Vec<&str> = headers
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}'))
        .collect();
    Err(AppError::new(
        2,
        format!(
            "Missing column `{column}`. Available columns: {}",
            available.join(", ")
        ),
    ))
}

fn matches_filter(value: Option<&str>, wanted: &str) -> bool {
    let Some(value) = value else { return false };
    value.trim().eq_ignore_ascii_case(wanted.trim())
}

fn parse_cell(record: &StringRecord, idx: usize) -> Result<Option<f64>, String> {
    let Some(raw) = record.get(idx).map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    let v: f64 = raw
        .parse()
        .map_err(|_| format!("Invalid number '{raw}'."))?;
    if !v.is_finite() {
        return Err(format!("Non-finite value '{raw}'."));
    }
    if v < 0.0 {
        return Err(format!("Negative time '{raw}'."));
    }
    Ok(Some(v))
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDE: &str = "\u{feff}Labeled,Unlabeled\n\
                        # tubulin 12 uM\n\
                        470.0,25.0\n\
                        1415.0,\n\
                        x,55.0\n\
                        -3,80.0\n";

    const TIDY: &str = "condition,time to catastrophe (s)\n\
                        7 uM,510\n\
                        12 uM,620\n\
                        12 uM,845\n\
                        7 UM,90\n";

    #[test]
    fn wide_layout_skips_blank_cells_and_reports_bad_rows() {
        let data = read_column(WIDE.as_bytes(), "labeled", None).unwrap();
        assert_eq!(data.sample.values(), &[470.0, 1415.0]);
        assert_eq!(data.rows_read, 4);
        assert_eq!(data.rows_used, 2);
        assert_eq!(data.row_errors.len(), 2);
        assert!(data.row_errors[0].message.contains("Invalid number"));
        assert!(data.row_errors[1].message.contains("Negative"));

        let other = read_column(WIDE.as_bytes(), "Unlabeled", None).unwrap();
        assert_eq!(other.sample.values(), &[25.0, 55.0, 80.0]);
        assert!(other.row_errors.is_empty());
    }

    #[test]
    fn tidy_layout_filters_rows_case_insensitively() {
        let filter = RowFilter {
            column: "condition".to_string(),
            value: "7 uM".to_string(),
        };
        let data = read_column(TIDY.as_bytes(), "Time to catastrophe (s)", Some(&filter)).unwrap();
        assert_eq!(data.sample.values(), &[510.0, 90.0]);
        assert_eq!(data.rows_read, 4);
    }

    #[test]
    fn missing_columns_are_schema_errors() {
        let err = read_column(TIDY.as_bytes(), "seconds", None).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("Available columns"));

        let filter = RowFilter {
            column: "tubulin".to_string(),
            value: "7".to_string(),
        };
        let err = read_column(TIDY.as_bytes(), "condition", Some(&filter)).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn no_usable_values_is_exit_code_three() {
        let filter = RowFilter {
            column: "condition".to_string(),
            value: "14 uM".to_string(),
        };
        let err = read_column(TIDY.as_bytes(), "time to catastrophe (s)", Some(&filter)).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("times.csv");
        std::fs::write(&path, WIDE).unwrap();
        let data = load_column(&path, "unlabeled", None).unwrap();
        assert_eq!(data.rows_used, 3);

        let err = load_column(&dir.path().join("missing.csv"), "x", None).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
