//! CSV exports.
//!
//! - ECDF vs fitted CDF, one row per distinct observed time
//! - simulated samples, one value per row
//!
//! Both are meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::Family;
use crate::error::AppError;
use crate::report::CdfResidual;

/// Write `t,ecdf,model_cdf,residual,family` rows to a CSV file.
pub fn write_cdf_csv(path: &Path, residuals: &[CdfResidual], family: Family) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut out = BufWriter::new(file);
    write_cdf_rows(&mut out, residuals, family)?;
    out.flush()
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV: {e}")))
}

pub fn write_cdf_rows<W: Write>(out: &mut W, residuals: &[CdfResidual], family: Family) -> Result<(), AppError> {
    writeln!(out, "t,ecdf,model_cdf,residual,family")
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    let family = family.key();
    for r in residuals {
        writeln!(
            out,
            "{},{:.10},{:.10},{:.10},{family}",
            r.t, r.ecdf, r.model_cdf, r.residual
        )
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

/// Write a single-column CSV of `values` under header `column`.
pub fn write_sample_csv<W: Write>(out: W, column: &str, values: &[f64]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record([column])
        .map_err(|e| AppError::new(2, format!("Failed to write sample CSV header: {e}")))?;
    for v in values {
        writer
            .write_record([v.to_string()])
            .map_err(|e| AppError::new(2, format!("Failed to write sample CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to write sample CSV: {e}")))
}
