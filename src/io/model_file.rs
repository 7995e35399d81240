//! Read/write model JSON files.
//!
//! A model file is the portable representation of a fit:
//! - family + parameters (+ intervals when bootstrapped)
//! - likelihood and information criteria
//! - a precomputed CDF grid and the sample ECDF for quick plotting
//!
//! The schema is defined by `domain::ModelFile`.

use std::fs::File;
use std::path::Path;

use crate::domain::{CdfGrid, FittedModel, ModelFile};
use crate::error::AppError;
use crate::math::stats::ecdf;
use crate::models::theoretical_cdf_grid;

/// Points in the saved CDF grid.
const GRID_POINTS: usize = 201;

/// Build the file contents for `model` fitted to `sample`.
pub fn model_file(model: &FittedModel, column: &str, sample: &[f64]) -> ModelFile {
    let t_max = sample.iter().copied().fold(0.0, f64::max);
    // Without data, cover a few mean waiting times.
    let t_max = if t_max > 0.0 { t_max } else { 4.0 * model.mean_time() };

    ModelFile {
        tool: "mtc".to_string(),
        column: column.to_string(),
        model: model.clone(),
        grid: theoretical_cdf_grid(model, t_max, GRID_POINTS),
        ecdf: ecdf(sample).map(|(t, cdf)| CdfGrid { t, cdf }),
    }
}

/// Write a model JSON file.
pub fn write_model_json(path: &Path, file: &ModelFile) -> Result<(), AppError> {
    let out = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create model JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(out, file)
        .map_err(|e| AppError::new(2, format!("Failed to write model JSON: {e}")))?;
    Ok(())
}

/// Read a model JSON file, checking the parameter vector matches the family.
pub fn read_model_json(path: &Path) -> Result<ModelFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open model JSON '{}': {e}", path.display())))?;
    let parsed: ModelFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid model JSON: {e}")))?;
    parsed.model.family.check_param_len(&parsed.model.params)?;
    if parsed.grid.t.len() != parsed.grid.cdf.len() {
        return Err(AppError::new(2, "Invalid model JSON: grid `t` and `cdf` lengths differ."));
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Family;

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let model = FittedModel::new(Family::TwoStep, vec![0.003, 0.007], -512.0, 80, 31);
        let file = model_file(&model, "labeled", &[120.0, 300.0, 300.0, 950.0]);
        assert_eq!(file.grid.t.len(), GRID_POINTS);
        assert_eq!(file.grid.t.last().copied(), Some(950.0));
        assert_eq!(file.ecdf.as_ref().map(|e| e.t.len()), Some(3));

        write_model_json(&path, &file).unwrap();
        let back = read_model_json(&path).unwrap();
        assert_eq!(back.model.family, Family::TwoStep);
        assert_eq!(back.column, "labeled");
        assert_eq!(back.grid.cdf.len(), GRID_POINTS);
        for (a, b) in back.model.params.iter().zip(&model.params) {
            assert!((a - b).abs() <= 1e-15 * b.abs());
        }
    }

    #[test]
    fn rejects_mismatched_parameters() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        let model = FittedModel::new(Family::Exponential, vec![0.01], -10.0, 5, 0);
        let mut file = model_file(&model, "t", &[10.0, 20.0]);
        file.model.family = Family::Gamma;
        write_model_json(&path, &file).unwrap();
        assert_eq!(read_model_json(&path).unwrap_err().exit_code(), 2);

        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(read_model_json(&path).unwrap_err().exit_code(), 2);
    }
}
