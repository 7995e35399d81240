//! Shared "fit pipeline" logic used by the `fit` and `compare` commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! CSV ingest -> fit / compare -> bootstrap -> ECDF residuals
//!
//! The command handlers can then focus on presentation (printing and exports).

use tracing::info;

use crate::domain::{FitConfig, FittedModel};
use crate::error::AppError;
use crate::fit::bootstrap::{BootstrapResult, bootstrap_confidence_interval};
use crate::fit::selection::{Comparison, compare};
use crate::io::ingest::{IngestedData, load_sample};
use crate::report::{CdfResidual, cdf_residuals, ks_distance};

/// All computed outputs of a single `mtc fit` / `mtc compare` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedData,
    /// The fitted model (the chosen one when several families were compared).
    pub model: FittedModel,
    pub comparison: Option<Comparison>,
    pub bootstrap: Option<BootstrapResult>,
    pub residuals: Vec<CdfResidual>,
    pub ks: f64,
}

/// Execute the full pipeline and return the computed outputs.
///
/// One requested family is fitted directly; several are compared and the
/// preferred one becomes `model`.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput, AppError> {
    // 1) Load and validate the sample.
    let ingest = load_sample(config)?;
    info!(column = %ingest.column, n = ingest.rows_used, "sample loaded");

    run_fit_with_sample(config, ingest)
}

/// Execute the pipeline on an already-ingested sample.
pub fn run_fit_with_sample(config: &FitConfig, ingest: IngestedData) -> Result<RunOutput, AppError> {
    let sample = ingest.sample.values();

    // 2) Fit the requested family, or compare several.
    let (mut model, comparison) = match config.families.as_slice() {
        [] => return Err(AppError::new(2, "No model family requested.")),
        [family] => (crate::fit::mle::fit(sample, *family)?, None),
        families => {
            let cmp = compare(sample, families)?;
            let best = cmp
                .best_fit()
                .cloned()
                .ok_or_else(|| AppError::new(4, "Model comparison produced no chosen fit."))?;
            (best, Some(cmp))
        }
    };
    info!(family = %model.family, log_likelihood = model.log_likelihood, "model fitted");

    // 3) Optional bootstrap intervals for the fitted family.
    let bootstrap = match &config.bootstrap {
        Some(bcfg) => {
            let result = bootstrap_confidence_interval(sample, model.family, bcfg)?;
            info!(
                converged = result.n_converged,
                requested = result.n_requested,
                "bootstrap finished"
            );
            model.intervals = Some(result.intervals.clone());
            Some(result)
        }
        None => None,
    };

    // 4) Goodness of fit against the ECDF.
    let residuals = cdf_residuals(sample, &model)?;
    let ks = ks_distance(&residuals);

    Ok(RunOutput {
        ingest,
        model,
        comparison,
        bootstrap,
        residuals,
        ks,
    })
}
