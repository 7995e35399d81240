//! Nonparametric bootstrap confidence intervals for MLE parameters.
//!
//! Each replicate draws `n` observations with replacement, refits the family,
//! and records the parameter vector. Intervals are the empirical percentiles
//! of the replicate estimates.
//!
//! Reproducibility: a master `StdRng` (seeded from `BootstrapConfig::seed`, or
//! OS entropy) draws one seed per replicate up front. Replicate `i` always sees
//! the same resample for a given master seed, whether replicates run
//! sequentially or on the rayon pool.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{BootstrapConfig, Family, FittedModel, Interval};
use crate::error::DistError;
use crate::fit::mle::{estimate, fit, validate_for_family};
use crate::math::stats::{percentile_sorted, sorted};

/// Bootstrap output for one family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootstrapResult {
    pub family: Family,
    pub confidence_level: f64,
    /// Percentile interval per parameter name.
    pub intervals: BTreeMap<String, Interval>,
    pub n_requested: usize,
    /// Replicates whose refit succeeded; intervals are computed from these.
    pub n_converged: usize,
    /// Parameter vectors of the converged replicates, in replicate order.
    pub replicates: Vec<Vec<f64>>,
}

impl BootstrapResult {
    pub fn n_failed(&self) -> usize {
        self.n_requested - self.n_converged
    }
}

/// Percentile bootstrap intervals for every parameter of `family`.
///
/// # Errors
///
/// - [`DistError::Parameter`] if `n_resamples < 1` or `confidence_level` is
///   not in `(0, 1)`.
/// - [`DistError::InvalidInput`] for an invalid sample.
/// - [`DistError::Estimation`] if no replicate could be refitted.
pub fn bootstrap_confidence_interval(
    sample: &[f64],
    family: Family,
    config: &BootstrapConfig,
) -> Result<BootstrapResult, DistError> {
    config.validate()?;
    validate_for_family(sample, family)?;

    let mut master = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let seeds: Vec<u64> = (0..config.n_resamples).map(|_| master.next_u64()).collect();

    let replicate = |seed: &u64| -> Result<Vec<f64>, DistError> {
        let mut rng = StdRng::seed_from_u64(*seed);
        let resampled = resample(sample, &mut rng);
        estimate(&resampled, family).map(|m| m.params)
    };

    let outcomes: Vec<Result<Vec<f64>, DistError>> = if config.parallel {
        seeds.par_iter().map(replicate).collect()
    } else {
        seeds.iter().map(replicate).collect()
    };

    let mut replicates = Vec::with_capacity(outcomes.len());
    let mut first_error = None;
    for outcome in outcomes {
        match outcome {
            Ok(params) => replicates.push(params),
            Err(e) => {
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }

    let n_failed = config.n_resamples - replicates.len();
    if replicates.is_empty() {
        let reason = first_error.map(|e| e.to_string()).unwrap_or_default();
        return Err(DistError::estimation(format!(
            "none of {} bootstrap replicates converged ({reason})",
            config.n_resamples
        )));
    }
    if let Some(e) = &first_error {
        warn!(
            family = %family,
            failed = n_failed,
            requested = config.n_resamples,
            first_error = %e,
            "some bootstrap replicates failed to converge"
        );
    }

    let intervals = percentile_intervals(family, &replicates, config.confidence_level)?;
    debug!(family = %family, converged = replicates.len(), ?intervals, "bootstrap finished");

    Ok(BootstrapResult {
        family,
        confidence_level: config.confidence_level,
        intervals,
        n_requested: config.n_resamples,
        n_converged: replicates.len(),
        replicates,
    })
}

/// Fit `family` and attach bootstrap intervals to the returned model.
pub fn fit_with_intervals(
    sample: &[f64],
    family: Family,
    config: &BootstrapConfig,
) -> Result<FittedModel, DistError> {
    config.validate()?;
    let mut model = fit(sample, family)?;
    let boot = bootstrap_confidence_interval(sample, family, config)?;
    model.intervals = Some(boot.intervals);
    Ok(model)
}

/// Draw `sample.len()` observations with replacement.
pub fn resample<R: Rng + ?Sized>(sample: &[f64], rng: &mut R) -> Vec<f64> {
    let n = sample.len();
    (0..n).map(|_| sample[rng.gen_range(0..n)]).collect()
}

fn percentile_intervals(
    family: Family,
    replicates: &[Vec<f64>],
    confidence_level: f64,
) -> Result<BTreeMap<String, Interval>, DistError> {
    let tail = (1.0 - confidence_level) / 2.0;
    let mut out = BTreeMap::new();
    for (i, name) in family.param_names().iter().enumerate() {
        let column: Vec<f64> = replicates.iter().map(|p| p[i]).collect();
        let column = sorted(&column);
        let low = percentile_sorted(&column, tail);
        let high = percentile_sorted(&column, 1.0 - tail);
        let (Some(low), Some(high)) = (low, high) else {
            return Err(DistError::estimation(format!(
                "could not compute percentile interval for {name}"
            )));
        };
        out.insert((*name).to_string(), Interval { low, high });
    }
    Ok(out)
}
