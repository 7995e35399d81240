//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON
//! - reloaded later for plotting or comparisons

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::DistError;

/// Candidate generative model for catastrophe times.
///
/// All rates are in inverse units of the observations (1/s for times in seconds).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Family {
    /// Single Poisson step: `t ~ Exp(beta)`.
    Exponential,
    /// `alpha` successive Poisson steps of equal rate `beta`.
    Gamma,
    /// Two successive Poisson steps with rates `beta1` and `beta2`.
    TwoStep,
}

impl Family {
    pub const ALL: [Family; 3] = [Family::Exponential, Family::Gamma, Family::TwoStep];

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            Family::Exponential => "Exponential",
            Family::Gamma => "Gamma",
            Family::TwoStep => "Two-step Poisson",
        }
    }

    /// Machine-readable key, as used on the command line and in JSON.
    ///
    /// Taken from the `ValueEnum` name, which shares kebab-case with serde.
    pub fn key(self) -> String {
        self.to_possible_value()
            .map(|v| v.get_name().to_string())
            .unwrap_or_else(|| format!("{self:?}"))
    }

    /// Parameter names, in the order used by every parameter vector.
    pub fn param_names(self) -> &'static [&'static str] {
        match self {
            Family::Exponential => &["beta"],
            Family::Gamma => &["alpha", "beta"],
            Family::TwoStep => &["beta1", "beta2"],
        }
    }

    pub fn param_count(self) -> usize {
        self.param_names().len()
    }

    /// Whether a zero observation has a finite, non-zero density.
    ///
    /// Gamma and TwoStep densities vanish (or diverge for `alpha < 1`) at zero,
    /// which makes the likelihood of a sample containing zeros degenerate.
    pub fn admits_zero(self) -> bool {
        matches!(self, Family::Exponential)
    }

    /// Check a parameter vector's length (not its domain).
    pub fn check_param_len(self, params: &[f64]) -> Result<(), DistError> {
        if params.len() != self.param_count() {
            return Err(DistError::parameter(format!(
                "{} expects {} parameter(s) ({}), got {}",
                self.display_name(),
                self.param_count(),
                self.param_names().join(", "),
                params.len()
            )));
        }
        Ok(())
    }

    /// Whether every parameter is finite and strictly positive.
    pub fn params_in_domain(self, params: &[f64]) -> bool {
        params.len() == self.param_count() && params.iter().all(|p| p.is_finite() && *p > 0.0)
    }
}

impl std::fmt::Display for Family {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A closed interval `[low, high]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub low: f64,
    pub high: f64,
}

impl Interval {
    pub fn contains(&self, x: f64) -> bool {
        self.low <= x && x <= self.high
    }

    pub fn width(&self) -> f64 {
        self.high - self.low
    }
}

/// Result of fitting one family to a sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    pub family: Family,
    /// Point estimates, ordered as [`Family::param_names`].
    pub params: Vec<f64>,
    pub log_likelihood: f64,
    /// Sample size the model was fitted on.
    pub n: usize,
    /// Akaike information criterion: `2k - 2 ln L`.
    pub aic: f64,
    /// Bayesian information criterion: `k ln n - 2 ln L`.
    pub bic: f64,
    /// Solver iterations (0 for closed-form estimates).
    pub iterations: usize,
    /// Asymptotic standard errors from the observed information, when invertible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub std_errors: Option<Vec<f64>>,
    /// Bootstrap percentile intervals keyed by parameter name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intervals: Option<BTreeMap<String, Interval>>,
}

impl FittedModel {
    pub fn new(family: Family, params: Vec<f64>, log_likelihood: f64, n: usize, iterations: usize) -> Self {
        let k = family.param_count() as f64;
        let n_f = n as f64;
        Self {
            family,
            params,
            log_likelihood,
            n,
            aic: 2.0 * k - 2.0 * log_likelihood,
            bic: k * n_f.ln() - 2.0 * log_likelihood,
            iterations,
            std_errors: None,
            intervals: None,
        }
    }

    /// Look up a parameter estimate by name.
    pub fn param(&self, name: &str) -> Option<f64> {
        self.family
            .param_names()
            .iter()
            .position(|p| *p == name)
            .and_then(|i| self.params.get(i).copied())
    }

    pub fn named_params(&self) -> Vec<(&'static str, f64)> {
        self.family
            .param_names()
            .iter()
            .copied()
            .zip(self.params.iter().copied())
            .collect()
    }

    /// Mean time to catastrophe implied by the fitted parameters.
    pub fn mean_time(&self) -> f64 {
        match self.family {
            Family::Exponential => 1.0 / self.params[0],
            Family::Gamma => self.params[0] / self.params[1],
            Family::TwoStep => 1.0 / self.params[0] + 1.0 / self.params[1],
        }
    }
}

/// Evaluated distribution function, for plotting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CdfGrid {
    pub t: Vec<f64>,
    pub cdf: Vec<f64>,
}

/// Portable JSON representation of a fit.
///
/// Holds the model, a precomputed CDF grid and (optionally) the sample's ECDF,
/// so a saved fit can be re-plotted without the original CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFile {
    pub tool: String,
    /// Data column (or condition) the model was fitted to.
    pub column: String,
    pub model: FittedModel,
    pub grid: CdfGrid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ecdf: Option<CdfGrid>,
}

/// Bootstrap resampling settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootstrapConfig {
    pub n_resamples: usize,
    /// Central coverage of the reported intervals, in `(0, 1)`.
    pub confidence_level: f64,
    /// Master seed; `None` draws one from OS entropy.
    pub seed: Option<u64>,
    /// Refit replicates on the rayon pool. Results do not depend on this flag.
    pub parallel: bool,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            n_resamples: 1000,
            confidence_level: 0.95,
            seed: None,
            parallel: false,
        }
    }
}

impl BootstrapConfig {
    pub fn validate(&self) -> Result<(), DistError> {
        if self.n_resamples < 1 {
            return Err(DistError::parameter("n_resamples must be >= 1"));
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(DistError::parameter(format!(
                "confidence_level must lie in (0, 1), got {}",
                self.confidence_level
            )));
        }
        Ok(())
    }
}

/// Row filter for tidy CSV inputs: keep rows where `column == value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFilter {
    pub column: String,
    pub value: String,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub csv_path: PathBuf,
    pub column: String,
    pub filter: Option<RowFilter>,
    pub families: Vec<Family>,
    pub bootstrap: Option<BootstrapConfig>,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_model: Option<PathBuf>,
    pub export_cdf: Option<PathBuf>,
}
