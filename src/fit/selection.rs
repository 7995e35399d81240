//! Model comparison across families using AIC with guardrails.
//!
//! The tool fits each requested family and computes:
//! - log-likelihood, AIC = 2k - 2 ln L, BIC = k ln n - 2 ln L
//! - Akaike weights
//! - likelihood-ratio statistics against the single-step (Exponential) model
//!
//! Selection rules:
//! 1. Families that fail to fit are recorded as skipped, not fatal
//! 2. Choose the family with minimum AIC
//! 3. If ΔAIC < 2 between the best and a simpler family, pick the simpler family

use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF};
use tracing::{info, warn};

use crate::data::sample::validate;
use crate::domain::{Family, FittedModel};
use crate::error::DistError;
use crate::fit::mle::fit;

/// Preference margin for simpler models, in AIC units.
const AIC_MARGIN: f64 = 2.0;

/// Likelihood-ratio test of `null` nested in `alternative`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LikelihoodRatio {
    pub null: Family,
    pub alternative: Family,
    /// `2 (ln L_alt - ln L_null)`, floored at zero.
    pub statistic: f64,
    pub df: usize,
    /// Asymptotic chi-squared p-value. For Exponential inside TwoStep the null
    /// sits on the parameter boundary (one rate → ∞), where this is conservative.
    pub p_value: f64,
}

/// Output of fitting + selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    /// Fits for all families that converged, in request order.
    pub fits: Vec<FittedModel>,
    /// Akaike weights aligned with `fits`.
    pub akaike_weights: Vec<f64>,
    pub best: Family,
    /// Families that were skipped and why (for diagnostics).
    pub skipped: Vec<(Family, String)>,
    pub likelihood_ratios: Vec<LikelihoodRatio>,
}

impl Comparison {
    pub fn best_fit(&self) -> Option<&FittedModel> {
        self.fits.iter().find(|f| f.family == self.best)
    }

    pub fn get(&self, family: Family) -> Option<&FittedModel> {
        self.fits.iter().find(|f| f.family == family)
    }
}

/// Fit every family in `families` and select the preferred one.
///
/// # Errors
///
/// [`DistError::InvalidInput`] for an invalid sample, or
/// [`DistError::Estimation`] if no family could be fitted.
pub fn compare(sample: &[f64], families: &[Family]) -> Result<Comparison, DistError> {
    validate(sample)?;
    if families.is_empty() {
        return Err(DistError::parameter("no families to compare"));
    }

    let mut fits = Vec::new();
    let mut skipped = Vec::new();

    for &family in families {
        if fits.iter().any(|f: &FittedModel| f.family == family) {
            continue;
        }
        match fit(sample, family) {
            Ok(model) => fits.push(model),
            Err(e) => {
                warn!(family = %family, error = %e, "family skipped");
                skipped.push((family, e.to_string()));
            }
        }
    }

    if fits.is_empty() {
        return Err(DistError::estimation(
            "no candidate family could be fitted to the sample",
        ));
    }

    let best = select_by_aic(&fits);
    let akaike_weights = akaike_weights(&fits);
    let likelihood_ratios = likelihood_ratios(&fits)?;

    info!(best = %best, fitted = fits.len(), skipped = skipped.len(), "model comparison finished");

    Ok(Comparison {
        fits,
        akaike_weights,
        best,
        skipped,
        likelihood_ratios,
    })
}

fn select_by_aic(fits: &[FittedModel]) -> Family {
    let mut best = &fits[0];
    for f in &fits[1..] {
        if f.aic < best.aic {
            best = f;
        }
    }

    let best_aic = best.aic;

    // Iterate in order of increasing complexity and pick the first fit that
    // is "close enough" to the best.
    let mut order: Vec<&FittedModel> = fits.iter().collect();
    order.sort_by_key(|f| (f.family.param_count(), f.family));
    for f in order {
        if f.aic <= best_aic + AIC_MARGIN {
            return f.family;
        }
    }

    best.family
}

fn akaike_weights(fits: &[FittedModel]) -> Vec<f64> {
    let min_aic = fits.iter().map(|f| f.aic).fold(f64::INFINITY, f64::min);
    let raw: Vec<f64> = fits.iter().map(|f| (-(f.aic - min_aic) / 2.0).exp()).collect();
    let total: f64 = raw.iter().sum();
    raw.into_iter().map(|w| w / total).collect()
}

fn likelihood_ratios(fits: &[FittedModel]) -> Result<Vec<LikelihoodRatio>, DistError> {
    let Some(null) = fits.iter().find(|f| f.family == Family::Exponential) else {
        return Ok(Vec::new());
    };

    let mut out = Vec::new();
    for alt in fits.iter().filter(|f| f.family != Family::Exponential) {
        let df = alt.family.param_count() - null.family.param_count();
        let statistic = (2.0 * (alt.log_likelihood - null.log_likelihood)).max(0.0);
        let chi2 = ChiSquared::new(df as f64)
            .map_err(|e| DistError::parameter(format!("chi-squared df={df}: {e}")))?;
        let p_value = (1.0 - chi2.cdf(statistic)).clamp(0.0, 1.0);
        out.push(LikelihoodRatio {
            null: null.family,
            alternative: alt.family,
            statistic,
            df,
            p_value,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::draw;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn fake(family: Family, aic: f64) -> FittedModel {
        let mut m = FittedModel::new(family, vec![1.0; family.param_count()], 0.0, 10, 0);
        m.aic = aic;
        m
    }

    #[test]
    fn prefers_simpler_model_within_margin() {
        let fits = vec![fake(Family::Exponential, 101.0), fake(Family::Gamma, 100.0)];
        assert_eq!(select_by_aic(&fits), Family::Exponential);

        let fits = vec![fake(Family::Exponential, 110.0), fake(Family::Gamma, 100.0)];
        assert_eq!(select_by_aic(&fits), Family::Gamma);
    }

    #[test]
    fn akaike_weights_sum_to_one() {
        let fits = vec![
            fake(Family::Exponential, 110.0),
            fake(Family::Gamma, 100.0),
            fake(Family::TwoStep, 101.0),
        ];
        let w = akaike_weights(&fits);
        assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(w[1] > w[2] && w[2] > w[0]);
    }

    #[test]
    fn two_step_data_prefers_multi_step_models() {
        let mut rng = StdRng::seed_from_u64(99);
        let data = draw(Family::TwoStep, &[0.004, 0.006], 1_000, &mut rng).unwrap();
        let cmp = compare(&data, &Family::ALL).unwrap();

        let exp = cmp.get(Family::Exponential).unwrap();
        let two = cmp.get(Family::TwoStep).unwrap();
        assert!(two.log_likelihood > exp.log_likelihood);
        assert_ne!(cmp.best, Family::Exponential);
        assert!(cmp.skipped.is_empty());

        let lr = cmp
            .likelihood_ratios
            .iter()
            .find(|lr| lr.alternative == Family::TwoStep)
            .unwrap();
        assert_eq!(lr.df, 1);
        assert!(lr.p_value < 1e-6, "p = {}", lr.p_value);
    }

    #[test]
    fn zeros_skip_families_without_support_at_zero() {
        let data = [0.0, 12.0, 30.0, 41.0, 75.0, 120.0];
        let cmp = compare(&data, &Family::ALL).unwrap();
        assert_eq!(cmp.fits.len(), 1);
        assert_eq!(cmp.best, Family::Exponential);
        assert_eq!(cmp.skipped.len(), 2);
        assert!(cmp.likelihood_ratios.is_empty());
    }

    #[test]
    fn nothing_fitted_is_an_estimation_error() {
        assert!(matches!(
            compare(&[0.0, 0.0], &[Family::Gamma, Family::TwoStep]),
            Err(DistError::Estimation(_))
        ));
        assert!(matches!(compare(&[1.0], &[]), Err(DistError::Parameter(_))));
        assert!(matches!(compare(&[], &Family::ALL), Err(DistError::InvalidInput(_))));
    }
}
