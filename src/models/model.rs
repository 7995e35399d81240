//! Family dispatch for density evaluation and sampling.
//!
//! The fitter relies on a few primitive operations:
//! - log-density of one observation (for likelihoods)
//! - distribution function (for plots against the ECDF)
//! - random draws (for simulation studies)
//!
//! Parameters are passed as slices ordered as `Family::param_names()`.
//! Out-of-domain parameters yield `-inf` log-density rather than an error so
//! that these functions can serve directly as optimizer objectives.

use rand::Rng;

use crate::domain::{CdfGrid, Family, FittedModel};
use crate::error::DistError;
use crate::models::{exponential, gamma, two_step};

/// Log-density of a single observation.
pub fn ln_pdf(family: Family, params: &[f64], t: f64) -> f64 {
    if !family.params_in_domain(params) {
        return f64::NEG_INFINITY;
    }
    match family {
        Family::Exponential => exponential::ln_pdf(params[0], t),
        Family::Gamma => gamma::ln_pdf(params[0], params[1], t),
        Family::TwoStep => two_step::ln_pdf(params[0], params[1], t),
    }
}

pub fn pdf(family: Family, params: &[f64], t: f64) -> f64 {
    ln_pdf(family, params, t).exp()
}

/// Distribution function; `NaN` for out-of-domain parameters.
pub fn cdf(family: Family, params: &[f64], t: f64) -> f64 {
    if !family.params_in_domain(params) {
        return f64::NAN;
    }
    match family {
        Family::Exponential => exponential::cdf(params[0], t),
        Family::Gamma => gamma::cdf(params[0], params[1], t),
        Family::TwoStep => two_step::cdf(params[0], params[1], t),
    }
}

/// Sum of log-densities; no validation of the sample.
pub fn sum_ln_pdf(family: Family, params: &[f64], sample: &[f64]) -> f64 {
    if !family.params_in_domain(params) {
        return f64::NEG_INFINITY;
    }
    let mut total = 0.0;
    for &t in sample {
        total += ln_pdf(family, params, t);
        if total == f64::NEG_INFINITY {
            break;
        }
    }
    total
}

/// Draw `size` i.i.d. waiting times from `family` with `params`.
pub fn draw<R: Rng + ?Sized>(
    family: Family,
    params: &[f64],
    size: usize,
    rng: &mut R,
) -> Result<Vec<f64>, DistError> {
    family.check_param_len(params)?;
    if !family.params_in_domain(params) {
        return Err(DistError::parameter(format!(
            "{} parameters must be finite and > 0, got {params:?}",
            family.display_name()
        )));
    }
    match family {
        Family::Exponential => exponential::draw(params[0], size, rng),
        Family::Gamma => gamma::draw(params[0], params[1], size, rng),
        Family::TwoStep => two_step::draw(params[0], params[1], size, rng),
    }
}

/// Evaluate `cdf` on `n` evenly spaced points in `[0, t_max]`.
pub fn cdf_grid(family: Family, params: &[f64], t_max: f64, n: usize) -> (Vec<f64>, Vec<f64>) {
    let n = n.max(2);
    let t_max = if t_max.is_finite() && t_max > 0.0 { t_max } else { 1.0 };
    let mut ts = Vec::with_capacity(n);
    let mut ys = Vec::with_capacity(n);
    for i in 0..n {
        let u = i as f64 / (n as f64 - 1.0);
        let t = u * t_max;
        ts.push(t);
        ys.push(cdf(family, params, t));
    }
    (ts, ys)
}

/// CDF grid of a fitted model on `[0, t_max]`.
pub fn theoretical_cdf_grid(model: &FittedModel, t_max: f64, n: usize) -> CdfGrid {
    let (t, cdf) = cdf_grid(model.family, &model.params, t_max, n);
    CdfGrid { t, cdf }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn out_of_domain_parameters_are_not_errors() {
        assert_eq!(ln_pdf(Family::Gamma, &[-1.0, 1.0], 2.0), f64::NEG_INFINITY);
        assert_eq!(ln_pdf(Family::TwoStep, &[1.0], 2.0), f64::NEG_INFINITY);
        assert!(cdf(Family::Exponential, &[0.0], 1.0).is_nan());
        assert_eq!(sum_ln_pdf(Family::Exponential, &[f64::NAN], &[1.0]), f64::NEG_INFINITY);
    }

    #[test]
    fn sum_ln_pdf_short_circuits_impossible_observations() {
        // A zero observation is impossible under the two-step model.
        assert_eq!(
            sum_ln_pdf(Family::TwoStep, &[1.0, 2.0], &[1.0, 0.0, 3.0]),
            f64::NEG_INFINITY
        );
    }

    #[test]
    fn draw_validates_parameters() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            draw(Family::TwoStep, &[1.0], 3, &mut rng),
            Err(DistError::Parameter(_))
        ));
        assert!(matches!(
            draw(Family::Exponential, &[-2.0], 3, &mut rng),
            Err(DistError::Parameter(_))
        ));
        assert_eq!(draw(Family::Gamma, &[2.0, 0.5], 10, &mut rng).unwrap().len(), 10);
    }

    #[test]
    fn cdf_grid_spans_zero_to_max() {
        let (ts, ys) = cdf_grid(Family::Exponential, &[1.0], 5.0, 11);
        assert_eq!(ts.len(), 11);
        assert_eq!(ts[0], 0.0);
        assert!((ts[10] - 5.0).abs() < 1e-12);
        assert_eq!(ys[0], 0.0);
        for w in ys.windows(2) {
            assert!(w[1] >= w[0]);
        }
    }

    #[test]
    fn theoretical_grid_follows_fitted_model() {
        let model = FittedModel::new(Family::TwoStep, vec![0.5, 0.5], -1.0, 10, 0);
        let grid = theoretical_cdf_grid(&model, 10.0, 6);
        assert_eq!(grid.t.len(), 6);
        let expected = 1.0 - (-0.5f64 * 10.0).exp() * (1.0 + 0.5 * 10.0);
        assert!((grid.cdf[5] - expected).abs() < 1e-12);
    }
}
