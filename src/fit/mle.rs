//! Maximum-likelihood estimation for a single family.
//!
//! - Exponential: closed form, `beta = 1 / mean`.
//! - Gamma: profile likelihood in the shape. Eliminating the rate
//!   (`beta = alpha / mean`) leaves
//!
//!   ```text
//!   g(alpha) = ln(alpha) - digamma(alpha) - (ln(mean) - mean(ln t)) = 0
//!   ```
//!
//!   which is strictly decreasing in `alpha` and is solved by Newton–Raphson
//!   from Minka's closed-form approximation.
//! - Two-step: no closed form. A log-spaced grid of rate pairs picks the start
//!   and Nelder–Mead refines in log-parameter space.

use nalgebra::DVector;
use tracing::debug;

use crate::data::sample::validate;
use crate::domain::{Family, FittedModel};
use crate::error::DistError;
use crate::fit::grid::{best_grid_point, rate_grid_two_step};
use crate::math::optimize::{NelderMeadOptions, nelder_mead, numerical_hessian, standard_errors};
use crate::math::special::{digamma, trigamma};
use crate::math::stats;
use crate::models::sum_ln_pdf;

/// Maximum Newton-Raphson iterations for the Gamma shape.
const GAMMA_MAX_ITER: usize = 100;

/// Relative convergence tolerance for the Gamma shape.
const GAMMA_TOL: f64 = 1e-12;

/// Grid points per rate for the two-step starting grid.
const TWO_STEP_GRID_STEPS: usize = 24;

/// Two-step rates are searched within `e^±LN_RATE_BOUND` of `1 / mean`.
const LN_RATE_BOUND: f64 = 30.0;

/// Fit `family` to `sample` by maximum likelihood.
///
/// # Errors
///
/// - [`DistError::InvalidInput`] for an empty sample, negative or non-finite
///   values, or zeros when the family has no density at zero (Gamma, TwoStep).
/// - [`DistError::Estimation`] when the estimate is degenerate (zero mean,
///   zero spread, a mean too large or too small to invert) or the optimizer
///   does not converge.
pub fn fit(sample: &[f64], family: Family) -> Result<FittedModel, DistError> {
    validate_for_family(sample, family)?;

    let mut model = estimate(sample, family)?;
    model.std_errors = observed_standard_errors(sample, family, &model.params);

    debug!(
        family = %family,
        n = model.n,
        params = ?model.params,
        log_likelihood = model.log_likelihood,
        iterations = model.iterations,
        "fit converged"
    );
    Ok(model)
}

/// Log-likelihood of `sample` under `family` with `params`.
///
/// Deterministic. Parameters outside the family domain (non-positive or
/// non-finite) give `-inf`; a wrong number of parameters is an error.
pub fn log_likelihood(sample: &[f64], family: Family, params: &[f64]) -> Result<f64, DistError> {
    validate(sample)?;
    family.check_param_len(params)?;
    Ok(sum_ln_pdf(family, params, sample))
}

/// Sample checks shared by every fitting entry point.
pub fn validate_for_family(sample: &[f64], family: Family) -> Result<(), DistError> {
    validate(sample)?;
    if !family.admits_zero() {
        let zeros = sample.iter().filter(|t| **t == 0.0).count();
        if zeros > 0 {
            return Err(DistError::invalid_input(format!(
                "{} requires strictly positive times; sample contains {zeros} zero(s)",
                family.display_name()
            )));
        }
    }
    Ok(())
}

/// Point estimate without validation or standard errors.
///
/// Used directly by the bootstrap, whose resamples inherit validity from the
/// original sample.
pub(crate) fn estimate(sample: &[f64], family: Family) -> Result<FittedModel, DistError> {
    match family {
        Family::Exponential => fit_exponential(sample),
        Family::Gamma => fit_gamma(sample),
        Family::TwoStep => fit_two_step(sample),
    }
}

fn sample_mean(sample: &[f64]) -> Result<f64, DistError> {
    let mean = stats::mean(sample).ok_or_else(|| DistError::invalid_input("sample is empty"))?;
    if !(mean > 0.0) {
        return Err(DistError::estimation(
            "sample mean is zero; rate estimate is unbounded",
        ));
    }
    // Overflowing sums and subnormal means both leave 1/mean outside (0, inf).
    let rate = 1.0 / mean;
    if !(mean.is_finite() && rate.is_finite() && rate > 0.0) {
        return Err(DistError::estimation(format!(
            "sample mean {mean:e} is outside the representable rate range"
        )));
    }
    Ok(mean)
}

fn fit_exponential(sample: &[f64]) -> Result<FittedModel, DistError> {
    let mean = sample_mean(sample)?;
    let beta = 1.0 / mean;
    let params = vec![beta];
    let ll = sum_ln_pdf(Family::Exponential, &params, sample);
    if !(beta.is_finite() && beta > 0.0 && ll.is_finite()) {
        return Err(DistError::estimation(
            "exponential log-likelihood is not finite at the estimate",
        ));
    }
    Ok(FittedModel::new(Family::Exponential, params, ll, sample.len(), 0))
}

fn fit_gamma(sample: &[f64]) -> Result<FittedModel, DistError> {
    let mean = sample_mean(sample)?;
    let mean_ln = stats::mean_ln(sample).ok_or_else(|| DistError::invalid_input("sample is empty"))?;

    // s >= 0 by Jensen; s == 0 iff every observation is identical.
    let s = mean.ln() - mean_ln;
    if !(s.is_finite() && s > 1e-14) {
        return Err(DistError::estimation(
            "sample has no spread; Gamma shape estimate is unbounded",
        ));
    }

    let mut alpha = (3.0 - s + ((s - 3.0).powi(2) + 24.0 * s).sqrt()) / (12.0 * s);
    let mut iterations = 0;
    let mut converged = false;

    for iter in 0..GAMMA_MAX_ITER {
        iterations = iter + 1;

        let g = alpha.ln() - digamma(alpha) - s;
        let g_prime = 1.0 / alpha - trigamma(alpha);
        if !(g.is_finite() && g_prime.is_finite()) || g_prime.abs() < 1e-300 {
            return Err(DistError::estimation(format!(
                "Gamma shape iteration broke down at alpha={alpha}"
            )));
        }

        let delta = g / g_prime;
        let mut next = alpha - delta;
        // Keep the shape positive.
        if next <= 0.0 {
            next = alpha / 2.0;
        }
        let step = (next - alpha).abs();
        alpha = next;

        if step <= GAMMA_TOL * alpha {
            converged = true;
            break;
        }
    }

    if !converged {
        return Err(DistError::estimation(format!(
            "Gamma shape did not converge within {GAMMA_MAX_ITER} iterations"
        )));
    }

    let beta = alpha / mean;
    let params = vec![alpha, beta];
    let ll = sum_ln_pdf(Family::Gamma, &params, sample);
    if !ll.is_finite() {
        return Err(DistError::estimation("Gamma log-likelihood is not finite at the estimate"));
    }
    Ok(FittedModel::new(Family::Gamma, params, ll, sample.len(), iterations))
}

fn fit_two_step(sample: &[f64]) -> Result<FittedModel, DistError> {
    let mean = sample_mean(sample)?;
    let base = 1.0 / mean;
    if !(base.is_finite() && base > 0.0) {
        return Err(DistError::estimation(format!(
            "two-step rate scale 1/mean = {base:e} is not usable"
        )));
    }

    // The rate pair at the MLE satisfies roughly 1/beta1 + 1/beta2 ≈ mean, so
    // the slower rate sits in [1/mean, 2/mean] and the faster one above it.
    let grid = rate_grid_two_step(0.5 * base, 100.0 * base, TWO_STEP_GRID_STEPS)?;
    let start = best_grid_point(Family::TwoStep, &grid, sample).ok_or_else(|| {
        DistError::estimation("two-step log-likelihood is not finite anywhere on the starting grid")
    })?;

    let ln_base = base.ln();
    let objective = |x: &DVector<f64>| {
        if x.iter().any(|v| (v - ln_base).abs() > LN_RATE_BOUND) {
            return f64::INFINITY;
        }
        let params = [x[0].exp(), x[1].exp()];
        -sum_ln_pdf(Family::TwoStep, &params, sample)
    };

    let x0 = DVector::from_vec(vec![start.params[0].ln(), start.params[1].ln()]);
    let min = nelder_mead(objective, &x0, &NelderMeadOptions::default())?;

    let mut params = vec![min.x[0].exp(), min.x[1].exp()];
    params.sort_by(f64::total_cmp);
    let ll = sum_ln_pdf(Family::TwoStep, &params, sample);
    if !ll.is_finite() {
        return Err(DistError::estimation("two-step log-likelihood is not finite at the estimate"));
    }

    debug!(
        grid_start = ?start.params,
        grid_log_likelihood = start.log_likelihood,
        iterations = min.iterations,
        "two-step refinement finished"
    );

    Ok(FittedModel::new(Family::TwoStep, params, ll, sample.len(), min.iterations))
}

fn observed_standard_errors(sample: &[f64], family: Family, params: &[f64]) -> Option<Vec<f64>> {
    let x = DVector::from_column_slice(params);
    let neg_ll = |p: &DVector<f64>| -sum_ln_pdf(family, p.as_slice(), sample);
    let hessian = numerical_hessian(neg_ll, &x);
    standard_errors(&hessian)
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn successful_fits_have_valid_parameters(
            data in proptest::collection::vec(0.01_f64..1e3, 2..=40),
            family_idx in 0usize..3
        ) {
            let family = Family::ALL[family_idx];
            if let Ok(m) = fit(&data, family) {
                prop_assert_eq!(m.params.len(), family.param_count());
                prop_assert!(family.params_in_domain(&m.params), "params = {:?}", m.params);
                prop_assert!(m.log_likelihood.is_finite());
            }
        }

        #[test]
        fn exponential_always_fits_positive_mean_samples(
            data in proptest::collection::vec(0.0_f64..1e3, 1..=40)
        ) {
            prop_assume!(data.iter().any(|v| *v > 0.0));
            let m = fit(&data, Family::Exponential).unwrap();
            prop_assert!(m.params[0].is_finite() && m.params[0] > 0.0);
        }
    }
}
