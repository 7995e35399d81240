//! Reporting utilities: ECDF residuals and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::FittedModel;
use crate::error::AppError;
use crate::math::stats::ecdf;
use crate::models::cdf;

/// Empirical vs fitted distribution function at one observed time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CdfResidual {
    pub t: f64,
    pub ecdf: f64,
    pub model_cdf: f64,
    /// `ecdf - model_cdf`.
    pub residual: f64,
}

/// Evaluate the fitted CDF at each distinct observed time.
pub fn cdf_residuals(sample: &[f64], model: &FittedModel) -> Result<Vec<CdfResidual>, AppError> {
    let (values, probs) = ecdf(sample).ok_or_else(|| AppError::new(3, "Empty or non-finite sample."))?;

    let mut out = Vec::with_capacity(values.len());
    for (t, p) in values.into_iter().zip(probs) {
        let model_cdf = cdf(model.family, &model.params, t);
        if !model_cdf.is_finite() {
            return Err(AppError::new(4, "Non-finite model CDF during residual computation."));
        }
        out.push(CdfResidual {
            t,
            ecdf: p,
            model_cdf,
            residual: p - model_cdf,
        });
    }
    Ok(out)
}

/// Kolmogorov–Smirnov distance between the ECDF and the fitted CDF.
///
/// The ECDF jumps at each observation, so both sides of every step are checked.
pub fn ks_distance(residuals: &[CdfResidual]) -> f64 {
    let mut prev = 0.0;
    let mut d: f64 = 0.0;
    for r in residuals {
        d = d.max((r.ecdf - r.model_cdf).abs());
        d = d.max((prev - r.model_cdf).abs());
        prev = r.ecdf;
    }
    d
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Family;

    #[test]
    fn residuals_at_distinct_times() {
        let model = FittedModel::new(Family::Exponential, vec![1.0], -1.0, 3, 0);
        let res = cdf_residuals(&[1.0, 1.0, 2.0], &model).unwrap();
        assert_eq!(res.len(), 2);
        assert!((res[0].ecdf - 2.0 / 3.0).abs() < 1e-12);
        assert!((res[0].model_cdf - (1.0 - (-1.0f64).exp())).abs() < 1e-12);
        assert!((res[1].residual - (1.0 - res[1].model_cdf)).abs() < 1e-12);
    }

    #[test]
    fn ks_checks_both_sides_of_each_step() {
        let residuals = [
            CdfResidual { t: 1.0, ecdf: 0.5, model_cdf: 0.45, residual: 0.05 },
            CdfResidual { t: 2.0, ecdf: 1.0, model_cdf: 0.9, residual: 0.1 },
        ];
        // Just below t = 2 the ECDF is 0.5 while the model is already at 0.9.
        assert!((ks_distance(&residuals) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn ks_is_small_for_a_good_fit() {
        let sample = crate::data::simulate(Family::Exponential, &[0.01], 2_000, Some(3)).unwrap();
        let model = crate::fit::fit(&sample, Family::Exponential).unwrap();
        let res = cdf_residuals(&sample, &model).unwrap();
        assert!(ks_distance(&res) < 0.05);
    }
}
