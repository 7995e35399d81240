//! Starting-point grids for the two-step likelihood.
//!
//! The two-step surface is flat along the direction where one rate grows
//! without bound (the model degenerates to a single exponential), so a local
//! optimizer started at an arbitrary point can wander. We first scan a
//! deterministic log-spaced grid of rate pairs and hand the best cell to the
//! simplex refinement.

use rayon::prelude::*;

use crate::domain::Family;
use crate::error::DistError;
use crate::models::sum_ln_pdf;

/// Generate `steps` log-spaced points between `min` and `max` (inclusive).
pub fn log_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, DistError> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && max > 0.0 && max > min) {
        return Err(DistError::parameter(format!(
            "invalid grid range: min={min}, max={max} (must be finite, >0, and max>min)"
        )));
    }
    if steps < 2 {
        return Err(DistError::parameter("grid steps must be >= 2"));
    }

    let ln_min = min.ln();
    let ln_max = max.ln();
    let step = (ln_max - ln_min) / (steps as f64 - 1.0);

    let mut out = Vec::with_capacity(steps);
    for i in 0..steps {
        out.push((ln_min + step * i as f64).exp());
    }
    Ok(out)
}

/// Two-step rate grid: `[beta1, beta2]` with `beta1 <= beta2`.
///
/// The model is symmetric in its rates, so the lower triangle (diagonal
/// included) covers every distinct density.
pub fn rate_grid_two_step(min: f64, max: f64, steps: usize) -> Result<Vec<[f64; 2]>, DistError> {
    let values = log_space(min, max, steps)?;
    let mut out = Vec::with_capacity(steps * (steps + 1) / 2);
    for i in 0..values.len() {
        for j in i..values.len() {
            out.push([values[i], values[j]]);
        }
    }
    Ok(out)
}

/// A scored grid cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPoint {
    pub idx: usize,
    pub params: [f64; 2],
    pub log_likelihood: f64,
}

/// Evaluate every cell (in parallel) and return the highest log-likelihood.
///
/// Ties are broken by grid index, so the result does not depend on the
/// thread schedule.
pub fn best_grid_point(family: Family, grid: &[[f64; 2]], sample: &[f64]) -> Option<GridPoint> {
    grid.par_iter()
        .enumerate()
        .filter_map(|(idx, params)| {
            let ll = sum_ln_pdf(family, params, sample);
            ll.is_finite().then_some(GridPoint {
                idx,
                params: *params,
                log_likelihood: ll,
            })
        })
        .reduce_with(|a, b| {
            if b.log_likelihood > a.log_likelihood
                || (b.log_likelihood == a.log_likelihood && b.idx < a.idx)
            {
                b
            } else {
                a
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_space_includes_endpoints() {
        let v = log_space(0.1, 10.0, 5).unwrap();
        assert!((v[0] - 0.1).abs() < 1e-12);
        assert!((v[v.len() - 1] - 10.0).abs() < 1e-12);
        assert!((v[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn log_space_rejects_bad_ranges() {
        assert!(matches!(log_space(0.0, 1.0, 5), Err(DistError::Parameter(_))));
        assert!(matches!(log_space(2.0, 1.0, 5), Err(DistError::Parameter(_))));
        assert!(matches!(log_space(1.0, 2.0, 1), Err(DistError::Parameter(_))));
    }

    #[test]
    fn two_step_grid_is_ordered_and_complete() {
        let grid = rate_grid_two_step(0.1, 10.0, 6).unwrap();
        assert_eq!(grid.len(), 21);
        for p in &grid {
            assert!(p[0] <= p[1]);
        }
    }

    #[test]
    fn best_grid_point_prefers_generating_rates() {
        // Quantiles of a two-step(1, 4) density stand in for data.
        let sample: Vec<f64> = (1..200)
            .map(|i| {
                let u = i as f64 / 200.0;
                // Invert the CDF by bisection.
                let (mut lo, mut hi) = (0.0_f64, 50.0_f64);
                for _ in 0..100 {
                    let mid = 0.5 * (lo + hi);
                    if crate::models::two_step::cdf(1.0, 4.0, mid) < u {
                        lo = mid;
                    } else {
                        hi = mid;
                    }
                }
                0.5 * (lo + hi)
            })
            .collect();
        let grid = vec![[0.25, 0.5], [1.0, 4.0], [2.0, 2.0], [4.0, 16.0]];
        let best = best_grid_point(Family::TwoStep, &grid, &sample).unwrap();
        assert_eq!(best.idx, 1);
        assert!(best.log_likelihood.is_finite());
    }

    #[test]
    fn best_grid_point_skips_impossible_cells() {
        let grid = vec![[-1.0, 1.0], [f64::NAN, 2.0]];
        assert!(best_grid_point(Family::TwoStep, &grid, &[1.0, 2.0]).is_none());
    }
}
