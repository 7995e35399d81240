//! Derivative-free minimization and numerical curvature.
//!
//! The two-step likelihood has no closed-form maximizer, so it is refined with
//! a Nelder–Mead simplex search after a coarse grid picks the starting point.
//! Objectives are plain closures over `DVector<f64>`; `NaN` is treated as `+inf`
//! so out-of-domain vertices are simply rejected by the simplex.

use nalgebra::{DMatrix, DVector};

use crate::error::DistError;

/// Nelder–Mead tuning.
#[derive(Debug, Clone, Copy)]
pub struct NelderMeadOptions {
    /// Maximum number of simplex iterations per restart.
    pub max_iter: usize,
    /// Relative spread of vertex values at which the simplex is considered converged.
    pub ftol: f64,
    /// Offset added to each coordinate to build the initial simplex.
    pub initial_step: f64,
    /// Extra restarts from the best vertex once converged.
    pub restarts: usize,
}

impl Default for NelderMeadOptions {
    fn default() -> Self {
        Self {
            max_iter: 5_000,
            ftol: 1e-12,
            initial_step: 0.25,
            restarts: 2,
        }
    }
}

/// Best point found by a minimizer.
#[derive(Debug, Clone)]
pub struct Minimum {
    pub x: DVector<f64>,
    pub fx: f64,
    /// Total simplex iterations across restarts.
    pub iterations: usize,
}

const ALPHA: f64 = 1.0; // reflection
const GAMMA: f64 = 2.0; // expansion
const RHO: f64 = 0.5; // contraction
const SIGMA: f64 = 0.5; // shrink

/// Minimize `f` from `x0` with the Nelder–Mead simplex method.
///
/// Returns [`DistError::Estimation`] if the starting point is not finite or the
/// simplex does not converge within `max_iter` iterations.
pub fn nelder_mead<F>(f: F, x0: &DVector<f64>, opts: &NelderMeadOptions) -> Result<Minimum, DistError>
where
    F: Fn(&DVector<f64>) -> f64,
{
    let eval = |x: &DVector<f64>| {
        let v = f(x);
        if v.is_nan() { f64::INFINITY } else { v }
    };

    if !eval(x0).is_finite() {
        return Err(DistError::estimation(
            "objective is not finite at the starting point",
        ));
    }

    let mut best = run_simplex(&eval, x0, opts)?;
    let mut iterations = best.iterations;

    // Restarting from the converged vertex guards against premature collapse.
    for _ in 0..opts.restarts {
        let next = run_simplex(&eval, &best.x, opts)?;
        iterations += next.iterations;
        let improved = best.fx - next.fx > opts.ftol * (best.fx.abs() + 1e-300);
        if next.fx < best.fx {
            best = next;
        }
        if !improved {
            break;
        }
    }

    best.iterations = iterations;
    Ok(best)
}

fn run_simplex<F>(eval: &F, x0: &DVector<f64>, opts: &NelderMeadOptions) -> Result<Minimum, DistError>
where
    F: Fn(&DVector<f64>) -> f64,
{
    let n = x0.len();
    let mut simplex: Vec<DVector<f64>> = Vec::with_capacity(n + 1);
    simplex.push(x0.clone());
    for i in 0..n {
        let mut v = x0.clone();
        v[i] += opts.initial_step;
        simplex.push(v);
    }
    let mut values: Vec<f64> = simplex.iter().map(eval).collect();

    for iter in 0..opts.max_iter {
        // Order vertices: best first, worst last.
        let mut order: Vec<usize> = (0..=n).collect();
        order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
        simplex = order.iter().map(|&i| simplex[i].clone()).collect();
        values = order.iter().map(|&i| values[i]).collect();

        let f_best = values[0];
        let f_worst = values[n];
        let spread = 2.0 * (f_worst - f_best).abs();
        if f_worst.is_finite() && spread <= opts.ftol * (f_worst.abs() + f_best.abs()) + 1e-300 {
            return Ok(Minimum {
                x: simplex[0].clone(),
                fx: f_best,
                iterations: iter,
            });
        }

        let centroid = simplex[..n]
            .iter()
            .fold(DVector::<f64>::zeros(n), |acc, v| acc + v)
            / n as f64;

        let reflected = &centroid + (&centroid - &simplex[n]) * ALPHA;
        let f_reflected = eval(&reflected);

        if f_reflected < values[0] {
            let expanded = &centroid + (&reflected - &centroid) * GAMMA;
            let f_expanded = eval(&expanded);
            if f_expanded < f_reflected {
                simplex[n] = expanded;
                values[n] = f_expanded;
            } else {
                simplex[n] = reflected;
                values[n] = f_reflected;
            }
            continue;
        }

        if f_reflected < values[n - 1] {
            simplex[n] = reflected;
            values[n] = f_reflected;
            continue;
        }

        // Contraction: outside if the reflection beat the worst vertex, else inside.
        let (contracted, f_contracted) = if f_reflected < values[n] {
            let c = &centroid + (&reflected - &centroid) * RHO;
            let fc = eval(&c);
            (c, fc)
        } else {
            let c = &centroid + (&simplex[n] - &centroid) * RHO;
            let fc = eval(&c);
            (c, fc)
        };

        if f_contracted < values[n].min(f_reflected) {
            simplex[n] = contracted;
            values[n] = f_contracted;
            continue;
        }

        // Shrink towards the best vertex.
        let best = simplex[0].clone();
        for i in 1..=n {
            simplex[i] = &best + (&simplex[i] - &best) * SIGMA;
            values[i] = eval(&simplex[i]);
        }
    }

    Err(DistError::estimation(format!(
        "Nelder-Mead did not converge within {} iterations",
        opts.max_iter
    )))
}

/// Central-difference Hessian of `f` at `x`.
///
/// Step sizes are relative to each coordinate's magnitude.
pub fn numerical_hessian<F>(f: F, x: &DVector<f64>) -> DMatrix<f64>
where
    F: Fn(&DVector<f64>) -> f64,
{
    let n = x.len();
    let h: Vec<f64> = x.iter().map(|v| 1e-4 * v.abs().max(1e-8)).collect();
    let f0 = f(x);
    let mut hess = DMatrix::<f64>::zeros(n, n);

    let shifted = |i: usize, di: f64, j: usize, dj: f64| {
        let mut y = x.clone();
        y[i] += di;
        y[j] += dj;
        f(&y)
    };

    for i in 0..n {
        let fp = shifted(i, h[i], i, 0.0);
        let fm = shifted(i, -h[i], i, 0.0);
        hess[(i, i)] = (fp - 2.0 * f0 + fm) / (h[i] * h[i]);

        for j in (i + 1)..n {
            let fpp = shifted(i, h[i], j, h[j]);
            let fpm = shifted(i, h[i], j, -h[j]);
            let fmp = shifted(i, -h[i], j, h[j]);
            let fmm = shifted(i, -h[i], j, -h[j]);
            let v = (fpp - fpm - fmp + fmm) / (4.0 * h[i] * h[j]);
            hess[(i, j)] = v;
            hess[(j, i)] = v;
        }
    }

    hess
}

/// Standard errors from the Hessian of a negative log-likelihood.
///
/// Returns `None` when the observed information is singular or not positive
/// definite on its diagonal.
pub fn standard_errors(neg_log_like_hessian: &DMatrix<f64>) -> Option<Vec<f64>> {
    if neg_log_like_hessian.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let cov = neg_log_like_hessian.clone().try_inverse()?;
    let mut out = Vec::with_capacity(cov.nrows());
    for i in 0..cov.nrows() {
        let var = cov[(i, i)];
        if !(var.is_finite() && var > 0.0) {
            return None;
        }
        out.push(var.sqrt());
    }
    Some(out)
}
