//! Gamma distribution: the waiting time for `alpha` successive Poisson arrivals
//! that each occur at rate `beta`.

use rand::Rng;
use rand_distr::{Distribution, Gamma};

use crate::error::DistError;
use crate::math::special::{gamma_lr, ln_gamma};

pub fn ln_pdf(alpha: f64, beta: f64, t: f64) -> f64 {
    if t < 0.0 {
        return f64::NEG_INFINITY;
    }
    if t == 0.0 {
        return match alpha.partial_cmp(&1.0) {
            Some(std::cmp::Ordering::Less) => f64::INFINITY,
            Some(std::cmp::Ordering::Equal) => beta.ln(),
            _ => f64::NEG_INFINITY,
        };
    }
    alpha * beta.ln() - ln_gamma(alpha) + (alpha - 1.0) * t.ln() - beta * t
}

pub fn pdf(alpha: f64, beta: f64, t: f64) -> f64 {
    ln_pdf(alpha, beta, t).exp()
}

/// Regularized lower incomplete gamma `P(alpha, beta t)`.
pub fn cdf(alpha: f64, beta: f64, t: f64) -> f64 {
    if t <= 0.0 {
        return 0.0;
    }
    gamma_lr(alpha, beta * t)
}

/// Draw `size` waiting times.
pub fn draw<R: Rng + ?Sized>(alpha: f64, beta: f64, size: usize, rng: &mut R) -> Result<Vec<f64>, DistError> {
    if !(beta.is_finite() && beta > 0.0) {
        return Err(DistError::parameter(format!("gamma rate must be > 0, got {beta}")));
    }
    // rand_distr parameterizes by scale = 1 / rate.
    let dist = Gamma::new(alpha, 1.0 / beta)
        .map_err(|e| DistError::parameter(format!("gamma(alpha={alpha}, beta={beta}): {e}")))?;
    Ok((0..size).map(|_| dist.sample(rng)).collect())
}
