//! Single Poisson step: waiting time `t ~ Exp(beta)`.

use rand::Rng;
use rand_distr::{Distribution, Exp};

use crate::error::DistError;

pub fn ln_pdf(beta: f64, t: f64) -> f64 {
    if t < 0.0 {
        return f64::NEG_INFINITY;
    }
    beta.ln() - beta * t
}

pub fn pdf(beta: f64, t: f64) -> f64 {
    ln_pdf(beta, t).exp()
}

pub fn cdf(beta: f64, t: f64) -> f64 {
    if t <= 0.0 {
        return 0.0;
    }
    -(-beta * t).exp_m1()
}

/// Draw `size` waiting times.
pub fn draw<R: Rng + ?Sized>(beta: f64, size: usize, rng: &mut R) -> Result<Vec<f64>, DistError> {
    let dist = Exp::new(beta).map_err(|e| DistError::parameter(format!("exponential rate {beta}: {e}")))?;
    Ok((0..size).map(|_| dist.sample(rng)).collect())
}
