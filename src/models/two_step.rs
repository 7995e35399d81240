//! Two successive Poisson processes.
//!
//! Catastrophe happens once a first event (rate `beta1`) and then a second
//! event (rate `beta2`) have both arrived, so the waiting time is the sum of
//! two independent exponentials:
//!
//! ```text
//! f(t) = beta1 beta2 / (beta2 - beta1) * (exp(-beta1 t) - exp(-beta2 t))
//! F(t) = 1 - (beta2 exp(-beta1 t) - beta1 exp(-beta2 t)) / (beta2 - beta1)
//! ```
//!
//! The model is symmetric in the two rates. Writing `lo = min`, `d = |beta2 - beta1|`
//! and `h(d, t) = (1 - exp(-d t)) / d` gives the forms used here:
//!
//! ```text
//! ln f(t) = ln beta1 + ln beta2 - lo t + ln h(d, t)
//! F(t)    = 1 - exp(-lo t) (1 + lo h(d, t))
//! ```
//!
//! which stay accurate as `d → 0`, where the density becomes Gamma(2, beta).

use rand::Rng;
use rand_distr::{Distribution, Exp};

use crate::error::DistError;
use crate::math::special::{ln_one_minus_exp_neg_over, one_minus_exp_neg_over};

pub fn ln_pdf(beta1: f64, beta2: f64, t: f64) -> f64 {
    if t <= 0.0 {
        return f64::NEG_INFINITY;
    }
    let lo = beta1.min(beta2);
    let d = (beta2 - beta1).abs();
    beta1.ln() + beta2.ln() - lo * t + ln_one_minus_exp_neg_over(d, t)
}

pub fn pdf(beta1: f64, beta2: f64, t: f64) -> f64 {
    ln_pdf(beta1, beta2, t).exp()
}

pub fn cdf(beta1: f64, beta2: f64, t: f64) -> f64 {
    if t <= 0.0 {
        return 0.0;
    }
    let lo = beta1.min(beta2);
    let d = (beta2 - beta1).abs();
    let survival = (-lo * t).exp() * (1.0 + lo * one_minus_exp_neg_over(d, t));
    (1.0 - survival).clamp(0.0, 1.0)
}

/// Draw `size` waiting times as the sum of the two stage durations.
pub fn draw<R: Rng + ?Sized>(beta1: f64, beta2: f64, size: usize, rng: &mut R) -> Result<Vec<f64>, DistError> {
    let first = Exp::new(beta1).map_err(|e| DistError::parameter(format!("two-step beta1 {beta1}: {e}")))?;
    let second = Exp::new(beta2).map_err(|e| DistError::parameter(format!("two-step beta2 {beta2}: {e}")))?;
    Ok((0..size)
        .map(|_| first.sample(rng) + second.sample(rng))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_pdf(b1: f64, b2: f64, t: f64) -> f64 {
        b1 * b2 / (b2 - b1) * ((-b1 * t).exp() - (-b2 * t).exp())
    }

    fn naive_cdf(b1: f64, b2: f64, t: f64) -> f64 {
        b1 * b2 / (b2 - b1) * ((1.0 - (-b1 * t).exp()) / b1 - (1.0 - (-b2 * t).exp()) / b2)
    }

    #[test]
    fn matches_textbook_form_for_distinct_rates() {
        for &(b1, b2) in &[(0.002, 0.01), (0.01, 0.002), (1.0, 3.0)] {
            for t in [1.0, 50.0, 300.0, 1000.0] {
                let p = pdf(b1, b2, t);
                let q = naive_pdf(b1, b2, t);
                assert!((p - q).abs() <= 1e-10 * q.abs().max(1e-300), "pdf b=({b1},{b2}) t={t}: {p} vs {q}");
                let c = cdf(b1, b2, t);
                let e = naive_cdf(b1, b2, t);
                assert!((c - e).abs() < 1e-10, "cdf b=({b1},{b2}) t={t}: {c} vs {e}");
            }
        }
    }

    #[test]
    fn equal_rates_reduce_to_gamma_two() {
        let beta = 0.004;
        for t in [10.0, 200.0, 900.0] {
            let gamma_pdf = crate::models::gamma::pdf(2.0, beta, t);
            assert!((pdf(beta, beta, t) - gamma_pdf).abs() < 1e-12);
            let gamma_cdf = 1.0 - (-beta * t).exp() * (1.0 + beta * t);
            assert!((cdf(beta, beta, t) - gamma_cdf).abs() < 1e-12);
            // Nearly equal rates stay continuous with the limit.
            assert!((pdf(beta, beta * (1.0 + 1e-9), t) - gamma_pdf).abs() < 1e-9);
        }
    }

    #[test]
    fn rates_are_exchangeable() {
        for t in [5.0, 60.0, 400.0] {
            assert_eq!(ln_pdf(0.01, 0.003, t), ln_pdf(0.003, 0.01, t));
            assert_eq!(cdf(0.01, 0.003, t), cdf(0.003, 0.01, t));
        }
    }

    #[test]
    fn density_vanishes_at_zero() {
        assert_eq!(pdf(1.0, 2.0, 0.0), 0.0);
        assert_eq!(cdf(1.0, 2.0, 0.0), 0.0);
    }

    #[test]
    fn draws_have_summed_means() {
        use rand::SeedableRng;
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let xs = draw(0.5, 0.25, 20_000, &mut rng).unwrap();
        let mean = xs.iter().sum::<f64>() / xs.len() as f64;
        // E[t] = 1/0.5 + 1/0.25 = 6
        assert!((mean - 6.0).abs() < 0.15, "mean = {mean}");
        assert!(xs.iter().all(|v| *v > 0.0));
    }
}
