//! Special functions not covered by `statrs`, plus numerically careful
//! building blocks for the two-step density.

pub use statrs::function::gamma::{digamma, gamma_lr, ln_gamma};

/// Trigamma function `ψ'(x)` for `x > 0`.
///
/// Shifts the argument above 6 with the recurrence `ψ'(x) = ψ'(x + 1) + 1/x²`,
/// then applies the asymptotic series.
pub fn trigamma(x: f64) -> f64 {
    if !(x.is_finite() && x > 0.0) {
        return f64::NAN;
    }

    let mut x = x;
    let mut acc = 0.0;
    while x < 6.0 {
        acc += 1.0 / (x * x);
        x += 1.0;
    }

    let inv = 1.0 / x;
    let inv2 = inv * inv;
    // 1/x + 1/(2x²) + 1/(6x³) - 1/(30x⁵) + 1/(42x⁷) - 1/(30x⁹)
    let series = inv
        + 0.5 * inv2
        + inv * inv2 * (1.0 / 6.0 - inv2 * (1.0 / 30.0 - inv2 * (1.0 / 42.0 - inv2 / 30.0)));
    acc + series
}

/// `ln(1 - e^{-x})` for `x > 0`, accurate at both ends (Mächler 2012).
pub fn ln_one_minus_exp_neg(x: f64) -> f64 {
    if x <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if x > std::f64::consts::LN_2 {
        (-(-x).exp()).ln_1p()
    } else {
        (-(-x).exp_m1()).ln()
    }
}

/// `(1 - e^{-d t}) / d`, with the `d → 0` limit `t`.
pub fn one_minus_exp_neg_over(d: f64, t: f64) -> f64 {
    let x = d * t;
    if x.abs() < 1e-12 {
        t
    } else {
        -(-x).exp_m1() / d
    }
}

/// `ln((1 - e^{-d t}) / d)` for `t > 0`, `d >= 0`.
pub fn ln_one_minus_exp_neg_over(d: f64, t: f64) -> f64 {
    if t <= 0.0 {
        return f64::NEG_INFINITY;
    }
    let x = d * t;
    if x < 1e-12 {
        t.ln()
    } else {
        ln_one_minus_exp_neg(x) - d.ln()
    }
}
