//! Descriptive statistics over plain `f64` slices.
//!
//! Callers validate finiteness up front (see `data::Sample`), so these helpers
//! only guard against empty input.

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population (biased, denominator `n`) variance.
pub fn variance(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    Some(values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64)
}

/// Mean of `ln(x)`; `-inf` if any value is zero.
pub fn mean_ln(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().map(|v| v.ln()).sum::<f64>() / values.len() as f64)
}

/// Sorted copy using a total order.
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(f64::total_cmp);
    out
}

/// Percentile of already-sorted data, `q` in `[0, 1]`.
///
/// Linear interpolation between the closest order statistics at rank
/// `q * (n - 1)`.
pub fn percentile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    if sorted.len() == 1 {
        return Some(sorted[0]);
    }
    let rank = q * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Some(sorted[lo] + frac * (sorted[hi] - sorted[lo]))
}

/// Empirical CDF: `F_n(x) = #{x_i <= x} / n`.
///
/// Returns sorted unique values with their cumulative probabilities, or `None`
/// for empty / non-finite input.
pub fn ecdf(data: &[f64]) -> Option<(Vec<f64>, Vec<f64>)> {
    if data.is_empty() || data.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let n = data.len() as f64;
    let sorted = sorted(data);

    let mut values: Vec<f64> = Vec::new();
    let mut probs: Vec<f64> = Vec::new();
    for (i, &v) in sorted.iter().enumerate() {
        let cum = (i + 1) as f64 / n;
        match values.last() {
            Some(&last) if last == v => {
                if let Some(p) = probs.last_mut() {
                    *p = cum;
                }
            }
            _ => {
                values.push(v);
                probs.push(cum);
            }
        }
    }
    Some((values, probs))
}
