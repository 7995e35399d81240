//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the fitting code stays clean and testable
//! - output changes are localized

use crate::domain::FittedModel;
use crate::fit::bootstrap::BootstrapResult;
use crate::fit::selection::Comparison;
use crate::io::ingest::{IngestedData, RowError};

/// Row errors shown before eliding the rest.
const MAX_ROW_ERRORS: usize = 5;

/// Dataset header: source column, row bookkeeping and descriptive stats.
pub fn format_sample_summary(ingest: &IngestedData) -> String {
    let s = ingest.sample.summary();
    let mut out = String::new();

    out.push_str("=== mtc - catastrophe time distribution fit ===\n");
    out.push_str(&format!("Column: {}\n", ingest.column));
    out.push_str(&format!(
        "Rows: read={} used={} errors={}\n",
        ingest.rows_read,
        ingest.rows_used,
        ingest.row_errors.len()
    ));
    out.push_str(&format!(
        "Times: n={} | range=[{:.2}, {:.2}] | mean={:.2} | median={:.2}",
        s.n, s.min, s.max, s.mean, s.median
    ));
    if s.n_zero > 0 {
        out.push_str(&format!(" | zeros={}", s.n_zero));
    }
    out.push('\n');

    if !ingest.row_errors.is_empty() {
        out.push_str(&format_row_errors(&ingest.row_errors));
    }
    out
}

pub fn format_row_errors(errors: &[RowError]) -> String {
    let mut out = String::new();
    for e in errors.iter().take(MAX_ROW_ERRORS) {
        out.push_str(&format!("  line {}: {}\n", e.line, e.message));
    }
    if errors.len() > MAX_ROW_ERRORS {
        out.push_str(&format!("  ... and {} more\n", errors.len() - MAX_ROW_ERRORS));
    }
    out
}

/// One fitted model: parameters (with standard errors / intervals when
/// available) and fit quality.
pub fn format_fit(model: &FittedModel, ks: Option<f64>) -> String {
    let mut out = String::new();

    out.push_str(&format!("\nModel: {}\n", model.family.display_name()));
    for (i, (name, value)) in model.named_params().into_iter().enumerate() {
        let mut line = format!("- {name:<6} = {}", fmt_param(value));
        if let Some(se) = model.std_errors.as_ref().and_then(|v| v.get(i)) {
            line.push_str(&format!("  (se {})", fmt_param(*se)));
        }
        if let Some(ci) = model.intervals.as_ref().and_then(|m| m.get(name)) {
            line.push_str(&format!("  CI [{}, {}]", fmt_param(ci.low), fmt_param(ci.high)));
        }
        line.push('\n');
        out.push_str(&line);
    }
    out.push_str(&format!("- mean time = {:.2}\n", model.mean_time()));
    out.push_str(&format!(
        "- lnL={:.3} AIC={:.3} BIC={:.3} n={} iterations={}\n",
        model.log_likelihood, model.aic, model.bic, model.n, model.iterations
    ));
    if let Some(d) = ks {
        out.push_str(&format!("- KS distance = {d:.4}\n"));
    }
    out
}

/// Comparison table: one row per fitted family, best marked with `*`.
pub fn format_comparison(cmp: &Comparison) -> String {
    let mut out = String::new();
    let min_aic = cmp.fits.iter().map(|f| f.aic).fold(f64::INFINITY, f64::min);

    out.push_str("\nModel comparison:\n");
    out.push_str(
        format!(
            "  {:<18} {:>2} {:>12} {:>12} {:>8} {:>7}  params\n",
            "family", "k", "lnL", "AIC", "dAIC", "weight"
        )
        .trim_end(),
    );
    out.push('\n');

    for (fit, weight) in cmp.fits.iter().zip(&cmp.akaike_weights) {
        let chosen = if fit.family == cmp.best { "*" } else { " " };
        out.push_str(&format!(
            "{chosen} {:<18} {:>2} {:>12.3} {:>12.3} {:>8.3} {:>7.3}  {}\n",
            fit.family.display_name(),
            fit.family.param_count(),
            fit.log_likelihood,
            fit.aic,
            fit.aic - min_aic,
            weight,
            fmt_named(fit)
        ));
    }
    for (family, reason) in &cmp.skipped {
        out.push_str(&format!("  (skipped {}) {reason}\n", family.display_name()));
    }

    if !cmp.likelihood_ratios.is_empty() {
        out.push_str("\nLikelihood-ratio tests:\n");
        for lr in &cmp.likelihood_ratios {
            out.push_str(&format!(
                "- {} vs {}: LR={:.3} df={} p={:.3e}\n",
                lr.null.display_name(),
                lr.alternative.display_name(),
                lr.statistic,
                lr.df,
                lr.p_value
            ));
        }
    }

    out.push_str(&format!("\nChosen model: {}\n", cmp.best.display_name()));
    out
}

pub fn format_bootstrap(result: &BootstrapResult) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "\nBootstrap ({}): {:.0}% percentile intervals, {}/{} replicates converged\n",
        result.family.display_name(),
        100.0 * result.confidence_level,
        result.n_converged,
        result.n_requested
    ));
    for name in result.family.param_names() {
        if let Some(ci) = result.intervals.get(*name) {
            out.push_str(&format!(
                "- {name:<6} [{}, {}]\n",
                fmt_param(ci.low),
                fmt_param(ci.high)
            ));
        }
    }
    out
}

fn fmt_named(model: &FittedModel) -> String {
    let parts: Vec<String> = model
        .named_params()
        .into_iter()
        .map(|(name, v)| format!("{name}={}", fmt_param(v)))
        .collect();
    parts.join(" ")
}

/// Rates are often ~1e-3 per second, so switch to scientific below 0.01.
fn fmt_param(v: f64) -> String {
    if v != 0.0 && v.abs() < 0.01 {
        format!("{v:.4e}")
    } else {
        format!("{v:.4}")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::domain::{Family, Interval};
    use crate::fit::selection::LikelihoodRatio;

    fn two_step() -> FittedModel {
        let mut m = FittedModel::new(Family::TwoStep, vec![0.0032, 0.0081], -500.0, 100, 40);
        m.std_errors = Some(vec![0.0004, 0.002]);
        let mut intervals = BTreeMap::new();
        intervals.insert("beta1".to_string(), Interval { low: 0.0025, high: 0.004 });
        m.intervals = Some(intervals);
        m
    }

    #[test]
    fn param_formatting_switches_to_scientific() {
        assert_eq!(fmt_param(2.5), "2.5000");
        assert_eq!(fmt_param(0.0032), "3.2000e-3");
        assert_eq!(fmt_param(0.0), "0.0000");
    }

    #[test]
    fn fit_lists_errors_and_intervals() {
        let text = format_fit(&two_step(), Some(0.031));
        assert!(text.contains("Model: Two-step Poisson"));
        assert!(text.contains("- beta1  = 3.2000e-3  (se 4.0000e-4)  CI [2.5000e-3, 4.0000e-3]"));
        assert!(text.contains("- beta2  = 8.1000e-3  (se 2.0000e-3)\n"));
        assert!(text.contains("KS distance = 0.0310"));
    }

    #[test]
    fn comparison_marks_best_and_lists_tests() {
        let exp = FittedModel::new(Family::Exponential, vec![0.0023], -530.0, 100, 0);
        let cmp = Comparison {
            fits: vec![exp, two_step()],
            akaike_weights: vec![0.0, 1.0],
            best: Family::TwoStep,
            skipped: vec![(Family::Gamma, "estimation failed: test".to_string())],
            likelihood_ratios: vec![LikelihoodRatio {
                null: Family::Exponential,
                alternative: Family::TwoStep,
                statistic: 60.0,
                df: 1,
                p_value: 1e-14,
            }],
        };
        let text = format_comparison(&cmp);
        assert!(text.lines().any(|l| l.starts_with("* Two-step Poisson")));
        assert!(text.lines().any(|l| l.starts_with("  Exponential")));
        assert!(text.contains("(skipped Gamma)"));
        assert!(text.contains("Exponential vs Two-step Poisson: LR=60.000 df=1"));
        assert!(text.ends_with("Chosen model: Two-step Poisson\n"));
    }

    #[test]
    fn row_errors_are_elided() {
        let errors: Vec<RowError> = (0..8)
            .map(|i| RowError {
                line: i + 2,
                message: "Invalid number 'x'.".to_string(),
            })
            .collect();
        let text = format_row_errors(&errors);
        assert_eq!(text.lines().count(), MAX_ROW_ERRORS + 1);
        assert!(text.ends_with("... and 3 more\n"));
    }
}
