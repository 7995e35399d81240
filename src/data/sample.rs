//! Observed catastrophe times for one experimental condition.

use std::ops::Deref;

use crate::error::DistError;
use crate::math::stats;

/// A validated, immutable sample of catastrophe times.
///
/// Invariant: non-empty, every value finite and `>= 0`. Dereferences to
/// `&[f64]` so it can be passed wherever a slice is expected.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    values: Vec<f64>,
}

impl Sample {
    pub fn new(values: Vec<f64>) -> Result<Self, DistError> {
        validate(&values)?;
        Ok(Self { values })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    pub fn summary(&self) -> SampleSummary {
        let sorted = stats::sorted(&self.values);
        SampleSummary {
            n: sorted.len(),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            mean: stats::mean(&sorted).unwrap_or(f64::NAN),
            median: stats::percentile_sorted(&sorted, 0.5).unwrap_or(f64::NAN),
            n_zero: sorted.iter().filter(|v| **v == 0.0).count(),
        }
    }
}

impl Deref for Sample {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.values
    }
}

impl TryFrom<Vec<f64>> for Sample {
    type Error = DistError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Sample::new(values)
    }
}

impl TryFrom<&[f64]> for Sample {
    type Error = DistError;

    fn try_from(values: &[f64]) -> Result<Self, Self::Error> {
        Sample::new(values.to_vec())
    }
}

/// Summary stats about a sample (for reports).
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSummary {
    pub n: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub n_zero: usize,
}

/// Check the sample invariant: non-empty, finite, non-negative.
pub fn validate(values: &[f64]) -> Result<(), DistError> {
    if values.is_empty() {
        return Err(DistError::invalid_input("sample is empty"));
    }
    if let Some((i, v)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(DistError::invalid_input(format!(
            "sample value #{i} is not finite ({v})"
        )));
    }
    if let Some((i, v)) = values.iter().enumerate().find(|(_, v)| **v < 0.0) {
        return Err(DistError::invalid_input(format!(
            "sample value #{i} is negative ({v})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_negative_and_non_finite() {
        assert!(matches!(Sample::new(vec![]), Err(DistError::InvalidInput(_))));
        assert!(matches!(
            Sample::new(vec![1.0, -0.5]),
            Err(DistError::InvalidInput(_))
        ));
        assert!(matches!(
            Sample::new(vec![1.0, f64::NAN]),
            Err(DistError::InvalidInput(_))
        ));
        assert!(matches!(
            Sample::new(vec![f64::INFINITY]),
            Err(DistError::InvalidInput(_))
        ));
    }

    #[test]
    fn zero_is_a_valid_observation() {
        let s = Sample::new(vec![0.0, 10.0, 20.0]).unwrap();
        assert_eq!(s.len(), 3);
        assert_eq!(s.summary().n_zero, 1);
    }

    #[test]
    fn summary_reports_range_and_center() {
        let s = Sample::try_from(&[30.0, 10.0, 20.0, 40.0][..]).unwrap();
        let summary = s.summary();
        assert_eq!(summary.n, 4);
        assert_eq!(summary.min, 10.0);
        assert_eq!(summary.max, 40.0);
        assert_eq!(summary.mean, 25.0);
        assert_eq!(summary.median, 25.0);
        // Insertion order is preserved.
        assert_eq!(s.values(), &[30.0, 10.0, 20.0, 40.0]);
    }
}
