//! Validated numeric samples.
//!
//! [`Sample`] is the smart constructor every sample-based calculator takes:
//! once built, it is guaranteed non-empty and free of NaN/±∞, so callers
//! never re-check.

use serde::Serialize;

use crate::error::{require_finite, Result, StatsError};
use crate::stats;

/// A non-empty ordered sequence of finite observations.
///
/// # Examples
/// ```
/// use u_numkit::sample::Sample;
/// let s = Sample::new(vec![2.0, 4.0, 6.0]).unwrap();
/// assert_eq!(s.mean(), 4.0);
/// assert!(Sample::new(vec![]).is_err());
/// assert!(Sample::parse(&["1.5", "abc"]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    values: Vec<f64>,
}

impl Sample {
    /// Builds a sample, rejecting empty input and non-finite values.
    pub fn new(values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(StatsError::validation("sample must not be empty"));
        }
        require_finite("sample", &values)?;
        Ok(Self { values })
    }

    /// Copies a slice into a validated sample.
    pub fn from_slice(values: &[f64]) -> Result<Self> {
        Self::new(values.to_vec())
    }

    /// Parses textual observations, rejecting anything that is not a number.
    pub fn parse<S: AsRef<str>>(raw: &[S]) -> Result<Self> {
        let values = raw
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let text = s.as_ref().trim();
                text.parse::<f64>().map_err(|_| {
                    StatsError::validation(format!(
                        "sample contains a non-numeric value at index {i}: {text:?}"
                    ))
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        Self::new(values)
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false`; kept for slice-like ergonomics.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn mean(&self) -> f64 {
        stats::kahan_sum(&self.values) / self.values.len() as f64
    }

    /// Sample variance (ddof = 1); `None` for a single observation.
    pub fn variance(&self) -> Option<f64> {
        stats::variance(&self.values)
    }

    /// Sample standard deviation (ddof = 1); `None` for a single observation.
    pub fn std_dev(&self) -> Option<f64> {
        self.variance().map(f64::sqrt)
    }

    /// Standard error of the mean, `s / √n`.
    pub fn standard_error(&self) -> Option<f64> {
        self.std_dev().map(|s| s / (self.len() as f64).sqrt())
    }

    /// Fails with a validation error unless the sample has at least `min` observations.
    pub fn require_len(&self, min: usize) -> Result<()> {
        if self.len() < min {
            return Err(StatsError::validation(format!(
                "sample needs at least {min} observations, got {}",
                self.len()
            )));
        }
        Ok(())
    }

    /// Full descriptive summary (needs two observations for the spread).
    pub fn summary(&self) -> Result<Summary> {
        self.require_len(2)?;
        let v = &self.values;
        let mut sorted = v.clone();
        sorted.sort_unstable_by(f64::total_cmp);
        let q = |p| stats::quantile_sorted(&sorted, p).unwrap_or(f64::NAN);
        let variance = self.variance().unwrap_or(0.0);
        let minimum = sorted[0];
        let maximum = sorted[sorted.len() - 1];
        let (first_quartile, third_quartile) = (q(0.25), q(0.75));
        Ok(Summary {
            count: v.len(),
            mean: self.mean(),
            median: q(0.5),
            std_dev: variance.sqrt(),
            variance,
            min: minimum,
            max: maximum,
            range: maximum - minimum,
            first_quartile,
            third_quartile,
            interquartile_range: third_quartile - first_quartile,
        })
    }
}

impl TryFrom<Vec<f64>> for Sample {
    type Error = StatsError;

    fn try_from(values: Vec<f64>) -> Result<Self> {
        Self::new(values)
    }
}

/// Descriptive statistics of a [`Sample`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// ddof = 1
    pub std_dev: f64,
    /// ddof = 1
    pub variance: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    pub first_quartile: f64,
    pub third_quartile: f64,
    pub interquartile_range: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(Sample::new(vec![]), Err(StatsError::Validation(_))));
    }

    #[test]
    fn test_rejects_nan_and_infinity() {
        assert!(Sample::new(vec![1.0, f64::NAN]).is_err());
        assert!(Sample::new(vec![f64::NEG_INFINITY]).is_err());
    }

    #[test]
    fn test_parse_accepts_padded_numbers() {
        let s = Sample::parse(&[" 82", "64 ", "7.5e1"]).unwrap();
        assert_eq!(s.values(), &[82.0, 64.0, 75.0]);
    }

    #[test]
    fn test_parse_rejects_text() {
        let err = Sample::parse(&["1", "two"]).unwrap_err();
        assert!(err.to_string().contains("index 1"));
    }

    #[test]
    fn test_parse_rejects_nan_literal() {
        assert!(Sample::parse(&["NaN"]).is_err());
    }

    #[test]
    fn test_moments() {
        let s = Sample::new(vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(s.mean(), 5.0);
        assert!((s.variance().unwrap() - 32.0 / 7.0).abs() < 1e-12);
        assert!((s.standard_error().unwrap() - s.std_dev().unwrap() / 8f64.sqrt()).abs() < 1e-15);
    }

    #[test]
    fn test_single_observation_has_no_spread() {
        let s = Sample::new(vec![3.0]).unwrap();
        assert_eq!(s.std_dev(), None);
        assert!(s.summary().is_err());
    }

    #[test]
    fn test_summary() {
        let s = Sample::new(vec![82.0, 64.0, 64.0, 79.0, 64.0, 76.0, 52.0, 61.0, 85.0]).unwrap();
        let sum = s.summary().unwrap();
        assert_eq!(sum.count, 9);
        assert_eq!(sum.median, 64.0);
        assert_eq!(sum.min, 52.0);
        assert_eq!(sum.max, 85.0);
        assert_eq!(sum.range, 33.0);
        assert_eq!(sum.first_quartile, 64.0);
        assert_eq!(sum.third_quartile, 79.0);
        assert_eq!(sum.interquartile_range, 15.0);
    }
}
