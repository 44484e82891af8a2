//! Confidence intervals for a population mean.
//!
//! x̄ ± t*·s/√n with t* = t_{n−1}((1 + c)/2).
//!
//! # Examples
//!
//! ```
//! use u_numkit::interval::confidence_interval;
//! use u_numkit::sample::Sample;
//!
//! let s = Sample::new(vec![82.0, 64.0, 64.0, 79.0, 64.0, 76.0, 52.0, 61.0, 85.0]).unwrap();
//! let ci = confidence_interval(&s, 0.95).unwrap();
//! assert!(ci.lower < ci.mean && ci.mean < ci.upper);
//! ```

use serde::Serialize;
use tracing::debug;

use crate::error::{require_open_unit, Result, StatsError};
use crate::sample::Sample;
use crate::special;

/// Two-sided confidence interval for a mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
    /// Point estimate at the centre of the interval.
    pub mean: f64,
    /// Half-width, `critical_value · s / √n`.
    pub margin: f64,
    /// t* (or z* for the normal variant).
    pub critical_value: f64,
    /// Confidence level in (0, 1).
    pub level: f64,
}

impl ConfidenceInterval {
    /// Whether `value` falls inside the closed interval.
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// t-based confidence interval from a sample.
///
/// # Errors
/// [`StatsError::Validation`] if the sample has fewer than 2 observations or
/// `level ∉ (0, 1)`. Empty and non-numeric samples are already rejected by
/// [`Sample::new`].
pub fn confidence_interval(sample: &Sample, level: f64) -> Result<ConfidenceInterval> {
    sample.require_len(2)?;
    let sd = sample
        .std_dev()
        .ok_or_else(|| StatsError::validation("sample standard deviation is undefined"))?;
    confidence_interval_from_summary(sample.mean(), sd, sample.len(), level)
}

/// t-based confidence interval from summary statistics (mean, sd with
/// ddof = 1, sample size).
///
/// # Errors
/// [`StatsError::Validation`] if `n < 2`, `sd < 0`, any input is non-finite,
/// or `level ∉ (0, 1)`.
pub fn confidence_interval_from_summary(
    mean: f64,
    sd: f64,
    n: usize,
    level: f64,
) -> Result<ConfidenceInterval> {
    require_open_unit("confidence level", level)?;
    if n < 2 {
        return Err(StatsError::validation(format!(
            "confidence interval needs at least 2 observations, got {n}"
        )));
    }
    if !mean.is_finite() || !sd.is_finite() || sd < 0.0 {
        return Err(StatsError::validation(format!(
            "invalid summary statistics: mean={mean}, sd={sd}"
        )));
    }

    let df = (n - 1) as f64;
    let critical_value = special::t_distribution_quantile(0.5 * (1.0 + level), df);
    let margin = critical_value * sd / (n as f64).sqrt();
    debug!(mean, sd, n, level, critical_value, margin, "confidence interval");

    Ok(ConfidenceInterval {
        lower: mean - margin,
        upper: mean + margin,
        mean,
        margin,
        critical_value,
        level,
    })
}

/// Two-sided standard normal critical value z* = Φ⁻¹((1 + c)/2).
///
/// # Examples
/// ```
/// use u_numkit::interval::z_critical_value;
/// assert!((z_critical_value(0.95).unwrap() - 1.959964).abs() < 1e-6);
/// ```
pub fn z_critical_value(level: f64) -> Result<f64> {
    require_open_unit("confidence level", level)?;
    Ok(special::inverse_normal_cdf(0.5 * (1.0 + level)))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn mean_lies_inside_interval(
            data in proptest::collection::vec(-1e4_f64..1e4, 2..=50),
            level in 0.5_f64..0.999,
        ) {
            let s = Sample::new(data).unwrap();
            let ci = confidence_interval(&s, level).unwrap();
            prop_assert!(ci.lower <= ci.mean && ci.mean <= ci.upper);
        }
    }
}
