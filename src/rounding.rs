//! Significant-digit rounding and the error it introduces.
//!
//! # Examples
//!
//! ```
//! use u_numkit::rounding::{round_significant, rounding_error};
//!
//! let pi3 = round_significant(std::f64::consts::PI, 3).unwrap();
//! assert_eq!(pi3, 3.14);
//! let err = rounding_error(std::f64::consts::PI, pi3).unwrap();
//! assert!(err.percent < 0.06);
//! ```

use std::ops::RangeInclusive;

use serde::Serialize;

use crate::error::{Result, StatsError};

const MAX_SIGNIFICANT_DIGITS: u32 = 17;

/// Largest power of ten applied in one multiplication.
const MAX_SINGLE_SCALE: i32 = 300;

// ============================================================================
// Rounding
// ============================================================================

/// Rounds `value` to `digits` significant digits, ties to even.
///
/// Zero stays zero. An f64 never carries more than 17 significant digits,
/// so `digits ≥ 17` returns `value` unchanged.
///
/// # Errors
/// [`StatsError::Validation`] if `digits == 0`, `value` is not finite, or
/// rounding up carries past `f64::MAX`.
pub fn round_significant(value: f64, digits: u32) -> Result<f64> {
    if digits == 0 {
        return Err(StatsError::validation("need at least one significant digit"));
    }
    if !value.is_finite() {
        return Err(StatsError::validation(format!(
            "cannot round non-finite value {value}"
        )));
    }
    if value == 0.0 || digits >= MAX_SIGNIFICANT_DIGITS {
        return Ok(value);
    }
    let magnitude = value.abs().log10().floor() as i32 + 1;
    let exponent = magnitude - digits as i32;
    // Scaling by an exact power of ten on the correct side keeps 0.1-style
    // factors out of the arithmetic.
    let rounded = if exponent >= 0 {
        let scale = 10f64.powi(exponent);
        (value / scale).round_ties_even() * scale
    } else if -exponent <= MAX_SINGLE_SCALE {
        let scale = 10f64.powi(-exponent);
        (value * scale).round_ties_even() / scale
    } else {
        // Subnormal input: 10^(-exponent) alone would overflow.
        let head = 10f64.powi(MAX_SINGLE_SCALE);
        let tail = 10f64.powi(-exponent - MAX_SINGLE_SCALE);
        ((value * head * tail).round_ties_even() / tail) / head
    };
    if !rounded.is_finite() {
        return Err(StatsError::validation(format!(
            "{value} rounded to {digits} digits is outside the f64 range"
        )));
    }
    Ok(rounded)
}

// ============================================================================
// Error metrics
// ============================================================================

/// Absolute, relative and percentage error of an approximation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoundingError {
    pub absolute: f64,
    pub relative: f64,
    pub percent: f64,
}

/// Error of `rounded` against `exact`.
///
/// When `exact` is zero the relative error is 0 if `rounded` is also zero
/// and +∞ otherwise.
///
/// # Errors
/// [`StatsError::Validation`] if either value is not finite.
pub fn rounding_error(exact: f64, rounded: f64) -> Result<RoundingError> {
    if !exact.is_finite() || !rounded.is_finite() {
        return Err(StatsError::validation(format!(
            "values must be finite, got exact={exact}, rounded={rounded}"
        )));
    }
    let absolute = (exact - rounded).abs();
    let relative = if exact != 0.0 {
        absolute / exact.abs()
    } else if rounded == 0.0 {
        0.0
    } else {
        f64::INFINITY
    };
    Ok(RoundingError {
        absolute,
        relative,
        percent: relative * 100.0,
    })
}

/// One row of a [`rounding_profile`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoundingStep {
    pub digits: u32,
    pub rounded: f64,
    pub error: RoundingError,
}

/// Rounds `value` at each precision in `digits` and reports the error.
///
/// # Errors
/// Same as [`round_significant`].
pub fn rounding_profile(value: f64, digits: RangeInclusive<u32>) -> Result<Vec<RoundingStep>> {
    digits
        .map(|d| -> Result<RoundingStep> {
            let rounded = round_significant(value, d)?;
            Ok(RoundingStep {
                digits: d,
                rounded,
                error: rounding_error(value, rounded)?,
            })
        })
        .collect()
}

/// Applies `step` `iterations` times from `initial`, rounding to `digits`
/// significant digits after every step, and compares the result with the
/// unrounded iteration.
///
/// Returns `(rounded_result, error)`.
///
/// # Errors
/// [`StatsError::Validation`] if `digits == 0` or an iterate stops being
/// finite.
///
/// # Examples
/// ```
/// use u_numkit::rounding::propagate_rounding;
///
/// let (_, coarse) = propagate_rounding(3.0, 5, 2, |x| x * x / 10.0).unwrap();
/// let (_, fine) = propagate_rounding(3.0, 5, 8, |x| x * x / 10.0).unwrap();
/// assert!(fine.relative < coarse.relative);
/// ```
pub fn propagate_rounding<F>(
    initial: f64,
    iterations: usize,
    digits: u32,
    step: F,
) -> Result<(f64, RoundingError)>
where
    F: Fn(f64) -> f64,
{
    let mut exact = initial;
    let mut rounded = round_significant(initial, digits)?;
    for _ in 0..iterations {
        exact = step(exact);
        rounded = round_significant(step(rounded), digits)?;
    }
    Ok((rounded, rounding_error(exact, rounded)?))
}
