//! Error taxonomy for all calculators.
//!
//! - [`StatsError::Validation`]: malformed or out-of-range input
//! - [`StatsError::NotAnInteger`]: a real value where an integer count is required
//! - [`StatsError::Convergence`]: an iterative method exhausted its budget
//! - [`StatsError::Config`] / [`StatsError::Io`]: configuration loading

use thiserror::Error;

/// Error type shared by every module in this crate.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("{name} must be a non-negative integer, got {value}")]
    NotAnInteger { name: &'static str, value: f64 },

    #[error("{method} did not converge after {iterations} iterations")]
    Convergence {
        method: &'static str,
        iterations: usize,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl StatsError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        StatsError::Validation(msg.into())
    }

    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        StatsError::Io {
            context: context.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for StatsError {
    fn from(err: serde_json::Error) -> Self {
        StatsError::Config(err.to_string())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StatsError>;

/// Rejects a probability-like level outside the open interval `(0, 1)`.
pub(crate) fn require_open_unit(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(StatsError::validation(format!(
            "{name} must lie in (0, 1), got {value}"
        )))
    }
}

/// Rejects a rate that is not strictly positive and finite.
pub(crate) fn require_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(StatsError::validation(format!(
            "{name} must be positive, got {value}"
        )))
    }
}

/// Rejects any NaN or infinite value in `data`.
pub(crate) fn require_finite(name: &str, data: &[f64]) -> Result<()> {
    match data.iter().position(|x| !x.is_finite()) {
        None => Ok(()),
        Some(i) => Err(StatsError::validation(format!(
            "{name} contains a non-numeric value at index {i}: {}",
            data[i]
        ))),
    }
}

/// Converts a real value to a count, rejecting fractional, negative,
/// or non-finite input.
///
/// # Examples
/// ```
/// use u_numkit::error::integer_from_f64;
/// assert_eq!(integer_from_f64("n", 10.0).unwrap(), 10);
/// assert!(integer_from_f64("n", 2.5).is_err());
/// ```
pub fn integer_from_f64(name: &'static str, value: f64) -> Result<u64> {
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(StatsError::NotAnInteger { name, value });
    }
    if value < 0.0 {
        return Err(StatsError::validation(format!(
            "{name} must be non-negative, got {value}"
        )));
    }
    if value > u64::MAX as f64 {
        return Err(StatsError::validation(format!("{name} is too large: {value}")));
    }
    Ok(value as u64)
}
