//! Continuous probability densities on a bounded support.
//!
//! [`Density`] checks that a function is a valid density on `[lower, upper]`
//! (non-negative at every quadrature node, total mass 1) and then answers
//! interval probabilities and moments with the composite trapezoidal rule.
//! Densities with unbounded support are truncated by the caller to an
//! interval holding all but a negligible tail.
//!
//! # Examples
//!
//! ```
//! use u_numkit::density::Density;
//!
//! // Triangular density on [0, 1] peaking at 1/2.
//! let tri = Density::new(|x: f64| if x <= 0.5 { 4.0 * x } else { 4.0 * (1.0 - x) }, 0.0, 1.0).unwrap();
//! assert!((tri.mean() - 0.5).abs() < 1e-9);
//! assert!((tri.probability(0.0, 0.5).unwrap() - 0.5).abs() < 1e-9);
//! ```

use serde::Serialize;
use tracing::debug;

use crate::error::{require_positive, Result, StatsError};
use crate::integration::trapezoid_composite;

/// Quadrature subintervals used by [`Density::new`].
pub const DEFAULT_SUBINTERVALS: usize = 100_000;

/// Allowed |∫f − 1| used by [`Density::new`].
pub const DEFAULT_MASS_TOLERANCE: f64 = 1e-6;

/// Mean, variance and total mass of a [`Density`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DensitySummary {
    pub lower: f64,
    pub upper: f64,
    pub total_mass: f64,
    pub mean: f64,
    pub variance: f64,
    pub std_dev: f64,
}

/// A validated probability density function on `[lower, upper]`.
#[derive(Debug, Clone)]
pub struct Density<F> {
    pdf: F,
    lower: f64,
    upper: f64,
    subintervals: usize,
    total_mass: f64,
}

impl<F> Density<F>
where
    F: Fn(f64) -> f64,
{
    /// Validates `pdf` on `[lower, upper]` with the default resolution.
    ///
    /// # Errors
    /// See [`Density::with_resolution`].
    pub fn new(pdf: F, lower: f64, upper: f64) -> Result<Self> {
        Self::with_resolution(pdf, lower, upper, DEFAULT_SUBINTERVALS, DEFAULT_MASS_TOLERANCE)
    }

    /// Validates `pdf` on `[lower, upper]` using `subintervals` trapezoids.
    ///
    /// # Errors
    /// [`StatsError::Validation`] if the bounds are not finite or not
    /// increasing, `subintervals == 0`, `mass_tolerance ≤ 0`, `pdf` is
    /// negative or non-finite at a quadrature node, or its integral
    /// differs from 1 by more than `mass_tolerance`.
    pub fn with_resolution(
        pdf: F,
        lower: f64,
        upper: f64,
        subintervals: usize,
        mass_tolerance: f64,
    ) -> Result<Self> {
        if !lower.is_finite() || !upper.is_finite() || lower >= upper {
            return Err(StatsError::validation(format!(
                "support must be a finite interval with lower < upper, got [{lower}, {upper}]"
            )));
        }
        if subintervals == 0 {
            return Err(StatsError::validation("need at least one subinterval"));
        }
        require_positive("mass_tolerance", mass_tolerance)?;

        let h = (upper - lower) / subintervals as f64;
        for i in 0..=subintervals {
            let x = if i == subintervals {
                upper
            } else {
                lower + i as f64 * h
            };
            let fx = pdf(x);
            if !fx.is_finite() {
                return Err(StatsError::validation(format!(
                    "density is not finite at x = {x} (f(x) = {fx})"
                )));
            }
            if fx < 0.0 {
                return Err(StatsError::validation(format!(
                    "density is negative at x = {x} (f(x) = {fx})"
                )));
            }
        }

        let total_mass = trapezoid_composite(&pdf, lower, upper, subintervals)?;
        if (total_mass - 1.0).abs() > mass_tolerance {
            return Err(StatsError::validation(format!(
                "density integrates to {total_mass} on [{lower}, {upper}], expected 1"
            )));
        }
        debug!(lower, upper, subintervals, total_mass, "density validated");
        Ok(Self {
            pdf,
            lower,
            upper,
            subintervals,
            total_mass,
        })
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// Density value at `x`; zero outside the support.
    pub fn pdf(&self, x: f64) -> f64 {
        if x < self.lower || x > self.upper {
            0.0
        } else {
            (self.pdf)(x)
        }
    }

    /// Integral of `g(x)·f(x)` over the support.
    fn expectation<G>(&self, g: G) -> f64
    where
        G: Fn(f64) -> f64,
    {
        // The support and subinterval count were checked in the constructor.
        trapezoid_composite(
            |x| g(x) * (self.pdf)(x),
            self.lower,
            self.upper,
            self.subintervals,
        )
        .unwrap_or(f64::NAN)
    }

    /// P(a ≤ X ≤ b). The interval is clipped to the support.
    ///
    /// # Errors
    /// [`StatsError::Validation`] if `a` or `b` is NaN or `a > b`.
    pub fn probability(&self, a: f64, b: f64) -> Result<f64> {
        if a.is_nan() || b.is_nan() || a > b {
            return Err(StatsError::validation(format!(
                "need a ≤ b, got [{a}, {b}]"
            )));
        }
        let lo = a.max(self.lower);
        let hi = b.min(self.upper);
        if lo >= hi {
            return Ok(0.0);
        }
        // Keep the node spacing of the full support.
        let share = (hi - lo) / (self.upper - self.lower);
        let n = ((self.subintervals as f64 * share).ceil() as usize).max(1);
        let mass = trapezoid_composite(&self.pdf, lo, hi, n)?;
        Ok(mass.clamp(0.0, 1.0))
    }

    /// E[X].
    pub fn mean(&self) -> f64 {
        self.expectation(|x| x)
    }

    /// E[(X − E[X])²].
    pub fn variance(&self) -> f64 {
        let mean = self.mean();
        self.expectation(|x| (x - mean) * (x - mean)).max(0.0)
    }

    pub fn summary(&self) -> DensitySummary {
        let mean = self.mean();
        let variance = self.variance();
        DensitySummary {
            lower: self.lower,
            upper: self.upper,
            total_mass: self.total_mass,
            mean,
            variance,
            std_dev: variance.sqrt(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangular(x: f64) -> f64 {
        if x <= 0.5 {
            4.0 * x
        } else {
            4.0 * (1.0 - x)
        }
    }

    #[test]
    fn test_triangular_moments() {
        let d = Density::new(triangular, 0.0, 1.0).unwrap();
        let s = d.summary();
        assert!((s.total_mass - 1.0).abs() < 1e-12);
        assert!((s.mean - 0.5).abs() < 1e-9);
        assert!((s.variance - 1.0 / 24.0).abs() < 1e-9);
        assert!((s.std_dev - (1.0_f64 / 24.0).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_truncated_exponential() {
        let d = Density::new(|x: f64| 2.0 * (-2.0 * x).exp(), 0.0, 40.0).unwrap();
        assert!((d.mean() - 0.5).abs() < 1e-6);
        assert!((d.variance() - 0.25).abs() < 1e-6);
        let p = d.probability(0.0, 1.0).unwrap();
        assert!((p - (1.0 - (-2.0_f64).exp())).abs() < 1e-6);
    }

    #[test]
    fn test_standard_normal_intervals() {
        let phi = |x: f64| (-0.5 * x * x).exp() / (2.0 * std::f64::consts::PI).sqrt();
        let d = Density::new(phi, -10.0, 10.0).unwrap();
        assert!(d.mean().abs() < 1e-12);
        assert!((d.variance() - 1.0).abs() < 1e-8);
        assert!((d.probability(-1.0, 1.0).unwrap() - 0.682_689_492_137_086).abs() < 1e-8);
        assert!((d.probability(-2.0, 2.0).unwrap() - 0.954_499_736_103_642).abs() < 1e-8);
    }

    #[test]
    fn test_probability_clips_to_support() {
        let d = Density::new(triangular, 0.0, 1.0).unwrap();
        assert!((d.probability(-5.0, 5.0).unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(d.probability(0.3, 0.3).unwrap(), 0.0);
        assert_eq!(d.probability(2.0, 3.0).unwrap(), 0.0);
        assert!(d.probability(0.6, 0.2).is_err());
        assert!(d.probability(f64::NAN, 0.2).is_err());
        assert_eq!(d.pdf(1.5), 0.0);
        assert_eq!(d.pdf(0.25), 1.0);
    }

    #[test]
    fn test_rejects_negative_density() {
        // integrates to 1 but f(0) = −1
        let err = Density::new(|x: f64| 4.0 * x - 1.0, 0.0, 1.0).err().unwrap();
        assert!(matches!(err, StatsError::Validation(ref m) if m.contains("negative")));
    }

    #[test]
    fn test_rejects_unnormalized_function() {
        let err = Density::new(|_: f64| 2.0, 0.0, 1.0).err().unwrap();
        assert!(matches!(err, StatsError::Validation(ref m) if m.contains("integrates")));
    }

    #[test]
    fn test_rejects_bad_support() {
        assert!(Density::new(|_: f64| 1.0, 1.0, 0.0).is_err());
        assert!(Density::new(|_: f64| 1.0, 0.0, f64::INFINITY).is_err());
        assert!(Density::with_resolution(|_: f64| 1.0, 0.0, 1.0, 0, 1e-6).is_err());
        assert!(Density::with_resolution(|_: f64| 1.0, 0.0, 1.0, 10, 0.0).is_err());
        assert!(Density::new(|x: f64| 1.0 / x, 0.0, 1.0).is_err());
    }
}
