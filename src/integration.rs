//! Trapezoidal quadrature.
//!
//! # Examples
//!
//! ```
//! use u_numkit::integration::trapezoid_composite;
//!
//! let area = trapezoid_composite(|x| x * x, 0.0, 1.0, 1000).unwrap();
//! assert!((area - 1.0 / 3.0).abs() < 1e-6);
//! ```

use tracing::debug;

use crate::error::{require_finite, Result, StatsError};

fn check_bounds(a: f64, b: f64) -> Result<()> {
    if a.is_finite() && b.is_finite() {
        Ok(())
    } else {
        Err(StatsError::validation(format!(
            "integration bounds must be finite, got [{a}, {b}]"
        )))
    }
}

/// Single trapezoid: (b − a)·(f(a) + f(b))/2.
pub fn trapezoid_simple<F>(f: F, a: f64, b: f64) -> Result<f64>
where
    F: Fn(f64) -> f64,
{
    check_bounds(a, b)?;
    Ok((b - a) * (f(a) + f(b)) / 2.0)
}

/// Composite trapezoidal rule over `n` equal subintervals.
///
/// Exact for linear integrands; the error for smooth `f` shrinks as
/// O(h²) with h = (b − a)/n. Reversed bounds give the negated integral.
///
/// # Errors
/// [`StatsError::Validation`] if `n == 0` or a bound is not finite.
pub fn trapezoid_composite<F>(f: F, a: f64, b: f64, n: usize) -> Result<f64>
where
    F: Fn(f64) -> f64,
{
    check_bounds(a, b)?;
    if n == 0 {
        return Err(StatsError::validation("need at least one subinterval"));
    }
    let h = (b - a) / n as f64;
    let interior: f64 = (1..n).map(|i| f(a + i as f64 * h)).sum();
    let area = h * ((f(a) + f(b)) / 2.0 + interior);
    debug!(a, b, n, area, "trapezoid composite");
    Ok(area)
}

/// Trapezoidal rule over tabulated points `(xs[i], ys[i])`.
///
/// Spacing may be uneven. Integrating a speed table over its time stamps
/// gives the distance covered.
///
/// # Errors
/// [`StatsError::Validation`] if the slices differ in length, hold fewer
/// than two points, or contain non-finite values.
///
/// # Examples
/// ```
/// use u_numkit::integration::trapezoid_samples;
///
/// // seconds and m/s
/// let t = [0.0, 10.0, 20.0];
/// let v = [0.0, 10.0, 20.0];
/// assert_eq!(trapezoid_samples(&t, &v).unwrap(), 200.0);
/// ```
pub fn trapezoid_samples(xs: &[f64], ys: &[f64]) -> Result<f64> {
    if xs.len() != ys.len() {
        return Err(StatsError::validation(format!(
            "x and y must have the same length ({} vs {})",
            xs.len(),
            ys.len()
        )));
    }
    if xs.len() < 2 {
        return Err(StatsError::validation(format!(
            "need at least 2 points, got {}",
            xs.len()
        )));
    }
    require_finite("x", xs)?;
    require_finite("y", ys)?;

    let area = xs
        .windows(2)
        .zip(ys.windows(2))
        .map(|(x, y)| (y[0] + y[1]) * (x[1] - x[0]) / 2.0)
        .sum();
    Ok(area)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_single_trapezoid() {
        assert_eq!(trapezoid_simple(|x| x * x, 0.0, 2.0).unwrap(), 4.0);
        assert_eq!(trapezoid_simple(|x| 2.0 * x + 1.0, 0.0, 3.0).unwrap(), 12.0);
    }

    #[test]
    fn test_composite_two_panels() {
        let area = trapezoid_composite(|x| x * x, 0.0, 2.0, 2).unwrap();
        assert!((area - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_composite_fresnel_integral() {
        // S(1) for the Fresnel sine integral
        let area = trapezoid_composite(
            |t| (std::f64::consts::PI * t * t / 2.0).sin(),
            0.0,
            1.0,
            1000,
        )
        .unwrap();
        assert!((area - 0.438_259_147_390_354_8).abs() < 1e-5);
    }

    #[test]
    fn test_composite_reversed_bounds() {
        let fwd = trapezoid_composite(f64::exp, 0.0, 1.0, 64).unwrap();
        let rev = trapezoid_composite(f64::exp, 1.0, 0.0, 64).unwrap();
        assert!((fwd + rev).abs() < 1e-12);
    }

    #[test]
    fn test_composite_rejects_zero_panels() {
        assert!(matches!(
            trapezoid_composite(|x| x, 0.0, 1.0, 0),
            Err(StatsError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_infinite_bounds() {
        assert!(trapezoid_simple(|x| x, 0.0, f64::INFINITY).is_err());
        assert!(trapezoid_composite(|x| x, f64::NAN, 1.0, 4).is_err());
    }

    #[test]
    fn test_samples_speed_table_distance() {
        let seconds = [0.0, 10.0, 20.0];
        let kmh = [0.0, 36.0, 72.0];
        let metres = trapezoid_samples(&seconds, &kmh).unwrap() * 1000.0 / 3600.0;
        assert!((metres - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_samples_uneven_spacing() {
        let x = [0.0, 1.0, 3.0];
        let y = [1.0, 1.0, 1.0];
        assert_eq!(trapezoid_samples(&x, &y).unwrap(), 3.0);
    }

    #[test]
    fn test_samples_validation() {
        assert!(trapezoid_samples(&[0.0, 1.0], &[1.0]).is_err());
        assert!(trapezoid_samples(&[0.0], &[1.0]).is_err());
        assert!(trapezoid_samples(&[0.0, f64::NAN], &[1.0, 2.0]).is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn composite_exact_for_lines(
            m in -10.0_f64..10.0,
            c in -10.0_f64..10.0,
            a in -5.0_f64..5.0,
            len in 0.1_f64..10.0,
            n in 1_usize..50,
        ) {
            let b = a + len;
            let exact = m * (b * b - a * a) / 2.0 + c * len;
            let area = trapezoid_composite(|x| m * x + c, a, b, n).unwrap();
            prop_assert!((area - exact).abs() < 1e-9 * (1.0 + exact.abs()));
        }

        #[test]
        fn samples_agree_with_composite(n in 1_usize..40) {
            let xs: Vec<f64> = (0..=n).map(|i| i as f64 / n as f64).collect();
            let ys: Vec<f64> = xs.iter().map(|x| x.exp()).collect();
            let tabulated = trapezoid_samples(&xs, &ys).unwrap();
            let composite = trapezoid_composite(f64::exp, 0.0, 1.0, n).unwrap();
            prop_assert!((tabulated - composite).abs() < 1e-12);
        }
    }
}
