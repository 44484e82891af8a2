//! Root finding for scalar functions.
//!
//! - [`bisection`]: bracketing, guaranteed linear convergence.
//! - [`newton`]: Newton–Raphson, quadratic convergence near simple roots.
//! - [`fixed_point`]: iteration of x = g(x), linear convergence when
//!   |g′| < 1 near the fixed point.
//!
//! All return a [`Root`] with the iteration count, and report exhaustion
//! of the iteration budget as [`StatsError::Convergence`].
//!
//! # Examples
//!
//! ```
//! use u_numkit::roots::bisection;
//!
//! let root = bisection(|x| x * x * x - x - 2.0, 1.0, 2.0, 1e-6, 100).unwrap();
//! assert!((root.value - 1.5214).abs() < 1e-4);
//! ```

use serde::Serialize;
use tracing::{debug, trace};

use crate::config::AnalysisConfig;
use crate::error::{require_positive, Result, StatsError};

/// |f′(x)| below this stops Newton's method.
const MIN_DERIVATIVE: f64 = 1e-10;

/// Approximate root and the number of iterations spent on it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Root {
    pub value: f64,
    pub iterations: usize,
}

/// Bisection on `[a, b]`.
///
/// Halves the bracket until its width drops below `tolerance` or the
/// midpoint is an exact zero, then returns the midpoint. An endpoint that
/// is already an exact zero is returned immediately.
///
/// # Errors
/// - [`StatsError::Validation`] if `f(a)` and `f(b)` have the same sign,
///   the bounds are not finite, or `tolerance ≤ 0`.
/// - [`StatsError::Convergence`] if `max_iterations` is reached first.
pub fn bisection<F>(f: F, a: f64, b: f64, tolerance: f64, max_iterations: usize) -> Result<Root>
where
    F: Fn(f64) -> f64,
{
    require_positive("tolerance", tolerance)?;
    if !a.is_finite() || !b.is_finite() {
        return Err(StatsError::validation(format!(
            "bracket bounds must be finite, got [{a}, {b}]"
        )));
    }
    let (mut lo, mut hi) = if a <= b { (a, b) } else { (b, a) };
    let mut f_lo = f(lo);
    let f_hi = f(hi);
    if f_lo == 0.0 {
        return Ok(Root { value: lo, iterations: 0 });
    }
    if f_hi == 0.0 {
        return Ok(Root { value: hi, iterations: 0 });
    }
    if f_lo * f_hi > 0.0 || f_lo.is_nan() || f_hi.is_nan() {
        return Err(StatsError::validation(format!(
            "f must change sign on [{lo}, {hi}]: f(a)={f_lo}, f(b)={f_hi}"
        )));
    }

    let mut iterations = 0;
    while (hi - lo).abs() >= tolerance {
        if iterations == max_iterations {
            return Err(StatsError::Convergence {
                method: "bisection",
                iterations,
            });
        }
        let mid = 0.5 * (lo + hi);
        let f_mid = f(mid);
        iterations += 1;
        trace!(iterations, lo, hi, mid, f_mid, "bisection step");
        if f_mid == 0.0 {
            lo = mid;
            hi = mid;
            break;
        }
        if f_lo * f_mid < 0.0 {
            hi = mid;
        } else {
            lo = mid;
            f_lo = f_mid;
        }
    }

    let value = 0.5 * (lo + hi);
    debug!(value, iterations, "bisection converged");
    Ok(Root { value, iterations })
}

/// Newton–Raphson iteration xₙ₊₁ = xₙ − f(xₙ)/f′(xₙ) from `x0`.
///
/// Stops when |xₙ₊₁ − xₙ| < `tolerance`.
///
/// # Errors
/// - [`StatsError::Validation`] if `x0` is not finite, `tolerance ≤ 0`, or
///   |f′(x)| < 1e-10 (or NaN) at some iterate.
/// - [`StatsError::Convergence`] if an iterate is not finite or
///   `max_iterations` is reached first. `iterations` is the step that failed.
///
/// # Examples
/// ```
/// use u_numkit::roots::newton;
///
/// let root = newton(|x| x * x - 2.0, |x| 2.0 * x, 1.0, 1e-12, 50).unwrap();
/// assert!((root.value - 2f64.sqrt()).abs() < 1e-12);
/// ```
pub fn newton<F, D>(f: F, df: D, x0: f64, tolerance: f64, max_iterations: usize) -> Result<Root>
where
    F: Fn(f64) -> f64,
    D: Fn(f64) -> f64,
{
    require_positive("tolerance", tolerance)?;
    if !x0.is_finite() {
        return Err(StatsError::validation(format!(
            "initial guess must be finite, got {x0}"
        )));
    }

    let mut x = x0;
    for iteration in 1..=max_iterations {
        let slope = df(x);
        if slope.is_nan() || slope.abs() < MIN_DERIVATIVE {
            debug!(x, slope, iteration, "newton: derivative vanished");
            return Err(StatsError::validation(format!(
                "derivative is near zero at x = {x} (f'(x) = {slope})"
            )));
        }
        let next = x - f(x) / slope;
        trace!(iteration, x, next, "newton step");
        if !next.is_finite() {
            debug!(x, iteration, "newton: iterate left the finite range");
            return Err(StatsError::Convergence {
                method: "newton",
                iterations: iteration,
            });
        }
        if (next - x).abs() < tolerance {
            debug!(value = next, iterations = iteration, "newton converged");
            return Ok(Root {
                value: next,
                iterations: iteration,
            });
        }
        x = next;
    }

    Err(StatsError::Convergence {
        method: "newton",
        iterations: max_iterations,
    })
}

/// Fixed-point iteration xₙ₊₁ = g(xₙ) from `x0`.
///
/// Stops when |xₙ₊₁ − xₙ| ≤ `tolerance` and returns xₙ₊₁. A root of f is
/// found by rewriting f(x) = 0 as x = g(x); the iteration converges when
/// |g′| < 1 around the fixed point.
///
/// # Errors
/// - [`StatsError::Validation`] if `x0` is not finite or `tolerance ≤ 0`.
/// - [`StatsError::Convergence`] if an iterate is not finite or
///   `max_iterations` is reached first.
///
/// # Examples
/// ```
/// use u_numkit::roots::fixed_point;
///
/// // cos(x) − 5x + 1 = 0 rewritten as x = (cos(x) + 1) / 5
/// let root = fixed_point(|x| (x.cos() + 1.0) / 5.0, 0.5, 1e-6, 100).unwrap();
/// assert!((root.value.cos() - 5.0 * root.value + 1.0).abs() < 1e-5);
/// ```
pub fn fixed_point<G>(g: G, x0: f64, tolerance: f64, max_iterations: usize) -> Result<Root>
where
    G: Fn(f64) -> f64,
{
    require_positive("tolerance", tolerance)?;
    if !x0.is_finite() {
        return Err(StatsError::validation(format!(
            "initial guess must be finite, got {x0}"
        )));
    }

    let mut x = x0;
    for iteration in 1..=max_iterations {
        let next = g(x);
        trace!(iteration, x, next, "fixed-point step");
        if !next.is_finite() {
            debug!(x, iteration, "fixed point: iterate left the finite range");
            return Err(StatsError::Convergence {
                method: "fixed_point",
                iterations: iteration,
            });
        }
        if (next - x).abs() <= tolerance {
            debug!(value = next, iterations = iteration, "fixed point converged");
            return Ok(Root {
                value: next,
                iterations: iteration,
            });
        }
        x = next;
    }

    Err(StatsError::Convergence {
        method: "fixed_point",
        iterations: max_iterations,
    })
}

/// [`bisection`] with the tolerance and iteration cap from `config`.
pub fn bisection_with_config<F>(f: F, a: f64, b: f64, config: &AnalysisConfig) -> Result<Root>
where
    F: Fn(f64) -> f64,
{
    bisection(f, a, b, config.bisection_tolerance, config.max_iterations)
}

/// [`newton`] with the tolerance and iteration cap from `config`.
pub fn newton_with_config<F, D>(f: F, df: D, x0: f64, config: &AnalysisConfig) -> Result<Root>
where
    F: Fn(f64) -> f64,
    D: Fn(f64) -> f64,
{
    newton(f, df, x0, config.newton_tolerance, config.max_iterations)
}

/// [`fixed_point`] with the tolerance and iteration cap from `config`.
pub fn fixed_point_with_config<G>(g: G, x0: f64, config: &AnalysisConfig) -> Result<Root>
where
    G: Fn(f64) -> f64,
{
    fixed_point(g, x0, config.fixed_point_tolerance, config.max_iterations)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cubic(x: f64) -> f64 {
        x * x * x - x - 2.0
    }

    #[test]
    fn test_bisection_cubic() {
        let root = bisection(cubic, 1.0, 2.0, 1e-6, 100).unwrap();
        assert!((root.value - 1.521_379_706_8).abs() < 1e-6);
        assert_eq!(root.iterations, 20);
    }

    #[test]
    fn test_bisection_reversed_bracket() {
        let root = bisection(cubic, 2.0, 1.0, 1e-6, 100).unwrap();
        assert!((root.value - 1.521_379_706_8).abs() < 1e-6);
    }

    #[test]
    fn test_bisection_exact_midpoint() {
        let root = bisection(|x| x, -1.0, 1.0, 1e-6, 100).unwrap();
        assert_eq!(root.value, 0.0);
        assert_eq!(root.iterations, 1);
    }

    #[test]
    fn test_bisection_endpoint_root() {
        let root = bisection(|x| x - 1.0, 1.0, 3.0, 1e-6, 100).unwrap();
        assert_eq!(root.value, 1.0);
        assert_eq!(root.iterations, 0);
    }

    #[test]
    fn test_bisection_no_sign_change() {
        assert!(matches!(
            bisection(|x| x * x + 1.0, -1.0, 1.0, 1e-6, 100),
            Err(StatsError::Validation(_))
        ));
    }

    #[test]
    fn test_bisection_iteration_cap() {
        assert!(matches!(
            bisection(cubic, 1.0, 2.0, 1e-12, 5),
            Err(StatsError::Convergence { method: "bisection", iterations: 5 })
        ));
    }

    #[test]
    fn test_newton_cubic() {
        let root = newton(cubic, |x| 3.0 * x * x - 1.0, 1.5, 1e-10, 50).unwrap();
        assert!((root.value - 1.521_379_706_804_568).abs() < 1e-10);
        assert!(root.iterations < 10);
    }

    #[test]
    fn test_newton_flat_derivative() {
        let err = newton(|x| x * x + 1.0, |x| 2.0 * x, 0.0, 1e-6, 50).unwrap_err();
        assert!(matches!(err, StatsError::Validation(_)), "{err:?}");
    }

    #[test]
    fn test_newton_flat_derivative_after_steps() {
        // x² + 1 from 1 lands on x = 0 after one step
        let err = newton(|x| x * x + 1.0, |x| 2.0 * x, 1.0, 1e-6, 50).unwrap_err();
        assert!(matches!(err, StatsError::Validation(_)), "{err:?}");
    }

    #[test]
    fn test_newton_non_finite_iterate_reports_its_step() {
        // f(x)/f'(x) = f64::MAX / 1e-5 overflows on the first step
        let err = newton(|_| f64::MAX, |_| 1e-5, 0.0, 1e-12, 50).unwrap_err();
        assert!(
            matches!(err, StatsError::Convergence { method: "newton", iterations: 1 }),
            "{err:?}"
        );
    }

    #[test]
    fn test_newton_cycles_without_converging() {
        // x³ − 2x + 2 from 0 oscillates between 0 and 1.
        let err = newton(|x| x * x * x - 2.0 * x + 2.0, |x| 3.0 * x * x - 2.0, 0.0, 1e-8, 30)
            .unwrap_err();
        assert!(matches!(
            err,
            StatsError::Convergence { method: "newton", iterations: 30 }
        ));
    }

    #[test]
    fn test_fixed_point_cosine() {
        let root = fixed_point(|x| (x.cos() + 1.0) / 5.0, 0.5, 1e-6, 100).unwrap();
        assert!((root.value - 0.385_334_8).abs() < 1e-6);
        assert!(root.iterations > 1 && root.iterations < 20);
    }

    #[test]
    fn test_fixed_point_already_fixed() {
        let root = fixed_point(|x| x, 3.0, 1e-9, 10).unwrap();
        assert_eq!(root.value, 3.0);
        assert_eq!(root.iterations, 1);
    }

    #[test]
    fn test_fixed_point_divergent_map() {
        // |g'| = 2 pushes iterates away from the fixed point at 0.
        assert!(matches!(
            fixed_point(|x| 2.0 * x, 1.0, 1e-9, 25),
            Err(StatsError::Convergence { method: "fixed_point", iterations: 25 })
        ));
        assert!(matches!(
            fixed_point(|x| x * x, 10.0, 1e-9, 50),
            Err(StatsError::Convergence { method: "fixed_point", iterations: 9 })
        ));
    }

    #[test]
    fn test_fixed_point_rejects_bad_input() {
        assert!(matches!(
            fixed_point(|x| x, f64::NAN, 1e-6, 10),
            Err(StatsError::Validation(_))
        ));
        assert!(fixed_point(|x| x, 1.0, 0.0, 10).is_err());
    }

    #[test]
    fn test_with_config() {
        let cfg = AnalysisConfig::default();
        let b = bisection_with_config(cubic, 1.0, 2.0, &cfg).unwrap();
        let n = newton_with_config(cubic, |x| 3.0 * x * x - 1.0, 2.0, &cfg).unwrap();
        assert!((b.value - n.value).abs() < 1e-5);
        let g = fixed_point_with_config(|x| (x + 2.0).cbrt(), 1.0, &cfg).unwrap();
        assert!((g.value - b.value).abs() < 1e-5);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn bisection_finds_linear_root(r in -100.0_f64..100.0, width in 0.5_f64..50.0) {
            let root = bisection(|x| x - r, r - width, r + 2.0 * width, 1e-9, 200).unwrap();
            prop_assert!((root.value - r).abs() < 1e-8);
        }

        #[test]
        fn newton_finds_square_roots(s in 0.01_f64..1e4) {
            let root = newton(|x| x * x - s, |x| 2.0 * x, s.max(1.0), 1e-12, 100).unwrap();
            prop_assert!((root.value - s.sqrt()).abs() < 1e-9 * s.sqrt().max(1.0));
        }

        #[test]
        fn fixed_point_of_contraction(a in -0.9_f64..0.9, c in -50.0_f64..50.0) {
            // g(x) = a·x + c has its fixed point at c / (1 − a)
            let root = fixed_point(|x| a * x + c, 0.0, 1e-12, 1_000).unwrap();
            let exact = c / (1.0 - a);
            prop_assert!((root.value - exact).abs() < 1e-9 * exact.abs().max(1.0));
        }
    }
}
