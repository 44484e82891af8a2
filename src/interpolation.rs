//! Polynomial interpolation through tabulated points.

use crate::error::{require_finite, Result, StatsError};

/// Evaluates the Lagrange interpolating polynomial through
/// `(xs[i], ys[i])` at `x`.
///
/// With n nodes the polynomial has degree at most n − 1 and passes through
/// every node exactly. Nodes need not be sorted.
///
/// # Errors
/// [`StatsError::Validation`] if the slices are empty or differ in
/// length, a value is not finite, or two nodes coincide.
///
/// # Examples
/// ```
/// use u_numkit::interpolation::lagrange;
///
/// // specific heat of water against temperature
/// let t = [20.0, 25.0, 30.0, 35.0];
/// let cp = [0.99907, 0.99852, 0.99826, 0.99818];
/// let at = lagrange(&t, &cp, 27.5).unwrap();
/// assert!((at - 0.998_360_625).abs() < 1e-12);
/// ```
pub fn lagrange(xs: &[f64], ys: &[f64], x: f64) -> Result<f64> {
    if xs.is_empty() {
        return Err(StatsError::validation("need at least one node"));
    }
    if xs.len() != ys.len() {
        return Err(StatsError::validation(format!(
            "x and y must have the same length ({} vs {})",
            xs.len(),
            ys.len()
        )));
    }
    require_finite("x nodes", xs)?;
    require_finite("y values", ys)?;
    if !x.is_finite() {
        return Err(StatsError::validation(format!(
            "evaluation point must be finite, got {x}"
        )));
    }
    for (i, xi) in xs.iter().enumerate() {
        if xs[i + 1..].contains(xi) {
            return Err(StatsError::validation(format!("duplicate node x = {xi}")));
        }
    }

    let value = xs
        .iter()
        .zip(ys)
        .enumerate()
        .map(|(i, (&xi, &yi))| {
            let basis: f64 = xs
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, &xj)| (x - xj) / (xi - xj))
                .product();
            yi * basis
        })
        .sum();
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passes_through_nodes() {
        let xs = [0.0, 1.0, 3.0];
        let ys = [2.0, -1.0, 5.0];
        for (x, y) in xs.iter().zip(&ys) {
            assert!((lagrange(&xs, &ys, *x).unwrap() - y).abs() < 1e-12);
        }
    }

    #[test]
    fn test_reproduces_quadratic() {
        let f = |x: f64| 3.0 * x * x - 2.0 * x + 1.0;
        let xs = [-1.0, 0.5, 2.0];
        let ys: Vec<f64> = xs.iter().map(|&x| f(x)).collect();
        assert!((lagrange(&xs, &ys, 1.25).unwrap() - f(1.25)).abs() < 1e-12);
    }

    #[test]
    fn test_single_node_is_constant() {
        assert_eq!(lagrange(&[4.0], &[7.0], -100.0).unwrap(), 7.0);
    }

    #[test]
    fn test_specific_heat_table() {
        let t = [20.0, 25.0, 30.0, 35.0];
        let cp = [0.99907, 0.99852, 0.99826, 0.99818];
        assert!((lagrange(&t, &cp, 28.0).unwrap() - 0.998_336_24).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(lagrange(&[], &[], 1.0).is_err());
        assert!(lagrange(&[1.0, 2.0], &[1.0], 1.0).is_err());
        assert!(lagrange(&[1.0, 1.0], &[1.0, 2.0], 1.5).is_err());
        assert!(lagrange(&[1.0, 2.0], &[1.0, 2.0], f64::NAN).is_err());
    }
}
