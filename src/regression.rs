//! Linear regression by ordinary least squares: one predictor with
//! [`LinearFit`], several with [`MultipleFit`].
//!
//! # Examples
//!
//! ```
//! use u_numkit::regression::LinearFit;
//!
//! let x = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let y = [2.1, 3.9, 6.2, 7.8, 10.1];
//! let fit = LinearFit::fit(&x, &y).unwrap();
//! assert!((fit.slope - 1.99).abs() < 1e-12);
//! assert!(fit.metrics.r_squared > 0.99);
//! assert!((fit.predict(6.0) - 11.99).abs() < 1e-9);
//! ```

use serde::Serialize;
use tracing::debug;

use crate::error::{require_finite, Result, StatsError};
use crate::stats;

/// Goodness-of-fit measures of a line against observed data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitMetrics {
    /// 1 − SSE/SST. Constant observations give 1.0 on a perfect fit and
    /// 0.0 otherwise.
    pub r_squared: f64,
    /// SSE / n.
    pub mse: f64,
    pub rmse: f64,
}

/// Fitted line y = intercept + slope·x with its in-sample metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub n: usize,
    pub metrics: FitMetrics,
}

fn check_pairs(xs: &[f64], ys: &[f64], min: usize) -> Result<()> {
    if xs.len() != ys.len() {
        return Err(StatsError::validation(format!(
            "x and y must have the same number of observations ({} vs {})",
            xs.len(),
            ys.len()
        )));
    }
    if xs.len() < min {
        return Err(StatsError::validation(format!(
            "need at least {min} observations, got {}",
            xs.len()
        )));
    }
    require_finite("x", xs)?;
    require_finite("y", ys)
}

impl LinearFit {
    /// Least-squares fit of `ys` on `xs`.
    ///
    /// # Errors
    /// [`StatsError::Validation`] on mismatched lengths, fewer than 3
    /// points, non-finite values, or constant `xs`.
    pub fn fit(xs: &[f64], ys: &[f64]) -> Result<Self> {
        check_pairs(xs, ys, 3)?;
        let (mean_x, mean_y) = match (stats::mean(xs), stats::mean(ys)) {
            (Some(mx), Some(my)) => (mx, my),
            _ => return Err(StatsError::validation("empty input")),
        };
        let sxx = stats::sum_squared_deviations(xs, mean_x).unwrap_or(0.0);
        if sxx == 0.0 {
            return Err(StatsError::validation("x has zero variance"));
        }
        let sxy = stats::kahan_sum(
            &xs.iter()
                .zip(ys)
                .map(|(x, y)| (x - mean_x) * (y - mean_y))
                .collect::<Vec<_>>(),
        );
        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;

        let mut fit = LinearFit {
            slope,
            intercept,
            n: xs.len(),
            metrics: FitMetrics {
                r_squared: 0.0,
                mse: 0.0,
                rmse: 0.0,
            },
        };
        fit.metrics = fit.evaluate(xs, ys)?;
        debug!(
            n = fit.n,
            slope,
            intercept,
            r_squared = fit.metrics.r_squared,
            "linear regression"
        );
        Ok(fit)
    }

    /// Value of the fitted line at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// Observed minus predicted, per point.
    pub fn residuals(&self, xs: &[f64], ys: &[f64]) -> Vec<f64> {
        xs.iter().zip(ys).map(|(&x, &y)| y - self.predict(x)).collect()
    }

    /// Scores the line on `(xs, ys)`, which need not be the training data.
    ///
    /// # Errors
    /// [`StatsError::Validation`] on mismatched lengths, empty input, or
    /// non-finite values.
    pub fn evaluate(&self, xs: &[f64], ys: &[f64]) -> Result<FitMetrics> {
        check_pairs(xs, ys, 1)?;
        Ok(score(ys, &self.residuals(xs, ys)))
    }
}

/// R², MSE and RMSE from observations and their residuals.
fn score(ys: &[f64], residuals: &[f64]) -> FitMetrics {
    let squared: Vec<f64> = residuals.iter().map(|r| r * r).collect();
    let sse = stats::kahan_sum(&squared);
    let mean_y = stats::mean(ys).unwrap_or(0.0);
    let sst = stats::sum_squared_deviations(ys, mean_y).unwrap_or(0.0);
    let r_squared = match (sst == 0.0, sse == 0.0) {
        (false, _) => 1.0 - sse / sst,
        (true, true) => 1.0,
        (true, false) => 0.0,
    };
    let mse = sse / ys.len() as f64;
    FitMetrics {
        r_squared,
        mse,
        rmse: mse.sqrt(),
    }
}

// ============================================================================
// Multiple Linear Regression
// ============================================================================

/// Relative pivot size below which X'X is treated as singular.
const SINGULAR_PIVOT: f64 = 1e-12;

/// Fitted hyperplane y = β₀ + β₁x₁ + … + βₚxₚ with its in-sample metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultipleFit {
    /// Intercept first, then one coefficient per predictor.
    pub coefficients: Vec<f64>,
    pub n: usize,
    /// Number of predictors.
    pub p: usize,
    pub metrics: FitMetrics,
}

fn check_predictors(predictors: &[&[f64]], ys: &[f64]) -> Result<()> {
    if predictors.is_empty() {
        return Err(StatsError::validation("need at least one predictor"));
    }
    for (j, column) in predictors.iter().enumerate() {
        if column.len() != ys.len() {
            return Err(StatsError::validation(format!(
                "predictor {j} has {} observations, y has {}",
                column.len(),
                ys.len()
            )));
        }
        require_finite("predictor", column)?;
    }
    require_finite("y", ys)
}

/// Solves `a·x = b` in place by Gaussian elimination with partial pivoting.
///
/// `a` is row-major `size × size`.
fn solve_linear_system(mut a: Vec<f64>, mut b: Vec<f64>, size: usize) -> Result<Vec<f64>> {
    let scale = a.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    for col in 0..size {
        let pivot_row = (col..size)
            .max_by(|&i, &j| a[i * size + col].abs().total_cmp(&a[j * size + col].abs()))
            .unwrap_or(col);
        let pivot = a[pivot_row * size + col];
        if pivot.abs() <= SINGULAR_PIVOT * scale {
            return Err(StatsError::validation(
                "predictors are collinear; X'X is singular",
            ));
        }
        if pivot_row != col {
            for k in 0..size {
                a.swap(col * size + k, pivot_row * size + k);
            }
            b.swap(col, pivot_row);
        }
        for row in col + 1..size {
            let factor = a[row * size + col] / pivot;
            if factor == 0.0 {
                continue;
            }
            for k in col..size {
                a[row * size + k] -= factor * a[col * size + k];
            }
            b[row] -= factor * b[col];
        }
    }
    let mut x = vec![0.0; size];
    for row in (0..size).rev() {
        let tail: f64 = (row + 1..size).map(|k| a[row * size + k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row * size + row];
    }
    Ok(x)
}

impl MultipleFit {
    /// Least-squares fit of `ys` on the columns in `predictors`.
    ///
    /// An intercept column of ones is prepended to the design matrix X and
    /// the normal equations X'Xβ = X'y are solved directly.
    ///
    /// # Errors
    /// [`StatsError::Validation`] if there are no predictors, lengths
    /// differ, a value is non-finite, there are fewer than p + 1
    /// observations, or the predictors are collinear.
    ///
    /// # Examples
    /// ```
    /// use u_numkit::regression::MultipleFit;
    ///
    /// let x1 = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
    /// let x2 = [2.0, 1.0, 4.0, 3.0, 6.0, 5.0];
    /// let y: Vec<f64> = x1.iter().zip(&x2).map(|(a, b)| 1.0 + 2.0 * a - b).collect();
    /// let fit = MultipleFit::fit(&[&x1, &x2], &y).unwrap();
    /// assert!((fit.coefficients[1] - 2.0).abs() < 1e-9);
    /// assert!((fit.predict(&[10.0, 3.0]).unwrap() - 18.0).abs() < 1e-9);
    /// ```
    pub fn fit(predictors: &[&[f64]], ys: &[f64]) -> Result<Self> {
        check_predictors(predictors, ys)?;
        let p = predictors.len();
        let n = ys.len();
        let cols = p + 1;
        if n < cols {
            return Err(StatsError::validation(format!(
                "need at least {cols} observations for {p} predictors, got {n}"
            )));
        }
        let column = |j: usize, i: usize| if j == 0 { 1.0 } else { predictors[j - 1][i] };

        let mut xtx = vec![0.0; cols * cols];
        let mut xty = vec![0.0; cols];
        for r in 0..cols {
            for c in r..cols {
                let products: Vec<f64> = (0..n).map(|i| column(r, i) * column(c, i)).collect();
                let v = stats::kahan_sum(&products);
                xtx[r * cols + c] = v;
                xtx[c * cols + r] = v;
            }
            let products: Vec<f64> = (0..n).map(|i| column(r, i) * ys[i]).collect();
            xty[r] = stats::kahan_sum(&products);
        }
        let coefficients = solve_linear_system(xtx, xty, cols)?;

        let mut fit = MultipleFit {
            coefficients,
            n,
            p,
            metrics: FitMetrics {
                r_squared: 0.0,
                mse: 0.0,
                rmse: 0.0,
            },
        };
        fit.metrics = fit.evaluate(predictors, ys)?;
        debug!(
            n,
            p,
            r_squared = fit.metrics.r_squared,
            "multiple linear regression"
        );
        Ok(fit)
    }

    /// Prediction for one observation with one value per predictor.
    ///
    /// # Errors
    /// [`StatsError::Validation`] if `row` does not have `p` values.
    pub fn predict(&self, row: &[f64]) -> Result<f64> {
        if row.len() != self.p {
            return Err(StatsError::validation(format!(
                "expected {} predictor values, got {}",
                self.p,
                row.len()
            )));
        }
        Ok(self.coefficients[0]
            + self.coefficients[1..]
                .iter()
                .zip(row)
                .map(|(b, x)| b * x)
                .sum::<f64>())
    }

    /// Scores the fit on column-wise `predictors` and `ys`.
    ///
    /// # Errors
    /// [`StatsError::Validation`] on a predictor count other than `p`,
    /// mismatched lengths, empty input, or non-finite values.
    pub fn evaluate(&self, predictors: &[&[f64]], ys: &[f64]) -> Result<FitMetrics> {
        check_predictors(predictors, ys)?;
        if predictors.len() != self.p {
            return Err(StatsError::validation(format!(
                "expected {} predictors, got {}",
                self.p,
                predictors.len()
            )));
        }
        if ys.is_empty() {
            return Err(StatsError::validation("empty input"));
        }
        let mut residuals = Vec::with_capacity(ys.len());
        for (i, &y) in ys.iter().enumerate() {
            let row: Vec<f64> = predictors.iter().map(|column| column[i]).collect();
            residuals.push(y - self.predict(&row)?);
        }
        Ok(score(ys, &residuals))
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn r_squared_in_unit_interval(
            ys in proptest::collection::vec(-100.0_f64..100.0, 3..30),
        ) {
            let xs: Vec<f64> = (0..ys.len()).map(|i| i as f64).collect();
            let fit = LinearFit::fit(&xs, &ys).unwrap();
            prop_assert!(fit.metrics.r_squared >= -1e-9);
            prop_assert!(fit.metrics.r_squared <= 1.0 + 1e-9);
            prop_assert!(fit.metrics.mse >= 0.0);
        }

        #[test]
        fn line_passes_through_centroid(
            ys in proptest::collection::vec(-100.0_f64..100.0, 3..30),
        ) {
            let xs: Vec<f64> = (0..ys.len()).map(|i| (i as f64).sqrt()).collect();
            let fit = LinearFit::fit(&xs, &ys).unwrap();
            let mx = xs.iter().sum::<f64>() / xs.len() as f64;
            let my = ys.iter().sum::<f64>() / ys.len() as f64;
            prop_assert!((fit.predict(mx) - my).abs() < 1e-8);
        }

        #[test]
        fn multiple_residuals_orthogonal_to_predictors(
            ys in proptest::collection::vec(-100.0_f64..100.0, 6..30),
        ) {
            let x1: Vec<f64> = (0..ys.len()).map(|i| i as f64).collect();
            let x2: Vec<f64> = (0..ys.len()).map(|i| ((i * 7) % 5) as f64).collect();
            let fit = MultipleFit::fit(&[&x1, &x2], &ys).unwrap();
            let residuals: Vec<f64> = (0..ys.len())
                .map(|i| ys[i] - fit.predict(&[x1[i], x2[i]]).unwrap())
                .collect();
            prop_assert!(residuals.iter().sum::<f64>().abs() < 1e-7);
            let dot: f64 = residuals.iter().zip(&x1).map(|(r, x)| r * x).sum();
            prop_assert!(dot.abs() < 1e-6);
            prop_assert!(fit.metrics.r_squared <= 1.0 + 1e-9);
        }
    }
}
