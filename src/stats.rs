//! Descriptive statistics with numerical stability guarantees.
//!
//! These are the `Option`-returning building blocks underneath
//! [`Sample`](crate::sample::Sample) and the hypothesis tests. They never
//! panic: empty input or non-finite values yield `None`.
//!
//! # Algorithms
//!
//! - **Sums/means**: Neumaier compensated summation.
//! - **Variance**: Welford's online algorithm (ddof = 1 for the sample form).
//!   Reference: Welford (1962), *Technometrics* 4(3).
//! - **Quantile**: R-7 linear interpolation, as in NumPy's default
//!   `percentile`. Reference: Hyndman & Fan (1996).

use std::cmp::Ordering;

/// Neumaier compensated summation.
///
/// # Examples
/// ```
/// use u_numkit::stats::kahan_sum;
/// let v = [1e16, 1.0, -1e16];
/// assert_eq!(kahan_sum(&v), 1.0);
/// ```
pub fn kahan_sum(data: &[f64]) -> f64 {
    let (sum, compensation) = data.iter().fold((0.0_f64, 0.0_f64), |(sum, c), &x| {
        let t = sum + x;
        let c = if sum.abs() >= x.abs() {
            c + ((sum - t) + x)
        } else {
            c + ((x - t) + sum)
        };
        (t, c)
    });
    sum + compensation
}

/// Arithmetic mean.
///
/// # Returns
/// `None` if `data` is empty or contains NaN/Inf.
///
/// # Examples
/// ```
/// use u_numkit::stats::mean;
/// assert_eq!(mean(&[1.0, 2.0, 3.0, 4.0]), Some(2.5));
/// assert_eq!(mean(&[]), None);
/// ```
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() || !data.iter().all(|x| x.is_finite()) {
        return None;
    }
    Some(kahan_sum(data) / data.len() as f64)
}

/// Sample variance with Bessel's correction (denominator `n − 1`).
///
/// # Returns
/// `None` if fewer than 2 values or any NaN/Inf.
///
/// # Examples
/// ```
/// use u_numkit::stats::variance;
/// let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
/// assert!((variance(&v).unwrap() - 32.0 / 7.0).abs() < 1e-12);
/// ```
pub fn variance(data: &[f64]) -> Option<f64> {
    if data.len() < 2 || !data.iter().all(|x| x.is_finite()) {
        return None;
    }
    let acc: RunningMoments = data.iter().copied().collect();
    acc.sample_variance()
}

/// Sample standard deviation, `√variance`.
pub fn std_dev(data: &[f64]) -> Option<f64> {
    variance(data).map(f64::sqrt)
}

/// Σ(xᵢ − center)², the building block of every sum-of-squares table.
///
/// Returns `None` for empty input or non-finite values.
pub fn sum_squared_deviations(data: &[f64], center: f64) -> Option<f64> {
    if data.is_empty() || !data.iter().all(|x| x.is_finite()) || !center.is_finite() {
        return None;
    }
    let squares: Vec<f64> = data.iter().map(|&x| (x - center) * (x - center)).collect();
    Some(kahan_sum(&squares))
}

/// Smallest value, `None` if empty or any NaN.
pub fn min(data: &[f64]) -> Option<f64> {
    extreme(data, f64::min)
}

/// Largest value, `None` if empty or any NaN.
pub fn max(data: &[f64]) -> Option<f64> {
    extreme(data, f64::max)
}

fn extreme(data: &[f64], pick: fn(f64, f64) -> f64) -> Option<f64> {
    let (first, rest) = data.split_first()?;
    if data.iter().any(|x| x.is_nan()) {
        return None;
    }
    Some(rest.iter().copied().fold(*first, pick))
}

/// Median (average of the two middle values for even lengths).
///
/// # Examples
/// ```
/// use u_numkit::stats::median;
/// assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
/// assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
/// ```
pub fn median(data: &[f64]) -> Option<f64> {
    quantile(data, 0.5)
}

/// `p`-th quantile using R-7 linear interpolation.
///
/// # Returns
/// `None` if `data` is empty, `p ∉ [0, 1]`, or data contains NaN.
///
/// # Examples
/// ```
/// use u_numkit::stats::quantile;
/// let data = [1.0, 2.0, 3.0, 4.0, 5.0];
/// assert_eq!(quantile(&data, 0.25), Some(2.0));
/// assert_eq!(quantile(&data, 1.0), Some(5.0));
/// ```
pub fn quantile(data: &[f64], p: f64) -> Option<f64> {
    if data.is_empty() || !(0.0..=1.0).contains(&p) || data.iter().any(|x| x.is_nan()) {
        return None;
    }
    let mut sorted = data.to_vec();
    sorted.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    quantile_sorted(&sorted, p)
}

/// R-7 quantile on data the caller guarantees is sorted ascending.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 || !(0.0..=1.0).contains(&p) {
        return None;
    }
    let h = (n - 1) as f64 * p;
    let j = h.floor() as usize;
    let g = h - h.floor();
    match sorted.get(j + 1) {
        Some(&next) => Some((1.0 - g) * sorted[j] + g * next),
        None => Some(sorted[n - 1]),
    }
}

/// Sample covariance (denominator `n − 1`).
///
/// # Returns
/// `None` if lengths differ, fewer than 2 pairs, or any NaN/Inf.
pub fn covariance(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len();
    if n != y.len() || n < 2 {
        return None;
    }
    let mx = mean(x)?;
    let my = mean(y)?;
    let products: Vec<f64> = x.iter().zip(y).map(|(&a, &b)| (a - mx) * (b - my)).collect();
    Some(kahan_sum(&products) / (n - 1) as f64)
}

/// Streaming mean/variance accumulator (Welford).
///
/// # Examples
/// ```
/// use u_numkit::stats::RunningMoments;
/// let acc: RunningMoments = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0].into_iter().collect();
/// assert!((acc.mean().unwrap() - 5.0).abs() < 1e-12);
/// assert!((acc.population_variance().unwrap() - 4.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RunningMoments {
    count: u64,
    mean: f64,
    m2: f64,
}

impl RunningMoments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one observation.
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then_some(self.mean)
    }

    /// Variance with denominator `n − 1`; `None` below two observations.
    pub fn sample_variance(&self) -> Option<f64> {
        (self.count > 1).then(|| self.m2 / (self.count - 1) as f64)
    }

    /// Variance with denominator `n`; `None` when empty.
    pub fn population_variance(&self) -> Option<f64> {
        (self.count > 0).then(|| self.m2 / self.count as f64)
    }
}

impl FromIterator<f64> for RunningMoments {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut acc = Self::new();
        for x in iter {
            acc.push(x);
        }
        acc
    }
}
