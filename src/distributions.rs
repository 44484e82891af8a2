//! Probability distributions.
//!
//! Discrete counting distributions with exact point masses, plus the normal
//! distribution and classical (equally likely outcomes) probability.
//!
//! # Supported Distributions
//!
//! | Distribution | Parameters | Mean | Variance |
//! |---|---|---|---|
//! | [`Binomial`] | n, p | np | np(1−p) |
//! | [`Poisson`] | λ | λ | λ |
//! | [`Normal`] | μ, σ | μ | σ² |
//!
//! # Design Notes
//!
//! Point masses are evaluated in log space with Loader's saddle-point form
//! (see [`special::binomial_ln_pmf`]), so large counts neither overflow nor
//! lose precision. Cumulative sums run from `k` away from the mode and stop
//! once the terms no longer change the total, so their cost depends on the
//! spread of the distribution rather than on `k`. Survival functions are
//! defined as `1 − cdf`.
//!
//! Integer parameters are `u64`. The `*_from_f64` constructors accept a
//! real value and reject fractional input with
//! [`StatsError::NotAnInteger`].

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::error::{integer_from_f64, require_positive, Result, StatsError};
use crate::special;

/// Terms below this fraction of the running total end a tail sum.
const TAIL_EPSILON: f64 = 1e-20;

/// Sums `mass` over `indices`, along which it must be non-increasing,
/// stopping at the first term that no longer moves the total.
fn sum_decreasing<I, F>(indices: I, mass: F) -> f64
where
    I: Iterator<Item = u64>,
    F: Fn(u64) -> f64,
{
    let mut total = 0.0;
    for i in indices {
        let term = mass(i);
        if term <= TAIL_EPSILON * total {
            break;
        }
        total += term;
    }
    total
}

// ============================================================================
// Binomial Distribution
// ============================================================================

/// Binomial distribution B(n, p): successes in `n` independent trials.
///
/// # Mathematical Definition
/// - PMF: P(X=k) = C(n,k)·pᵏ·(1−p)ⁿ⁻ᵏ
/// - Mean: np
/// - Variance: np(1−p)
///
/// # Examples
/// ```
/// use u_numkit::distributions::Binomial;
///
/// let b = Binomial::new(5, 0.75).unwrap();
/// assert!((b.pmf(5).unwrap() - 0.2373046875).abs() < 1e-12);
/// assert_eq!(b.mean(), 3.75);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Binomial {
    n: u64,
    p: f64,
}

impl Binomial {
    /// Creates B(n, p).
    ///
    /// # Errors
    /// [`StatsError::Validation`] if `p ∉ [0, 1]`.
    pub fn new(n: u64, p: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&p) {
            return Err(StatsError::validation(format!(
                "success probability must lie in [0, 1], got {p}"
            )));
        }
        Ok(Self { n, p })
    }

    /// Creates B(n, p) from a real-valued trial count.
    ///
    /// # Errors
    /// [`StatsError::NotAnInteger`] if `n` is fractional or non-finite,
    /// [`StatsError::Validation`] if `n < 0` or `p ∉ [0, 1]`.
    pub fn from_f64(n: f64, p: f64) -> Result<Self> {
        Self::new(integer_from_f64("n", n)?, p)
    }

    pub fn trials(&self) -> u64 {
        self.n
    }

    pub fn probability(&self) -> f64 {
        self.p
    }

    pub fn mean(&self) -> f64 {
        self.n as f64 * self.p
    }

    pub fn variance(&self) -> f64 {
        self.n as f64 * self.p * (1.0 - self.p)
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    fn check_k(&self, k: u64) -> Result<()> {
        if k > self.n {
            return Err(StatsError::validation(format!(
                "k must not exceed n = {}, got {k}",
                self.n
            )));
        }
        Ok(())
    }

    /// Number of ways to choose `k` of `n`, exact while below 2⁵³.
    pub fn coefficient(&self, k: u64) -> Result<f64> {
        self.check_k(k)?;
        let k = k.min(self.n - k);
        let mut c = 1.0_f64;
        for i in 1..=k {
            c = c * (self.n - k + i) as f64 / i as f64;
        }
        Ok(c.round())
    }

    /// P(X = k).
    pub fn pmf(&self, k: u64) -> Result<f64> {
        self.check_k(k)?;
        Ok(self.mass(k))
    }

    fn mass(&self, k: u64) -> f64 {
        if self.p == 0.0 {
            return if k == 0 { 1.0 } else { 0.0 };
        }
        if self.p == 1.0 {
            return if k == self.n { 1.0 } else { 0.0 };
        }
        special::binomial_ln_pmf(k, self.n, self.p).exp()
    }

    /// Most likely outcome ⌊(n + 1)p⌋, capped at `n`.
    fn mode(&self) -> u64 {
        let m = ((self.n as f64 + 1.0) * self.p).floor() as u64;
        m.min(self.n)
    }

    /// P(X ≤ k).
    pub fn cdf(&self, k: u64) -> Result<f64> {
        self.check_k(k)?;
        if k == self.n {
            return Ok(1.0);
        }
        if k <= self.mode() {
            let lower = sum_decreasing((0..=k).rev(), |i| self.mass(i));
            Ok(lower.min(1.0))
        } else {
            let upper = sum_decreasing(k + 1..=self.n, |i| self.mass(i));
            Ok((1.0 - upper).max(0.0))
        }
    }

    /// P(X > k) = 1 − P(X ≤ k).
    pub fn sf(&self, k: u64) -> Result<f64> {
        Ok(1.0 - self.cdf(k)?)
    }

    /// Full table {k → P(X = k)} for k = 0..=n.
    pub fn table(&self) -> BTreeMap<u64, f64> {
        (0..=self.n).map(|k| (k, self.mass(k))).collect()
    }
}

// ============================================================================
// Poisson Distribution
// ============================================================================

/// Poisson distribution with rate λ.
///
/// # Mathematical Definition
/// - PMF: P(X=k) = λᵏ e^(−λ) / k!
/// - Mean = Variance = λ
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Poisson {
    lambda: f64,
}

impl Poisson {
    /// # Errors
    /// [`StatsError::Validation`] unless `λ > 0` and finite.
    pub fn new(lambda: f64) -> Result<Self> {
        require_positive("lambda", lambda)?;
        Ok(Self { lambda })
    }

    /// Converts a real-valued event count, rejecting fractions with
    /// [`StatsError::NotAnInteger`] and negatives with
    /// [`StatsError::Validation`].
    pub fn k_from_f64(k: f64) -> Result<u64> {
        integer_from_f64("k", k)
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    pub fn mean(&self) -> f64 {
        self.lambda
    }

    pub fn variance(&self) -> f64 {
        self.lambda
    }

    /// ln P(X = k).
    pub fn ln_pmf(&self, k: u64) -> f64 {
        special::poisson_ln_pmf(k, self.lambda)
    }

    /// P(X = k).
    pub fn pmf(&self, k: u64) -> f64 {
        self.ln_pmf(k).exp()
    }

    /// P(X ≤ k).
    pub fn cdf(&self, k: u64) -> f64 {
        // f64 → u64 casts saturate, so a huge λ still yields a valid mode.
        let mode = self.lambda.floor() as u64;
        if k <= mode {
            return sum_decreasing((0..=k).rev(), |i| self.pmf(i)).min(1.0);
        }
        match k.checked_add(1) {
            Some(start) => (1.0 - sum_decreasing(start.., |i| self.pmf(i))).max(0.0),
            None => 1.0,
        }
    }

    /// P(X > k) = 1 − P(X ≤ k).
    pub fn sf(&self, k: u64) -> f64 {
        1.0 - self.cdf(k)
    }
}

/// Point probability with the rate it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoissonReport {
    pub k: u64,
    pub base_lambda: f64,
    /// λ · period / base period.
    pub adjusted_lambda: f64,
    pub period: u32,
    pub probability: f64,
    pub ln_probability: f64,
    /// Probability as a percentage with two decimals, e.g. `"22.40%"`.
    pub percentage: String,
}

/// Poisson rates quoted over a base period and rescaled to shorter ones.
///
/// # Examples
/// ```
/// use u_numkit::distributions::PoissonCalculator;
///
/// // 3 failures per 30 days, probability of exactly 2 in 15 days.
/// let calc = PoissonCalculator::default();
/// let report = calc.report(3.0, 2, 15).unwrap();
/// assert_eq!(report.adjusted_lambda, 1.5);
/// assert_eq!(report.percentage, "25.10%");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoissonCalculator {
    base_period: u32,
}

impl Default for PoissonCalculator {
    fn default() -> Self {
        Self { base_period: 30 }
    }
}

impl PoissonCalculator {
    /// # Errors
    /// [`StatsError::Validation`] if `base_period == 0`.
    pub fn new(base_period: u32) -> Result<Self> {
        if base_period == 0 {
            return Err(StatsError::validation("base period must be at least 1"));
        }
        Ok(Self { base_period })
    }

    pub fn from_config(config: &AnalysisConfig) -> Result<Self> {
        Self::new(config.poisson_base_period)
    }

    pub fn base_period(&self) -> u32 {
        self.base_period
    }

    /// Distribution for `period` units, λ scaled by `period / base_period`.
    ///
    /// # Errors
    /// [`StatsError::Validation`] if `λ ≤ 0` or `period ∉ [1, base_period]`.
    pub fn rescale(&self, lambda: f64, period: u32) -> Result<Poisson> {
        if period == 0 || period > self.base_period {
            return Err(StatsError::validation(format!(
                "period must lie in [1, {}], got {period}",
                self.base_period
            )));
        }
        require_positive("lambda", lambda)?;
        Poisson::new(lambda * f64::from(period) / f64::from(self.base_period))
    }

    /// P(X = k) over `period`, with the rescaled λ and log-probability.
    pub fn report(&self, lambda: f64, k: u64, period: u32) -> Result<PoissonReport> {
        let dist = self.rescale(lambda, period)?;
        let ln_probability = dist.ln_pmf(k);
        let probability = ln_probability.exp();
        debug!(
            lambda,
            adjusted = dist.lambda(),
            k,
            period,
            probability,
            "poisson point probability"
        );
        Ok(PoissonReport {
            k,
            base_lambda: lambda,
            adjusted_lambda: dist.lambda(),
            period,
            probability,
            ln_probability,
            percentage: format!("{:.2}%", probability * 100.0),
        })
    }
}

// ============================================================================
// Normal Distribution
// ============================================================================

/// Which tail [`Normal::tail_probability`] integrates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Tail {
    /// P(X ≤ x)
    Lower,
    /// P(X > x)
    Upper,
}

/// Normal (Gaussian) distribution N(μ, σ²).
///
/// # Mathematical Definition
/// - PDF: φ(x) = (1/(σ√(2π))) exp(−(x−μ)²/(2σ²))
/// - CDF: Φ((x−μ)/σ) (via standard normal CDF)
/// - Mean: μ
/// - Variance: σ²
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Normal {
    mu: f64,
    sigma: f64,
}

impl Normal {
    /// Creates a new normal distribution N(μ, σ).
    ///
    /// # Errors
    /// Returns `Err` if `sigma ≤ 0` or parameters are not finite.
    pub fn new(mu: f64, sigma: f64) -> Result<Self> {
        if !mu.is_finite() || !sigma.is_finite() || sigma <= 0.0 {
            return Err(StatsError::validation(format!(
                "Normal requires finite μ and σ > 0, got μ={mu}, σ={sigma}"
            )));
        }
        Ok(Self { mu, sigma })
    }

    pub fn mean(&self) -> f64 {
        self.mu
    }

    pub fn variance(&self) -> f64 {
        self.sigma * self.sigma
    }

    pub fn std_dev(&self) -> f64 {
        self.sigma
    }

    pub fn pdf(&self, x: f64) -> f64 {
        let z = (x - self.mu) / self.sigma;
        special::standard_normal_pdf(z) / self.sigma
    }

    /// CDF: Φ((x−μ)/σ).
    pub fn cdf(&self, x: f64) -> f64 {
        special::standard_normal_cdf((x - self.mu) / self.sigma)
    }

    /// P(X > x), computed from the mirrored lower tail.
    pub fn sf(&self, x: f64) -> f64 {
        special::standard_normal_cdf((self.mu - x) / self.sigma)
    }

    pub fn tail_probability(&self, x: f64, tail: Tail) -> f64 {
        match tail {
            Tail::Lower => self.cdf(x),
            Tail::Upper => self.sf(x),
        }
    }

    /// P(a ≤ X ≤ b).
    ///
    /// # Errors
    /// [`StatsError::Validation`] if `a > b`.
    pub fn interval_probability(&self, a: f64, b: f64) -> Result<f64> {
        if a > b {
            return Err(StatsError::validation(format!(
                "lower bound {a} must not exceed upper bound {b}"
            )));
        }
        Ok((self.cdf(b) - self.cdf(a)).max(0.0))
    }

    /// Inverse CDF (quantile): μ + σ·Φ⁻¹(p).
    ///
    /// Returns `None` if `p` is outside `(0, 1)`.
    pub fn quantile(&self, p: f64) -> Option<f64> {
        if p <= 0.0 || p >= 1.0 {
            return None;
        }
        Some(self.mu + self.sigma * special::inverse_normal_cdf(p))
    }
}

// ============================================================================
// Classical probability
// ============================================================================

/// Probability of an event with `favourable` of `possible` equally likely
/// outcomes.
///
/// # Errors
/// [`StatsError::Validation`] if `possible == 0` or `favourable > possible`.
///
/// # Examples
/// ```
/// use u_numkit::distributions::classical_probability;
/// assert_eq!(classical_probability(1, 6).unwrap(), 1.0 / 6.0);
/// assert!(classical_probability(7, 6).is_err());
/// ```
pub fn classical_probability(favourable: u64, possible: u64) -> Result<f64> {
    if possible == 0 {
        return Err(StatsError::validation(
            "number of possible outcomes must be positive",
        ));
    }
    if favourable > possible {
        return Err(StatsError::validation(format!(
            "favourable outcomes ({favourable}) exceed possible outcomes ({possible})"
        )));
    }
    Ok(favourable as f64 / possible as f64)
}

// ============================================================================
// Tests
// ============================================================================


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        // --- Binomial ---

        #[test]
        fn binomial_pmf_sums_to_one(n in 0_u64..200, p in 0.0_f64..=1.0) {
            let b = Binomial::new(n, p).unwrap();
            let total: f64 = b.table().values().sum();
            prop_assert!((total - 1.0).abs() < 1e-9, "sum = {total}");
        }

        #[test]
        fn binomial_cdf_plus_sf_is_one(n in 1_u64..200, p in 0.0_f64..=1.0, frac in 0.0_f64..=1.0) {
            let b = Binomial::new(n, p).unwrap();
            let k = (frac * n as f64).floor() as u64;
            let c = b.cdf(k).unwrap();
            prop_assert!((0.0..=1.0).contains(&c));
            prop_assert_eq!(c + b.sf(k).unwrap(), 1.0);
        }

        #[test]
        fn binomial_cdf_monotonic(n in 1_u64..100, p in 0.0_f64..=1.0) {
            let b = Binomial::new(n, p).unwrap();
            let mut prev = 0.0;
            for k in 0..=n {
                let c = b.cdf(k).unwrap();
                prop_assert!(c >= prev - 1e-12);
                prev = c;
            }
        }

        // --- Poisson ---

        #[test]
        fn poisson_cdf_plus_sf_is_one(lambda in 0.01_f64..50.0, k in 0_u64..100) {
            let p = Poisson::new(lambda).unwrap();
            prop_assert_eq!(p.cdf(k) + p.sf(k), 1.0);
        }

        #[test]
        fn poisson_pmf_matches_log(lambda in 0.5_f64..50.0, k in 0_u64..100) {
            let p = Poisson::new(lambda).unwrap();
            prop_assert!(p.pmf(k) >= 0.0);
            prop_assert!((p.pmf(k).ln() - p.ln_pmf(k)).abs() < 1e-9);
        }

        // --- Normal ---

        #[test]
        fn normal_quantile_roundtrip(
            mu in -100.0_f64..100.0,
            sigma in 0.1_f64..50.0,
            p in 0.001_f64..0.999,
        ) {
            let n = Normal::new(mu, sigma).unwrap();
            let x = n.quantile(p).unwrap();
            let p_back = n.cdf(x);
            prop_assert!((p_back - p).abs() < 1e-8, "roundtrip: p={p} -> x={x} -> p_back={p_back}");
        }

        #[test]
        fn normal_cdf_plus_sf_is_one(mu in -10.0_f64..10.0, sigma in 0.1_f64..10.0, x in -50.0_f64..50.0) {
            let n = Normal::new(mu, sigma).unwrap();
            prop_assert!((n.cdf(x) + n.sf(x) - 1.0).abs() < 1e-12);
        }
    }
}
