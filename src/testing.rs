//! Hypothesis testing.
//!
//! t-tests (one-sample, two-sample with a Levene pre-check, and from
//! summary statistics), Levene's test for equal variances, and the χ²
//! goodness-of-fit test against a uniform distribution.
//!
//! Every two-tailed decision follows the same rule: reject H₀ iff
//! `p < α`.
//!
//! # Examples
//!
//! ```
//! use u_numkit::sample::Sample;
//! use u_numkit::testing::{two_sample_t_test, Decision};
//!
//! let a = Sample::new(vec![5.1, 4.9, 5.2, 5.0, 4.8]).unwrap();
//! let b = Sample::new(vec![7.1, 6.9, 7.2, 7.0, 6.8]).unwrap();
//! let r = two_sample_t_test(&a, &b, 0.05).unwrap();
//! assert_eq!(r.decision, Decision::RejectNull);
//! ```

use serde::Serialize;
use tracing::debug;

use crate::anova::anova_core;
use crate::error::{require_open_unit, Result, StatsError};
use crate::sample::Sample;
use crate::special;
use crate::stats;

/// Default minimum total frequency for [`chi_square_uniformity`].
pub const DEFAULT_MIN_TOTAL: f64 = 30.0;
/// Default minimum expected count per category for [`chi_square_uniformity`].
pub const DEFAULT_MIN_EXPECTED: f64 = 5.0;

/// Statistic, degrees of freedom and p-value of a test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TestResult {
    /// Test statistic (t, F or χ² depending on test).
    pub statistic: f64,
    /// Degrees of freedom (fractional for Welch; numerator df for F tests).
    pub df: f64,
    pub p_value: f64,
}

/// Outcome of a test at a fixed significance level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Decision {
    RejectNull,
    FailToReject,
}

impl Decision {
    /// `RejectNull` iff `p_value < alpha`.
    pub fn from_p_value(p_value: f64, alpha: f64) -> Self {
        if p_value < alpha {
            Decision::RejectNull
        } else {
            Decision::FailToReject
        }
    }

    pub fn is_reject(self) -> bool {
        self == Decision::RejectNull
    }
}

/// Which standard error the two-sample t statistic uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VarianceAssumption {
    /// Pooled variance, df = n₁ + n₂ − 2.
    Equal,
    /// Welch standard error, Satterthwaite df.
    Unequal,
}

/// Result of a two-sample t-test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TwoSampleTTest {
    pub statistic: f64,
    pub df: f64,
    pub p_value: f64,
    /// Two-tailed critical value t(1 − α/2, df).
    pub critical_value: f64,
    pub mean_difference: f64,
    pub variance: VarianceAssumption,
    /// Levene pre-check, absent when the assumption was given explicitly.
    pub levene: Option<TestResult>,
    pub alpha: f64,
    pub decision: Decision,
}

/// Summary statistics of one group: mean, sample sd (ddof = 1), size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroupSummary {
    pub mean: f64,
    pub std_dev: f64,
    pub n: usize,
}

impl GroupSummary {
    pub fn new(mean: f64, std_dev: f64, n: usize) -> Self {
        Self { mean, std_dev, n }
    }

    /// Summary of a sample; `None` for a single observation.
    pub fn from_sample(sample: &Sample) -> Option<Self> {
        Some(Self::new(sample.mean(), sample.std_dev()?, sample.len()))
    }

    fn validate(&self, label: &str) -> Result<()> {
        if self.n < 2 {
            return Err(StatsError::validation(format!(
                "group {label} needs at least 2 observations, got {}",
                self.n
            )));
        }
        if !self.mean.is_finite() || !self.std_dev.is_finite() || self.std_dev < 0.0 {
            return Err(StatsError::validation(format!(
                "group {label} has invalid summary: mean={}, sd={}",
                self.mean, self.std_dev
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Levene (Brown-Forsythe)
// ---------------------------------------------------------------------------

/// Levene's test for equality of variances, median-centred.
///
/// # Algorithm
///
/// zᵢⱼ = |xᵢⱼ − median(group i)|, then one-way ANOVA on z. The reported
/// `df` is the numerator df (k − 1).
///
/// # Errors
///
/// [`StatsError::Validation`] if fewer than 2 groups, any group has fewer
/// than 2 observations, or any value is non-finite.
///
/// # References
///
/// - Levene (1960). "Robust tests for equality of variances".
/// - Brown & Forsythe (1974). JASA, 69(346), 364–367.
///
/// # Examples
///
/// ```
/// use u_numkit::testing::levene_test;
///
/// let g1 = [4.9, 5.0, 5.0, 5.1, 5.0];
/// let g2 = [0.0, 3.0, 5.0, 7.0, 10.0];
/// let r = levene_test(&[&g1, &g2]).unwrap();
/// assert!(r.p_value < 0.05);
/// ```
pub fn levene_test(groups: &[&[f64]]) -> Result<TestResult> {
    if groups.len() < 2 {
        return Err(StatsError::validation(format!(
            "Levene's test requires at least 2 groups, got {}",
            groups.len()
        )));
    }
    let mut deviations = Vec::with_capacity(groups.len());
    for (i, g) in groups.iter().enumerate() {
        if g.len() < 2 {
            return Err(StatsError::validation(format!(
                "Levene group {i} needs at least 2 observations, got {}",
                g.len()
            )));
        }
        let median = stats::median(g).ok_or_else(|| {
            StatsError::validation(format!("Levene group {i} contains a non-numeric value"))
        })?;
        deviations.push(g.iter().map(|&x| (x - median).abs()).collect::<Vec<f64>>());
    }

    let refs: Vec<&[f64]> = deviations.iter().map(Vec::as_slice).collect();
    let core = anova_core(&refs)?;
    Ok(TestResult {
        statistic: core.f_statistic,
        df: core.df_between as f64,
        p_value: core.p_value,
    })
}

// ---------------------------------------------------------------------------
// t-tests
// ---------------------------------------------------------------------------

/// One-sample t-test: H₀: μ = μ₀, t = (x̄ − μ₀)/(s/√n), df = n − 1.
///
/// # Errors
///
/// [`StatsError::Validation`] if fewer than 2 observations, μ₀ is not
/// finite, or the sample has zero variance.
///
/// # Examples
///
/// ```
/// use u_numkit::sample::Sample;
/// use u_numkit::testing::one_sample_t_test;
///
/// let s = Sample::new(vec![2.0, 4.0, 6.0, 8.0, 10.0]).unwrap();
/// let r = one_sample_t_test(&s, 6.0).unwrap();
/// assert!(r.p_value > 0.5);
/// ```
pub fn one_sample_t_test(sample: &Sample, mu0: f64) -> Result<TestResult> {
    sample.require_len(2)?;
    if !mu0.is_finite() {
        return Err(StatsError::validation(format!(
            "hypothesised mean must be finite, got {mu0}"
        )));
    }
    let se = sample
        .standard_error()
        .filter(|&se| se > 0.0)
        .ok_or_else(|| StatsError::validation("sample has zero variance"))?;

    let t = (sample.mean() - mu0) / se;
    let df = (sample.len() - 1) as f64;
    let p_value = two_tailed_p(t, df);
    debug!(t, df, p_value, "one-sample t-test");
    Ok(TestResult {
        statistic: t,
        df,
        p_value,
    })
}

/// Two-sample t-test with a Levene pre-check at the same `alpha`.
///
/// If Levene's p-value exceeds `alpha` the pooled statistic is used,
/// otherwise Welch's.
///
/// # Errors
///
/// [`StatsError::Validation`] if either sample has fewer than 2
/// observations, `alpha ∉ (0, 1)`, or both samples have zero variance.
pub fn two_sample_t_test(a: &Sample, b: &Sample, alpha: f64) -> Result<TwoSampleTTest> {
    require_open_unit("alpha", alpha)?;
    a.require_len(2)?;
    b.require_len(2)?;

    let levene = levene_test(&[a.values(), b.values()])?;
    let variance = if levene.p_value > alpha {
        VarianceAssumption::Equal
    } else {
        VarianceAssumption::Unequal
    };
    debug!(
        levene_f = levene.statistic,
        levene_p = levene.p_value,
        ?variance,
        "variance pre-check"
    );

    let summarize = |s: &Sample| -> Result<GroupSummary> {
        GroupSummary::from_sample(s)
            .ok_or_else(|| StatsError::validation("sample standard deviation is undefined"))
    };
    let mut result = t_test_from_summary(&summarize(a)?, &summarize(b)?, alpha, variance)?;
    result.levene = Some(levene);
    Ok(result)
}

/// Two-sample t-test from summary statistics with an explicit variance
/// assumption.
///
/// # Errors
///
/// [`StatsError::Validation`] if either group has `n < 2`, a negative or
/// non-finite sd, `alpha ∉ (0, 1)`, or the standard error is zero.
///
/// # Examples
///
/// ```
/// use u_numkit::testing::{t_test_from_summary, GroupSummary, VarianceAssumption};
///
/// let a = GroupSummary::new(78.5, 10.2, 40);
/// let b = GroupSummary::new(72.1, 11.5, 38);
/// let r = t_test_from_summary(&a, &b, 0.05, VarianceAssumption::Unequal).unwrap();
/// assert!(r.statistic > 0.0);
/// ```
pub fn t_test_from_summary(
    a: &GroupSummary,
    b: &GroupSummary,
    alpha: f64,
    variance: VarianceAssumption,
) -> Result<TwoSampleTTest> {
    require_open_unit("alpha", alpha)?;
    a.validate("A")?;
    b.validate("B")?;

    let (n1, n2) = (a.n as f64, b.n as f64);
    let (v1, v2) = (a.std_dev * a.std_dev, b.std_dev * b.std_dev);
    if v1 == 0.0 && v2 == 0.0 {
        return Err(StatsError::validation("both samples have zero variance"));
    }

    let (se, df) = match variance {
        VarianceAssumption::Equal => {
            let df = n1 + n2 - 2.0;
            let pooled = ((n1 - 1.0) * v1 + (n2 - 1.0) * v2) / df;
            ((pooled * (1.0 / n1 + 1.0 / n2)).sqrt(), df)
        }
        VarianceAssumption::Unequal => {
            let (w1, w2) = (v1 / n1, v2 / n2);
            let df = (w1 + w2).powi(2) / (w1 * w1 / (n1 - 1.0) + w2 * w2 / (n2 - 1.0));
            ((w1 + w2).sqrt(), df)
        }
    };

    let mean_difference = a.mean - b.mean;
    let t = mean_difference / se;
    let p_value = two_tailed_p(t, df);
    let critical_value = special::t_distribution_quantile(1.0 - alpha / 2.0, df);
    let decision = Decision::from_p_value(p_value, alpha);
    debug!(t, df, p_value, critical_value, ?decision, "two-sample t-test");

    Ok(TwoSampleTTest {
        statistic: t,
        df,
        p_value,
        critical_value,
        mean_difference,
        variance,
        levene: None,
        alpha,
        decision,
    })
}

fn two_tailed_p(t: f64, df: f64) -> f64 {
    (2.0 * (1.0 - special::t_distribution_cdf(t.abs(), df))).clamp(0.0, 1.0)
}

// ---------------------------------------------------------------------------
// Chi-squared goodness of fit
// ---------------------------------------------------------------------------

/// Result of a χ² test against a uniform distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChiSquareTest {
    pub statistic: f64,
    pub df: f64,
    pub p_value: f64,
    /// χ²(1 − α, df).
    pub critical_value: f64,
    /// Expected count per category (total / k).
    pub expected: f64,
    pub decision: Decision,
}

/// χ² goodness-of-fit of observed frequencies against equal expected
/// frequencies.
///
/// # Errors
///
/// [`StatsError::Validation`] if fewer than 2 categories, any frequency is
/// negative or non-finite, the total is below `min_total`, the expected
/// count per category is below `min_expected`, or `alpha ∉ (0, 1)`.
///
/// # Examples
///
/// ```
/// use u_numkit::testing::{chi_square_uniformity, DEFAULT_MIN_EXPECTED, DEFAULT_MIN_TOTAL};
///
/// let dice = [8.0, 12.0, 10.0, 9.0, 11.0, 10.0];
/// let r = chi_square_uniformity(&dice, 0.05, DEFAULT_MIN_TOTAL, DEFAULT_MIN_EXPECTED).unwrap();
/// assert!(!r.decision.is_reject());
/// ```
pub fn chi_square_uniformity(
    observed: &[f64],
    alpha: f64,
    min_total: f64,
    min_expected: f64,
) -> Result<ChiSquareTest> {
    require_open_unit("alpha", alpha)?;
    let k = observed.len();
    if k < 2 {
        return Err(StatsError::validation(format!(
            "χ² test needs at least 2 categories, got {k}"
        )));
    }
    if let Some(i) = observed.iter().position(|o| !o.is_finite() || *o < 0.0) {
        return Err(StatsError::validation(format!(
            "frequency at index {i} must be a non-negative number, got {}",
            observed[i]
        )));
    }

    let total = stats::kahan_sum(observed);
    if total < min_total {
        return Err(StatsError::validation(format!(
            "total frequency {total} is below the minimum of {min_total}"
        )));
    }
    let expected = total / k as f64;
    if expected < min_expected {
        return Err(StatsError::validation(format!(
            "expected count per category {expected} is below the minimum of {min_expected}"
        )));
    }

    let statistic: f64 = observed
        .iter()
        .map(|&o| (o - expected).powi(2) / expected)
        .sum();
    let df = (k - 1) as f64;
    let p_value = (1.0 - special::chi_squared_cdf(statistic, df)).clamp(0.0, 1.0);
    let critical_value = special::chi_squared_quantile(1.0 - alpha, df);
    let decision = Decision::from_p_value(p_value, alpha);
    debug!(statistic, df, p_value, critical_value, "chi-square uniformity");

    Ok(ChiSquareTest {
        statistic,
        df,
        p_value,
        critical_value,
        expected,
        decision,
    })
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn two_sample_p_bounded(
            a in proptest::collection::vec(-100.0_f64..100.0, 3..=20),
            b in proptest::collection::vec(-100.0_f64..100.0, 3..=20),
        ) {
            let (sa, sb) = (Sample::new(a).unwrap(), Sample::new(b).unwrap());
            if let Ok(r) = two_sample_t_test(&sa, &sb, 0.05) {
                prop_assert!((0.0..=1.0).contains(&r.p_value));
                prop_assert_eq!(r.decision.is_reject(), r.p_value < 0.05);
            }
        }

        #[test]
        fn swapping_samples_negates_t(
            a in proptest::collection::vec(-100.0_f64..100.0, 3..=20),
            b in proptest::collection::vec(-100.0_f64..100.0, 3..=20),
        ) {
            let (sa, sb) = (Sample::new(a).unwrap(), Sample::new(b).unwrap());
            if let (Ok(ab), Ok(ba)) = (two_sample_t_test(&sa, &sb, 0.05), two_sample_t_test(&sb, &sa, 0.05)) {
                prop_assert!((ab.statistic + ba.statistic).abs() < 1e-9 * ab.statistic.abs().max(1.0));
            }
        }
    }
}
