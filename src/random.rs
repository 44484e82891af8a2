//! Random number generation, sampling primitives, and seeded simulations.
//!
//! # Reproducibility
//!
//! Every simulation takes an explicit `seed` and builds its own generator
//! with [`create_rng`]; there is no process-wide seed. The underlying
//! algorithm (SmallRng) is deterministic for a given seed on the same
//! platform.

use std::collections::BTreeMap;

use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::error::{require_open_unit, require_positive, Result, StatsError};
use crate::interval::{confidence_interval_from_summary, ConfidenceInterval};
use crate::stats::RunningMoments;

/// Knuth's multiplication method underflows e^(−λ) beyond this chunk size.
const POISSON_CHUNK: f64 = 30.0;

/// Creates a fast, seeded random number generator.
///
/// Uses `SmallRng` (Xoshiro256++) for high performance.
/// The sequence is deterministic for a given seed on the same platform.
///
/// # Examples
/// ```
/// use u_numkit::random::create_rng;
/// use rand::Rng;
/// let mut rng = create_rng(42);
/// let x: f64 = rng.random();
/// assert!(x >= 0.0 && x < 1.0);
/// ```
pub fn create_rng(seed: u64) -> rand::rngs::SmallRng {
    use rand::SeedableRng;
    rand::rngs::SmallRng::seed_from_u64(seed)
}

// ============================================================================
// Sampling primitives
// ============================================================================

/// Uniform draw on (0, 1], safe to take the logarithm of.
fn open_unit<R: Rng>(rng: &mut R) -> f64 {
    1.0 - rng.random::<f64>()
}

/// Exponential variate with the given rate (mean `1 / rate`), by inversion.
///
/// The caller guarantees `rate > 0`.
pub fn sample_exponential<R: Rng>(rng: &mut R, rate: f64) -> f64 {
    -open_unit(rng).ln() / rate
}

/// Standard normal variate (Box–Muller, cosine branch).
///
/// Reference: Box & Muller (1958), *Ann. Math. Statist.* 29(2).
pub fn sample_standard_normal<R: Rng>(rng: &mut R) -> f64 {
    let u1 = open_unit(rng);
    let u2: f64 = rng.random();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

pub fn sample_normal<R: Rng>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    mean + std_dev * sample_standard_normal(rng)
}

/// Poisson variate with mean `lambda`.
///
/// # Algorithm
/// Knuth's product-of-uniforms method. Large rates are split into chunks of
/// at most 30 and the chunk counts summed (Poisson variables are additive),
/// so `e^(−λ)` never underflows.
///
/// Reference: Knuth (1997), *TAOCP* Vol. 2, §3.4.1.
///
/// # Complexity
/// Expected O(λ) uniform draws.
pub fn sample_poisson<R: Rng>(rng: &mut R, lambda: f64) -> u64 {
    let mut remaining = lambda;
    let mut total = 0;
    while remaining > 0.0 {
        let chunk = remaining.min(POISSON_CHUNK);
        remaining -= chunk;
        let limit = (-chunk).exp();
        let mut product = rng.random::<f64>();
        while product > limit {
            total += 1;
            product *= rng.random::<f64>();
        }
    }
    total
}

// ============================================================================
// Die rolls
// ============================================================================

/// Rolls a fair die with `faces` faces `rolls` times.
///
/// # Errors
/// [`StatsError::Validation`] if `faces == 0`.
///
/// # Examples
/// ```
/// use u_numkit::random::simulate_die_rolls;
/// let rolls = simulate_die_rolls(1000, 6, 42).unwrap();
/// assert_eq!(rolls.len(), 1000);
/// assert!(rolls.iter().all(|&r| (1..=6).contains(&r)));
/// ```
pub fn simulate_die_rolls(rolls: usize, faces: u32, seed: u64) -> Result<Vec<u32>> {
    if faces == 0 {
        return Err(StatsError::validation("a die needs at least one face"));
    }
    let mut rng = create_rng(seed);
    Ok((0..rolls).map(|_| rng.random_range(1..=faces)).collect())
}

/// Count of each face 1..=faces; out-of-range rolls are ignored.
pub fn face_frequencies(rolls: &[u32], faces: u32) -> Vec<u64> {
    let mut counts = vec![0_u64; faces as usize];
    for &r in rolls {
        if let Some(slot) = (r as usize).checked_sub(1).and_then(|i| counts.get_mut(i)) {
            *slot += 1;
        }
    }
    counts
}

// ============================================================================
// Poisson daily counts
// ============================================================================

/// Simulated event counts per day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyCounts {
    pub counts: Vec<u64>,
    pub mean: f64,
    /// {count → fraction of days with that count}
    pub relative_frequencies: BTreeMap<u64, f64>,
}

/// Draws `days` daily counts from Poisson(`mean_per_day`).
///
/// # Errors
/// [`StatsError::Validation`] if `mean_per_day ≤ 0` or `days == 0`.
pub fn simulate_daily_counts(mean_per_day: f64, days: usize, seed: u64) -> Result<DailyCounts> {
    require_positive("mean_per_day", mean_per_day)?;
    if days == 0 {
        return Err(StatsError::validation("days must be at least 1"));
    }
    let mut rng = create_rng(seed);
    let counts: Vec<u64> = (0..days)
        .map(|_| sample_poisson(&mut rng, mean_per_day))
        .collect();

    let mut tally: BTreeMap<u64, u64> = BTreeMap::new();
    for &c in &counts {
        *tally.entry(c).or_default() += 1;
    }
    let relative_frequencies = tally
        .into_iter()
        .map(|(c, n)| (c, n as f64 / days as f64))
        .collect();
    let mean = counts.iter().sum::<u64>() as f64 / days as f64;
    debug!(mean_per_day, days, seed, mean, "poisson daily counts");

    Ok(DailyCounts {
        counts,
        mean,
        relative_frequencies,
    })
}

// ============================================================================
// Confidence interval coverage
// ============================================================================

/// Outcome of repeated sampling from a known normal population.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageReport {
    pub intervals: Vec<ConfidenceInterval>,
    /// Whether each interval contains the population mean.
    pub covered: Vec<bool>,
    /// Fraction of intervals containing the population mean.
    pub coverage: f64,
}

/// Draws `samples` samples of size `sample_size` from N(mean, std_dev) and
/// builds a t-interval at `level` for each.
///
/// # Errors
/// [`StatsError::Validation`] if `std_dev ≤ 0`, `sample_size < 2`,
/// `samples == 0`, or `level ∉ (0, 1)`.
///
/// # Examples
/// ```
/// use u_numkit::random::simulate_ci_coverage;
/// let r = simulate_ci_coverage(50.0, 10.0, 30, 200, 0.95, 7).unwrap();
/// assert!(r.coverage > 0.85);
/// ```
pub fn simulate_ci_coverage(
    mean: f64,
    std_dev: f64,
    sample_size: usize,
    samples: usize,
    level: f64,
    seed: u64,
) -> Result<CoverageReport> {
    require_positive("std_dev", std_dev)?;
    require_open_unit("confidence level", level)?;
    if !mean.is_finite() {
        return Err(StatsError::validation(format!("mean must be finite, got {mean}")));
    }
    if sample_size < 2 {
        return Err(StatsError::validation(format!(
            "sample size must be at least 2, got {sample_size}"
        )));
    }
    if samples == 0 {
        return Err(StatsError::validation("number of samples must be at least 1"));
    }

    let mut rng = create_rng(seed);
    let mut intervals = Vec::with_capacity(samples);
    for _ in 0..samples {
        let moments: RunningMoments = (0..sample_size)
            .map(|_| sample_normal(&mut rng, mean, std_dev))
            .collect();
        let (m, var) = match (moments.mean(), moments.sample_variance()) {
            (Some(m), Some(v)) => (m, v),
            _ => return Err(StatsError::validation("sample moments are undefined")),
        };
        intervals.push(confidence_interval_from_summary(m, var.sqrt(), sample_size, level)?);
    }

    let covered: Vec<bool> = intervals.iter().map(|ci| ci.contains(mean)).collect();
    let coverage = covered.iter().filter(|&&c| c).count() as f64 / samples as f64;
    debug!(samples, sample_size, level, coverage, "confidence interval coverage");

    Ok(CoverageReport {
        intervals,
        covered,
        coverage,
    })
}

// ============================================================================
// Tests
// ============================================================================


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn die_rolls_in_range(seed in 0_u64..10000, faces in 1_u32..20) {
            let rolls = simulate_die_rolls(200, faces, seed).unwrap();
            prop_assert!(rolls.iter().all(|&r| r >= 1 && r <= faces));
            prop_assert_eq!(face_frequencies(&rolls, faces).iter().sum::<u64>(), 200);
        }

        #[test]
        fn exponential_is_positive(seed in 0_u64..10000, rate in 0.01_f64..100.0) {
            let mut rng = create_rng(seed);
            for _ in 0..50 {
                let x = sample_exponential(&mut rng, rate);
                prop_assert!(x >= 0.0 && x.is_finite());
            }
        }
    }
}
