//! One-way analysis of variance.
//!
//! H₀: all group means are equal. F = MS_between / MS_within with
//! (k − 1, N − k) degrees of freedom.
//!
//! Reference: Fisher (1925), *Statistical Methods for Research Workers*.
//!
//! # Examples
//!
//! ```
//! use u_numkit::anova::one_way_anova;
//!
//! let groups = [
//!     ("fundamental", vec![30.85, 30.34, 24.90, 31.36, 30.14]),
//!     ("medio", vec![31.01, 25.82, 22.59, 29.66, 26.36]),
//!     ("superior", vec![21.67, 20.39, 28.80, 25.78, 27.88]),
//! ];
//! let table = one_way_anova(groups).unwrap();
//! assert_eq!(table.df_between, 2);
//! assert_eq!(table.df_within, 12);
//! ```

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{require_finite, Result, StatsError};
use crate::special;
use crate::stats;

/// Sums of squares below this fraction of Σx² are treated as exact zeros.
const RELATIVE_ZERO: f64 = 1e-20;

/// Per-group descriptive line of the ANOVA table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    pub name: String,
    pub count: usize,
    pub mean: f64,
}

/// Full one-way ANOVA table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnovaTable {
    pub groups: Vec<GroupStats>,
    pub grand_mean: f64,
    pub ss_between: f64,
    pub ss_within: f64,
    pub ss_total: f64,
    pub df_between: usize,
    pub df_within: usize,
    pub df_total: usize,
    pub ms_between: f64,
    pub ms_within: f64,
    /// `0` when both mean squares vanish, `+∞` when only MS_within does.
    pub f_statistic: f64,
    pub p_value: f64,
}

impl AnovaTable {
    /// Whether H₀ is rejected at significance level `alpha`.
    pub fn rejects_null(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

/// One-way ANOVA over named groups, preserving input order.
///
/// Accepts anything that yields `(name, values)` pairs: arrays of tuples,
/// `Vec<(String, Vec<f64>)>`, or a `&BTreeMap<String, Vec<f64>>`.
///
/// # Errors
/// [`StatsError::Validation`] if fewer than 2 groups, any group is empty,
/// any value is non-finite, or there are no within-group degrees of
/// freedom (every group has a single observation).
pub fn one_way_anova<I, K, V>(groups: I) -> Result<AnovaTable>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<[f64]>,
{
    let owned: Vec<(String, Vec<f64>)> = groups
        .into_iter()
        .map(|(k, v)| (k.as_ref().to_owned(), v.as_ref().to_vec()))
        .collect();

    for (name, values) in &owned {
        if values.is_empty() {
            return Err(StatsError::validation(format!("group '{name}' is empty")));
        }
        require_finite(&format!("group '{name}'"), values)?;
    }

    let slices: Vec<&[f64]> = owned.iter().map(|(_, v)| v.as_slice()).collect();
    let core = anova_core(&slices)?;

    let groups = owned
        .iter()
        .zip(&core.group_means)
        .map(|((name, values), &mean)| GroupStats {
            name: name.clone(),
            count: values.len(),
            mean,
        })
        .collect();

    debug!(
        k = core.df_between + 1,
        f = core.f_statistic,
        p = core.p_value,
        "one-way anova"
    );

    Ok(AnovaTable {
        groups,
        grand_mean: core.grand_mean,
        ss_between: core.ss_between,
        ss_within: core.ss_within,
        ss_total: core.ss_total,
        df_between: core.df_between,
        df_within: core.df_within,
        df_total: core.df_between + core.df_within,
        ms_between: core.ms_between,
        ms_within: core.ms_within,
        f_statistic: core.f_statistic,
        p_value: core.p_value,
    })
}

/// Unnamed ANOVA arithmetic, shared with Levene's test.
#[derive(Debug, Clone)]
pub(crate) struct AnovaCore {
    pub group_means: Vec<f64>,
    pub grand_mean: f64,
    pub ss_between: f64,
    pub ss_within: f64,
    pub ss_total: f64,
    pub df_between: usize,
    pub df_within: usize,
    pub ms_between: f64,
    pub ms_within: f64,
    pub f_statistic: f64,
    pub p_value: f64,
}

pub(crate) fn anova_core(groups: &[&[f64]]) -> Result<AnovaCore> {
    let k = groups.len();
    if k < 2 {
        return Err(StatsError::validation(format!(
            "ANOVA requires at least 2 groups, got {k}"
        )));
    }

    let mut group_means = Vec::with_capacity(k);
    for g in groups {
        let m = stats::mean(g).ok_or_else(|| {
            StatsError::validation("every ANOVA group must be non-empty and finite")
        })?;
        group_means.push(m);
    }

    let all: Vec<f64> = groups.iter().flat_map(|g| g.iter().copied()).collect();
    let total_n = all.len();
    let df_between = k - 1;
    let df_within = total_n - k;
    if df_within == 0 {
        return Err(StatsError::validation(
            "ANOVA needs at least one group with two or more observations",
        ));
    }

    let grand_mean = stats::kahan_sum(&all) / total_n as f64;
    let scale = stats::sum_squared_deviations(&all, 0.0).unwrap_or(0.0);
    let snap = |ss: f64| if ss <= RELATIVE_ZERO * scale { 0.0 } else { ss };

    let ss_total = snap(stats::sum_squared_deviations(&all, grand_mean).unwrap_or(0.0));
    let ss_within = snap(
        groups
            .iter()
            .zip(&group_means)
            .filter_map(|(g, &m)| stats::sum_squared_deviations(g, m))
            .sum(),
    );
    let ss_between = snap(
        groups
            .iter()
            .zip(&group_means)
            .map(|(g, &m)| g.len() as f64 * (m - grand_mean) * (m - grand_mean))
            .sum(),
    );

    let ms_between = ss_between / df_between as f64;
    let ms_within = ss_within / df_within as f64;

    let (f_statistic, p_value) = if ms_within > 0.0 {
        let f = ms_between / ms_within;
        let p = 1.0 - special::f_distribution_cdf(f, df_between as f64, df_within as f64);
        (f, p.clamp(0.0, 1.0))
    } else if ms_between > 0.0 {
        warn!("zero within-group variance with distinct group means");
        (f64::INFINITY, 0.0)
    } else {
        warn!("all observations identical; F statistic set to 0");
        (0.0, 1.0)
    };

    Ok(AnovaCore {
        group_means,
        grand_mean,
        ss_between,
        ss_within,
        ss_total,
        df_between,
        df_within,
        ms_between,
        ms_within,
        f_statistic,
        p_value,
    })
}
