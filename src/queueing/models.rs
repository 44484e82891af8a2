use serde::Serialize;
use tracing::debug;

use crate::config::QueueConfig;
use crate::error::{require_positive, Result, StatsError};

/// Steady-state performance measures of a queue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QueueMetrics {
    pub servers: u32,
    pub arrival_rate: f64,
    pub service_rate: f64,
    /// ρ = λ / (c·μ)
    pub utilization: f64,
    /// Probability the system is empty.
    pub p0: f64,
    /// Probability an arrival has to wait.
    pub wait_probability: f64,
    /// Lq
    pub queue_length: f64,
    /// Wq
    pub queue_time: f64,
    /// L = Lq + λ/μ
    pub system_length: f64,
    /// W = Wq + 1/μ
    pub system_time: f64,
}

/// A queue with closed-form steady-state measures.
pub trait QueueModel {
    fn arrival_rate(&self) -> f64;

    /// Per-server service rate.
    fn service_rate(&self) -> f64;

    fn servers(&self) -> u32;

    fn p0(&self) -> f64;

    fn wait_probability(&self) -> f64;

    /// Lq, mean number waiting.
    fn queue_length(&self) -> f64;

    fn utilization(&self) -> f64 {
        self.arrival_rate() / (f64::from(self.servers()) * self.service_rate())
    }

    /// Wq = Lq / λ (Little's law).
    fn queue_time(&self) -> f64 {
        self.queue_length() / self.arrival_rate()
    }

    fn metrics(&self) -> QueueMetrics {
        let offered_load = self.arrival_rate() / self.service_rate();
        let queue_length = self.queue_length();
        let queue_time = self.queue_time();
        QueueMetrics {
            servers: self.servers(),
            arrival_rate: self.arrival_rate(),
            service_rate: self.service_rate(),
            utilization: self.utilization(),
            p0: self.p0(),
            wait_probability: self.wait_probability(),
            queue_length,
            queue_time,
            system_length: queue_length + offered_load,
            system_time: queue_time + 1.0 / self.service_rate(),
        }
    }
}

fn check_rates(arrival_rate: f64, service_rate: f64, servers: u32) -> Result<()> {
    require_positive("arrival rate", arrival_rate)?;
    require_positive("service rate", service_rate)?;
    if servers == 0 {
        return Err(StatsError::validation("servers must be at least 1"));
    }
    let capacity = f64::from(servers) * service_rate;
    if arrival_rate >= capacity {
        return Err(StatsError::validation(format!(
            "unstable system: arrival rate {arrival_rate} must be below total service rate {capacity}"
        )));
    }
    Ok(())
}

// ============================================================================
// M/M/1
// ============================================================================

/// Single-server queue: ρ = λ/μ, Lq = ρ²/(1−ρ).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mm1 {
    lambda: f64,
    mu: f64,
}

impl Mm1 {
    /// # Errors
    /// [`StatsError::Validation`] if either rate is non-positive or λ ≥ μ.
    pub fn new(arrival_rate: f64, service_rate: f64) -> Result<Self> {
        check_rates(arrival_rate, service_rate, 1)?;
        Ok(Self {
            lambda: arrival_rate,
            mu: service_rate,
        })
    }

    /// Builds from the hourly form of `config`; its server count is ignored.
    pub fn from_config(config: &QueueConfig) -> Result<Self> {
        let hourly = config.to_hourly();
        Self::new(hourly.arrival_rate, hourly.service_rate)
    }
}

impl QueueModel for Mm1 {
    fn arrival_rate(&self) -> f64 {
        self.lambda
    }

    fn service_rate(&self) -> f64 {
        self.mu
    }

    fn servers(&self) -> u32 {
        1
    }

    fn p0(&self) -> f64 {
        1.0 - self.utilization()
    }

    fn wait_probability(&self) -> f64 {
        self.utilization()
    }

    fn queue_length(&self) -> f64 {
        let rho = self.utilization();
        rho * rho / (1.0 - rho)
    }
}

// ============================================================================
// M/M/2
// ============================================================================

/// Two-server queue with the textbook shortcut
/// P0 = 1/(1 + a + a²/2), Lq = a²·P0 / (2(1 − ρ)), with a = λ/μ.
///
/// These values differ from the exact Erlang-C result; use
/// [`Mmc`] with `c = 2` for the exact model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mm2 {
    lambda: f64,
    mu: f64,
}

impl Mm2 {
    /// # Errors
    /// [`StatsError::Validation`] if either rate is non-positive or λ ≥ 2μ.
    pub fn new(arrival_rate: f64, service_rate: f64) -> Result<Self> {
        check_rates(arrival_rate, service_rate, 2)?;
        Ok(Self {
            lambda: arrival_rate,
            mu: service_rate,
        })
    }

    pub fn from_config(config: &QueueConfig) -> Result<Self> {
        let hourly = config.to_hourly();
        Self::new(hourly.arrival_rate, hourly.service_rate)
    }

    fn offered_load(&self) -> f64 {
        self.lambda / self.mu
    }
}

impl QueueModel for Mm2 {
    fn arrival_rate(&self) -> f64 {
        self.lambda
    }

    fn service_rate(&self) -> f64 {
        self.mu
    }

    fn servers(&self) -> u32 {
        2
    }

    fn p0(&self) -> f64 {
        let a = self.offered_load();
        1.0 / (1.0 + a + a * a / 2.0)
    }

    /// P(N ≥ 2) = 1 − P0·(1 + a).
    fn wait_probability(&self) -> f64 {
        (1.0 - self.p0() * (1.0 + self.offered_load())).max(0.0)
    }

    fn queue_length(&self) -> f64 {
        let a = self.offered_load();
        a * a * self.p0() / (2.0 * (1.0 - self.utilization()))
    }
}

// ============================================================================
// M/M/c
// ============================================================================

/// c-server queue, exact Erlang-C model.
///
/// # Algorithm
/// P0 = [Σ_{n<c} aⁿ/n! + a^c/(c!(1−ρ))]⁻¹, C = a^c/(c!(1−ρ))·P0,
/// Lq = C·ρ/(1−ρ). The terms aⁿ/n! are built by recurrence.
///
/// Reference: Gross et al. (2008), *Fundamentals of Queueing Theory*, §2.3.
///
/// # Examples
/// ```
/// use u_numkit::queueing::{Mmc, QueueModel};
/// let q = Mmc::new(5.0, 3.0, 2).unwrap();
/// assert!((q.wait_probability() - 25.0 / 33.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mmc {
    lambda: f64,
    mu: f64,
    c: u32,
}

impl Mmc {
    /// # Errors
    /// [`StatsError::Validation`] if either rate is non-positive, `c == 0`,
    /// or λ ≥ c·μ.
    pub fn new(arrival_rate: f64, service_rate: f64, servers: u32) -> Result<Self> {
        check_rates(arrival_rate, service_rate, servers)?;
        Ok(Self {
            lambda: arrival_rate,
            mu: service_rate,
            c: servers,
        })
    }

    pub fn from_config(config: &QueueConfig) -> Result<Self> {
        let hourly = config.to_hourly();
        Self::new(hourly.arrival_rate, hourly.service_rate, hourly.servers)
    }

    /// (Σ_{n<c} aⁿ/n!, a^c/(c!(1−ρ)))
    fn erlang_terms(&self) -> (f64, f64) {
        let a = self.lambda / self.mu;
        let mut term = 1.0;
        let mut head = 0.0;
        for n in 0..self.c {
            head += term;
            term *= a / f64::from(n + 1);
        }
        (head, term / (1.0 - self.utilization()))
    }
}

impl QueueModel for Mmc {
    fn arrival_rate(&self) -> f64 {
        self.lambda
    }

    fn service_rate(&self) -> f64 {
        self.mu
    }

    fn servers(&self) -> u32 {
        self.c
    }

    fn p0(&self) -> f64 {
        let (head, tail) = self.erlang_terms();
        1.0 / (head + tail)
    }

    fn wait_probability(&self) -> f64 {
        let (head, tail) = self.erlang_terms();
        tail / (head + tail)
    }

    fn queue_length(&self) -> f64 {
        let rho = self.utilization();
        self.wait_probability() * rho / (1.0 - rho)
    }
}

// ============================================================================
// Comparison
// ============================================================================

/// One server versus two for the same arrival and service rates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelComparison {
    pub single: QueueMetrics,
    pub double: QueueMetrics,
    /// (Wq₁ − Wq₂) / Wq₁ · 100
    pub wait_reduction_percent: f64,
}

/// M/M/1 and M/M/2 metrics side by side for the hourly form of `config`.
///
/// # Errors
/// [`StatsError::Validation`] if either model is unstable or a rate is
/// non-positive.
pub fn compare_models(config: &QueueConfig) -> Result<ModelComparison> {
    let single = Mm1::from_config(config)?.metrics();
    let double = Mm2::from_config(config)?.metrics();
    let wait_reduction_percent = (single.queue_time - double.queue_time) / single.queue_time * 100.0;
    debug!(
        mm1_wq = single.queue_time,
        mm2_wq = double.queue_time,
        wait_reduction_percent,
        "queue model comparison"
    );
    Ok(ModelComparison {
        single,
        double,
        wait_reduction_percent,
    })
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn mmc_one_server_is_mm1(mu in 0.1_f64..100.0, load in 0.01_f64..0.99) {
            let lambda = load * mu;
            let a = Mm1::new(lambda, mu).unwrap();
            let b = Mmc::new(lambda, mu, 1).unwrap();
            let tol = 1e-9 * a.queue_length().max(1.0);
            prop_assert!((a.queue_length() - b.queue_length()).abs() < tol);
        }

        #[test]
        fn littles_law(mu in 0.1_f64..100.0, load in 0.01_f64..0.99, c in 1_u32..20) {
            let lambda = load * mu * f64::from(c);
            let m = Mmc::new(lambda, mu, c).unwrap().metrics();
            prop_assert!((m.system_length - lambda * m.system_time).abs() < 1e-9 * m.system_length.max(1.0));
            prop_assert!((0.0..=1.0).contains(&m.wait_probability));
        }

        #[test]
        fn more_servers_never_wait_longer(mu in 0.1_f64..100.0, load in 0.01_f64..0.99, c in 1_u32..10) {
            let lambda = load * mu * f64::from(c);
            let fewer = Mmc::new(lambda, mu, c).unwrap().queue_time();
            let more = Mmc::new(lambda, mu, c + 1).unwrap().queue_time();
            prop_assert!(more <= fewer + 1e-12);
        }
    }
}
