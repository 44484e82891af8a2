use serde::Serialize;
use tracing::debug;

use crate::config::QueueConfig;
use crate::error::Result;
use crate::random::{create_rng, sample_exponential};
use crate::stats;

/// Averages observed in one simulated run, in the config's hourly units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub customers: usize,
    pub average_queue_time: f64,
    pub average_service_time: f64,
    /// Busy server time inside the horizon over `servers × horizon`.
    pub server_utilization: f64,
    /// Mean number in system seen by each arrival, itself included.
    pub average_in_system: f64,
}

/// Simulates a c-server FIFO queue over `config.simulation_time`.
///
/// Arrivals form a Poisson process with rate λ; service times are
/// exponential with rate μ. Each customer takes the server that frees up
/// first. The run is fully determined by `seed`.
///
/// # Errors
/// [`crate::StatsError::Validation`] if `config` fails
/// [`QueueConfig::validate`].
///
/// # Examples
/// ```
/// use u_numkit::config::QueueConfig;
/// use u_numkit::queueing::simulate;
///
/// let cfg = QueueConfig::new(2.0, 3.0).with_servers(2);
/// let a = simulate(&cfg, 42).unwrap();
/// let b = simulate(&cfg, 42).unwrap();
/// assert_eq!(a, b);
/// ```
pub fn simulate(config: &QueueConfig, seed: u64) -> Result<SimulationReport> {
    config.validate()?;
    let cfg = config.to_hourly();
    let horizon = cfg.simulation_time;
    let mut rng = create_rng(seed);

    let mut free_at = vec![0.0_f64; cfg.servers as usize];
    let mut in_system: Vec<f64> = Vec::new();
    let mut waits = Vec::new();
    let mut services = Vec::new();
    let mut seen = Vec::new();
    let mut busy = 0.0;

    let mut now = sample_exponential(&mut rng, cfg.arrival_rate);
    while now <= horizon {
        let service = sample_exponential(&mut rng, cfg.service_rate);
        let (slot, &available) = free_at
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(b.1))
            .unwrap_or((0, &0.0));
        let start = now.max(available);
        let departure = start + service;
        if let Some(s) = free_at.get_mut(slot) {
            *s = departure;
        }

        in_system.retain(|&d| d > now);
        in_system.push(departure);
        seen.push(in_system.len() as f64);

        busy += (departure.min(horizon) - start.min(horizon)).max(0.0);
        waits.push(start - now);
        services.push(service);
        now += sample_exponential(&mut rng, cfg.arrival_rate);
    }

    let report = SimulationReport {
        customers: waits.len(),
        average_queue_time: stats::mean(&waits).unwrap_or(0.0),
        average_service_time: stats::mean(&services).unwrap_or(0.0),
        server_utilization: busy / (horizon * f64::from(cfg.servers)),
        average_in_system: stats::mean(&seen).unwrap_or(0.0),
    };
    debug!(
        seed,
        customers = report.customers,
        wq = report.average_queue_time,
        utilization = report.server_utilization,
        "queue simulation"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimeUnit;
    use crate::queueing::{Mmc, QueueModel};

    #[test]
    fn test_same_seed_same_run() {
        let cfg = QueueConfig::new(2.0, 3.0);
        assert_eq!(simulate(&cfg, 7).unwrap(), simulate(&cfg, 7).unwrap());
        assert_ne!(simulate(&cfg, 7).unwrap(), simulate(&cfg, 8).unwrap());
    }

    #[test]
    fn test_rejects_unstable_config() {
        assert!(simulate(&QueueConfig::new(3.0, 3.0), 1).is_err());
    }

    #[test]
    fn test_long_run_matches_erlang_c() {
        let mut cfg = QueueConfig::new(4.0, 3.0).with_servers(2);
        cfg.simulation_time = 20_000.0;
        let sim = simulate(&cfg, 123).unwrap();
        let exact = Mmc::new(4.0, 3.0, 2).unwrap();
        let wq = exact.queue_time();
        assert!((sim.average_queue_time - wq).abs() < 0.1 * wq, "{} vs {wq}", sim.average_queue_time);
        assert!((sim.server_utilization - 2.0 / 3.0).abs() < 0.02);
        assert!((sim.average_service_time - 1.0 / 3.0).abs() < 0.01);
    }

    #[test]
    fn test_minutes_are_converted() {
        let mut cfg = QueueConfig::new(1.0, 0.2).with_servers(6);
        cfg.time_unit = TimeUnit::Minutes;
        cfg.simulation_time = 600.0;
        let sim = simulate(&cfg, 5).unwrap();
        // ~60 arrivals per hour over 10 hours
        assert!((400..800).contains(&sim.customers));
        assert!(sim.average_service_time < 0.2);
    }

    #[test]
    fn test_single_server_never_overlaps() {
        let sim = simulate(&QueueConfig::new(2.0, 3.0), 99).unwrap();
        assert!(sim.server_utilization <= 1.0);
        assert!(sim.average_in_system >= 1.0);
    }
}
