//! Configuration models.
//!
//! [`AnalysisConfig`] carries the default significance level, tolerances and
//! iteration caps shared by the calculators. [`QueueConfig`] describes a
//! queueing system and is the input of [`crate::queueing`].
//!
//! Both are JSON documents; every field except the two rates is optional
//! and falls back to its default.
//!
//! # Examples
//!
//! ```
//! use u_numkit::config::{QueueConfig, TimeUnit};
//!
//! let cfg = QueueConfig::from_json_str(
//!     r#"{"arrival_rate": 0.5, "service_rate": 0.25, "servers": 2, "time_unit": "minutes"}"#,
//! )
//! .unwrap();
//! let hourly = cfg.to_hourly();
//! assert_eq!(hourly.time_unit, TimeUnit::Hours);
//! assert_eq!(hourly.arrival_rate, 30.0);
//! ```

use std::fs;
use std::path::Path;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::error::{require_open_unit, require_positive, Result, StatsError};

// ============================================================================
// AnalysisConfig
// ============================================================================

/// Defaults shared by the statistical and numerical calculators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// α for hypothesis tests.
    #[serde(default = "default_significance_level")]
    pub significance_level: f64,

    /// Confidence level for intervals.
    #[serde(default = "default_confidence_level")]
    pub confidence_level: f64,

    #[serde(default = "default_tolerance")]
    pub bisection_tolerance: f64,

    #[serde(default = "default_tolerance")]
    pub newton_tolerance: f64,

    #[serde(default = "default_tolerance")]
    pub fixed_point_tolerance: f64,

    /// Iteration cap for the root finders.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Reference period (days) for Poisson rate rescaling.
    #[serde(default = "default_poisson_base_period")]
    pub poisson_base_period: u32,
}

fn default_significance_level() -> f64 {
    0.05
}

fn default_confidence_level() -> f64 {
    0.95
}

fn default_tolerance() -> f64 {
    1e-6
}

fn default_max_iterations() -> usize {
    100
}

fn default_poisson_base_period() -> u32 {
    30
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            significance_level: default_significance_level(),
            confidence_level: default_confidence_level(),
            bisection_tolerance: default_tolerance(),
            newton_tolerance: default_tolerance(),
            fixed_point_tolerance: default_tolerance(),
            max_iterations: default_max_iterations(),
            poisson_base_period: default_poisson_base_period(),
        }
    }
}

impl AnalysisConfig {
    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Loads and validates a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let cfg: Self = read_json(path)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_json(path, self)
    }

    /// Checks that levels lie in (0, 1), tolerances are positive and the
    /// iteration cap and Poisson base period are non-zero.
    pub fn validate(&self) -> Result<()> {
        require_open_unit("significance_level", self.significance_level)?;
        require_open_unit("confidence_level", self.confidence_level)?;
        require_positive("bisection_tolerance", self.bisection_tolerance)?;
        require_positive("newton_tolerance", self.newton_tolerance)?;
        require_positive("fixed_point_tolerance", self.fixed_point_tolerance)?;
        if self.max_iterations == 0 {
            return Err(StatsError::Config("max_iterations must be at least 1".into()));
        }
        if self.poisson_base_period == 0 {
            return Err(StatsError::Config(
                "poisson_base_period must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// QueueConfig
// ============================================================================

/// Unit in which the rates and simulation horizon of a [`QueueConfig`] are given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    #[default]
    Hours,
    Minutes,
}

/// A queueing system: rates per unit time, servers and simulation horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueConfig {
    /// λ, arrivals per time unit.
    pub arrival_rate: f64,

    /// μ, services per time unit per server.
    pub service_rate: f64,

    #[serde(default = "default_servers")]
    pub servers: u32,

    /// Horizon of the discrete-event simulation, in `time_unit`.
    #[serde(default = "default_simulation_time")]
    pub simulation_time: f64,

    #[serde(default)]
    pub time_unit: TimeUnit,

    #[serde(default = "default_confidence_level")]
    pub confidence_level: f64,
}

fn default_servers() -> u32 {
    1
}

fn default_simulation_time() -> f64 {
    8.0
}

impl QueueConfig {
    /// An hourly single-server config with default horizon.
    pub fn new(arrival_rate: f64, service_rate: f64) -> Self {
        Self {
            arrival_rate,
            service_rate,
            servers: default_servers(),
            simulation_time: default_simulation_time(),
            time_unit: TimeUnit::Hours,
            confidence_level: default_confidence_level(),
        }
    }

    pub fn with_servers(mut self, servers: u32) -> Self {
        self.servers = servers;
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let cfg: Self = read_json(path)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_json(path, self)
    }

    /// Minute-based rates are multiplied by 60 and the horizon divided by
    /// 60; hour-based configs are returned unchanged.
    pub fn to_hourly(&self) -> Self {
        match self.time_unit {
            TimeUnit::Hours => self.clone(),
            TimeUnit::Minutes => Self {
                arrival_rate: self.arrival_rate * 60.0,
                service_rate: self.service_rate * 60.0,
                simulation_time: self.simulation_time / 60.0,
                time_unit: TimeUnit::Hours,
                ..self.clone()
            },
        }
    }

    /// ρ = λ / (c·μ).
    pub fn utilization(&self) -> f64 {
        self.arrival_rate / (f64::from(self.servers) * self.service_rate)
    }

    /// Checks rates, server count, horizon, confidence level and the
    /// stability condition λ < c·μ.
    pub fn validate(&self) -> Result<()> {
        require_positive("arrival_rate", self.arrival_rate)?;
        require_positive("service_rate", self.service_rate)?;
        require_positive("simulation_time", self.simulation_time)?;
        require_open_unit("confidence_level", self.confidence_level)?;
        if self.servers == 0 {
            return Err(StatsError::validation("servers must be at least 1"));
        }
        let capacity = f64::from(self.servers) * self.service_rate;
        if self.arrival_rate >= capacity {
            return Err(StatsError::validation(format!(
                "unstable system: arrival rate {} must be below total service rate {capacity}",
                self.arrival_rate
            )));
        }
        Ok(())
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .map_err(|e| StatsError::io(format!("reading {}", path.display()), e))?;
    let value = serde_json::from_str(&content)?;
    debug!(path = %path.display(), "configuration loaded");
    Ok(value)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).map_err(|e| StatsError::io(format!("writing {}", path.display()), e))?;
    debug!(path = %path.display(), "configuration saved");
    Ok(())
}
