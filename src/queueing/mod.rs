//! Queueing theory.
//!
//! Steady-state formulas for Markovian queues ([`Mm1`], [`Mm2`], [`Mmc`])
//! and a seeded discrete-event simulation of a c-server FIFO queue
//! ([`simulate`]).
//!
//! # Examples
//!
//! ```
//! use u_numkit::queueing::{Mm1, QueueModel};
//!
//! let q = Mm1::new(2.0, 3.0).unwrap();
//! let m = q.metrics();
//! assert!((m.utilization - 2.0 / 3.0).abs() < 1e-12);
//! assert!((m.queue_length - 4.0 / 3.0).abs() < 1e-12);
//! assert!((m.queue_time - 2.0 / 3.0).abs() < 1e-12);
//! ```

mod models;
mod simulation;

pub use models::{compare_models, Mm1, Mm2, Mmc, ModelComparison, QueueMetrics, QueueModel};
pub use simulation::{simulate, SimulationReport};
