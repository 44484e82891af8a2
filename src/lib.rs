//! # u-numkit
//!
//! Applied statistics and numerical-methods toolkit.
//!
//! Each calculator takes plain numbers or slices, validates them, and
//! returns a serializable result record or a [`StatsError`].
//!
//! ## Modules
//!
//! - [`stats`]: descriptive statistics with numerical stability guarantees
//! - [`special`]: normal, Student-t, F and χ² distribution functions
//! - [`sample`]: validated numeric samples and their summaries
//! - [`interval`]: t-based confidence intervals for a mean
//! - [`testing`]: Levene, t-tests and χ² uniformity
//! - [`anova`]: one-way analysis of variance
//! - [`distributions`]: binomial, Poisson, normal and classical probability
//! - [`density`]: validation and moments of continuous densities
//! - [`queueing`]: M/M/1, M/M/2, M/M/c and a seeded queue simulation
//! - [`roots`]: bisection, Newton–Raphson and fixed-point iteration
//! - [`integration`]: trapezoidal rule
//! - [`interpolation`]: Lagrange polynomials
//! - [`regression`]: simple and multiple linear regression
//! - [`rounding`]: significant digits and rounding error
//! - [`random`]: seeded samplers and Monte Carlo simulations
//! - [`config`]: JSON-backed analysis and queue configuration
//!
//! ## Design Philosophy
//!
//! - **Numerical stability first**: Welford's algorithm for variance,
//!   Kahan summation for accumulation
//! - **Explicit seeds**: every simulation takes its seed as an argument
//! - **Property-based testing**: mathematical invariants verified via proptest

pub mod anova;
pub mod config;
pub mod density;
pub mod distributions;
pub mod error;
pub mod integration;
pub mod interpolation;
pub mod interval;
pub mod queueing;
pub mod random;
pub mod regression;
pub mod roots;
pub mod rounding;
pub mod sample;
pub mod special;
pub mod stats;
pub mod testing;

pub use error::{Result, StatsError};
