//! Nonlinear fit orchestration.
//!
//! Responsibilities:
//!
//! - validate observations and the starting guess before any math runs
//! - translate sigmas into fit weights
//! - drive the Levenberg-Marquardt core and scale the output covariance

pub mod driver;

pub use driver::*;
