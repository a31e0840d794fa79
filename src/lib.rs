//! `mmfit` library crate.
//!
//! Simulates noisy Michaelis-Menten enzyme kinetics data, fits the
//! two-parameter rate law back out of the noise, and reports fit quality.
//! The pipeline is deliberately linear:
//!
//! synthetic data -> weighted nonlinear fit -> goodness of fit -> plot data
//!
//! Everything lives in a library so that:
//!
//! - core logic is testable without spawning processes
//! - a presentation layer (plots, notebooks, etc.) can consume the
//!   structured outputs without re-running any math
//! - the random stream is owned by the caller, keeping runs reproducible

pub mod app;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod math;
pub mod models;
pub mod report;
