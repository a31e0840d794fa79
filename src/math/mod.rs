//! Mathematical utilities: damped nonlinear least squares.

pub mod lm;

pub use lm::*;
