//! Top-level orchestration.
//!
//! The experiment pipeline lives here; everything below it is a reusable
//! building block with no knowledge of the overall run shape.

pub mod pipeline;

pub use pipeline::*;
