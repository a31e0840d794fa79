//! Michaelis-Menten rate law.
//!
//! The model is implemented as small, pure functions so that fitting and
//! reporting code can stay generic over "evaluate" and "differentiate".

pub mod model;

pub use model::*;
