//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - kinetic parameters and observation points (`KineticParams`, `Observation`)
//! - generator/fit configuration (`SynthConfig`, `FitOptions`, `ExperimentConfig`)
//! - fit outputs (`FitResult`, `FitQuality`)
//! - the plot-layer contract (`CurveSeries`, `ReciprocalSeries`)

pub mod types;

pub use types::*;
