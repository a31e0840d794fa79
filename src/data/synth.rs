//! Synthetic Michaelis-Menten dataset generation.
//!
//! Concentrations are laid out on an even grid over `[0, s_max)`; velocities
//! are the noise-free model values plus i.i.d. Gaussian noise of a fixed
//! standard deviation. Every point reports that same standard deviation as
//! its uncertainty, so the downstream fit is told the exact noise level that
//! produced the data (an idealization the fit exploits via absolute sigmas).
//!
//! The RNG is owned by the caller. Seeding it explicitly makes dataset
//! generation deterministic, which the test suite relies on.

use log::debug;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::domain::{Dataset, Observation, SynthConfig};
use crate::error::{FitError, Result};
use crate::models::velocity;

/// Generate a noisy dataset from the true kinetic parameters.
///
/// The grid is `s_i = i * s_max / n` for `i = 0..n`, so the series always
/// contains `s = 0` and never reaches `s_max`.
pub fn generate_dataset(config: &SynthConfig, rng: &mut StdRng) -> Result<Dataset> {
    if config.n_obs == 0 {
        return Err(FitError::InvalidParameter {
            name: "n_obs",
            value: 0.0,
            constraint: "> 0",
        });
    }
    if !(config.s_max.is_finite() && config.s_max > 0.0) {
        return Err(FitError::InvalidParameter {
            name: "s_max",
            value: config.s_max,
            constraint: "finite and > 0",
        });
    }
    if !(config.noise_sd.is_finite() && config.noise_sd >= 0.0) {
        return Err(FitError::InvalidParameter {
            name: "noise_sd",
            value: config.noise_sd,
            constraint: "finite and >= 0",
        });
    }
    if !config.truth.vmax.is_finite() {
        return Err(FitError::InvalidParameter {
            name: "vmax",
            value: config.truth.vmax,
            constraint: "finite",
        });
    }
    if !(config.truth.km.is_finite() && config.truth.km > 0.0) {
        return Err(FitError::InvalidParameter {
            name: "km",
            value: config.truth.km,
            constraint: "finite and > 0",
        });
    }

    // Standard normal scaled by noise_sd, so noise_sd = 0 cleanly yields
    // noise-free data instead of a degenerate distribution.
    let normal =
        Normal::new(0.0, 1.0).map_err(|e| FitError::Distribution(e.to_string()))?;

    let n = config.n_obs;
    let mut points = Vec::with_capacity(n);
    for i in 0..n {
        let s = i as f64 * config.s_max / n as f64;
        let z: f64 = normal.sample(rng);
        let v_obs = velocity(s, &config.truth) + config.noise_sd * z;
        points.push(Observation {
            s,
            v_obs,
            sigma: config.noise_sd,
        });
    }

    debug!(
        "generated {} observations over [0, {}) with noise sd {}",
        n, config.s_max, config.noise_sd
    );

    Ok(Dataset {
        points,
        truth: config.truth,
        noise_sd: config.noise_sd,
    })
}
