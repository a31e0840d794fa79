//! Weighted Michaelis-Menten fit driver.
//!
//! Minimizes `Σ ((v_i - v(s_i; Vmax, Km)) / σ_i)^2` over `(Vmax, Km)` from a
//! caller-supplied starting guess, and derives the parameter covariance from
//! the Jacobian at the solution.
//!
//! Covariance semantics: under `SigmaMode::Absolute` (the default, and the
//! only mode the simulation pipeline uses) the sigmas are taken at face
//! value and the covariance is `(J^T J)^-1`, *not* rescaled by the reduced
//! chi-square. Under `SigmaMode::Relative` the sigmas only fix relative
//! weights and the covariance is multiplied by `cost / (n - 2)`.

use log::debug;
use nalgebra::{DMatrix, DVector};

use crate::domain::{FitOptions, FitResult, KineticParams, Observation, PARAM_COUNT, SigmaMode};
use crate::error::{FitError, Result};
use crate::math::{LmOptions, covariance_from_jtj, minimize};
use crate::models::{velocity, velocity_gradient};

/// Minimum observation count: one more than the number of fitted parameters,
/// so the degrees of freedom stay positive.
pub const MIN_OBSERVATIONS: usize = PARAM_COUNT + 1;

/// Translate reported sigmas into fit weights (`1 / σ_i`).
///
/// A fully noise-free dataset reports `σ_i = 0` everywhere; weighting by
/// `1/σ` is then undefined, so the fit falls back to unit weights. A mix of
/// zero and nonzero sigmas has no sensible interpretation and is rejected.
pub fn fit_weights(points: &[Observation]) -> Result<Vec<f64>> {
    if points.iter().all(|p| p.sigma == 0.0) {
        return Ok(vec![1.0; points.len()]);
    }
    points
        .iter()
        .map(|p| {
            if p.sigma.is_finite() && p.sigma > 0.0 {
                Ok(1.0 / p.sigma)
            } else {
                Err(FitError::InvalidParameter {
                    name: "sigma",
                    value: p.sigma,
                    constraint: "> 0 (or exactly 0 on every point)",
                })
            }
        })
        .collect()
}

/// Fit `(Vmax, Km)` to the observations.
///
/// Fails before any solver work when the inputs cannot support a fit:
/// fewer than [`MIN_OBSERVATIONS`] points, non-finite values, a zero `km`
/// in the starting guess, or inconsistent sigmas.
pub fn fit_michaelis_menten(points: &[Observation], options: &FitOptions) -> Result<FitResult> {
    let n = points.len();
    if n < MIN_OBSERVATIONS {
        return Err(FitError::TooFewObservations {
            n,
            min: MIN_OBSERVATIONS,
        });
    }
    if !options.initial.vmax.is_finite() {
        return Err(FitError::InvalidParameter {
            name: "initial.vmax",
            value: options.initial.vmax,
            constraint: "finite",
        });
    }
    if !options.initial.km.is_finite() || options.initial.km == 0.0 {
        return Err(FitError::InvalidParameter {
            name: "initial.km",
            value: options.initial.km,
            constraint: "finite and nonzero",
        });
    }
    for p in points {
        if !(p.s.is_finite() && p.s >= 0.0) {
            return Err(FitError::InvalidParameter {
                name: "s",
                value: p.s,
                constraint: "finite and >= 0",
            });
        }
        if !p.v_obs.is_finite() {
            return Err(FitError::InvalidParameter {
                name: "v_obs",
                value: p.v_obs,
                constraint: "finite",
            });
        }
    }
    let weights = fit_weights(points)?;

    let residuals = {
        let points = points.to_vec();
        let weights = weights.clone();
        move |x: &DVector<f64>| {
            let params = KineticParams::new(x[0], x[1]);
            DVector::from_iterator(
                points.len(),
                points
                    .iter()
                    .zip(weights.iter())
                    .map(|(p, w)| (p.v_obs - velocity(p.s, &params)) * w),
            )
        }
    };
    let jacobian = {
        let points = points.to_vec();
        let weights = weights.clone();
        move |x: &DVector<f64>| {
            let params = KineticParams::new(x[0], x[1]);
            DMatrix::from_fn(points.len(), PARAM_COUNT, |i, j| {
                let (d_vmax, d_km) = velocity_gradient(points[i].s, &params);
                let d = if j == 0 { d_vmax } else { d_km };
                d * weights[i]
            })
        }
    };

    let x0 = DVector::from_vec(vec![options.initial.vmax, options.initial.km]);
    let out = minimize(x0, residuals, jacobian, &LmOptions::default())?;

    let mut cov = covariance_from_jtj(&out.jtj).ok_or(FitError::SingularJacobian)?;
    if options.sigma_mode == SigmaMode::Relative {
        // Sigmas were only relative weights: rescale by the reduced chi-square.
        let scale = out.cost / (n - PARAM_COUNT) as f64;
        cov *= scale;
    }

    let params = KineticParams::new(out.params[0], out.params[1]);
    debug!(
        "fit converged in {} iterations: vmax = {:.6}, km = {:.6}, cost = {:.6e}",
        out.iterations, params.vmax, params.km, out.cost
    );

    Ok(FitResult {
        params,
        covariance: [
            [cov[(0, 0)], cov[(0, 1)]],
            [cov[(1, 0)], cov[(1, 1)]],
        ],
        cost: out.cost,
        iterations: out.iterations,
    })
}
