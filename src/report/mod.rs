//! Reporting utilities: goodness of fit and plot-layer data.
//!
//! We keep this separate from the fit driver so:
//! - the math/fitting code stays clean and testable
//! - the plotting contract is explicit: a presentation layer gets exactly
//!   these structures and never re-runs any computation

pub mod format;

pub use format::*;

use crate::domain::{CurveSeries, FitQuality, KineticParams, Observation, PARAM_COUNT, ReciprocalSeries};
use crate::error::{FitError, Result};
use crate::fit::{MIN_OBSERVATIONS, fit_weights};
use crate::models::velocity;

/// Chi-square goodness of fit against the fitted parameters.
///
/// `chisq = Σ ((v_i - v(s_i)) / σ_i)^2`, `dof = n - 2`. Uses the same
/// sigma-to-weight rule as the fit itself, so a noise-free dataset yields a
/// plain (unweighted) sum of squared residuals.
pub fn goodness_of_fit(points: &[Observation], params: &KineticParams) -> Result<FitQuality> {
    let n = points.len();
    if n < MIN_OBSERVATIONS {
        return Err(FitError::TooFewObservations {
            n,
            min: MIN_OBSERVATIONS,
        });
    }
    let weights = fit_weights(points)?;

    let mut chisq = 0.0;
    for (p, w) in points.iter().zip(weights.iter()) {
        let r = (p.v_obs - velocity(p.s, params)) * w;
        chisq += r * r;
    }
    if !chisq.is_finite() {
        return Err(FitError::NonFinite { what: "chi-square" });
    }

    let dof = n - PARAM_COUNT;
    Ok(FitQuality {
        chisq,
        dof,
        reduced_chisq: chisq / dof as f64,
    })
}

/// Assemble the direct-plot contract: observed points with error bars plus
/// the fitted curve evaluated at each observed concentration.
pub fn curve_series(points: &[Observation], params: &KineticParams) -> Result<CurveSeries> {
    let mut series = CurveSeries {
        s: Vec::with_capacity(points.len()),
        v_obs: Vec::with_capacity(points.len()),
        sigma: Vec::with_capacity(points.len()),
        v_fit: Vec::with_capacity(points.len()),
    };
    for p in points {
        let v_fit = velocity(p.s, params);
        if !v_fit.is_finite() {
            return Err(FitError::NonFinite {
                what: "model prediction",
            });
        }
        series.s.push(p.s);
        series.v_obs.push(p.v_obs);
        series.sigma.push(p.sigma);
        series.v_fit.push(v_fit);
    }
    Ok(series)
}

/// Assemble the double-reciprocal (Lineweaver-Burk) plot contract.
///
/// The transform `(s, v) -> (1/s, 1/v)` is undefined wherever a value is
/// exactly zero, and the concentration grid always starts at `s = 0`. We
/// drop such points explicitly and report how many were dropped, rather
/// than emitting infinities or masking the hole with a clamp.
pub fn reciprocal_series(curve: &CurveSeries, params: &KineticParams) -> ReciprocalSeries {
    let mut out = ReciprocalSeries {
        inv_s: Vec::with_capacity(curve.s.len()),
        inv_v_obs: Vec::with_capacity(curve.s.len()),
        inv_v_fit: Vec::with_capacity(curve.s.len()),
        x_intercept: -1.0 / params.km,
        y_intercept: 1.0 / params.vmax,
        skipped: 0,
    };
    for i in 0..curve.s.len() {
        let (s, v_obs, v_fit) = (curve.s[i], curve.v_obs[i], curve.v_fit[i]);
        if s == 0.0 || v_obs == 0.0 || v_fit == 0.0 {
            out.skipped += 1;
            continue;
        }
        out.inv_s.push(1.0 / s);
        out.inv_v_obs.push(1.0 / v_obs);
        out.inv_v_fit.push(1.0 / v_fit);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::generate_dataset;
    use crate::domain::SynthConfig;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn dataset(noise_sd: f64, n_obs: usize, seed: u64) -> Vec<Observation> {
        let cfg = SynthConfig {
            truth: KineticParams::new(100.0, 3.0),
            noise_sd,
            n_obs,
            s_max: 50.0,
        };
        let mut rng = StdRng::seed_from_u64(seed);
        generate_dataset(&cfg, &mut rng).unwrap().points
    }

    #[test]
    fn perfect_fit_has_zero_chisq() {
        let points = dataset(0.0, 50, 1);
        let q = goodness_of_fit(&points, &KineticParams::new(100.0, 3.0)).unwrap();
        assert!(q.chisq < 1e-20);
        assert_eq!(q.dof, 48);
    }

    #[test]
    fn dof_is_n_minus_two() {
        for n in [3usize, 10, 50, 117] {
            let points = dataset(2.0, n, 5);
            let q = goodness_of_fit(&points, &KineticParams::new(100.0, 3.0)).unwrap();
            assert_eq!(q.dof, n - 2);
            assert!((q.reduced_chisq - q.chisq / q.dof as f64).abs() < 1e-12);
        }
    }

    #[test]
    fn goodness_rejects_too_few_points() {
        let points = dataset(2.0, 2, 5);
        let err = goodness_of_fit(&points, &KineticParams::new(100.0, 3.0)).unwrap_err();
        assert_eq!(err, FitError::TooFewObservations { n: 2, min: 3 });
    }

    #[test]
    fn noisy_chisq_is_near_dof_for_honest_sigmas() {
        // With the true parameters and the true noise level, the reduced
        // chi-square should sit in the vicinity of 1.
        let points = dataset(2.0, 50, 42);
        let q = goodness_of_fit(&points, &KineticParams::new(100.0, 3.0)).unwrap();
        assert!(q.reduced_chisq > 0.3 && q.reduced_chisq < 3.0, "got {}", q.reduced_chisq);
    }

    #[test]
    fn curve_series_aligns_with_observations() {
        let points = dataset(2.0, 20, 9);
        let params = KineticParams::new(100.0, 3.0);
        let series = curve_series(&points, &params).unwrap();
        assert_eq!(series.s.len(), 20);
        for (i, p) in points.iter().enumerate() {
            assert_eq!(series.s[i], p.s);
            assert_eq!(series.v_obs[i], p.v_obs);
            assert_eq!(series.sigma[i], p.sigma);
            assert_eq!(series.v_fit[i], velocity(p.s, &params));
        }
    }

    #[test]
    fn reciprocal_series_skips_the_origin() {
        // Noise-free so s = 0 implies v_obs = 0 as well; exactly that one
        // grid point is undefined under the transform.
        let points = dataset(0.0, 50, 3);
        let params = KineticParams::new(100.0, 3.0);
        let curve = curve_series(&points, &params).unwrap();
        let rec = reciprocal_series(&curve, &params);

        assert_eq!(rec.skipped, 1);
        assert_eq!(rec.inv_s.len(), 49);
        assert!(rec.inv_s.iter().all(|v| v.is_finite()));
        assert!(rec.inv_v_obs.iter().all(|v| v.is_finite()));
        assert!(rec.inv_v_fit.iter().all(|v| v.is_finite()));

        assert!((rec.x_intercept - (-1.0 / 3.0)).abs() < 1e-12);
        assert!((rec.y_intercept - 0.01).abs() < 1e-12);
    }

    #[test]
    fn reciprocal_series_matches_transform_pointwise() {
        let points = dataset(0.0, 10, 3);
        let params = KineticParams::new(100.0, 3.0);
        let curve = curve_series(&points, &params).unwrap();
        let rec = reciprocal_series(&curve, &params);

        // First grid point (s = 0) dropped; the rest map 1:1.
        for (k, i) in (1..points.len()).enumerate() {
            assert!((rec.inv_s[k] - 1.0 / curve.s[i]).abs() < 1e-15);
            assert!((rec.inv_v_fit[k] - 1.0 / curve.v_fit[i]).abs() < 1e-15);
        }
    }
}
