//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - handed to a plotting layer as-is
//! - exported to JSON for later comparison runs

use serde::{Deserialize, Serialize};

/// Number of free parameters in the Michaelis-Menten rate law (Vmax, Km).
pub const PARAM_COUNT: usize = 2;

/// The two kinetic constants of the Michaelis-Menten rate law.
///
/// `vmax` is the saturating velocity as substrate concentration grows without
/// bound; `km` is the concentration at which velocity reaches `vmax / 2`.
/// Both are estimated by the fit; "true" values appear only as inputs to the
/// synthetic data generator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KineticParams {
    pub vmax: f64,
    pub km: f64,
}

impl KineticParams {
    pub fn new(vmax: f64, km: f64) -> Self {
        Self { vmax, km }
    }
}

/// One observed data point: substrate concentration, measured velocity, and
/// the reported measurement uncertainty (one standard deviation).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Substrate concentration (>= 0).
    pub s: f64,
    /// Observed reaction velocity (model value plus noise).
    pub v_obs: f64,
    /// Reported uncertainty for this point (one sigma).
    pub sigma: f64,
}

/// A synthetic dataset together with the truth that generated it.
///
/// `truth` and `noise_sd` are carried along for diagnostics and tests; the
/// fit itself only ever sees `points`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub points: Vec<Observation>,
    /// Parameters the generator used (not visible to the fit).
    pub truth: KineticParams,
    /// Noise standard deviation the generator used.
    pub noise_sd: f64,
}

/// Inputs to the synthetic dataset generator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SynthConfig {
    /// True kinetic parameters used to compute noise-free velocities.
    pub truth: KineticParams,
    /// Gaussian noise standard deviation added to each velocity (>= 0).
    pub noise_sd: f64,
    /// Number of observations to generate.
    pub n_obs: usize,
    /// Concentrations are evenly spaced over `[0, s_max)`.
    pub s_max: f64,
}

/// How reported uncertainties scale the output covariance.
///
/// This mirrors the two conventions of weighted least squares:
///
/// - `Absolute`: sigmas are trusted in absolute terms; the covariance is
///   `(J^T J)^-1` with no further scaling.
/// - `Relative`: sigmas only encode relative weights; the covariance is
///   rescaled by the reduced chi-square.
///
/// The simulation pipeline always uses `Absolute` because the fit is told
/// the exact noise level that generated the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SigmaMode {
    #[default]
    Absolute,
    Relative,
}

/// Options for a single fit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitOptions {
    /// Starting point for the solver. `km` must be nonzero.
    pub initial: KineticParams,
    /// Covariance scaling convention.
    pub sigma_mode: SigmaMode,
}

impl FitOptions {
    /// Options with the default (absolute-sigma) covariance convention.
    pub fn from_guess(initial: KineticParams) -> Self {
        Self {
            initial,
            sigma_mode: SigmaMode::Absolute,
        }
    }
}

/// Best-fit parameters and their uncertainty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    /// Estimated kinetic parameters.
    pub params: KineticParams,
    /// 2x2 parameter covariance, row-major `[Vmax, Km]` ordering.
    ///
    /// Symmetric by construction. Only meaningful in absolute terms when the
    /// reported sigmas are accurate in absolute terms (`SigmaMode::Absolute`).
    pub covariance: [[f64; 2]; 2],
    /// Final weighted sum of squared residuals.
    pub cost: f64,
    /// Solver iterations used.
    pub iterations: usize,
}

impl FitResult {
    /// Standard error of the fitted Vmax.
    pub fn vmax_std_err(&self) -> f64 {
        self.covariance[0][0].max(0.0).sqrt()
    }

    /// Standard error of the fitted Km.
    pub fn km_std_err(&self) -> f64 {
        self.covariance[1][1].max(0.0).sqrt()
    }

    /// Correlation between the Vmax and Km estimates, in `[-1, 1]`.
    ///
    /// Returns 0 when either variance is (numerically) zero.
    pub fn correlation(&self) -> f64 {
        let denom = self.vmax_std_err() * self.km_std_err();
        if denom > 0.0 {
            (self.covariance[0][1] / denom).clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Fit quality diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitQuality {
    /// Sum of squared, sigma-normalized residuals.
    pub chisq: f64,
    /// Degrees of freedom: observation count minus fitted parameter count.
    pub dof: usize,
    /// `chisq / dof`; near 1 for a well-specified fit with honest sigmas.
    pub reduced_chisq: f64,
}

/// Everything a direct (v vs. s) plot needs: the observed points with error
/// bars and the fitted curve evaluated at the same concentrations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveSeries {
    pub s: Vec<f64>,
    pub v_obs: Vec<f64>,
    pub sigma: Vec<f64>,
    pub v_fit: Vec<f64>,
}

/// Everything a double-reciprocal (Lineweaver-Burk) plot needs.
///
/// The transform is undefined where `s` or `v_obs` is exactly zero; those
/// points are dropped and counted in `skipped` rather than emitted as
/// infinities (see `report::reciprocal_series`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReciprocalSeries {
    pub inv_s: Vec<f64>,
    pub inv_v_obs: Vec<f64>,
    pub inv_v_fit: Vec<f64>,
    /// X-axis intercept of the fitted line: `-1 / Km`.
    pub x_intercept: f64,
    /// Y-axis intercept of the fitted line: `1 / Vmax`.
    pub y_intercept: f64,
    /// Number of observations dropped because the transform was undefined.
    pub skipped: usize,
}

/// A full run's configuration as understood by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// True parameters for data synthesis.
    pub truth: KineticParams,
    /// Gaussian noise standard deviation.
    pub noise_sd: f64,
    /// Number of synthetic observations.
    pub n_obs: usize,
    /// Concentration range upper bound (exclusive).
    pub s_max: f64,
    /// RNG seed; same seed, same dataset.
    pub seed: u64,
    /// Starting guess handed to the solver.
    pub initial: KineticParams,
    /// Covariance scaling convention.
    pub sigma_mode: SigmaMode,
}

impl Default for ExperimentConfig {
    /// The canonical textbook experiment: a saturating enzyme with
    /// `Vmax = 100`, `Km = 3`, fifty points over `[0, 50)`, noise of 2
    /// velocity units, and a deliberately rough starting guess.
    fn default() -> Self {
        Self {
            truth: KineticParams::new(100.0, 3.0),
            noise_sd: 2.0,
            n_obs: 50,
            s_max: 50.0,
            seed: 42,
            initial: KineticParams::new(110.0, 25.0),
            sigma_mode: SigmaMode::Absolute,
        }
    }
}
