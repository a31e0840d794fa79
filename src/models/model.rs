//! Model evaluation for the Michaelis-Menten rate law.
//!
//! The fitter relies on two primitive operations:
//! - predict `v(s)` given the kinetic parameters (for residuals/plots)
//! - evaluate the analytic gradient wrt `(Vmax, Km)` (for the Jacobian)

use crate::domain::KineticParams;

/// Reaction velocity `v(s) = Vmax * s / (Km + s)`.
///
/// Pure and total for `s >= 0` and `km != 0`. A zero `km` together with
/// `s = 0` divides zero by zero; callers validate `km` at the pipeline
/// boundaries instead of checking here on every evaluation.
pub fn velocity(s: f64, params: &KineticParams) -> f64 {
    params.vmax * s / (params.km + s)
}

/// Partial derivatives of `velocity` wrt the parameters, as
/// `(dv/dVmax, dv/dKm)`.
///
/// Used to build the fit Jacobian analytically:
///
/// - `dv/dVmax = s / (Km + s)`
/// - `dv/dKm   = -Vmax * s / (Km + s)^2`
pub fn velocity_gradient(s: f64, params: &KineticParams) -> (f64, f64) {
    let denom = params.km + s;
    let d_vmax = s / denom;
    let d_km = -params.vmax * s / (denom * denom);
    (d_vmax, d_km)
}
