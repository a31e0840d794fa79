//! Levenberg-Marquardt minimizer for weighted nonlinear least squares.
//!
//! In this project we solve one small problem of the form:
//!
//! ```text
//! minimize Σ r_i(θ)^2,   r_i = (y_i - f_i(θ)) / σ_i
//! ```
//!
//! Implementation choices:
//! - The caller supplies the residual vector and the Jacobian of the *model*
//!   divided by the sigmas (`J_ij = (∂f_i/∂θ_j) / σ_i`), so the normal
//!   equations read `(J^T J + λ diag(J^T J)) δ = J^T r`.
//! - The damped system is solved by Cholesky. The parameter dimension is
//!   tiny (2 here), so factorization cost is irrelevant; what matters is
//!   that Cholesky fails loudly on a non-positive-definite system, which is
//!   exactly the rank-deficiency signal we want.
//! - Marquardt scaling (damping proportional to `diag(J^T J)`) keeps the
//!   step well-behaved when the two parameters have very different scales,
//!   as Vmax and Km typically do.

use log::{debug, trace};
use nalgebra::{DMatrix, DVector};

use crate::error::{FitError, Result};

/// Floor for the Marquardt scaling diagonal, so damping still regularizes
/// directions whose curvature is exactly zero.
const DIAG_FLOOR: f64 = 1e-12;

/// Tuning knobs for the minimizer.
#[derive(Debug, Clone, Copy)]
pub struct LmOptions {
    /// Outer iteration budget (one Jacobian evaluation each).
    pub max_iters: usize,
    /// Relative cost-decrease tolerance.
    pub ftol: f64,
    /// Relative step-size tolerance.
    pub xtol: f64,
    /// Gradient infinity-norm tolerance.
    pub gtol: f64,
    /// Initial damping factor.
    pub lambda_init: f64,
    /// Damping growth factor on a rejected step.
    pub lambda_up: f64,
    /// Damping shrink factor on an accepted step.
    pub lambda_down: f64,
    /// Damping ceiling; exceeding it means the fit is stuck.
    pub lambda_max: f64,
}

impl Default for LmOptions {
    fn default() -> Self {
        Self {
            max_iters: 100,
            ftol: 1e-10,
            xtol: 1e-10,
            gtol: 1e-12,
            lambda_init: 1e-3,
            lambda_up: 10.0,
            lambda_down: 10.0,
            lambda_max: 1e12,
        }
    }
}

/// Converged state of the minimizer.
#[derive(Debug, Clone)]
pub struct LmOutcome {
    /// Parameters at the minimum.
    pub params: DVector<f64>,
    /// Final sum of squared residuals.
    pub cost: f64,
    /// `J^T J` evaluated at the minimum (for covariance estimation).
    pub jtj: DMatrix<f64>,
    /// Outer iterations performed.
    pub iterations: usize,
}

/// Minimize the sum of squared residuals starting from `x0`.
///
/// `residuals` returns the weighted residual vector at the given parameters;
/// `jacobian` returns the matching weighted model Jacobian. A single attempt
/// is made from the given start; there is no restart logic.
pub fn minimize<F, J>(
    x0: DVector<f64>,
    mut residuals: F,
    mut jacobian: J,
    opts: &LmOptions,
) -> Result<LmOutcome>
where
    F: FnMut(&DVector<f64>) -> DVector<f64>,
    J: FnMut(&DVector<f64>) -> DMatrix<f64>,
{
    let p = x0.len();
    let mut x = x0;

    let mut r = residuals(&x);
    if !r.iter().all(|v| v.is_finite()) {
        return Err(FitError::NonFinite {
            what: "residuals at the initial guess",
        });
    }
    let mut cost = r.norm_squared();
    let mut lambda = opts.lambda_init;

    for iter in 1..=opts.max_iters {
        let j = jacobian(&x);
        if !j.iter().all(|v| v.is_finite()) {
            return Err(FitError::NonFinite { what: "Jacobian" });
        }
        let jt = j.transpose();
        let jtj = &jt * &j;
        let g = &jt * &r;

        if g.amax() <= opts.gtol {
            debug!("converged at iteration {iter}: gradient below tolerance");
            return Ok(LmOutcome {
                params: x,
                cost,
                jtj,
                iterations: iter,
            });
        }

        // Inner damping loop: grow lambda until a step is accepted or the
        // damping budget runs out.
        loop {
            let mut damped = jtj.clone();
            for k in 0..p {
                damped[(k, k)] += lambda * jtj[(k, k)].max(DIAG_FLOOR);
            }

            let Some(chol) = damped.cholesky() else {
                lambda *= opts.lambda_up;
                if lambda > opts.lambda_max {
                    return Err(FitError::SingularJacobian);
                }
                continue;
            };
            let delta = chol.solve(&g);
            if !delta.iter().all(|v| v.is_finite()) {
                lambda *= opts.lambda_up;
                if lambda > opts.lambda_max {
                    return Err(FitError::SingularJacobian);
                }
                continue;
            }

            let x_new = &x + &delta;
            let r_new = residuals(&x_new);
            let cost_new = if r_new.iter().all(|v| v.is_finite()) {
                r_new.norm_squared()
            } else {
                f64::INFINITY
            };

            let step_small = delta.norm() <= opts.xtol * (x.norm() + opts.xtol);

            if cost_new < cost {
                trace!(
                    "iter {iter}: accepted step, cost {cost:.6e} -> {cost_new:.6e}, lambda {lambda:.3e}"
                );
                let drop = cost - cost_new;
                x = x_new;
                r = r_new;
                let cost_old = cost;
                cost = cost_new;
                lambda = (lambda / opts.lambda_down).max(1e-14);

                if step_small || drop <= opts.ftol * cost_old {
                    let j = jacobian(&x);
                    if !j.iter().all(|v| v.is_finite()) {
                        return Err(FitError::NonFinite { what: "Jacobian" });
                    }
                    let jtj = j.transpose() * &j;
                    debug!("converged at iteration {iter}: cost {cost:.6e}");
                    return Ok(LmOutcome {
                        params: x,
                        cost,
                        jtj,
                        iterations: iter,
                    });
                }
                break;
            }

            // Rejected. A negligible step that still fails to improve the
            // cost means we are at a (possibly noisy) minimum.
            if step_small {
                debug!("converged at iteration {iter}: no improving step remains");
                return Ok(LmOutcome {
                    params: x,
                    cost,
                    jtj,
                    iterations: iter,
                });
            }

            trace!("iter {iter}: rejected step, lambda {lambda:.3e} -> {:.3e}", lambda * opts.lambda_up);
            lambda *= opts.lambda_up;
            if lambda > opts.lambda_max {
                return Err(FitError::Convergence {
                    iterations: iter,
                    lambda,
                });
            }
        }
    }

    Err(FitError::Convergence {
        iterations: opts.max_iters,
        lambda,
    })
}

/// Parameter covariance from `J^T J` at the minimum: `(J^T J)^-1`,
/// symmetrized against floating-point drift.
///
/// Returns `None` when the matrix is not positive definite.
pub fn covariance_from_jtj(jtj: &DMatrix<f64>) -> Option<DMatrix<f64>> {
    let inv = jtj.clone().cholesky()?.inverse();
    let sym = (&inv + inv.transpose()) * 0.5;
    if sym.iter().all(|v| v.is_finite()) {
        Some(sym)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_exponential_rate() {
        // y = exp(a x) sampled exactly at a = 0.7; start from a = 0.
        let xs: Vec<f64> = (0..20).map(|i| i as f64 * 0.1).collect();
        let ys: Vec<f64> = xs.iter().map(|x| (0.7 * x).exp()).collect();

        let residuals = {
            let xs = xs.clone();
            let ys = ys.clone();
            move |p: &DVector<f64>| {
                DVector::from_iterator(
                    xs.len(),
                    xs.iter().zip(ys.iter()).map(|(x, y)| y - (p[0] * x).exp()),
                )
            }
        };
        let jacobian = {
            let xs = xs.clone();
            move |p: &DVector<f64>| {
                DMatrix::from_iterator(
                    xs.len(),
                    1,
                    xs.iter().map(|x| x * (p[0] * x).exp()),
                )
            }
        };

        let out = minimize(
            DVector::from_element(1, 0.0),
            residuals,
            jacobian,
            &LmOptions::default(),
        )
        .unwrap();

        assert!((out.params[0] - 0.7).abs() < 1e-8);
        assert!(out.cost < 1e-16);
    }

    #[test]
    fn recovers_two_parameter_line() {
        // Linear models converge in essentially one step.
        let xs: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 2.0 + 3.0 * x).collect();

        let residuals = {
            let xs = xs.clone();
            let ys = ys.clone();
            move |p: &DVector<f64>| {
                DVector::from_iterator(
                    xs.len(),
                    xs.iter().zip(ys.iter()).map(|(x, y)| y - (p[0] + p[1] * x)),
                )
            }
        };
        let jacobian = {
            let xs = xs.clone();
            move |_: &DVector<f64>| {
                DMatrix::from_fn(xs.len(), 2, |i, j| if j == 0 { 1.0 } else { xs[i] })
            }
        };

        let out = minimize(
            DVector::from_vec(vec![0.0, 0.0]),
            residuals,
            jacobian,
            &LmOptions::default(),
        )
        .unwrap();

        assert!((out.params[0] - 2.0).abs() < 1e-8);
        assert!((out.params[1] - 3.0).abs() < 1e-8);
    }

    #[test]
    fn perfect_start_converges_immediately() {
        let residuals = |_: &DVector<f64>| DVector::from_element(3, 0.0);
        let jacobian = |_: &DVector<f64>| DMatrix::from_element(3, 1, 1.0);

        let out = minimize(
            DVector::from_element(1, 1.0),
            residuals,
            jacobian,
            &LmOptions::default(),
        )
        .unwrap();
        assert_eq!(out.iterations, 1);
        assert_eq!(out.cost, 0.0);
    }

    #[test]
    fn irreducible_cost_with_gradient_fails_to_converge() {
        // Constant residual but a lying Jacobian: every step is rejected and
        // the damping budget runs out.
        let residuals = |_: &DVector<f64>| DVector::from_element(1, 1.0);
        let jacobian = |_: &DVector<f64>| DMatrix::from_element(1, 1, 1.0);

        let err = minimize(
            DVector::from_element(1, 0.0),
            residuals,
            jacobian,
            &LmOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, FitError::Convergence { .. }));
    }

    #[test]
    fn non_finite_residuals_are_reported() {
        let residuals = |_: &DVector<f64>| DVector::from_element(1, f64::NAN);
        let jacobian = |_: &DVector<f64>| DMatrix::from_element(1, 1, 1.0);

        let err = minimize(
            DVector::from_element(1, 0.0),
            residuals,
            jacobian,
            &LmOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, FitError::NonFinite { .. }));
    }

    #[test]
    fn covariance_is_inverse_of_jtj() {
        let jtj = DMatrix::from_row_slice(2, 2, &[4.0, 1.0, 1.0, 3.0]);
        let cov = covariance_from_jtj(&jtj).unwrap();
        let ident = &jtj * &cov;
        assert!((ident[(0, 0)] - 1.0).abs() < 1e-12);
        assert!((ident[(1, 1)] - 1.0).abs() < 1e-12);
        assert!(ident[(0, 1)].abs() < 1e-12);
        assert!((cov[(0, 1)] - cov[(1, 0)]).abs() == 0.0);
    }

    #[test]
    fn covariance_rejects_indefinite_matrix() {
        let jtj = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 1.0]);
        assert!(covariance_from_jtj(&jtj).is_none());
    }
}
