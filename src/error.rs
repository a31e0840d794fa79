//! Error type for the simulation/fit pipeline.
//!
//! Every failure surfaces immediately to the caller; there is no local
//! recovery or retry anywhere in the pipeline. A run either produces a
//! complete result or aborts with one of these.

/// Main error type.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FitError {
    /// An input value violates its documented constraint.
    #[error("{name} must be {constraint} (got {value})")]
    InvalidParameter {
        /// Name of the offending input.
        name: &'static str,
        /// Value that was passed.
        value: f64,
        /// Human-readable constraint, e.g. "> 0".
        constraint: &'static str,
    },
    /// Fewer observations than the fit can support.
    #[error("too few observations: n = {n}, need at least {min}")]
    TooFewObservations {
        /// Observation count that was passed.
        n: usize,
        /// Minimum count for a meaningful fit (parameters + 1).
        min: usize,
    },
    /// The solver exhausted its iteration or damping budget.
    #[error("fit did not converge after {iterations} iterations (damping {lambda:.3e})")]
    Convergence {
        /// Iterations performed before giving up.
        iterations: usize,
        /// Damping factor at the point of failure.
        lambda: f64,
    },
    /// The normal equations cannot be factorized even at maximum damping.
    #[error("singular Jacobian: the normal equations are rank-deficient at the current parameters")]
    SingularJacobian,
    /// A NaN or infinity appeared where a finite value is required.
    #[error("non-finite {what} encountered")]
    NonFinite {
        /// What produced the non-finite value (residuals, Jacobian, ...).
        what: &'static str,
    },
    /// The noise distribution could not be constructed.
    #[error("noise distribution error: {0}")]
    Distribution(String),
}

/// Main result type.
pub type Result<T> = std::result::Result<T, FitError>;
