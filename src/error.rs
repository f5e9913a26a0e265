//! Error types for rangeqp.

use thiserror::Error;

/// Error type for rangeqp operations.
///
/// Every variant is a configuration or shape problem detected before the
/// solver runs. Solver-reported failures (infeasible, unbounded, iteration
/// limit) are not errors; they come back as a [`crate::SolveStatus`] on an
/// otherwise well-formed solution.
#[derive(Debug, Error)]
pub enum QpError {
    /// A vector or matrix does not have the length implied by the problem.
    #[error("Dimension mismatch for {name}: expected {expected}, got {got}")]
    DimensionMismatch {
        name: &'static str,
        expected: usize,
        got: usize,
    },

    /// Invalid problem specification.
    #[error("Invalid problem: {0}")]
    InvalidProblem(String),

    /// Constraint row whose upper limit lies below its lower limit.
    #[error("Inverted bound on constraint row {row}: upper {upper} < lower {lower}")]
    InvertedBound { row: usize, lower: f64, upper: f64 },

    /// Variable whose upper bound lies below its lower bound.
    #[error("Inverted bound on variable {index}: xmax {upper} < xmin {lower}")]
    InvertedVariableBound { index: usize, lower: f64, upper: f64 },

    /// Unknown or mistyped solver option.
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    /// The backend cannot run the requested algorithm.
    #[error("Solver {solver} does not support the {algorithm} algorithm")]
    UnsupportedAlgorithm {
        solver: &'static str,
        algorithm: &'static str,
    },

    /// Solver error.
    #[error("Solver error: {0}")]
    SolverError(String),
}

/// Result type for rangeqp operations.
pub type Result<T> = std::result::Result<T, QpError>;
