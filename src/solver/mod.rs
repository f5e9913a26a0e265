//! Solver interface for rangeqp.
//!
//! This module provides:
//! - The [`QpBackend`] trait every external solver is driven through
//! - The input and output records exchanged with a backend
//! - Matrix stuffing and the Clarabel backend

pub mod clarabel;
pub mod stuffing;

use std::fmt;

use nalgebra::DMatrix;

use crate::adapter::EqualityDualSign;
use crate::error::Result;
use crate::options::{Algorithm, Options};

pub use self::clarabel::{ClarabelBackend, ClarabelInfo};
pub use stuffing::{stuff_problem, BoundRows, StuffedProblem};

/// Solution status reported by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolveStatus {
    /// Optimal solution found.
    Optimal,
    /// Solved to reduced accuracy.
    AlmostOptimal,
    /// Problem is infeasible.
    Infeasible,
    /// Problem is unbounded.
    Unbounded,
    /// Maximum iterations reached.
    MaxIterations,
    /// Time limit reached.
    MaxTime,
    /// Numerical difficulties.
    NumericalError,
    /// Unknown status.
    Unknown,
}

impl SolveStatus {
    /// Whether the solver's primal point is meaningful.
    pub fn has_solution(self) -> bool {
        matches!(
            self,
            SolveStatus::Optimal
                | SolveStatus::AlmostOptimal
                | SolveStatus::MaxIterations
                | SolveStatus::MaxTime
        )
    }

    /// Integer exit flag: 1 success, 0 limit reached, -1 numerical or
    /// unknown failure, -2 infeasible, -3 unbounded.
    pub fn exitflag(self) -> i32 {
        match self {
            SolveStatus::Optimal | SolveStatus::AlmostOptimal => 1,
            SolveStatus::MaxIterations | SolveStatus::MaxTime => 0,
            SolveStatus::NumericalError | SolveStatus::Unknown => -1,
            SolveStatus::Infeasible => -2,
            SolveStatus::Unbounded => -3,
        }
    }

    /// Get a human-readable string representation.
    pub fn as_str(self) -> &'static str {
        match self {
            SolveStatus::Optimal => "optimal",
            SolveStatus::AlmostOptimal => "almost_optimal",
            SolveStatus::Infeasible => "infeasible",
            SolveStatus::Unbounded => "unbounded",
            SolveStatus::MaxIterations => "iteration_limit",
            SolveStatus::MaxTime => "time_limit",
            SolveStatus::NumericalError => "numerical_error",
            SolveStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Problem data in the calling convention of a one-sided solver:
///
/// ```text
/// minimize    0.5 x' H x + c' x
/// subject to  Ae x  = be
///             Ai x <= bi
///             xmin <= x <= xmax
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SolverInput<'a> {
    /// Quadratic cost, `None` to solve as a linear program.
    pub h: Option<&'a DMatrix<f64>>,
    pub c: &'a [f64],
    pub ae: &'a DMatrix<f64>,
    pub be: &'a [f64],
    pub ai: &'a DMatrix<f64>,
    pub bi: &'a [f64],
    pub xmin: &'a [f64],
    pub xmax: &'a [f64],
    pub x0: &'a [f64],
    /// Variable bounds at or beyond this magnitude are infinite.
    pub big_m: f64,
}

impl SolverInput<'_> {
    /// Number of variables.
    pub fn n(&self) -> usize {
        self.c.len()
    }

    pub fn is_lp(&self) -> bool {
        self.h.is_none()
    }
}

/// Duals in the solver's native layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawDuals {
    /// One per row of `Ae`.
    pub eqlin: Vec<f64>,
    /// One per row of `Ai`, non-negative.
    pub ineqlin: Vec<f64>,
    /// One per variable lower bound, non-negative.
    pub lower: Vec<f64>,
    /// One per variable upper bound, non-negative.
    pub upper: Vec<f64>,
}

/// Result of a backend solve.
#[derive(Debug, Clone)]
pub struct SolverOutput<I> {
    /// Primal point, `None` when the solver produced none.
    pub x: Option<Vec<f64>>,
    /// Objective value.
    pub f: f64,
    pub status: SolveStatus,
    /// Backend-defined diagnostics.
    pub info: I,
    /// Duals, `None` when the solver produced none.
    pub duals: Option<RawDuals>,
}

/// An external QP/LP solver.
pub trait QpBackend {
    /// Diagnostic record returned alongside every solve.
    type Info: fmt::Debug + Clone;

    /// Short name for logs and errors.
    fn name(&self) -> &'static str;

    /// Whether the backend can run `algorithm`.
    fn supports(&self, algorithm: Algorithm) -> bool;

    /// Sign convention of [`RawDuals::eqlin`].
    fn equality_dual_sign(&self) -> EqualityDualSign {
        EqualityDualSign::UpperPositive
    }

    /// Solve the problem.
    ///
    /// Returns `Err` only when the solver could not be set up (for example an
    /// unknown override). Infeasibility and other solve outcomes are reported
    /// through [`SolverOutput::status`].
    fn solve(&self, input: &SolverInput<'_>, options: &Options) -> Result<SolverOutput<Self::Info>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_has_solution() {
        assert!(SolveStatus::Optimal.has_solution());
        assert!(SolveStatus::AlmostOptimal.has_solution());
        assert!(SolveStatus::MaxIterations.has_solution());
        assert!(!SolveStatus::Infeasible.has_solution());
        assert!(!SolveStatus::Unbounded.has_solution());
        assert!(!SolveStatus::NumericalError.has_solution());
        assert!(!SolveStatus::Unknown.has_solution());
    }

    #[test]
    fn test_status_exitflag() {
        assert_eq!(SolveStatus::Optimal.exitflag(), 1);
        assert_eq!(SolveStatus::MaxTime.exitflag(), 0);
        assert_eq!(SolveStatus::Unknown.exitflag(), -1);
        assert_eq!(SolveStatus::Infeasible.exitflag(), -2);
        assert_eq!(SolveStatus::Unbounded.exitflag(), -3);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(format!("{}", SolveStatus::Optimal), "optimal");
        assert_eq!(format!("{}", SolveStatus::MaxIterations), "iteration_limit");
    }
}
