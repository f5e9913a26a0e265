//! # rangeqp
//!
//! Range-constrained quadratic and linear programs on top of one-sided
//! solvers.
//!
//! rangeqp takes a problem in two-sided form
//!
//! ```text
//! minimize    0.5 x' H x + c' x
//! subject to  l <= A x <= u
//!             xmin <= x <= xmax
//! ```
//!
//! rewrites it into equalities plus one-sided inequalities, hands it to an
//! external solver (Clarabel by default), and maps the solver's duals back to
//! per-row lower/upper multipliers.
//!
//! ## Quick Start
//!
//! ```ignore
//! use rangeqp::prelude::*;
//!
//! let solution = Problem::builder()
//!     .hessian(h)
//!     .constraints(a, l, u)
//!     .lower_bounds(vec![0.0; 4])
//!     .build()?
//!     .solve()?;
//!
//! println!("x = {:?}, f = {}", solution.x, solution.f);
//! println!("mu_l = {:?}", solution.lambda.mu_l);
//! ```
//!
//! ## Constraint rows
//!
//! Each row of `l <= A x <= u` is classified as:
//!
//! - **Equality**: `|u - l| <= eq_tol`
//! - **Upper-only**: `l` effectively `-inf`
//! - **Lower-only**: `u` effectively `+inf`, stored negated
//! - **Boxed**: both sides finite, stored twice
//! - **Free**: both sides infinite, dropped
//!
//! A lower limit at or below `-big_m` (default `1e10`) counts as `-inf` and
//! an upper limit at or above `big_m` as `+inf`. Equalities are recognized
//! first, so `A x = 1e12` stays an equality.
//!
//! ## Failures
//!
//! Bad shapes, inverted bounds and bad options are returned as
//! [`QpError`]. Solver outcomes such as infeasibility are not errors: the
//! solution carries the solver's status and NaN-filled values of the right
//! length.

pub mod adapter;
pub mod error;
pub mod options;
pub mod problem;
pub mod solver;
pub mod sparse;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use rangeqp::prelude::*;
/// ```
pub mod prelude {
    // Adapter
    pub use crate::adapter::{
        from_standard_duals, ConstraintPartition, EqualityDualSign, Multipliers, RowKind,
        StandardForm, Tolerances,
    };

    // Options
    pub use crate::options::{Algorithm, OptionValue, Options, OptionsBuilder};

    // Problem
    pub use crate::problem::{Problem, ProblemBuilder, QpSolution};

    // Solver
    pub use crate::solver::{
        ClarabelBackend, ClarabelInfo, QpBackend, RawDuals, SolveStatus, SolverInput,
        SolverOutput,
    };

    // Errors
    pub use crate::error::{QpError, Result};
}

// Re-export main types at crate root
pub use error::{QpError, Result};
pub use problem::{Problem, QpSolution};
pub use solver::{QpBackend, SolveStatus};
