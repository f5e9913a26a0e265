//! Range-constraint adapter.
//!
//! This module provides:
//! - Row partitioning of `l <= A x <= u` into equality, one-sided, boxed and
//!   free rows
//! - The standard form `Ae x = be`, `Ai x <= bi` handed to a solver
//! - The inverse map from standard-form duals to `mu_l`/`mu_u`

pub mod duals;
pub mod partition;
pub mod standard_form;

pub use duals::{from_standard_duals, EqualityDualSign, Multipliers};
pub use partition::{ConstraintPartition, RowKind, Tolerances, DEFAULT_BIG_M};
pub use standard_form::StandardForm;
