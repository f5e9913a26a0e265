//! Recovery of two-sided multipliers from standard-form duals.

use crate::error::{QpError, Result};

use super::partition::ConstraintPartition;

/// Sign convention a solver uses for equality-row duals.
///
/// Solvers disagree on this, so it is a documented property of each
/// backend rather than an assumption of the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EqualityDualSign {
    /// A positive dual means the upper limit binds, a negative one the lower
    /// limit. This matches the stationarity condition
    /// `H x + c + Ae' y + Ai' z = 0`.
    #[default]
    UpperPositive,
    /// A positive dual means the lower limit binds.
    LowerPositive,
}

impl EqualityDualSign {
    /// Split a signed equality dual into non-negative `(mu_l, mu_u)`.
    ///
    /// At most one component is non-zero; a zero dual yields `(0, 0)`.
    pub fn split(self, d: f64) -> (f64, f64) {
        let d = match self {
            EqualityDualSign::UpperPositive => d,
            EqualityDualSign::LowerPositive => -d,
        };
        if d < 0.0 {
            (-d, 0.0)
        } else if d > 0.0 {
            (0.0, d)
        } else {
            (0.0, 0.0)
        }
    }
}

/// Caller-facing multipliers.
///
/// `mu_l`/`mu_u` have one entry per original constraint row, `lower`/`upper`
/// one entry per variable. All entries are non-negative when defined and NaN
/// when the solver produced no duals.
#[derive(Debug, Clone, PartialEq)]
pub struct Multipliers {
    /// Multipliers on the lower limits `l <= A x`.
    pub mu_l: Vec<f64>,
    /// Multipliers on the upper limits `A x <= u`.
    pub mu_u: Vec<f64>,
    /// Multipliers on `xmin <= x`.
    pub lower: Vec<f64>,
    /// Multipliers on `x <= xmax`.
    pub upper: Vec<f64>,
}

impl Multipliers {
    /// NaN-filled multipliers for `n` variables and `m` rows.
    pub fn undefined(n: usize, m: usize) -> Self {
        Multipliers {
            mu_l: vec![f64::NAN; m],
            mu_u: vec![f64::NAN; m],
            lower: vec![f64::NAN; n],
            upper: vec![f64::NAN; n],
        }
    }

    /// Whether every entry is defined (not NaN).
    pub fn is_defined(&self) -> bool {
        [&self.mu_l, &self.mu_u, &self.lower, &self.upper]
            .iter()
            .all(|v| v.iter().all(|x| !x.is_nan()))
    }
}

/// Map solver duals on `(Ae, Ai)` back to `(mu_l, mu_u)` over the
/// original rows.
///
/// `ineq` must follow the stacking order of
/// [`super::StandardForm`]: upper-only, lower-only, boxed upper, boxed lower.
/// Free rows get zero multipliers.
pub fn from_standard_duals(
    eq: &[f64],
    ineq: &[f64],
    partition: &ConstraintPartition,
    sign: EqualityDualSign,
) -> Result<(Vec<f64>, Vec<f64>)> {
    if eq.len() != partition.neq() {
        return Err(QpError::DimensionMismatch {
            name: "equality duals",
            expected: partition.neq(),
            got: eq.len(),
        });
    }
    if ineq.len() != partition.nineq() {
        return Err(QpError::DimensionMismatch {
            name: "inequality duals",
            expected: partition.nineq(),
            got: ineq.len(),
        });
    }

    let m = partition.m;
    let mut mu_l = vec![0.0; m];
    let mut mu_u = vec![0.0; m];

    for (&i, &d) in partition.equality.iter().zip(eq) {
        let (lo, hi) = sign.split(d);
        mu_l[i] = lo;
        mu_u[i] = hi;
    }

    let (nlt, ngt, nbx) = (partition.nlt(), partition.ngt(), partition.nbx());
    let upper = &ineq[..nlt];
    let lower = &ineq[nlt..nlt + ngt];
    let boxed_upper = &ineq[nlt + ngt..nlt + ngt + nbx];
    let boxed_lower = &ineq[nlt + ngt + nbx..];

    for (&i, &z) in partition.upper_only.iter().zip(upper) {
        mu_u[i] = z;
    }
    for (&i, &z) in partition.lower_only.iter().zip(lower) {
        mu_l[i] = z;
    }
    for (k, &i) in partition.boxed.iter().enumerate() {
        mu_u[i] = boxed_upper[k];
        mu_l[i] = boxed_lower[k];
    }

    Ok((mu_l, mu_u))
}
