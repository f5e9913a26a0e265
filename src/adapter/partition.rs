//! Row classification for two-sided constraints `l <= A x <= u`.

use crate::error::{QpError, Result};

/// Default threshold above which a bound is treated as infinite.
pub const DEFAULT_BIG_M: f64 = 1e10;

/// Numeric thresholds used when classifying constraint rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    /// Rows with `|u - l| <= eq_tol` are equalities.
    pub eq_tol: f64,
    /// Bounds with magnitude at or above `big_m` are treated as infinite.
    pub big_m: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Tolerances {
            eq_tol: f64::EPSILON,
            big_m: DEFAULT_BIG_M,
        }
    }
}

impl Tolerances {
    /// Whether a lower bound is effectively `-inf`.
    pub fn is_neg_inf(&self, v: f64) -> bool {
        v <= -self.big_m
    }

    /// Whether an upper bound is effectively `+inf`.
    pub fn is_pos_inf(&self, v: f64) -> bool {
        v >= self.big_m
    }
}

/// Category of a single constraint row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowKind {
    /// `|u - l| <= eq_tol`.
    Equality,
    /// Only the upper side is finite: `A x <= u`.
    UpperOnly,
    /// Only the lower side is finite: `A x >= l`.
    LowerOnly,
    /// Both sides finite and distinct.
    Boxed,
    /// Neither side finite. The row constrains nothing.
    Free,
}

impl RowKind {
    /// Classify one row. Pure function of its bounds and the tolerances.
    ///
    /// Returns an error for NaN bounds, for `l = +inf` or `u = -inf`, and
    /// for `u < l - eq_tol`. Finite limits beyond `big_m` are valid: the
    /// equality test runs first, then each side is compared with `big_m`.
    pub fn classify(row: usize, l: f64, u: f64, tol: &Tolerances) -> Result<RowKind> {
        if l.is_nan() || u.is_nan() {
            return Err(QpError::InvalidProblem(format!(
                "constraint row {} has a NaN bound",
                row
            )));
        }
        if l == f64::INFINITY || u == f64::NEG_INFINITY {
            return Err(QpError::InvalidProblem(format!(
                "constraint row {} has lower bound {} and upper bound {}",
                row, l, u
            )));
        }
        if u < l - tol.eq_tol {
            return Err(QpError::InvertedBound {
                row,
                lower: l,
                upper: u,
            });
        }

        let kind = if (u - l).abs() <= tol.eq_tol {
            RowKind::Equality
        } else {
            match (tol.is_neg_inf(l), tol.is_pos_inf(u)) {
                (false, true) => RowKind::LowerOnly,
                (true, false) => RowKind::UpperOnly,
                (true, true) => RowKind::Free,
                (false, false) => RowKind::Boxed,
            }
        };
        Ok(kind)
    }
}

/// Disjoint index sets, one per [`RowKind`], each in ascending row order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintPartition {
    /// Total number of rows classified.
    pub m: usize,
    pub equality: Vec<usize>,
    pub upper_only: Vec<usize>,
    pub lower_only: Vec<usize>,
    pub boxed: Vec<usize>,
    pub free: Vec<usize>,
}

impl ConstraintPartition {
    /// Classify every row of `l <= A x <= u`.
    pub fn classify(l: &[f64], u: &[f64], tol: &Tolerances) -> Result<Self> {
        if l.len() != u.len() {
            return Err(QpError::DimensionMismatch {
                name: "u",
                expected: l.len(),
                got: u.len(),
            });
        }

        let mut partition = ConstraintPartition {
            m: l.len(),
            ..Default::default()
        };
        for (i, (&li, &ui)) in l.iter().zip(u).enumerate() {
            match RowKind::classify(i, li, ui, tol)? {
                RowKind::Equality => partition.equality.push(i),
                RowKind::UpperOnly => partition.upper_only.push(i),
                RowKind::LowerOnly => partition.lower_only.push(i),
                RowKind::Boxed => partition.boxed.push(i),
                RowKind::Free => partition.free.push(i),
            }
        }

        tracing::debug!(
            component = "adapter",
            operation = "partition",
            rows = partition.m as u64,
            equality = partition.equality.len() as u64,
            upper_only = partition.upper_only.len() as u64,
            lower_only = partition.lower_only.len() as u64,
            boxed = partition.boxed.len() as u64,
            free = partition.free.len() as u64,
            "Partitioned constraint rows"
        );

        Ok(partition)
    }

    /// Number of equality rows.
    pub fn neq(&self) -> usize {
        self.equality.len()
    }

    /// Number of upper-only rows (`nlt`).
    pub fn nlt(&self) -> usize {
        self.upper_only.len()
    }

    /// Number of lower-only rows (`ngt`).
    pub fn ngt(&self) -> usize {
        self.lower_only.len()
    }

    /// Number of boxed rows (`nbx`).
    pub fn nbx(&self) -> usize {
        self.boxed.len()
    }

    /// Number of stacked one-sided inequality rows: `nlt + ngt + 2 nbx`.
    pub fn nineq(&self) -> usize {
        self.nlt() + self.ngt() + 2 * self.nbx()
    }

    /// Category of row `i`, or `None` if out of range.
    #[cfg(test)]
    pub fn kind_of(&self, i: usize) -> Option<RowKind> {
        let sets = [
            (&self.equality, RowKind::Equality),
            (&self.upper_only, RowKind::UpperOnly),
            (&self.lower_only, RowKind::LowerOnly),
            (&self.boxed, RowKind::Boxed),
            (&self.free, RowKind::Free),
        ];
        sets.iter()
            .find(|(set, _)| set.binary_search(&i).is_ok())
            .map(|(_, kind)| *kind)
    }
}
