//! Matrix stuffing: converts a [`SolverInput`] to conic solver format.
//!
//! Clarabel solves
//!
//! ```text
//! minimize    0.5 x' P x + q' x
//! subject to  A x + s = b,  s in K
//! ```
//!
//! so the one-sided problem is stacked as rows `[Ae; Ai; Iu; -Il]` with
//! `K = Zero(neq) x Nonneg(nineq + nupper + nlower)`, where `Iu`/`-Il` hold
//! one row per finite variable bound.

use nalgebra_sparse::CscMatrix;

use super::{RawDuals, SolverInput};
use crate::sparse::{csc_from_triplets, csc_vstack, dense_to_csc, dense_to_csc_upper_sym};

/// Variable indices with a finite bound, in the order their rows appear.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundRows {
    /// Variables with a finite `xmax`.
    pub upper: Vec<usize>,
    /// Variables with a finite `xmin`.
    pub lower: Vec<usize>,
}

impl BoundRows {
    /// Collect finite bounds.
    ///
    /// `xmax >= big_m` counts as `+inf` and `xmin <= -big_m` as `-inf`,
    /// unless the opposite bound of the same variable lies beyond `big_m`
    /// on the same side, in which case both are kept as written.
    pub fn from_bounds(xmin: &[f64], xmax: &[f64], big_m: f64) -> Self {
        let keeps_upper = |j: usize| {
            xmax[j].is_finite()
                && (xmax[j] < big_m || xmin.get(j).is_some_and(|&lo| lo >= big_m))
        };
        let keeps_lower = |j: usize| {
            xmin[j].is_finite()
                && (xmin[j] > -big_m || xmax.get(j).is_some_and(|&hi| hi <= -big_m))
        };
        BoundRows {
            upper: (0..xmax.len()).filter(|&j| keeps_upper(j)).collect(),
            lower: (0..xmin.len()).filter(|&j| keeps_lower(j)).collect(),
        }
    }

    /// Total number of bound rows.
    pub fn len(&self) -> usize {
        self.upper.len() + self.lower.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Stuffed problem ready for Clarabel.
#[derive(Debug)]
pub struct StuffedProblem {
    /// Quadratic cost matrix P (n x n, upper triangle).
    pub p: CscMatrix<f64>,
    /// Linear cost vector q (n).
    pub q: Vec<f64>,
    /// Constraint matrix A.
    pub a: CscMatrix<f64>,
    /// Constraint vector b.
    pub b: Vec<f64>,
    /// Number of zero cone (equality) rows.
    pub zero: usize,
    /// Number of nonnegative cone rows: `Ai` rows followed by bound rows.
    pub nonneg: usize,
    /// Number of `Ai` rows at the start of the nonnegative block.
    pub nineq: usize,
    /// Bound row layout for dual recovery.
    pub bounds: BoundRows,
}

/// Build the stuffed problem from a one-sided solver input.
pub fn stuff_problem(input: &SolverInput<'_>) -> StuffedProblem {
    let n = input.n();

    let p = match input.h {
        Some(h) => dense_to_csc_upper_sym(h),
        None => CscMatrix::zeros(n, n),
    };

    let bounds = BoundRows::from_bounds(input.xmin, input.xmax, input.big_m);
    let (bound_mat, bound_rhs) = stuff_bounds(&bounds, input.xmin, input.xmax, n);

    let a = csc_vstack(
        &csc_vstack(&dense_to_csc(input.ae), &dense_to_csc(input.ai)),
        &bound_mat,
    );

    let mut b = Vec::with_capacity(a.nrows());
    b.extend_from_slice(input.be);
    b.extend_from_slice(input.bi);
    b.extend(bound_rhs);

    StuffedProblem {
        p,
        q: input.c.to_vec(),
        a,
        b,
        zero: input.be.len(),
        nonneg: input.bi.len() + bounds.len(),
        nineq: input.bi.len(),
        bounds,
    }
}

/// Rows `x_j <= xmax_j` followed by `-x_j <= -xmin_j`.
fn stuff_bounds(
    bounds: &BoundRows,
    xmin: &[f64],
    xmax: &[f64],
    n: usize,
) -> (CscMatrix<f64>, Vec<f64>) {
    let mut rows = Vec::with_capacity(bounds.len());
    let mut cols = Vec::with_capacity(bounds.len());
    let mut vals = Vec::with_capacity(bounds.len());
    let mut rhs = Vec::with_capacity(bounds.len());

    for (k, &j) in bounds.upper.iter().enumerate() {
        rows.push(k);
        cols.push(j);
        vals.push(1.0);
        rhs.push(xmax[j]);
    }
    let offset = bounds.upper.len();
    for (k, &j) in bounds.lower.iter().enumerate() {
        rows.push(offset + k);
        cols.push(j);
        vals.push(-1.0);
        rhs.push(-xmin[j]);
    }

    (csc_from_triplets(bounds.len(), n, rows, cols, vals), rhs)
}

impl StuffedProblem {
    /// Slice the conic dual `z` back into the one-sided layout.
    ///
    /// Returns `None` if `z` does not match the stuffed row count.
    pub fn unstuff_duals(&self, z: &[f64], n: usize) -> Option<RawDuals> {
        if z.len() != self.b.len() {
            return None;
        }

        let (eq, rest) = z.split_at(self.zero);
        let (ineq, rest) = rest.split_at(self.nineq);
        let (up, lo) = rest.split_at(self.bounds.upper.len());

        let mut upper = vec![0.0; n];
        let mut lower = vec![0.0; n];
        for (&j, &v) in self.bounds.upper.iter().zip(up) {
            upper[j] = v;
        }
        for (&j, &v) in self.bounds.lower.iter().zip(lo) {
            lower[j] = v;
        }

        Some(RawDuals {
            eqlin: eq.to_vec(),
            ineqlin: ineq.to_vec(),
            lower,
            upper,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{DMatrix, RowDVector};

    const INF: f64 = f64::INFINITY;

    #[test]
    fn test_bound_rows() {
        let rows = BoundRows::from_bounds(&[0.0, -INF, -1e10, 1.0], &[INF, 2.0, 1e10, 1.0], 1e10);
        assert_eq!(rows.upper, vec![1, 3]);
        assert_eq!(rows.lower, vec![0, 3]);
        assert_eq!(rows.len(), 4);
    }

    #[test]
    fn test_bound_rows_beyond_big_m() {
        // Fixed at 2e10: both sides are real bounds.
        let rows = BoundRows::from_bounds(&[2e10], &[2e10], 1e10);
        assert_eq!(rows.upper, vec![0]);
        assert_eq!(rows.lower, vec![0]);

        let rows = BoundRows::from_bounds(&[-3e10], &[-2e10], 1e10);
        assert_eq!(rows.upper, vec![0]);
        assert_eq!(rows.lower, vec![0]);

        // A large lower bound alone does not make 1e300 an upper bound.
        let rows = BoundRows::from_bounds(&[5.0, 2e10], &[1e300, INF], 1e10);
        assert!(rows.upper.is_empty());
        assert_eq!(rows.lower, vec![0, 1]);
    }

    #[test]
    fn test_stuff_layout() {
        let h = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 4.0]);
        let ae = DMatrix::from_row_slice(1, 2, &[1.0, 1.0]);
        let ai = DMatrix::from_row_slice(2, 2, &[1.0, -1.0, -1.0, 0.0]);
        let input = SolverInput {
            h: Some(&h),
            c: &[1.0, 0.0],
            ae: &ae,
            be: &[1.0],
            ai: &ai,
            bi: &[3.0, 0.5],
            xmin: &[0.0, -INF],
            xmax: &[INF, 5.0],
            x0: &[0.0, 0.0],
            big_m: 1e10,
        };

        let stuffed = stuff_problem(&input);
        assert_eq!(stuffed.zero, 1);
        assert_eq!(stuffed.nineq, 2);
        assert_eq!(stuffed.nonneg, 4);
        assert_eq!(stuffed.a.nrows(), 5);
        assert_eq!(stuffed.a.ncols(), 2);
        assert_eq!(stuffed.b, vec![1.0, 3.0, 0.5, 5.0, -0.0]);

        let dense = crate::sparse::csc_to_dense(&stuffed.a);
        assert_eq!(dense.row(3), RowDVector::from_row_slice(&[0.0, 1.0]));
        assert_eq!(dense.row(4), RowDVector::from_row_slice(&[-1.0, 0.0]));

        // Upper triangle only.
        let p = crate::sparse::csc_to_dense(&stuffed.p);
        assert_eq!(p[(0, 1)], 1.0);
        assert_eq!(p[(1, 0)], 0.0);
    }

    #[test]
    fn test_unstuff_duals() {
        let ae = DMatrix::zeros(1, 2);
        let ai = DMatrix::zeros(1, 2);
        let input = SolverInput {
            h: None,
            c: &[0.0, 0.0],
            ae: &ae,
            be: &[0.0],
            ai: &ai,
            bi: &[0.0],
            xmin: &[0.0, 0.0],
            xmax: &[INF, 1.0],
            x0: &[0.0, 0.0],
            big_m: 1e10,
        };
        let stuffed = stuff_problem(&input);

        // [eq, ineq, upper(x1), lower(x0), lower(x1)]
        let duals = stuffed
            .unstuff_duals(&[-1.5, 0.25, 2.0, 3.0, 4.0], 2)
            .unwrap();
        assert_eq!(duals.eqlin, vec![-1.5]);
        assert_eq!(duals.ineqlin, vec![0.25]);
        assert_eq!(duals.upper, vec![0.0, 2.0]);
        assert_eq!(duals.lower, vec![3.0, 4.0]);

        assert!(stuffed.unstuff_duals(&[0.0; 3], 2).is_none());
    }
}
