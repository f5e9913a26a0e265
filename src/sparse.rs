//! Sparse matrix utilities.
//!
//! Helper functions for moving dense problem data into the CSC storage the
//! solver consumes.

use nalgebra::DMatrix;
use nalgebra_sparse::{CooMatrix, CscMatrix};

/// Create a CSC matrix from triplets (row, col, value).
///
/// Duplicates are summed together.
pub fn csc_from_triplets(
    nrows: usize,
    ncols: usize,
    rows: Vec<usize>,
    cols: Vec<usize>,
    vals: Vec<f64>,
) -> CscMatrix<f64> {
    if rows.is_empty() {
        return CscMatrix::zeros(nrows, ncols);
    }

    let mut coo = CooMatrix::new(nrows, ncols);
    for ((row, col), val) in rows.into_iter().zip(cols).zip(vals) {
        if row < nrows && col < ncols {
            coo.push(row, col, val);
        }
    }

    CscMatrix::from(&coo)
}

/// Convert a dense matrix to CSC format, dropping exact zeros only.
pub fn dense_to_csc(dense: &DMatrix<f64>) -> CscMatrix<f64> {
    let mut rows = Vec::new();
    let mut cols = Vec::new();
    let mut vals = Vec::new();

    for j in 0..dense.ncols() {
        for i in 0..dense.nrows() {
            let v = dense[(i, j)];
            if v != 0.0 {
                rows.push(i);
                cols.push(j);
                vals.push(v);
            }
        }
    }

    csc_from_triplets(dense.nrows(), dense.ncols(), rows, cols, vals)
}

/// Upper triangle of the symmetric part `(H + H') / 2` in CSC format.
///
/// `x' H x` depends only on the symmetric part, and conic solvers read only
/// the upper triangle.
pub fn dense_to_csc_upper_sym(h: &DMatrix<f64>) -> CscMatrix<f64> {
    let mut rows = Vec::new();
    let mut cols = Vec::new();
    let mut vals = Vec::new();

    for j in 0..h.ncols() {
        for i in 0..=j.min(h.nrows().saturating_sub(1)) {
            let v = if i == j {
                h[(i, j)]
            } else {
                0.5 * (h[(i, j)] + h[(j, i)])
            };
            if v != 0.0 {
                rows.push(i);
                cols.push(j);
                vals.push(v);
            }
        }
    }

    csc_from_triplets(h.nrows(), h.ncols(), rows, cols, vals)
}

/// Convert CSC to dense matrix.
pub fn csc_to_dense(sparse: &CscMatrix<f64>) -> DMatrix<f64> {
    let mut dense = DMatrix::zeros(sparse.nrows(), sparse.ncols());
    for (row, col, val) in sparse.triplet_iter() {
        dense[(row, col)] = *val;
    }
    dense
}

/// Stack two CSC matrices vertically.
pub fn csc_vstack(a: &CscMatrix<f64>, b: &CscMatrix<f64>) -> CscMatrix<f64> {
    let mut rows = Vec::new();
    let mut cols = Vec::new();
    let mut vals = Vec::new();

    for (r, c, v) in a.triplet_iter() {
        rows.push(r);
        cols.push(c);
        vals.push(*v);
    }
    for (r, c, v) in b.triplet_iter() {
        rows.push(r + a.nrows());
        cols.push(c);
        vals.push(*v);
    }

    csc_from_triplets(
        a.nrows() + b.nrows(),
        a.ncols().max(b.ncols()),
        rows,
        cols,
        vals,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csc_from_triplets() {
        let m = csc_from_triplets(3, 3, vec![0, 1, 2], vec![0, 1, 2], vec![1.0, 2.0, 3.0]);
        assert_eq!(m.nrows(), 3);
        assert_eq!(m.ncols(), 3);
        assert_eq!(m.nnz(), 3);
    }

    #[test]
    fn test_dense_to_csc() {
        let dense = DMatrix::from_row_slice(2, 3, &[1.0, 0.0, 2.0, 0.0, 0.0, -3.0]);
        let sparse = dense_to_csc(&dense);
        assert_eq!(sparse.nnz(), 3);
        assert_eq!(csc_to_dense(&sparse), dense);
    }

    #[test]
    fn test_tiny_entries_kept() {
        let dense = DMatrix::from_row_slice(1, 3, &[1e-20, 0.0, -1e-16]);
        let sparse = dense_to_csc(&dense);
        assert_eq!(sparse.nnz(), 2);
        assert_eq!(csc_to_dense(&sparse), dense);

        let h = DMatrix::from_row_slice(2, 2, &[1e-18, 0.0, 0.0, 1.0]);
        assert_eq!(dense_to_csc_upper_sym(&h).nnz(), 2);
    }

    #[test]
    fn test_upper_sym() {
        let h = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 3.0, 4.0]);
        let p = csc_to_dense(&dense_to_csc_upper_sym(&h));
        assert_eq!(p, DMatrix::from_row_slice(2, 2, &[2.0, 2.0, 0.0, 4.0]));
    }

    #[test]
    fn test_vstack_empty_block() {
        let a = dense_to_csc(&DMatrix::identity(2, 2));
        let b = CscMatrix::zeros(0, 2);
        let s = csc_vstack(&a, &b);
        assert_eq!(s.nrows(), 2);
        assert_eq!(s.ncols(), 2);
        assert_eq!(s.nnz(), 2);
    }
}
