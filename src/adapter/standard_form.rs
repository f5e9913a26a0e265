//! Conversion of range constraints to equalities plus one-sided `<=` rows.

use nalgebra::DMatrix;

use super::partition::ConstraintPartition;

/// Constraints in the form `Ae x = be`, `Ai x <= bi`.
///
/// The rows of `Ai` are stacked as:
/// 1. upper-only rows `(A, u)`
/// 2. lower-only rows negated `(-A, -l)`
/// 3. boxed rows `(A, u)`
/// 4. boxed rows negated `(-A, -l)`
///
/// [`super::from_standard_duals`] reads the inequality duals back in
/// exactly this order.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardForm {
    pub ae: DMatrix<f64>,
    pub be: Vec<f64>,
    pub ai: DMatrix<f64>,
    pub bi: Vec<f64>,
}

impl StandardForm {
    /// Build the standard form of `l <= A x <= u` for a given partition.
    ///
    /// Free rows are dropped.
    pub fn build(a: &DMatrix<f64>, l: &[f64], u: &[f64], partition: &ConstraintPartition) -> Self {
        let n = a.ncols();

        let ae = select_rows(a, &partition.equality, 1.0);
        let be = partition.equality.iter().map(|&i| u[i]).collect();

        let blocks = [
            (&partition.upper_only, 1.0),
            (&partition.lower_only, -1.0),
            (&partition.boxed, 1.0),
            (&partition.boxed, -1.0),
        ];

        let mut ai = DMatrix::zeros(partition.nineq(), n);
        let mut bi = Vec::with_capacity(partition.nineq());
        let mut offset = 0;
        for (rows, sign) in blocks {
            if rows.is_empty() {
                continue;
            }
            ai.rows_mut(offset, rows.len())
                .copy_from(&select_rows(a, rows, sign));
            // The negated blocks take their right-hand side from l.
            bi.extend(
                rows.iter()
                    .map(|&i| if sign > 0.0 { u[i] } else { -l[i] }),
            );
            offset += rows.len();
        }

        StandardForm { ae, be, ai, bi }
    }

    /// Number of equality rows.
    pub fn neq(&self) -> usize {
        self.be.len()
    }

    /// Number of one-sided inequality rows.
    pub fn nineq(&self) -> usize {
        self.bi.len()
    }

    /// Whether `x` satisfies `Ae x = be` (within `eq_tol`) and `Ai x <= bi`
    /// (within `feas_tol`).
    #[cfg(test)]
    pub fn is_feasible(&self, x: &[f64], eq_tol: f64, feas_tol: f64) -> bool {
        let x = nalgebra::DVector::from_column_slice(x);
        let eq_ok = (&self.ae * &x)
            .iter()
            .zip(&self.be)
            .all(|(ax, b)| (ax - b).abs() <= eq_tol);
        let ineq_ok = (&self.ai * &x)
            .iter()
            .zip(&self.bi)
            .all(|(ax, b)| *ax <= b + feas_tol);
        eq_ok && ineq_ok
    }
}

/// Copy the listed rows of `a`, scaled by `sign`.
fn select_rows(a: &DMatrix<f64>, rows: &[usize], sign: f64) -> DMatrix<f64> {
    let mut out = DMatrix::zeros(rows.len(), a.ncols());
    for (k, &i) in rows.iter().enumerate() {
        out.row_mut(k).copy_from(&(a.row(i) * sign));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::Tolerances;
    use nalgebra::DVector;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    const INF: f64 = f64::INFINITY;

    fn standard_form(a: &DMatrix<f64>, l: &[f64], u: &[f64]) -> StandardForm {
        let p = ConstraintPartition::classify(l, u, &Tolerances::default()).unwrap();
        StandardForm::build(a, l, u, &p)
    }

    #[test]
    fn test_portfolio_rows() {
        #[rustfmt::skip]
        let a = DMatrix::from_row_slice(2, 4, &[
            1.0, 1.0, 1.0, 1.0,
            0.17, 0.11, 0.10, 0.18,
        ]);
        let sf = standard_form(&a, &[1.0, 0.10], &[1.0, INF]);

        assert_eq!(sf.ae, DMatrix::from_row_slice(1, 4, &[1.0, 1.0, 1.0, 1.0]));
        assert_eq!(sf.be, vec![1.0]);
        assert_eq!(
            sf.ai,
            DMatrix::from_row_slice(1, 4, &[-0.17, -0.11, -0.10, -0.18])
        );
        assert_eq!(sf.bi, vec![-0.10]);
    }

    #[test]
    fn test_stacking_order() {
        // rows: boxed, lower-only, upper-only, equality, free, boxed
        let a = DMatrix::from_fn(6, 2, |i, j| (10 * i + j) as f64);
        let l = [-1.0, 2.0, -INF, 4.0, -INF, -6.0];
        let u = [1.0, INF, 3.0, 4.0, INF, 6.0];
        let sf = standard_form(&a, &l, &u);

        assert_eq!(sf.neq(), 1);
        assert_eq!(sf.ae.row(0), a.row(3));
        assert_eq!(sf.be, vec![4.0]);

        assert_eq!(sf.nineq(), 1 + 1 + 2 + 2);
        assert_eq!(sf.ai.row(0), a.row(2));
        assert_eq!(sf.ai.row(1), -a.row(1));
        assert_eq!(sf.ai.row(2), a.row(0));
        assert_eq!(sf.ai.row(3), a.row(5));
        assert_eq!(sf.ai.row(4), -a.row(0));
        assert_eq!(sf.ai.row(5), -a.row(5));
        assert_eq!(sf.bi, vec![3.0, -2.0, 1.0, 6.0, 1.0, 6.0]);
    }

    #[test]
    fn test_no_constraints() {
        let a = DMatrix::zeros(0, 3);
        let sf = standard_form(&a, &[], &[]);
        assert_eq!(sf.ae.shape(), (0, 3));
        assert_eq!(sf.ai.shape(), (0, 3));
        assert!(sf.is_feasible(&[1.0, 2.0, 3.0], 0.0, 0.0));
    }

    #[test]
    fn test_feasible_region_preserved_random() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let tol = 1e-9;

        for _ in 0..100 {
            let m = rng.gen_range(1..8);
            let n = rng.gen_range(1..5);
            let a = DMatrix::from_fn(m, n, |_, _| rng.gen_range(-3.0..3.0));

            let mut l = Vec::with_capacity(m);
            let mut u = Vec::with_capacity(m);
            for _ in 0..m {
                let lo: f64 = rng.gen_range(-4.0..4.0);
                match rng.gen_range(0..5) {
                    0 => {
                        l.push(lo);
                        u.push(lo);
                    }
                    1 => {
                        l.push(-INF);
                        u.push(lo);
                    }
                    2 => {
                        l.push(lo);
                        u.push(INF);
                    }
                    3 => {
                        l.push(-INF);
                        u.push(INF);
                    }
                    _ => {
                        l.push(lo);
                        u.push(lo + rng.gen_range(0.1..4.0));
                    }
                }
            }
            let sf = standard_form(&a, &l, &u);

            for _ in 0..50 {
                let x = DVector::from_fn(n, |_, _| rng.gen_range(-2.0..2.0));
                let ax = &a * &x;
                let in_range = ax
                    .iter()
                    .zip(l.iter().zip(&u))
                    .all(|(v, (lo, hi))| {
                        if lo == hi {
                            (v - hi).abs() <= tol
                        } else {
                            *lo - tol <= *v && *v <= *hi + tol
                        }
                    });
                assert_eq!(in_range, sf.is_feasible(x.as_slice(), tol, tol));
            }
        }
    }
}
