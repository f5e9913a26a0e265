//! Problem definition and solving API.
//!
//! A [`Problem`] is the quadratic program
//!
//! ```text
//! minimize    0.5 x' H x + c' x
//! subject to  l <= A x <= u
//!             xmin <= x <= xmax
//! ```
//!
//! built through [`ProblemBuilder`], which fills the usual defaults
//! (`c = 0`, `l = -inf`, `u = +inf`, `xmin = -inf`, `xmax = +inf`, `x0 = 0`)
//! and checks dimensions:
//!
//! ```ignore
//! let solution = Problem::builder()
//!     .hessian(h)
//!     .constraints(a, l, u)
//!     .lower_bounds(vec![0.0; 4])
//!     .build()?
//!     .solve()?;
//! ```

use nalgebra::DMatrix;
use tracing::{debug, warn};

use crate::adapter::{
    from_standard_duals, ConstraintPartition, EqualityDualSign, Multipliers, StandardForm,
};
use crate::error::{QpError, Result};
use crate::options::Options;
use crate::solver::{
    BoundRows, ClarabelBackend, ClarabelInfo, QpBackend, SolveStatus, SolverInput, SolverOutput,
};

/// A range-constrained QP or LP.
#[derive(Debug, Clone)]
pub struct Problem {
    /// Quadratic cost (n x n). `None` for a linear program.
    pub h: Option<DMatrix<f64>>,
    /// Linear cost (n).
    pub c: Vec<f64>,
    /// Constraint matrix (m x n).
    pub a: DMatrix<f64>,
    /// Constraint lower limits (m).
    pub l: Vec<f64>,
    /// Constraint upper limits (m).
    pub u: Vec<f64>,
    /// Variable lower bounds (n).
    pub xmin: Vec<f64>,
    /// Variable upper bounds (n).
    pub xmax: Vec<f64>,
    /// Initial point (n).
    pub x0: Vec<f64>,
}

/// Solution returned to the caller.
///
/// Always shaped like the problem: `x` has length n and `lambda` has
/// vectors of length m and n, NaN-filled when the solver produced nothing.
#[derive(Debug, Clone)]
pub struct QpSolution<I> {
    /// Primal solution.
    pub x: Vec<f64>,
    /// Objective value `0.5 x' H x + c' x`.
    pub f: f64,
    /// Status as reported by the backend.
    pub status: SolveStatus,
    /// Backend diagnostics, passed through unchanged.
    pub info: I,
    /// Multipliers on constraints and bounds.
    pub lambda: Multipliers,
}

impl<I> QpSolution<I> {
    /// Whether the backend reported a usable solution.
    pub fn is_solved(&self) -> bool {
        self.status.has_solution()
    }

    /// Integer exit flag, see [`SolveStatus::exitflag`].
    pub fn exitflag(&self) -> i32 {
        self.status.exitflag()
    }
}

impl Problem {
    /// Start building a problem.
    pub fn builder() -> ProblemBuilder {
        ProblemBuilder::default()
    }

    /// Number of variables.
    pub fn n(&self) -> usize {
        self.c.len()
    }

    /// Number of constraint rows.
    pub fn m(&self) -> usize {
        self.a.nrows()
    }

    /// Whether the quadratic term is absent or all zero.
    pub fn is_lp(&self) -> bool {
        self.h
            .as_ref()
            .map_or(true, |h| h.iter().all(|&v| v == 0.0))
    }

    /// Solve with Clarabel and default options.
    pub fn solve(&self) -> Result<QpSolution<ClarabelInfo>> {
        self.solve_with(&Options::default())
    }

    /// Solve with Clarabel and custom options.
    pub fn solve_with(&self, options: &Options) -> Result<QpSolution<ClarabelInfo>> {
        self.solve_using(&ClarabelBackend, options)
    }

    /// Solve with any backend.
    ///
    /// Configuration and shape problems are returned as `Err` before the
    /// backend runs. This includes an LP with no rows and no bound finite
    /// below `big_m`. Solver failures are returned as `Ok` with the backend's
    /// status and NaN-filled values.
    pub fn solve_using<B: QpBackend>(
        &self,
        backend: &B,
        options: &Options,
    ) -> Result<QpSolution<B::Info>> {
        if !backend.supports(options.algorithm()) {
            return Err(QpError::UnsupportedAlgorithm {
                solver: backend.name(),
                algorithm: options.algorithm().as_str(),
            });
        }

        let tol = options.tolerances();
        let partition = ConstraintPartition::classify(&self.l, &self.u, tol)?;
        let standard = StandardForm::build(&self.a, &self.l, &self.u, &partition);

        let is_lp = self.is_lp();
        let bounds = BoundRows::from_bounds(&self.xmin, &self.xmax, tol.big_m);
        if is_lp && partition.neq() + partition.nineq() == 0 && bounds.is_empty() {
            return Err(QpError::InvalidProblem(
                "LP problem must include constraints or variable bounds".into(),
            ));
        }

        debug!(
            component = "problem",
            operation = "solve",
            solver = backend.name(),
            variables = self.n() as u64,
            rows = self.m() as u64,
            lp = is_lp,
            "Solving problem"
        );

        let input = SolverInput {
            h: if is_lp { None } else { self.h.as_ref() },
            c: &self.c,
            ae: &standard.ae,
            be: &standard.be,
            ai: &standard.ai,
            bi: &standard.bi,
            xmin: &self.xmin,
            xmax: &self.xmax,
            x0: &self.x0,
            big_m: tol.big_m,
        };
        let output = backend.solve(&input, options)?;

        let sign = options
            .equality_dual_sign()
            .unwrap_or_else(|| backend.equality_dual_sign());
        let solution = self.repackage(output, &partition, sign);
        debug!(
            component = "problem",
            operation = "solve",
            status = solution.status.as_str(),
            multipliers = solution.lambda.is_defined(),
            "Solve finished"
        );
        Ok(solution)
    }

    /// Convert backend output to a problem-shaped solution.
    fn repackage<I>(
        &self,
        output: SolverOutput<I>,
        partition: &ConstraintPartition,
        sign: EqualityDualSign,
    ) -> QpSolution<I> {
        let (n, m) = (self.n(), self.m());
        let SolverOutput {
            x,
            f,
            status,
            info,
            duals,
        } = output;

        let x = match x {
            Some(x) if status.has_solution() && x.len() == n => Some(x),
            Some(x) if status.has_solution() => {
                warn!(
                    component = "problem",
                    expected = n as u64,
                    got = x.len() as u64,
                    "Solver returned a solution of the wrong length"
                );
                None
            }
            _ => None,
        };

        let Some(x) = x else {
            return QpSolution {
                x: vec![f64::NAN; n],
                f: f64::NAN,
                status,
                info,
                lambda: Multipliers::undefined(n, m),
            };
        };

        let lambda = duals
            .and_then(|d| {
                if d.lower.len() != n || d.upper.len() != n {
                    warn!(
                        component = "problem",
                        lower = d.lower.len() as u64,
                        upper = d.upper.len() as u64,
                        expected = n as u64,
                        "Bound duals have the wrong length"
                    );
                    return None;
                }
                match from_standard_duals(&d.eqlin, &d.ineqlin, partition, sign) {
                    Ok((mu_l, mu_u)) => Some(Multipliers {
                        mu_l,
                        mu_u,
                        lower: d.lower,
                        upper: d.upper,
                    }),
                    Err(e) => {
                        warn!(component = "problem", error = %e, "Discarding solver duals");
                        None
                    }
                }
            })
            .unwrap_or_else(|| Multipliers::undefined(n, m));

        QpSolution {
            x,
            f,
            status,
            info,
            lambda,
        }
    }
}

/// Builder for constructing problems.
#[derive(Debug, Clone, Default)]
pub struct ProblemBuilder {
    h: Option<DMatrix<f64>>,
    c: Option<Vec<f64>>,
    a: Option<DMatrix<f64>>,
    l: Option<Vec<f64>>,
    u: Option<Vec<f64>>,
    xmin: Option<Vec<f64>>,
    xmax: Option<Vec<f64>>,
    x0: Option<Vec<f64>>,
}

impl ProblemBuilder {
    /// Set the quadratic cost matrix.
    pub fn hessian(mut self, h: DMatrix<f64>) -> Self {
        self.h = Some(h);
        self
    }

    /// Set the linear cost vector.
    pub fn linear_cost(mut self, c: Vec<f64>) -> Self {
        self.c = Some(c);
        self
    }

    /// Set `l <= A x <= u` in one call.
    pub fn constraints(self, a: DMatrix<f64>, l: Vec<f64>, u: Vec<f64>) -> Self {
        self.constraint_matrix(a).constraint_lower(l).constraint_upper(u)
    }

    pub fn constraint_matrix(mut self, a: DMatrix<f64>) -> Self {
        self.a = Some(a);
        self
    }

    /// Constraint lower limits. Defaults to `-inf`.
    pub fn constraint_lower(mut self, l: Vec<f64>) -> Self {
        self.l = Some(l);
        self
    }

    /// Constraint upper limits. Defaults to `+inf`.
    pub fn constraint_upper(mut self, u: Vec<f64>) -> Self {
        self.u = Some(u);
        self
    }

    /// Variable lower bounds. Defaults to `-inf`.
    pub fn lower_bounds(mut self, xmin: Vec<f64>) -> Self {
        self.xmin = Some(xmin);
        self
    }

    /// Variable upper bounds. Defaults to `+inf`.
    pub fn upper_bounds(mut self, xmax: Vec<f64>) -> Self {
        self.xmax = Some(xmax);
        self
    }

    pub fn bounds(self, xmin: Vec<f64>, xmax: Vec<f64>) -> Self {
        self.lower_bounds(xmin).upper_bounds(xmax)
    }

    /// Initial point. Defaults to zero.
    pub fn initial_point(mut self, x0: Vec<f64>) -> Self {
        self.x0 = Some(x0);
        self
    }

    /// Fill defaults and validate.
    pub fn build(self) -> Result<Problem> {
        let n = self.num_variables()?;

        if let Some(h) = &self.h {
            check_len("H rows", n, h.nrows())?;
            check_len("H columns", n, h.ncols())?;
        }

        let c = self.c.unwrap_or_else(|| vec![0.0; n]);
        check_len("c", n, c.len())?;

        let a = match self.a {
            Some(a) => a,
            None => {
                let m = self.l.as_ref().or(self.u.as_ref()).map_or(0, Vec::len);
                if m > 0 {
                    return Err(QpError::InvalidProblem(
                        "constraint limits given without a constraint matrix".into(),
                    ));
                }
                DMatrix::zeros(0, n)
            }
        };
        check_len("A columns", n, a.ncols())?;
        let m = a.nrows();

        let l = self.l.unwrap_or_else(|| vec![f64::NEG_INFINITY; m]);
        let u = self.u.unwrap_or_else(|| vec![f64::INFINITY; m]);
        check_len("l", m, l.len())?;
        check_len("u", m, u.len())?;

        let xmin = self.xmin.unwrap_or_else(|| vec![f64::NEG_INFINITY; n]);
        let xmax = self.xmax.unwrap_or_else(|| vec![f64::INFINITY; n]);
        check_len("xmin", n, xmin.len())?;
        check_len("xmax", n, xmax.len())?;

        let x0 = self.x0.unwrap_or_else(|| vec![0.0; n]);
        check_len("x0", n, x0.len())?;

        for (j, (&lo, &hi)) in xmin.iter().zip(&xmax).enumerate() {
            if lo.is_nan() || hi.is_nan() {
                return Err(QpError::InvalidProblem(format!(
                    "variable {} has a NaN bound",
                    j
                )));
            }
            if lo == f64::INFINITY || hi == f64::NEG_INFINITY {
                return Err(QpError::InvalidProblem(format!(
                    "variable {} has lower bound {} and upper bound {}",
                    j, lo, hi
                )));
            }
            if hi < lo {
                return Err(QpError::InvertedVariableBound {
                    index: j,
                    lower: lo,
                    upper: hi,
                });
            }
        }

        Ok(Problem {
            h: self.h,
            c,
            a,
            l,
            u,
            xmin,
            xmax,
            x0,
        })
    }

    /// n from H, else c, else the columns of A.
    fn num_variables(&self) -> Result<usize> {
        if let Some(h) = &self.h {
            return Ok(h.nrows());
        }
        if let Some(c) = &self.c {
            return Ok(c.len());
        }
        if let Some(a) = &self.a {
            return Ok(a.ncols());
        }
        Err(QpError::InvalidProblem(
            "cannot determine the number of variables: give H, c or A".into(),
        ))
    }
}

fn check_len(name: &'static str, expected: usize, got: usize) -> Result<()> {
    if expected == got {
        Ok(())
    } else {
        Err(QpError::DimensionMismatch {
            name,
            expected,
            got,
        })
    }
}
