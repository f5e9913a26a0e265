//! Clarabel solver integration.
//!
//! This module provides the [`QpBackend`] implementation for the Clarabel
//! interior-point solver.

use clarabel::algebra::CscMatrix as ClarabelCsc;
use clarabel::solver::{
    DefaultSettings, DefaultSettingsBuilder, DefaultSolver, IPSolver, SolverStatus,
    SupportedConeT,
};
use tracing::{debug, info, trace, warn};

use super::stuffing::{stuff_problem, StuffedProblem};
use super::{QpBackend, SolveStatus, SolverInput, SolverOutput};
use crate::adapter::EqualityDualSign;
use crate::error::{QpError, Result};
use crate::options::{Algorithm, OptionValue, Options};

impl From<SolverStatus> for SolveStatus {
    fn from(status: SolverStatus) -> Self {
        match status {
            SolverStatus::Solved => SolveStatus::Optimal,
            SolverStatus::AlmostSolved => SolveStatus::AlmostOptimal,
            SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
                SolveStatus::Infeasible
            }
            SolverStatus::DualInfeasible | SolverStatus::AlmostDualInfeasible => {
                SolveStatus::Unbounded
            }
            SolverStatus::MaxIterations => SolveStatus::MaxIterations,
            SolverStatus::MaxTime => SolveStatus::MaxTime,
            SolverStatus::NumericalError | SolverStatus::InsufficientProgress => {
                SolveStatus::NumericalError
            }
            _ => SolveStatus::Unknown,
        }
    }
}

/// Diagnostics from a Clarabel solve.
#[derive(Debug, Clone)]
pub struct ClarabelInfo {
    /// Status exactly as Clarabel reported it.
    pub raw_status: SolverStatus,
    /// Number of interior-point iterations.
    pub iterations: u32,
    /// Solve time in seconds.
    pub solve_time: f64,
    /// Objective value as computed by Clarabel.
    pub obj_val: f64,
}

/// Clarabel interior-point backend.
///
/// Equality duals follow [`EqualityDualSign::UpperPositive`]: Clarabel's
/// KKT condition is `P x + q + A' z = 0`. Clarabel has no warm start, so
/// the initial point is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClarabelBackend;

impl ClarabelBackend {
    pub fn new() -> Self {
        ClarabelBackend
    }

    /// Clarabel settings for `options`: defaults, then the enumerated
    /// options, then the raw overrides.
    pub fn settings(&self, options: &Options) -> Result<DefaultSettings<f64>> {
        let mut builder = DefaultSettingsBuilder::default();
        builder.verbose(options.verbosity() >= 2);
        if let Some(max_iter) = options.max_iter() {
            builder.max_iter(max_iter);
        }
        let mut settings = builder
            .build()
            .map_err(|e| QpError::SolverError(e.to_string()))?;

        for (key, value) in options.overrides() {
            apply_override(&mut settings, key, value)?;
        }
        Ok(settings)
    }
}

impl QpBackend for ClarabelBackend {
    type Info = ClarabelInfo;

    fn name(&self) -> &'static str {
        "clarabel"
    }

    fn supports(&self, algorithm: Algorithm) -> bool {
        matches!(algorithm, Algorithm::Auto | Algorithm::InteriorPoint)
    }

    fn equality_dual_sign(&self) -> EqualityDualSign {
        EqualityDualSign::UpperPositive
    }

    fn solve(&self, input: &SolverInput<'_>, options: &Options) -> Result<SolverOutput<ClarabelInfo>> {
        let settings = self.settings(options)?;
        let n = input.n();
        let stuffed = stuff_problem(input);

        debug!(
            component = "clarabel",
            operation = "solve",
            variables = n as u64,
            equalities = stuffed.zero as u64,
            inequalities = stuffed.nonneg as u64,
            lp = input.is_lp(),
            "Invoking Clarabel"
        );
        if input.x0.iter().any(|&v| v != 0.0) {
            trace!(component = "clarabel", "Initial point ignored, no warm start");
        }

        let p = to_clarabel_csc(&stuffed.p);
        let a = to_clarabel_csc(&stuffed.a);
        let cones = to_clarabel_cones(&stuffed);

        let mut solver = DefaultSolver::new(&p, &stuffed.q, &a, &stuffed.b, &cones, settings);
        solver.solve();

        let raw_status = solver.solution.status;
        let status = SolveStatus::from(raw_status);
        let info = ClarabelInfo {
            raw_status,
            iterations: solver.info.iterations,
            solve_time: solver.solution.solve_time,
            obj_val: solver.solution.obj_val,
        };

        if options.verbosity() >= 1 {
            info!(
                component = "clarabel",
                status = status.as_str(),
                iterations = info.iterations,
                solve_time = info.solve_time,
                objective = info.obj_val,
                "Clarabel finished"
            );
        }

        if !status.has_solution() {
            warn!(
                component = "clarabel",
                status = status.as_str(),
                raw_status = ?raw_status,
                "Clarabel returned no solution"
            );
            return Ok(SolverOutput {
                x: None,
                f: f64::NAN,
                status,
                info,
                duals: None,
            });
        }

        let duals = stuffed.unstuff_duals(&solver.solution.z, n);
        Ok(SolverOutput {
            x: Some(solver.solution.x.clone()),
            f: info.obj_val,
            status,
            info,
            duals,
        })
    }
}

/// Apply one override on top of `settings`.
fn apply_override(settings: &mut DefaultSettings<f64>, key: &str, value: &OptionValue) -> Result<()> {
    match key {
        "max_iter" => settings.max_iter = as_u32(key, value)?,
        "equilibrate_max_iter" => settings.equilibrate_max_iter = as_u32(key, value)?,
        "time_limit" => settings.time_limit = as_f64(key, value)?,
        "max_step_fraction" => settings.max_step_fraction = as_f64(key, value)?,
        "tol_gap_abs" => settings.tol_gap_abs = as_f64(key, value)?,
        "tol_gap_rel" => settings.tol_gap_rel = as_f64(key, value)?,
        "tol_feas" => settings.tol_feas = as_f64(key, value)?,
        "tol_infeas_abs" => settings.tol_infeas_abs = as_f64(key, value)?,
        "tol_infeas_rel" => settings.tol_infeas_rel = as_f64(key, value)?,
        "tol_ktratio" => settings.tol_ktratio = as_f64(key, value)?,
        "verbose" => settings.verbose = as_bool(key, value)?,
        "equilibrate_enable" => settings.equilibrate_enable = as_bool(key, value)?,
        "static_regularization_enable" => {
            settings.static_regularization_enable = as_bool(key, value)?
        }
        "direct_solve_method" => settings.direct_solve_method = as_string(key, value)?,
        _ => {
            return Err(QpError::InvalidOption(format!(
                "unknown Clarabel setting '{}'",
                key
            )))
        }
    }
    Ok(())
}

fn type_error(key: &str, expected: &str, value: &OptionValue) -> QpError {
    QpError::InvalidOption(format!(
        "Clarabel setting '{}' expects {}, got {}",
        key,
        expected,
        value.type_name()
    ))
}

fn as_f64(key: &str, value: &OptionValue) -> Result<f64> {
    match value {
        OptionValue::Float(v) => Ok(*v),
        OptionValue::Int(v) => Ok(*v as f64),
        other => Err(type_error(key, "a number", other)),
    }
}

fn as_u32(key: &str, value: &OptionValue) -> Result<u32> {
    match value {
        OptionValue::Int(v) => u32::try_from(*v).map_err(|_| {
            QpError::InvalidOption(format!("Clarabel setting '{}' out of range: {}", key, v))
        }),
        other => Err(type_error(key, "an integer", other)),
    }
}

fn as_bool(key: &str, value: &OptionValue) -> Result<bool> {
    match value {
        OptionValue::Bool(v) => Ok(*v),
        other => Err(type_error(key, "a bool", other)),
    }
}

fn as_string(key: &str, value: &OptionValue) -> Result<String> {
    match value {
        OptionValue::Str(v) => Ok(v.clone()),
        other => Err(type_error(key, "a string", other)),
    }
}

/// Convert nalgebra CSC to Clarabel CSC.
fn to_clarabel_csc(m: &nalgebra_sparse::CscMatrix<f64>) -> ClarabelCsc<f64> {
    ClarabelCsc::new(
        m.nrows(),
        m.ncols(),
        m.col_offsets().to_vec(),
        m.row_indices().to_vec(),
        m.values().to_vec(),
    )
}

/// Cones for the stuffed rows: equalities first, then all one-sided rows.
fn to_clarabel_cones(stuffed: &StuffedProblem) -> Vec<SupportedConeT<f64>> {
    let mut cones = Vec::new();

    if stuffed.zero > 0 {
        cones.push(SupportedConeT::ZeroConeT(stuffed.zero));
    }

    if stuffed.nonneg > 0 {
        cones.push(SupportedConeT::NonnegativeConeT(stuffed.nonneg));
    }

    cones
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = ClarabelBackend.settings(&Options::default()).unwrap();
        assert!(!settings.verbose);
    }

    #[test]
    fn test_settings_from_options() {
        let options = Options::builder()
            .with_verbosity(2)
            .with_max_iter(42)
            .with_override("tol_feas", 1e-6)
            .with_override("time_limit", 5i64)
            .with_override("equilibrate_enable", false)
            .with_override("direct_solve_method", "qdldl")
            .build();
        let settings = ClarabelBackend.settings(&options).unwrap();
        assert!(settings.verbose);
        assert_eq!(settings.max_iter, 42);
        assert_eq!(settings.tol_feas, 1e-6);
        assert_eq!(settings.time_limit, 5.0);
        assert!(!settings.equilibrate_enable);
        assert_eq!(settings.direct_solve_method, "qdldl");
    }

    #[test]
    fn test_override_beats_max_iter_option() {
        let options = Options::builder()
            .with_max_iter(10)
            .with_override("max_iter", 20u32)
            .build();
        let settings = ClarabelBackend.settings(&options).unwrap();
        assert_eq!(settings.max_iter, 20);
    }

    #[test]
    fn test_unknown_override() {
        let options = Options::builder().with_override("mystery", 1i64).build();
        let err = ClarabelBackend.settings(&options).unwrap_err();
        assert!(matches!(err, QpError::InvalidOption(_)));
    }

    #[test]
    fn test_mistyped_override() {
        let options = Options::builder().with_override("verbose", 1i64).build();
        assert!(ClarabelBackend.settings(&options).is_err());

        let options = Options::builder().with_override("max_iter", -3i64).build();
        assert!(ClarabelBackend.settings(&options).is_err());
    }

    #[test]
    fn test_supports() {
        assert!(ClarabelBackend.supports(Algorithm::Auto));
        assert!(ClarabelBackend.supports(Algorithm::InteriorPoint));
        assert!(!ClarabelBackend.supports(Algorithm::ActiveSet));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(SolveStatus::from(SolverStatus::Solved), SolveStatus::Optimal);
        assert_eq!(
            SolveStatus::from(SolverStatus::PrimalInfeasible),
            SolveStatus::Infeasible
        );
        assert_eq!(
            SolveStatus::from(SolverStatus::DualInfeasible),
            SolveStatus::Unbounded
        );
        assert_eq!(
            SolveStatus::from(SolverStatus::MaxIterations),
            SolveStatus::MaxIterations
        );
    }
}
