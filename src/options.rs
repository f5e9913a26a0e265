//! Solve options.
//!
//! [`Options`] is an immutable value assembled once through
//! [`OptionsBuilder`] and handed by reference to the backend.

use std::collections::BTreeMap;
use std::fmt;

use crate::adapter::{EqualityDualSign, Tolerances};

/// Algorithm requested from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
    /// Let the backend pick.
    #[default]
    Auto,
    /// Interior-point method.
    InteriorPoint,
    /// Active-set method.
    ActiveSet,
}

impl Algorithm {
    /// Get a human-readable string representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::Auto => "auto",
            Algorithm::InteriorPoint => "interior-point",
            Algorithm::ActiveSet => "active-set",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of a solver-specific override.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl OptionValue {
    /// Type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            OptionValue::Bool(_) => "bool",
            OptionValue::Int(_) => "integer",
            OptionValue::Float(_) => "float",
            OptionValue::Str(_) => "string",
        }
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        OptionValue::Bool(v)
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        OptionValue::Int(v)
    }
}

impl From<u32> for OptionValue {
    fn from(v: u32) -> Self {
        OptionValue::Int(i64::from(v))
    }
}

impl From<f64> for OptionValue {
    fn from(v: f64) -> Self {
        OptionValue::Float(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        OptionValue::Str(v.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(v: String) -> Self {
        OptionValue::Str(v)
    }
}

/// Immutable solve options.
#[derive(Debug, Clone, Default)]
pub struct Options {
    verbosity: u8,
    algorithm: Algorithm,
    max_iter: Option<u32>,
    tolerances: Tolerances,
    equality_dual_sign: Option<EqualityDualSign>,
    overrides: BTreeMap<String, OptionValue>,
}

impl Options {
    /// Start building options from defaults.
    pub fn builder() -> OptionsBuilder {
        OptionsBuilder::default()
    }

    /// Verbosity: 0 silent, 1 final summary, 2+ solver iteration output.
    pub fn verbosity(&self) -> u8 {
        self.verbosity
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Iteration cap, `None` for the solver default.
    pub fn max_iter(&self) -> Option<u32> {
        self.max_iter
    }

    pub fn tolerances(&self) -> &Tolerances {
        &self.tolerances
    }

    /// Equality-dual sign override, `None` to use the backend's convention.
    pub fn equality_dual_sign(&self) -> Option<EqualityDualSign> {
        self.equality_dual_sign
    }

    /// Solver-specific settings applied on top of the algorithm defaults.
    pub fn overrides(&self) -> &BTreeMap<String, OptionValue> {
        &self.overrides
    }
}

/// Builder for [`Options`].
#[derive(Debug, Clone, Default)]
pub struct OptionsBuilder {
    options: Options,
}

impl OptionsBuilder {
    /// Set the verbosity level.
    pub fn with_verbosity(mut self, level: u8) -> Self {
        self.options.verbosity = level;
        self
    }

    /// Set the algorithm.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.options.algorithm = algorithm;
        self
    }

    /// Set the iteration cap. Zero means solver default.
    pub fn with_max_iter(mut self, max_iter: u32) -> Self {
        self.options.max_iter = (max_iter > 0).then_some(max_iter);
        self
    }

    /// Set the equality tolerance used when partitioning rows.
    pub fn with_eq_tol(mut self, eq_tol: f64) -> Self {
        self.options.tolerances.eq_tol = eq_tol;
        self
    }

    /// Set the threshold at which bounds are treated as infinite.
    pub fn with_big_m(mut self, big_m: f64) -> Self {
        self.options.tolerances.big_m = big_m;
        self
    }

    /// Override the backend's equality-dual sign convention.
    pub fn with_equality_dual_sign(mut self, sign: EqualityDualSign) -> Self {
        self.options.equality_dual_sign = Some(sign);
        self
    }

    /// Add a solver-specific setting. Later values replace earlier ones.
    pub fn with_override(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.options.overrides.insert(key.into(), value.into());
        self
    }

    /// Finish building.
    pub fn build(self) -> Options {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = Options::default();
        assert_eq!(options.verbosity(), 0);
        assert_eq!(options.algorithm(), Algorithm::Auto);
        assert_eq!(options.max_iter(), None);
        assert_eq!(options.tolerances(), &Tolerances::default());
        assert_eq!(options.equality_dual_sign(), None);
        assert!(options.overrides().is_empty());
    }

    #[test]
    fn test_options_builder() {
        let options = Options::builder()
            .with_verbosity(2)
            .with_algorithm(Algorithm::InteriorPoint)
            .with_max_iter(75)
            .with_eq_tol(1e-9)
            .with_big_m(1e8)
            .with_equality_dual_sign(EqualityDualSign::LowerPositive)
            .with_override("tol_feas", 1e-7)
            .with_override("equilibrate_enable", false)
            .build();

        assert_eq!(options.verbosity(), 2);
        assert_eq!(options.algorithm(), Algorithm::InteriorPoint);
        assert_eq!(options.max_iter(), Some(75));
        assert_eq!(options.tolerances().eq_tol, 1e-9);
        assert_eq!(options.tolerances().big_m, 1e8);
        assert_eq!(
            options.equality_dual_sign(),
            Some(EqualityDualSign::LowerPositive)
        );
        assert_eq!(
            options.overrides().get("tol_feas"),
            Some(&OptionValue::Float(1e-7))
        );
        assert_eq!(
            options.overrides().get("equilibrate_enable"),
            Some(&OptionValue::Bool(false))
        );
    }

    #[test]
    fn test_zero_max_iter_means_default() {
        let options = Options::builder().with_max_iter(0).build();
        assert_eq!(options.max_iter(), None);
    }

    #[test]
    fn test_override_replaces() {
        let options = Options::builder()
            .with_override("max_iter", 10u32)
            .with_override("max_iter", 20u32)
            .build();
        assert_eq!(options.overrides().len(), 1);
        assert_eq!(options.overrides()["max_iter"], OptionValue::Int(20));
    }

    #[test]
    fn test_algorithm_display() {
        assert_eq!(format!("{}", Algorithm::ActiveSet), "active-set");
        assert_eq!(Algorithm::InteriorPoint.as_str(), "interior-point");
    }
}
