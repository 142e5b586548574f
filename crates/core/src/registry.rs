//! Declared bounds and defaults for the parameters an optimizer searches over.
//!
//! A [`ParameterRegistry`] is an immutable, ordered table of
//! [`ParameterSpec`]s. The declaration order is meaningful: every downstream
//! table, chart, and tie-break iterates parameters in this order, so reports
//! are stable from run to run.
//!
//! The registry also carries the designated subset of "new" parameters, the
//! ones an experiment introduced and whose drift from their defaults is worth
//! reporting separately.
//!
//! # Example
//!
//! ```
//! use hindsight_core::registry::{ParameterRegistry, ParameterSpec};
//!
//! let registry = ParameterRegistry::new([
//!     ParameterSpec::new("move_cost", 0.02, 0.08, 0.035).unwrap(),
//!     ParameterSpec::new("spawn_offset", 5.0, 30.0, 15.0).unwrap(),
//! ])
//! .unwrap();
//!
//! assert_eq!(registry.names().collect::<Vec<_>>(), ["move_cost", "spawn_offset"]);
//! assert_eq!(registry.spec_for("spawn_offset").unwrap().range(), 25.0);
//! assert!(registry.spec_for("missing").is_err());
//! ```

mod exp10;

use thiserror::Error;

/// Bounds and default value of one optimizable parameter.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ParameterSpec {
    name: String,
    lower: f64,
    upper: f64,
    default: f64,
}

/// Errors that can occur when declaring parameters.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpecError {
    #[error("parameter name must not be empty")]
    EmptyName,

    #[error("bounds of `{name}` must be finite")]
    NonFiniteBound { name: String },

    #[error("default of `{name}` must be finite")]
    NonFiniteDefault { name: String },

    #[error("lower bound of `{name}` must be below its upper bound ({lower} >= {upper})")]
    InvertedBounds { name: String, lower: f64, upper: f64 },

    #[error("parameter `{0}` is declared more than once")]
    Duplicate(String),
}

/// Error returned when a parameter name has no registry entry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown parameter `{name}`")]
pub struct UnknownParameterError {
    pub name: String,
}

impl ParameterSpec {
    /// Creates a new parameter spec.
    ///
    /// The default is not required to lie within the bounds; optimizers are
    /// often seeded from a default that an experiment later re-bounds.
    ///
    /// # Errors
    ///
    /// Returns a [`SpecError`] if the name is empty, any value is non-finite,
    /// or `lower >= upper`.
    pub fn new(
        name: impl Into<String>,
        lower: f64,
        upper: f64,
        default: f64,
    ) -> Result<Self, SpecError> {
        let name = name.into();
        if name.is_empty() {
            return Err(SpecError::EmptyName);
        }
        if !lower.is_finite() || !upper.is_finite() {
            return Err(SpecError::NonFiniteBound { name });
        }
        if !default.is_finite() {
            return Err(SpecError::NonFiniteDefault { name });
        }
        if lower >= upper {
            return Err(SpecError::InvertedBounds { name, lower, upper });
        }

        Ok(Self {
            name,
            lower,
            upper,
            default,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn lower(&self) -> f64 {
        self.lower
    }

    #[must_use]
    pub fn upper(&self) -> f64 {
        self.upper
    }

    #[must_use]
    pub fn default_value(&self) -> f64 {
        self.default
    }

    /// Returns the width of the bound interval, `upper - lower`.
    #[must_use]
    pub fn range(&self) -> f64 {
        self.upper - self.lower
    }

    /// Returns where `value` sits within the bounds, as a percentage.
    ///
    /// `0` is the lower bound and `100` the upper bound. Values outside the
    /// bounds map outside `[0, 100]`.
    #[must_use]
    pub fn percent_of_range(&self, value: f64) -> f64 {
        (value - self.lower) / self.range() * 100.0
    }
}

/// An ordered, immutable table of parameter specs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterRegistry {
    specs: Vec<ParameterSpec>,
    new_parameters: Vec<String>,
}

impl ParameterRegistry {
    /// Creates a registry from specs in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::Duplicate`] if two specs share a name.
    pub fn new<I>(specs: I) -> Result<Self, SpecError>
    where
        I: IntoIterator<Item = ParameterSpec>,
    {
        let specs: Vec<_> = specs.into_iter().collect();

        for (i, spec) in specs.iter().enumerate() {
            if specs[..i].iter().any(|s| s.name == spec.name) {
                return Err(SpecError::Duplicate(spec.name.clone()));
            }
        }

        Ok(Self {
            specs,
            new_parameters: Vec::new(),
        })
    }

    /// Designates the subset of parameters reported as "new".
    ///
    /// The subset keeps the order given here.
    ///
    /// # Errors
    ///
    /// Returns an [`UnknownParameterError`] if any name is not declared.
    pub fn with_new_parameters<I, S>(mut self, names: I) -> Result<Self, UnknownParameterError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if let Some(name) = names.iter().find(|name| !self.contains(name)) {
            return Err(UnknownParameterError { name: name.clone() });
        }

        self.new_parameters = names;
        Ok(self)
    }

    /// Looks up a spec by name.
    ///
    /// # Errors
    ///
    /// Returns an [`UnknownParameterError`] if no spec has this name.
    pub fn spec_for(&self, name: &str) -> Result<&ParameterSpec, UnknownParameterError> {
        self.specs
            .iter()
            .find(|spec| spec.name == name)
            .ok_or_else(|| UnknownParameterError {
                name: name.to_owned(),
            })
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.specs.iter().any(|spec| spec.name == name)
    }

    /// Returns the declaration position of `name`, if declared.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.specs.iter().position(|spec| spec.name == name)
    }

    /// Returns all parameter names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.specs.iter().map(ParameterSpec::name)
    }

    /// Returns all specs in declaration order.
    #[must_use]
    pub fn specs(&self) -> &[ParameterSpec] {
        &self.specs
    }

    /// Returns the designated new parameters.
    #[must_use]
    pub fn new_parameters(&self) -> &[String] {
        &self.new_parameters
    }

    #[must_use]
    pub fn is_new(&self, name: &str) -> bool {
        self.new_parameters.iter().any(|n| n == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str, lower: f64, upper: f64) -> ParameterSpec {
        ParameterSpec::new(name, lower, upper, lower).unwrap()
    }

    #[test]
    fn rejects_inverted_and_degenerate_bounds() {
        assert!(matches!(
            ParameterSpec::new("a", 1.0, 0.0, 0.5),
            Err(SpecError::InvertedBounds { .. })
        ));
        assert!(matches!(
            ParameterSpec::new("a", 1.0, 1.0, 1.0),
            Err(SpecError::InvertedBounds { .. })
        ));
    }

    #[test]
    fn rejects_non_finite_values() {
        assert!(matches!(
            ParameterSpec::new("a", f64::NEG_INFINITY, 1.0, 0.0),
            Err(SpecError::NonFiniteBound { .. })
        ));
        assert!(matches!(
            ParameterSpec::new("a", 0.0, 1.0, f64::NAN),
            Err(SpecError::NonFiniteDefault { .. })
        ));
    }

    #[test]
    fn rejects_empty_name() {
        assert_eq!(
            ParameterSpec::new("", 0.0, 1.0, 0.5),
            Err(SpecError::EmptyName)
        );
    }

    #[test]
    fn allows_default_outside_bounds() {
        // `pred_density_k` in the exp10 table defaults to 0 with bounds [10, 600].
        let spec = ParameterSpec::new("k", 10.0, 600.0, 0.0).unwrap();
        assert_eq!(spec.default_value(), 0.0);
    }

    #[test]
    fn rejects_duplicate_names() {
        let result = ParameterRegistry::new([spec("a", 0.0, 1.0), spec("a", 0.0, 2.0)]);
        assert_eq!(result, Err(SpecError::Duplicate("a".into())));
    }

    #[test]
    fn keeps_declaration_order() {
        let registry =
            ParameterRegistry::new([spec("z", 0.0, 1.0), spec("a", 0.0, 1.0), spec("m", 0.0, 1.0)])
                .unwrap();

        assert_eq!(registry.names().collect::<Vec<_>>(), ["z", "a", "m"]);
        assert_eq!(registry.position("a"), Some(1));
        assert_eq!(registry.position("q"), None);
    }

    #[test]
    fn spec_for_unknown_name_fails() {
        let registry = ParameterRegistry::new([spec("a", 0.0, 1.0)]).unwrap();
        assert_eq!(
            registry.spec_for("b"),
            Err(UnknownParameterError { name: "b".into() })
        );
    }

    #[test]
    fn new_parameters_must_be_declared() {
        let registry = ParameterRegistry::new([spec("a", 0.0, 1.0), spec("b", 0.0, 1.0)]).unwrap();

        let registry = registry.with_new_parameters(["b"]).unwrap();
        assert!(registry.is_new("b"));
        assert!(!registry.is_new("a"));

        let err = registry.with_new_parameters(["c"]).unwrap_err();
        assert_eq!(err.name, "c");
    }

    #[test]
    fn percent_of_range_maps_bounds_to_0_and_100() {
        let spec = ParameterSpec::new("a", 10.0, 20.0, 15.0).unwrap();
        assert_eq!(spec.percent_of_range(10.0), 0.0);
        assert_eq!(spec.percent_of_range(15.0), 50.0);
        assert_eq!(spec.percent_of_range(20.0), 100.0);
    }
}
