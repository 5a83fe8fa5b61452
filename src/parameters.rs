//! Forecast and observation parameters (variables) and the registry that indexes them.
use crate::error::{AnEnError, Result};
use std::collections::HashMap;

/// A forecast or observation variable, e.g. 2 meter temperature or 10 meter wind direction.
///
/// Two parameters are equal if and only if their names match.
#[derive(Debug, Clone)]
pub struct Parameter {
    name: String,
    circular: bool,
    weight: f64,
}

impl PartialEq for Parameter {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Parameter {}

impl Parameter {
    /// Create a linear parameter with a weight of 1.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use analog_ensemble::Parameter;
    ///
    /// let p = Parameter::new("temperature");
    /// assert_eq!(p.name(), "temperature");
    /// assert!(!p.circular());
    /// assert_eq!(p.weight(), 1.0);
    /// ```
    pub fn new<S: Into<String>>(name: S) -> Self {
        Parameter {
            name: name.into(),
            circular: false,
            weight: 1.0,
        }
    }

    /// Builder method to mark a parameter as circular (angular, in degrees).
    ///
    /// ```rust
    /// use analog_ensemble::Parameter;
    ///
    /// assert!(Parameter::new("wdir").with_circular(true).circular());
    /// ```
    #[inline]
    pub fn with_circular(mut self, circular: bool) -> Self {
        self.circular = circular;
        self
    }

    /// Builder method to set the weight this parameter contributes to the similarity metric.
    #[inline]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// The name, which is the identity of the parameter.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the parameter wraps around at 360 degrees.
    #[inline]
    pub fn circular(&self) -> bool {
        self.circular
    }

    /// The weight in the similarity metric.
    #[inline]
    pub fn weight(&self) -> f64 {
        self.weight
    }
}

/// An insertion ordered, duplicate rejecting list of parameters with lookup by name.
#[derive(Debug, Clone, Default)]
pub struct Parameters {
    entries: Vec<Parameter>,
    by_name: HashMap<String, usize>,
}

impl Parameters {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a list of parameters, failing on the first duplicate name.
    ///
    /// ```rust
    /// use analog_ensemble::{Parameter, Parameters};
    ///
    /// let pars = Parameters::from_parameters(vec![
    ///     Parameter::new("u"),
    ///     Parameter::new("v"),
    /// ]).unwrap();
    /// assert_eq!(pars.index_of("v").unwrap(), 1);
    ///
    /// let twice = vec![Parameter::new("u"), Parameter::new("u")];
    /// assert!(Parameters::from_parameters(twice).is_err());
    /// ```
    pub fn from_parameters<I>(pars: I) -> Result<Self>
    where
        I: IntoIterator<Item = Parameter>,
    {
        let mut registry = Self::new();
        for p in pars {
            registry.push(p)?;
        }
        Ok(registry)
    }

    /// Append a parameter and return its index.
    pub fn push(&mut self, parameter: Parameter) -> Result<usize> {
        if self.by_name.contains_key(parameter.name()) {
            return Err(AnEnError::DuplicateEntry(format!(
                "parameter {}",
                parameter.name()
            )));
        }

        let idx = self.entries.len();
        self.by_name.insert(parameter.name().to_owned(), idx);
        self.entries.push(parameter);
        Ok(idx)
    }

    /// The index of the parameter with this name.
    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| AnEnError::NotRegistered(format!("parameter {}", name)))
    }

    /// Get a parameter by index.
    #[inline]
    pub fn get(&self, idx: usize) -> Option<&Parameter> {
        self.entries.get(idx)
    }

    /// Number of parameters.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if there are no parameters.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.entries.iter()
    }

    /// All names in insertion order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(Parameter::name).collect()
    }

    /// All weights in insertion order.
    pub fn weights(&self) -> Vec<f64> {
        self.entries.iter().map(Parameter::weight).collect()
    }

    /// All circular flags in insertion order.
    pub fn circulars(&self) -> Vec<bool> {
        self.entries.iter().map(Parameter::circular).collect()
    }
}
