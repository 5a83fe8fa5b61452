//! Run configuration for the analog search.
//!
//! `Config` is a plain structure. It is normally filled in by a collaborator that parses a file or
//! a command line. It derives `Deserialize` and every field has a default. The
//! builder methods cover the options most often changed in code.
use crate::{
    error::{AnEnError, Result},
    keys::{DistanceWeighting, Operation, SdScope, SdSource, ShortfallPolicy, Variance},
};
use serde::Deserialize;

/// Options for an analog ensemble run.
///
/// # Examples
///
/// ```rust
/// use analog_ensemble::{Config, Operation};
///
/// let config = Config::default()
///     .with_num_analogs(5)
///     .with_operation(Operation::SpaceExtended)
///     .with_num_nearest(3);
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.num_sims_or_default(), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of ensemble members per test case.
    pub num_analogs: usize,
    /// Number of ranked similarity rows kept per case for diagnostics, 0 keeps `num_analogs`.
    pub num_sims: usize,
    /// Index of the observation parameter whose values become ensemble members.
    pub obs_var_index: usize,
    /// Half width, in lead time steps, of the window compared around each lead time.
    pub flt_radius: usize,
    /// Number of neighboring stations searched besides the test station.
    pub num_nearest: usize,
    /// Neighbors further than this are never searched.
    pub max_distance: Option<f64>,
    /// A candidate with more missing parameters than this is not admissible.
    pub max_par_nan: Option<usize>,
    /// A parameter with more missing lead times in its window than this counts as missing.
    pub max_flt_nan: Option<usize>,
    /// Parameter weights overriding the ones registered with the parameters.
    pub weights: Option<Vec<f64>>,
    /// Circular flags overriding the ones registered with the parameters.
    pub circulars: Option<Vec<bool>>,
    /// The search strategy.
    pub operation: Operation,
    /// Only search forecasts whose verifying observation precedes the test time.
    pub prevent_search_future: bool,
    /// Remove the test station, and stations at its location, from its own search pool.
    pub exclude_closest_location: bool,
    /// Draw members from the matched search station's observations.
    pub extend_obs: bool,
    /// Distance penalty for candidates at neighboring stations.
    pub distance_weighting: DistanceWeighting,
    /// Length scale of the distance penalty, in coordinate units.
    pub distance_scale: f64,
    /// Granularity of the standard deviation.
    pub sd_scope: SdScope,
    /// Archive the standard deviation is computed from.
    pub sd_source: SdSource,
    /// Variance estimator for linear parameters.
    pub variance: Variance,
    /// Substitute for a zero or undefined standard deviation.
    pub sd_fallback: Option<f64>,
    /// What to do when a case has too few admissible candidates.
    pub shortfall: ShortfallPolicy,
    /// Keep the ranked similarity rows in the output.
    pub save_sims: bool,
    /// Size of a dedicated thread pool, otherwise the global rayon pool is used.
    pub num_threads: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            num_analogs: 1,
            num_sims: 0,
            obs_var_index: 0,
            flt_radius: 1,
            num_nearest: 0,
            max_distance: None,
            max_par_nan: None,
            max_flt_nan: None,
            weights: None,
            circulars: None,
            operation: Operation::default(),
            prevent_search_future: true,
            exclude_closest_location: false,
            extend_obs: false,
            distance_weighting: DistanceWeighting::default(),
            distance_scale: 1.0,
            sd_scope: SdScope::default(),
            sd_source: SdSource::default(),
            variance: Variance::default(),
            sd_fallback: None,
            shortfall: ShortfallPolicy::default(),
            save_sims: false,
            num_threads: None,
        }
    }
}

impl Config {
    /// Builder method for the ensemble size.
    #[inline]
    pub fn with_num_analogs(mut self, num_analogs: usize) -> Self {
        self.num_analogs = num_analogs;
        self
    }

    /// Builder method for the search strategy.
    #[inline]
    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operation = operation;
        self
    }

    /// Builder method for the lead time window radius.
    #[inline]
    pub fn with_flt_radius(mut self, flt_radius: usize) -> Self {
        self.flt_radius = flt_radius;
        self
    }

    /// Builder method for the number of neighbors.
    #[inline]
    pub fn with_num_nearest(mut self, num_nearest: usize) -> Self {
        self.num_nearest = num_nearest;
        self
    }

    /// Builder method for the observation parameter used for members.
    #[inline]
    pub fn with_obs_var_index(mut self, obs_var_index: usize) -> Self {
        self.obs_var_index = obs_var_index;
        self
    }

    /// Builder method for the standard deviation fallback.
    #[inline]
    pub fn with_sd_fallback<T>(mut self, fallback: T) -> Self
    where
        Option<f64>: From<T>,
    {
        self.sd_fallback = Option::from(fallback);
        self
    }

    /// Builder method for the shortfall policy.
    #[inline]
    pub fn with_shortfall(mut self, shortfall: ShortfallPolicy) -> Self {
        self.shortfall = shortfall;
        self
    }

    /// Builder method for the thread count.
    #[inline]
    pub fn with_num_threads<T>(mut self, num_threads: T) -> Self
    where
        Option<usize>: From<T>,
    {
        self.num_threads = Option::from(num_threads);
        self
    }

    /// Number of similarity rows kept per case.
    #[inline]
    pub fn num_sims_or_default(&self) -> usize {
        if self.num_sims == 0 {
            self.num_analogs
        } else {
            self.num_sims
        }
    }

    /// Check every value that does not depend on the archives.
    pub fn validate(&self) -> Result<()> {
        if self.num_analogs == 0 {
            return Err(AnEnError::invalid("num_analogs must be positive"));
        }

        if self.num_sims != 0 && self.num_sims < self.num_analogs {
            return Err(AnEnError::invalid(format!(
                "num_sims ({}) must be 0 or at least num_analogs ({})",
                self.num_sims, self.num_analogs
            )));
        }

        if let Some(max_distance) = self.max_distance {
            if !(max_distance >= 0.0) {
                return Err(AnEnError::invalid("max_distance must be non-negative"));
            }
        }

        if !(self.distance_scale > 0.0) || !self.distance_scale.is_finite() {
            return Err(AnEnError::invalid("distance_scale must be positive and finite"));
        }

        if let Some(fallback) = self.sd_fallback {
            if !(fallback > 0.0) || !fallback.is_finite() {
                return Err(AnEnError::invalid("sd_fallback must be positive and finite"));
            }
        }

        if let Some(ref weights) = self.weights {
            if weights.iter().any(|&w| !(w >= 0.0) || !w.is_finite()) {
                return Err(AnEnError::invalid("weights must be non-negative and finite"));
            }
        }

        if self.num_threads == Some(0) {
            return Err(AnEnError::invalid("num_threads must be positive"));
        }

        if self.operation == Operation::Independent && self.num_nearest > 0 {
            return Err(AnEnError::invalid(
                "num_nearest is only used by the space extended search",
            ));
        }

        Ok(())
    }
}
