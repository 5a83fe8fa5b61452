//! Enums used as keys for setting options in the configuration and in functions.
//!
//! Every key parses from and prints to its snake case name, so a collaborator reading a text
//! configuration can hand the strings straight to `str::parse`.
use serde::Deserialize;
use strum_macros::{Display, EnumIter, EnumString};

/// Which search strategy generates the analogs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Each test station only searches its own history.
    Independent,
    /// Each test station also searches the history of its nearest neighbors.
    SpaceExtended,
}

impl Default for Operation {
    fn default() -> Self {
        Operation::Independent
    }
}

/// Granularity of the standard deviation used to normalize differences.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SdScope {
    /// One value per parameter, shared by every station and lead time.
    Parameter,
    /// One value per parameter and station, shared by every lead time.
    ParameterStation,
    /// One value per parameter, station, and lead time.
    ParameterStationFlt,
}

impl Default for SdScope {
    fn default() -> Self {
        SdScope::ParameterStationFlt
    }
}

/// Which archive the standard deviation is computed from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SdSource {
    /// The historical (search) forecasts.
    Forecasts,
    /// The observations, matched to forecast parameters by name.
    Observations,
}

impl Default for SdSource {
    fn default() -> Self {
        SdSource::Forecasts
    }
}

/// Variance estimator.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Variance {
    /// Bessel corrected, divides by `n - 1`.
    Sample,
    /// Divides by `n`.
    Population,
}

impl Default for Variance {
    fn default() -> Self {
        Variance::Sample
    }
}

/// What to do with a test case that has fewer admissible candidates than requested members.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ShortfallPolicy {
    /// Abort the run with `InsufficientCandidates`.
    Fail,
    /// Keep the members that were found, leave the rest missing, and flag the case incomplete.
    MarkIncomplete,
}

impl Default for ShortfallPolicy {
    fn default() -> Self {
        ShortfallPolicy::MarkIncomplete
    }
}

/// How candidates from neighboring stations are penalized for their distance from the test
/// station. Only used by the space extended search.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DistanceWeighting {
    /// All search stations count the same.
    Uniform,
    /// Scores are multiplied by `1 + d / scale`.
    Inverse,
    /// Scores are multiplied by `1 + (d / scale)^2`.
    InverseSquared,
}

impl Default for DistanceWeighting {
    fn default() -> Self {
        DistanceWeighting::Uniform
    }
}

impl DistanceWeighting {
    /// The multiplicative penalty for a candidate at `distance` from the test station.
    #[inline]
    pub fn penalty(self, distance: f64, scale: f64) -> f64 {
        let d = distance / scale;
        match self {
            DistanceWeighting::Uniform => 1.0,
            DistanceWeighting::Inverse => 1.0 + d,
            DistanceWeighting::InverseSquared => 1.0 + d * d,
        }
    }
}

/// How strictly two stations must agree to be considered the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display)]
#[strum(serialize_all = "snake_case")]
pub enum StationMatch {
    /// Name and coordinates must all match.
    Strict,
    /// Only the name must match.
    Loose,
}
