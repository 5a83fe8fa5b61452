#![warn(missing_docs)]
//! Analog ensemble generation from archives of numerical weather forecasts and their verifying
//! observations.
//!
//! Given a forecast to post-process, the generator searches the history of the same model for
//! the forecasts that looked most like it, across several parameters and a window of lead times,
//! and returns the observations that verified those historical forecasts as an ensemble. The
//! metric is the weighted sum of squared differences normalized by the standard deviation of each
//! parameter, with circular parameters such as wind direction compared the short way around.
//!
//! Two search strategies are provided. The independent search only looks at each station's own
//! history. The space extended search also borrows candidates from the nearest neighboring
//! stations, optionally penalizing them for their distance.
//!
//! Reading and writing archives is left to the caller. Build [`Forecasts`] and [`Observations`]
//! from shared [`Parameters`], [`Stations`], and [`Times`] collections, configure a [`Config`], and
//! call [`AnEn::generate`].

//
// API
//
pub use crate::analogs::{Analogs, MemberSource};
pub use crate::array4d::Array4D;
pub use crate::config::Config;
pub use crate::engine::{AnEn, AnEnOutput, AnalogSearch, Independent, SpaceExtended};
pub use crate::error::{AnEnError, Result};
pub use crate::forecasts::Forecasts;
pub use crate::keys::{
    DistanceWeighting, Operation, SdScope, SdSource, ShortfallPolicy, StationMatch, Variance,
};
pub use crate::observations::Observations;
pub use crate::parameters::{Parameter, Parameters};
pub use crate::partition::{gather, split, AnalogBlock};
pub use crate::similarity::{
    difference, dissimilarity, parameter_term, rank, Candidate, SimilarityMatrices,
};
pub use crate::standard_deviation::StandardDeviation;
pub use crate::stations::{Station, Stations};
pub use crate::times::{Time, TimeUnit, Times};
pub use crate::utility::{fold_circular, CIRCULAR_RANGE};
pub use crate::wind::{
    append_observed_wind_speed_direction, append_wind_speed_direction, WindNames,
};
pub use crate::window::{
    admissible_time, flt_window, nearest_stations, station_map, TimeTable,
};

pub mod partition;

//
// Internal use only
//

// Modules
mod analogs;
mod array4d;
mod config;
mod engine;
mod error;
mod forecasts;
mod keys;
mod observations;
mod parameters;
mod similarity;
mod standard_deviation;
mod stations;
mod times;
mod utility;
mod wind;
mod window;
