use crate::{
    config::Config,
    engine::AnalogSearch,
    error::Result,
    keys::DistanceWeighting,
    stations::Stations,
    window::nearest_stations,
};

/// Search the test station's history and the histories of its nearest neighbors.
///
/// Candidates from a neighbor are penalized for its distance according to the weighting. Members
/// come from the test station's observations unless `extend_obs` is set, in which case they come
/// from the matched station.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpaceExtended {
    num_nearest: usize,
    exclude_closest_location: bool,
    max_distance: Option<f64>,
    weighting: DistanceWeighting,
    scale: f64,
    extend_obs: bool,
}

impl Default for SpaceExtended {
    fn default() -> Self {
        SpaceExtended {
            num_nearest: 0,
            exclude_closest_location: false,
            max_distance: None,
            weighting: DistanceWeighting::default(),
            scale: 1.0,
            extend_obs: false,
        }
    }
}

impl SpaceExtended {
    /// Take the neighbor options from a configuration.
    pub fn from_config(config: &Config) -> Self {
        SpaceExtended {
            num_nearest: config.num_nearest,
            exclude_closest_location: config.exclude_closest_location,
            max_distance: config.max_distance,
            weighting: config.distance_weighting,
            scale: config.distance_scale,
            extend_obs: config.extend_obs,
        }
    }

    /// Builder method for the number of neighbors.
    #[inline]
    pub fn with_num_nearest(mut self, num_nearest: usize) -> Self {
        self.num_nearest = num_nearest;
        self
    }

    /// Builder method to leave the test location out of its own pool.
    #[inline]
    pub fn with_exclude_closest_location(mut self, exclude: bool) -> Self {
        self.exclude_closest_location = exclude;
        self
    }

    /// Builder method for the distance penalty.
    #[inline]
    pub fn with_weighting(mut self, weighting: DistanceWeighting, scale: f64) -> Self {
        self.weighting = weighting;
        self.scale = scale;
        self
    }

    /// Builder method to take members from the matched station.
    #[inline]
    pub fn with_extend_obs(mut self, extend_obs: bool) -> Self {
        self.extend_obs = extend_obs;
        self
    }
}

impl AnalogSearch for SpaceExtended {
    fn search_stations(
        &self,
        stations: &Stations,
        test_station: usize,
    ) -> Result<Vec<(usize, f64)>> {
        nearest_stations(
            stations,
            test_station,
            self.num_nearest,
            self.exclude_closest_location,
            self.max_distance,
        )
    }

    #[inline]
    fn adjust_score(&self, score: f64, distance: f64) -> f64 {
        score * self.weighting.penalty(distance, self.scale)
    }

    #[inline]
    fn member_station(&self, test_station: usize, search_station: usize) -> usize {
        if self.extend_obs {
            search_station
        } else {
            test_station
        }
    }
}
