//! Construction of the search windows: which lead times are compared, which historical forecasts
//! may be searched, which observation verifies them, and which stations are searched.
use crate::{
    error::{AnEnError, Result},
    stations::Stations,
    times::{Time, Times},
};
use std::ops::Range;

/// The lead time indexes compared for lead time `flt`, `[flt - radius, flt + radius]` clamped to
/// the available lead times.
///
/// ```rust
/// use analog_ensemble::flt_window;
///
/// assert_eq!(flt_window(0, 1, 5), 0..2);
/// assert_eq!(flt_window(2, 1, 5), 1..4);
/// assert_eq!(flt_window(4, 2, 5), 2..5);
/// assert_eq!(flt_window(3, 0, 5), 3..4);
/// ```
#[inline]
pub fn flt_window(flt: usize, radius: usize, num_flts: usize) -> Range<usize> {
    let start = flt.saturating_sub(radius);
    let end = flt.saturating_add(radius).saturating_add(1).min(num_flts);
    start..end
}

/// True if the forecast initialized at `search_time` may be used as an analog for the test
/// forecast initialized at `test_time` at lead time `flt`.
///
/// A forecast is never its own analog. When preventing the search of the future, the verifying
/// observation of the searched forecast must already exist at the test initialization time.
#[inline]
pub fn admissible_time(
    test_index: usize,
    test_time: Time,
    search_index: usize,
    search_time: Time,
    flt: Time,
    prevent_search_future: bool,
) -> bool {
    if test_index == search_index {
        return false;
    }

    !prevent_search_future
        || search_time
            .checked_add(flt)
            .map_or(false, |valid| valid < test_time)
}

/// Maps every (forecast time, lead time) pair to the index of its verifying observation time.
#[derive(Debug, Clone)]
pub struct TimeTable {
    obs_index: Vec<Option<usize>>,
    num_flts: usize,
}

impl TimeTable {
    /// Build the table. All three registries must count in the same unit from the same origin.
    ///
    /// ```rust
    /// use analog_ensemble::{TimeTable, Times};
    ///
    /// let times = Times::from_values(vec![0, 24]).unwrap();
    /// let flts = Times::from_values(vec![0, 6, 12]).unwrap();
    /// let obs_times = Times::from_values(vec![0, 6, 24, 36]).unwrap();
    ///
    /// let table = TimeTable::new(&times, &flts, &obs_times).unwrap();
    /// assert_eq!(table.get(0, 1), Some(1));
    /// assert_eq!(table.get(0, 2), None);
    /// assert_eq!(table.get(1, 0), Some(2));
    /// assert_eq!(table.get(1, 2), Some(3));
    /// ```
    pub fn new(times: &Times, flts: &Times, obs_times: &Times) -> Result<Self> {
        if !times.same_frame(flts) || !times.same_frame(obs_times) {
            return Err(AnEnError::invalid(
                "forecast times, lead times, and observation times must share a unit and origin",
            ));
        }

        let obs_index = times
            .iter()
            .flat_map(|t| {
                flts.iter()
                    .map(move |f| t.checked_add(f).and_then(|valid| obs_times.index_of(valid)))
            })
            .collect();

        Ok(TimeTable {
            obs_index,
            num_flts: flts.len(),
        })
    }

    /// The observation time index verifying forecast time `time` at lead time `flt`.
    #[inline]
    pub fn get(&self, time: usize, flt: usize) -> Option<usize> {
        if flt >= self.num_flts {
            return None;
        }
        self.obs_index
            .get(time * self.num_flts + flt)
            .copied()
            .flatten()
    }

    /// Number of pairs with a verifying observation time.
    pub fn count_resolved(&self) -> usize {
        self.obs_index.iter().filter(|i| i.is_some()).count()
    }
}

/// For every forecast station, the index of the observation station with the same name.
pub fn station_map(forecast_stations: &Stations, obs_stations: &Stations) -> Result<Vec<usize>> {
    let map: Vec<usize> = forecast_stations
        .iter()
        .filter_map(|stn| obs_stations.index_of_name(stn.name()).ok())
        .collect();

    if map.len() != forecast_stations.len() {
        return Err(AnEnError::DimensionMismatch {
            what: "forecast stations with observations",
            expected: forecast_stations.len(),
            found: map.len(),
        });
    }

    Ok(map)
}

/// The stations searched on behalf of a test station, as `(index, distance)` pairs.
///
/// The test station comes first unless `exclude_closest_location` is set, in which case it and
/// every station at the same location are left out. Then the `num_nearest` closest remaining
/// stations within `max_distance` follow, nearest first.
pub fn nearest_stations(
    stations: &Stations,
    test_station: usize,
    num_nearest: usize,
    exclude_closest_location: bool,
    max_distance: Option<f64>,
) -> Result<Vec<(usize, f64)>> {
    let mut pool = Vec::with_capacity(num_nearest + 1);
    if !exclude_closest_location {
        pool.push((test_station, 0.0));
    }

    if num_nearest > 0 {
        let neighbors = stations
            .distances_from(test_station)?
            .into_iter()
            .filter(|&(idx, _)| idx != test_station)
            .filter(|&(_, dist)| !(exclude_closest_location && dist == 0.0))
            .filter(|&(_, dist)| max_distance.map_or(true, |max| dist <= max))
            .take(num_nearest);
        pool.extend(neighbors);
    }

    if pool.is_empty() {
        return Err(AnEnError::invalid(format!(
            "no stations left to search for test station {}",
            test_station
        )));
    }

    Ok(pool)
}
