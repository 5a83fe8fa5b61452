//! Stations (forecast or observation locations) and the registry that indexes them.
use crate::{
    error::{AnEnError, Result},
    keys::StationMatch,
};
use std::collections::HashMap;

/// A location identified by name, with optional planar coordinates.
///
/// The derived `PartialEq` and `PartialOrd` compare name and coordinates (strict comparison).
/// Use [`Station::matches`] to choose between strict and loose (name only) comparison.
#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub struct Station {
    name: String,
    location: Option<(f64, f64)>,
}

impl Station {
    /// Create a station without coordinates.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use analog_ensemble::Station;
    ///
    /// let stn = Station::new("KMSO");
    /// assert_eq!(stn.name(), "KMSO");
    /// assert!(stn.location().is_none());
    /// ```
    pub fn new<S: Into<String>>(name: S) -> Self {
        Station {
            name: name.into(),
            location: None,
        }
    }

    /// Builder method to add planar coordinates.
    ///
    /// ```rust
    /// use analog_ensemble::Station;
    ///
    /// assert_eq!(Station::new("a").with_xy((1.0, 2.0)).location(), Some((1.0, 2.0)));
    /// assert_eq!(Station::new("a").with_xy(None).location(), None);
    /// ```
    #[inline]
    pub fn with_xy<T>(mut self, coords: T) -> Self
    where
        Option<(f64, f64)>: From<T>,
    {
        self.location = Option::from(coords);
        self
    }

    /// The name, which is the identity of the station.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Planar x and y coordinates.
    #[inline]
    pub fn location(&self) -> Option<(f64, f64)> {
        self.location
    }

    /// Compare two stations either strictly (name and coordinates) or loosely (name only).
    ///
    /// ```rust
    /// use analog_ensemble::{Station, StationMatch};
    ///
    /// let a = Station::new("a").with_xy((1.0, 2.0));
    /// let b = Station::new("a");
    /// assert!(a.matches(&b, StationMatch::Loose));
    /// assert!(!a.matches(&b, StationMatch::Strict));
    /// ```
    pub fn matches(&self, other: &Station, mode: StationMatch) -> bool {
        match mode {
            StationMatch::Strict => self == other,
            StationMatch::Loose => self.name == other.name,
        }
    }

    /// Planar (Euclidean) distance, if both stations have coordinates.
    pub fn distance_to(&self, other: &Station) -> Option<f64> {
        let (x0, y0) = self.location?;
        let (x1, y1) = other.location?;
        Some((x1 - x0).hypot(y1 - y0))
    }
}

/// An insertion ordered, duplicate rejecting list of stations with lookup by name.
#[derive(Debug, Clone, Default)]
pub struct Stations {
    entries: Vec<Station>,
    by_name: HashMap<String, usize>,
}

impl Stations {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a list of stations, failing on the first duplicate name.
    pub fn from_stations<I>(stations: I) -> Result<Self>
    where
        I: IntoIterator<Item = Station>,
    {
        let mut registry = Self::new();
        for stn in stations {
            registry.push(stn)?;
        }
        Ok(registry)
    }

    /// Append a station and return its index.
    pub fn push(&mut self, station: Station) -> Result<usize> {
        if self.by_name.contains_key(station.name()) {
            return Err(AnEnError::DuplicateEntry(format!(
                "station {}",
                station.name()
            )));
        }

        let idx = self.entries.len();
        self.by_name.insert(station.name().to_owned(), idx);
        self.entries.push(station);
        Ok(idx)
    }

    /// The index of the station with this name.
    pub fn index_of_name(&self, name: &str) -> Result<usize> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| AnEnError::NotRegistered(format!("station {}", name)))
    }

    /// The index of a station, compared strictly or loosely.
    pub fn index_of(&self, station: &Station, mode: StationMatch) -> Result<usize> {
        let idx = self.index_of_name(station.name())?;
        if self.entries[idx].matches(station, mode) {
            Ok(idx)
        } else {
            Err(AnEnError::NotRegistered(format!(
                "station {} at {:?}",
                station.name(),
                station.location()
            )))
        }
    }

    /// Get a station by index.
    #[inline]
    pub fn get(&self, idx: usize) -> Option<&Station> {
        self.entries.get(idx)
    }

    /// Number of stations.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if there are no stations.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Station> {
        self.entries.iter()
    }

    /// All names in insertion order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(Station::name).collect()
    }

    /// All coordinates in insertion order.
    pub fn coordinates(&self) -> Vec<Option<(f64, f64)>> {
        self.entries.iter().map(Station::location).collect()
    }

    /// Distances from the station at `origin` to every station, including itself, as
    /// `(index, distance)` pairs sorted by distance and then index.
    pub fn distances_from(&self, origin: usize) -> Result<Vec<(usize, f64)>> {
        let center = self.entries.get(origin).ok_or(AnEnError::OutOfRange {
            index: [origin, 0, 0, 0],
            extents: [self.len(), 0, 0, 0],
        })?;

        let mut dists = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, stn)| {
                center.distance_to(stn).map(|d| (i, d)).ok_or_else(|| {
                    AnEnError::invalid(format!(
                        "stations {} and {} need coordinates to compute a distance",
                        center.name(),
                        stn.name()
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        dists.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

        Ok(dists)
    }
}
