//! An archive of verifying observations: parameter x station x time.
//!
//! The values live in an [`Array4D`] whose trailing extent is always 1.
use crate::{
    array4d::Array4D,
    error::{AnEnError, Result},
    parameters::Parameters,
    stations::Stations,
    times::{Time, Times},
};
use optional::Optioned;
use std::sync::Arc;

/// Observation values with the collections that label each axis.
#[derive(Debug, Clone)]
pub struct Observations {
    parameters: Arc<Parameters>,
    stations: Arc<Stations>,
    times: Arc<Times>,
    data: Array4D,
}

impl Observations {
    /// Create an archive with every value missing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use analog_ensemble::{Observations, Parameter, Parameters, Station, Stations, Time, Times};
    /// use std::sync::Arc;
    ///
    /// let pars = Arc::new(Parameters::from_parameters(vec![Parameter::new("t2")]).unwrap());
    /// let stns = Arc::new(Stations::from_stations(vec![Station::new("a")]).unwrap());
    /// let times = Arc::new(Times::from_values(vec![0, 3_600, 7_200]).unwrap());
    ///
    /// let mut obs = Observations::new(pars, stns, times).unwrap();
    /// obs.set_value_by_id("t2", "a", Time(3_600), 271.0).unwrap();
    /// assert_eq!(obs.value(0, 0, 1).unwrap().unpack(), 271.0);
    /// assert!(obs.value(0, 0, 2).unwrap().is_none());
    /// ```
    pub fn new(
        parameters: Arc<Parameters>,
        stations: Arc<Stations>,
        times: Arc<Times>,
    ) -> Result<Self> {
        let data = Array4D::new([parameters.len(), stations.len(), times.len(), 1])?;
        Self::from_array(parameters, stations, times, data)
    }

    /// Wrap an existing array, checking its extents against the collections.
    pub fn from_array(
        parameters: Arc<Parameters>,
        stations: Arc<Stations>,
        times: Arc<Times>,
        data: Array4D,
    ) -> Result<Self> {
        let obs = Observations {
            parameters,
            stations,
            times,
            data,
        };
        obs.validate()?;
        Ok(obs)
    }

    /// Check that every array extent matches the size of its collection.
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("observation parameters", self.parameters.len()),
            ("observation stations", self.stations.len()),
            ("observation times", self.times.len()),
            ("observation trailing axis", 1),
        ];

        for (&(what, expected), &found) in checks.iter().zip(&self.data.extents()) {
            if found != expected {
                return Err(AnEnError::DimensionMismatch {
                    what,
                    expected,
                    found,
                });
            }
        }

        Ok(())
    }

    /// Relabel the axes, copying the values whose indexes exist in both.
    pub fn resize(
        &mut self,
        parameters: Arc<Parameters>,
        stations: Arc<Stations>,
        times: Arc<Times>,
    ) -> Result<()> {
        self.data
            .resize([parameters.len(), stations.len(), times.len(), 1])?;
        self.parameters = parameters;
        self.stations = stations;
        self.times = times;
        self.validate()
    }

    /// The parameters axis.
    #[inline]
    pub fn parameters(&self) -> &Arc<Parameters> {
        &self.parameters
    }

    /// The stations axis.
    #[inline]
    pub fn stations(&self) -> &Arc<Stations> {
        &self.stations
    }

    /// The times axis.
    #[inline]
    pub fn times(&self) -> &Arc<Times> {
        &self.times
    }

    /// The values.
    #[inline]
    pub fn data(&self) -> &Array4D {
        &self.data
    }

    /// The contiguous value buffer for bulk writes.
    #[inline]
    pub fn values_mut(&mut self) -> &mut [f64] {
        self.data.as_mut_slice()
    }

    /// Get a value by index.
    #[inline]
    pub fn value(&self, parameter: usize, station: usize, time: usize) -> Result<Optioned<f64>> {
        self.data.get(parameter, station, time, 0)
    }

    /// Set a value by index.
    #[inline]
    pub fn set_value<T>(
        &mut self,
        parameter: usize,
        station: usize,
        time: usize,
        value: T,
    ) -> Result<()>
    where
        Optioned<f64>: From<T>,
    {
        self.data.set(parameter, station, time, 0, value)
    }

    /// Get a value by parameter name, station name, and time.
    pub fn value_by_id(&self, parameter: &str, station: &str, time: Time) -> Result<Optioned<f64>> {
        let (p, s, t) = self.resolve(parameter, station, time)?;
        self.data.get(p, s, t, 0)
    }

    /// Set a value by parameter name, station name, and time.
    pub fn set_value_by_id<T>(
        &mut self,
        parameter: &str,
        station: &str,
        time: Time,
        value: T,
    ) -> Result<()>
    where
        Optioned<f64>: From<T>,
    {
        let (p, s, t) = self.resolve(parameter, station, time)?;
        self.data.set(p, s, t, 0, value)
    }

    fn resolve(&self, parameter: &str, station: &str, time: Time) -> Result<(usize, usize, usize)> {
        let p = self.parameters.index_of(parameter)?;
        let s = self.stations.index_of_name(station)?;
        let t = self
            .times
            .index_of(time)
            .ok_or_else(|| AnEnError::NotRegistered(format!("observation time {}", time.0)))?;
        Ok((p, s, t))
    }

    #[inline]
    pub(crate) fn at(&self, parameter: usize, station: usize, time: usize) -> f64 {
        self.data.at(parameter, station, time, 0)
    }
}
