//! An archive of gridded or point forecasts: parameter x station x time x lead time.
use crate::{
    array4d::Array4D,
    error::{AnEnError, Result},
    parameters::Parameters,
    stations::Stations,
    times::{Time, Times},
};
use optional::Optioned;
use std::sync::Arc;

/// Forecast values with the collections that label each axis.
///
/// The collections are shared, not owned, so the same `Stations` can label both a forecast and an
/// observation archive. The array extents always equal the collection sizes.
#[derive(Debug, Clone)]
pub struct Forecasts {
    parameters: Arc<Parameters>,
    stations: Arc<Stations>,
    times: Arc<Times>,
    flts: Arc<Times>,
    data: Array4D,
}

impl Forecasts {
    /// Create an archive with every value missing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use analog_ensemble::{Forecasts, Parameter, Parameters, Station, Stations, Time, Times};
    /// use std::sync::Arc;
    ///
    /// let pars = Arc::new(Parameters::from_parameters(vec![Parameter::new("t2")]).unwrap());
    /// let stns = Arc::new(Stations::from_stations(vec![Station::new("a")]).unwrap());
    /// let times = Arc::new(Times::from_values(vec![0, 86_400]).unwrap());
    /// let flts = Arc::new(Times::from_values(vec![0, 3_600]).unwrap());
    ///
    /// let mut fcsts = Forecasts::new(pars, stns, times, flts).unwrap();
    /// fcsts.set_value_by_id("t2", "a", Time(86_400), Time(3_600), 280.5).unwrap();
    /// assert_eq!(fcsts.value(0, 0, 1, 1).unwrap().unpack(), 280.5);
    /// ```
    pub fn new(
        parameters: Arc<Parameters>,
        stations: Arc<Stations>,
        times: Arc<Times>,
        flts: Arc<Times>,
    ) -> Result<Self> {
        let data = Array4D::new([parameters.len(), stations.len(), times.len(), flts.len()])?;
        Self::from_array(parameters, stations, times, flts, data)
    }

    /// Wrap an existing array, checking its extents against the collections.
    pub fn from_array(
        parameters: Arc<Parameters>,
        stations: Arc<Stations>,
        times: Arc<Times>,
        flts: Arc<Times>,
        data: Array4D,
    ) -> Result<Self> {
        let fcsts = Forecasts {
            parameters,
            stations,
            times,
            flts,
            data,
        };
        fcsts.validate()?;
        Ok(fcsts)
    }

    /// Check that every array extent matches the size of its collection.
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("forecast parameters", self.parameters.len()),
            ("forecast stations", self.stations.len()),
            ("forecast times", self.times.len()),
            ("forecast lead times", self.flts.len()),
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

        if !self.times.same_frame(&self.flts) {
            return Err(AnEnError::invalid(
                "forecast times and lead times must use the same unit and origin",
            ));
        }

        Ok(())
    }

    /// Relabel the axes. The array is copied into the new extents, keeping values whose indexes
    /// exist in both, and the result is validated again.
    pub fn resize(
        &mut self,
        parameters: Arc<Parameters>,
        stations: Arc<Stations>,
        times: Arc<Times>,
        flts: Arc<Times>,
    ) -> Result<()> {
        self.data
            .resize([parameters.len(), stations.len(), times.len(), flts.len()])?;
        self.parameters = parameters;
        self.stations = stations;
        self.times = times;
        self.flts = flts;
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

    /// The initialization times axis.
    #[inline]
    pub fn times(&self) -> &Arc<Times> {
        &self.times
    }

    /// The lead times axis.
    #[inline]
    pub fn flts(&self) -> &Arc<Times> {
        &self.flts
    }

    /// The values.
    #[inline]
    pub fn data(&self) -> &Array4D {
        &self.data
    }

    /// The contiguous value buffer for bulk writes. Shape is fixed, use `resize` to change it.
    #[inline]
    pub fn values_mut(&mut self) -> &mut [f64] {
        self.data.as_mut_slice()
    }

    /// Get a value by index.
    #[inline]
    pub fn value(
        &self,
        parameter: usize,
        station: usize,
        time: usize,
        flt: usize,
    ) -> Result<Optioned<f64>> {
        self.data.get(parameter, station, time, flt)
    }

    /// Set a value by index.
    #[inline]
    pub fn set_value<T>(
        &mut self,
        parameter: usize,
        station: usize,
        time: usize,
        flt: usize,
        value: T,
    ) -> Result<()>
    where
        Optioned<f64>: From<T>,
    {
        self.data.set(parameter, station, time, flt, value)
    }

    /// Get a value by parameter name, station name, initialization time, and lead time.
    pub fn value_by_id(
        &self,
        parameter: &str,
        station: &str,
        time: Time,
        flt: Time,
    ) -> Result<Optioned<f64>> {
        let (p, s, t, f) = self.resolve(parameter, station, time, flt)?;
        self.data.get(p, s, t, f)
    }

    /// Set a value by parameter name, station name, initialization time, and lead time.
    pub fn set_value_by_id<T>(
        &mut self,
        parameter: &str,
        station: &str,
        time: Time,
        flt: Time,
        value: T,
    ) -> Result<()>
    where
        Optioned<f64>: From<T>,
    {
        let (p, s, t, f) = self.resolve(parameter, station, time, flt)?;
        self.data.set(p, s, t, f, value)
    }

    fn resolve(
        &self,
        parameter: &str,
        station: &str,
        time: Time,
        flt: Time,
    ) -> Result<(usize, usize, usize, usize)> {
        let p = self.parameters.index_of(parameter)?;
        let s = self.stations.index_of_name(station)?;
        let t = self
            .times
            .index_of(time)
            .ok_or_else(|| AnEnError::NotRegistered(format!("forecast time {}", time.0)))?;
        let f = self
            .flts
            .index_of(flt)
            .ok_or_else(|| AnEnError::NotRegistered(format!("lead time {}", flt.0)))?;
        Ok((p, s, t, f))
    }

    // Raw access for the search loops, indexes already validated.
    #[inline]
    pub(crate) fn at(&self, parameter: usize, station: usize, time: usize, flt: usize) -> f64 {
        self.data.at(parameter, station, time, flt)
    }
}
