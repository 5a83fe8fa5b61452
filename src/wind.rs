//! Derive wind speed and direction parameters from wind components.
//!
//! Archives usually carry the U and V components, but the direction is a better predictor for
//! analog matching. The derived direction is registered as a circular parameter.
use crate::{
    error::Result,
    forecasts::Forecasts,
    observations::Observations,
    parameters::{Parameter, Parameters},
};
use metfor::{MetersPSec, Quantity, WindSpdDir, WindUV};
use std::sync::Arc;

/// Names of the component parameters to read and of the parameters to add.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindNames<'a> {
    /// Eastward component, in m/s.
    pub u: &'a str,
    /// Northward component, in m/s.
    pub v: &'a str,
    /// Name for the derived speed.
    pub speed: &'a str,
    /// Name for the derived direction.
    pub direction: &'a str,
}

impl Default for WindNames<'static> {
    fn default() -> Self {
        WindNames {
            u: "u10",
            v: "v10",
            speed: "wspd",
            direction: "wdir",
        }
    }
}

/// Append wind speed and direction parameters to a forecast archive. Returns the indexes of the
/// new speed and direction parameters.
///
/// Either component missing leaves both derived values missing.
///
/// ```rust
/// use analog_ensemble::{
///     append_wind_speed_direction, Forecasts, Parameter, Parameters, Station, Stations, Times,
///     WindNames,
/// };
/// use std::sync::Arc;
///
/// let pars = Parameters::from_parameters(vec![Parameter::new("u10"), Parameter::new("v10")]);
/// let stns = Stations::from_stations(vec![Station::new("a")]).unwrap();
/// let times = Arc::new(Times::from_values(vec![0]).unwrap());
/// let flts = Arc::new(Times::from_values(vec![0]).unwrap());
///
/// let mut fcsts =
///     Forecasts::new(Arc::new(pars.unwrap()), Arc::new(stns), times, flts).unwrap();
/// fcsts.set_value(0, 0, 0, 0, 3.0).unwrap();
/// fcsts.set_value(1, 0, 0, 0, 4.0).unwrap();
///
/// let (spd, dir) = append_wind_speed_direction(&mut fcsts, &WindNames::default()).unwrap();
/// assert_eq!((spd, dir), (2, 3));
/// assert!((fcsts.value(spd, 0, 0, 0).unwrap().unpack() - 5.0).abs() < 1.0e-9);
/// assert!(fcsts.parameters().get(dir).unwrap().circular());
/// ```
pub fn append_wind_speed_direction(
    forecasts: &mut Forecasts,
    names: &WindNames,
) -> Result<(usize, usize)> {
    let (parameters, indexes) = with_wind_parameters(forecasts.parameters(), names)?;

    let stations = forecasts.stations().clone();
    let times = forecasts.times().clone();
    let flts = forecasts.flts().clone();
    forecasts.resize(Arc::new(parameters), stations, times, flts)?;

    let block = forecasts.stations().len() * forecasts.times().len() * forecasts.flts().len();
    derive(forecasts.values_mut(), block, indexes);

    Ok((indexes[2], indexes[3]))
}

/// Append wind speed and direction parameters to an observation archive. Returns the indexes of
/// the new speed and direction parameters.
pub fn append_observed_wind_speed_direction(
    observations: &mut Observations,
    names: &WindNames,
) -> Result<(usize, usize)> {
    let (parameters, indexes) = with_wind_parameters(observations.parameters(), names)?;

    let stations = observations.stations().clone();
    let times = observations.times().clone();
    observations.resize(Arc::new(parameters), stations, times)?;

    let block = observations.stations().len() * observations.times().len();
    derive(observations.values_mut(), block, indexes);

    Ok((indexes[2], indexes[3]))
}

// The extended registry and the indexes of u, v, speed, and direction.
fn with_wind_parameters(
    parameters: &Parameters,
    names: &WindNames,
) -> Result<(Parameters, [usize; 4])> {
    let u = parameters.index_of(names.u)?;
    let v = parameters.index_of(names.v)?;

    let mut extended = parameters.clone();
    let speed = extended.push(Parameter::new(names.speed))?;
    let direction = extended.push(Parameter::new(names.direction).with_circular(true))?;

    Ok((extended, [u, v, speed, direction]))
}

// Parameters are the leading axis, so each parameter is one contiguous block of values.
fn derive(values: &mut [f64], block: usize, indexes: [usize; 4]) {
    let [u, v, speed, direction] = indexes;

    for i in 0..block {
        let uu = values[u * block + i];
        let vv = values[v * block + i];

        let (spd, dir) = if uu.is_nan() || vv.is_nan() {
            (std::f64::NAN, std::f64::NAN)
        } else {
            let WindSpdDir { speed, direction } = WindSpdDir::<MetersPSec>::from(WindUV {
                u: MetersPSec(uu),
                v: MetersPSec(vv),
            });
            (speed.unpack(), direction)
        };

        values[speed * block + i] = spd;
        values[direction * block + i] = dir;
    }
}
