//! Dispersion statistics used to normalize raw forecast differences into comparable units.
//!
//! Values are computed over the time axis for each parameter, and depending on the [`SdScope`],
//! independently for each station and each lead time. Linear parameters use the sample (or
//! population) standard deviation, circular parameters use the Yamartino estimator. A cell with
//! fewer than two valid samples is undefined, never zero.
use crate::{
    error::{AnEnError, Result},
    forecasts::Forecasts,
    keys::{SdScope, Variance},
    observations::Observations,
    parameters::Parameters,
    stations::Stations,
    utility::{sd_circular, sd_linear},
};
use optional::Optioned;
use rayon::prelude::*;
use tracing::debug;

/// Precomputed standard deviations keyed by parameter, station, and lead time.
#[derive(Debug, Clone)]
pub struct StandardDeviation {
    values: Vec<f64>,
    extents: [usize; 3],
    scope: SdScope,
}

impl StandardDeviation {
    /// Compute from forecasts over the given time indexes, usually the search times.
    pub fn from_forecasts(
        forecasts: &Forecasts,
        time_indices: &[usize],
        circulars: &[bool],
        scope: SdScope,
        variance: Variance,
    ) -> Result<Self> {
        let num_pars = forecasts.parameters().len();
        let num_stations = forecasts.stations().len();
        let num_flts = forecasts.flts().len();

        check_circulars(circulars, num_pars)?;
        if let Some(&bad) = time_indices
            .iter()
            .find(|&&t| t >= forecasts.times().len())
        {
            return Err(AnEnError::OutOfRange {
                index: [0, 0, bad, 0],
                extents: forecasts.data().extents(),
            });
        }

        let extents = scoped_extents(scope, num_pars, num_stations, num_flts);

        // For each cell, the stations and lead times whose values are pooled.
        let gather = |p: usize, s: usize, f: usize| -> Vec<f64> {
            let (stations, flts) = match scope {
                SdScope::Parameter => (0..num_stations, 0..num_flts),
                SdScope::ParameterStation => (s..s + 1, 0..num_flts),
                SdScope::ParameterStationFlt => (s..s + 1, f..f + 1),
            };

            let mut values = Vec::with_capacity(stations.len() * flts.len() * time_indices.len());
            for stn in stations {
                for flt in flts.clone() {
                    values.extend(time_indices.iter().map(|&t| forecasts.at(p, stn, t, flt)));
                }
            }
            values
        };

        let sds = Self::compute(extents, scope, circulars, variance, gather);
        debug!(
            scope = %scope,
            cells = sds.values.len(),
            undefined = sds.count_undefined(),
            "standard deviation from forecasts"
        );
        Ok(sds)
    }

    /// Compute from observations. Forecast parameters and stations are matched to observation
    /// parameters and stations by name. Observations have no lead time, so a per lead time scope
    /// is computed per station.
    pub fn from_observations(
        observations: &Observations,
        parameters: &Parameters,
        stations: &Stations,
        circulars: &[bool],
        scope: SdScope,
        variance: Variance,
    ) -> Result<Self> {
        check_circulars(circulars, parameters.len())?;

        let par_map = parameters
            .iter()
            .map(|p| observations.parameters().index_of(p.name()))
            .collect::<Result<Vec<_>>>()?;
        let stn_map = stations
            .iter()
            .map(|s| observations.stations().index_of_name(s.name()))
            .collect::<Result<Vec<_>>>()?;

        let scope = match scope {
            SdScope::ParameterStationFlt => SdScope::ParameterStation,
            other => other,
        };
        let extents = scoped_extents(scope, parameters.len(), stations.len(), 1);
        let num_times = observations.times().len();

        let gather = |p: usize, s: usize, _f: usize| -> Vec<f64> {
            let obs_p = par_map[p];
            let obs_stations: Vec<usize> = match scope {
                SdScope::Parameter => stn_map.clone(),
                _ => vec![stn_map[s]],
            };

            obs_stations
                .into_iter()
                .flat_map(|obs_s| (0..num_times).map(move |t| (obs_s, t)))
                .map(|(obs_s, t)| observations.at(obs_p, obs_s, t))
                .collect()
        };

        let sds = Self::compute(extents, scope, circulars, variance, gather);
        debug!(
            scope = %scope,
            cells = sds.values.len(),
            undefined = sds.count_undefined(),
            "standard deviation from observations"
        );
        Ok(sds)
    }

    fn compute<G>(
        extents: [usize; 3],
        scope: SdScope,
        circulars: &[bool],
        variance: Variance,
        gather: G,
    ) -> Self
    where
        G: Fn(usize, usize, usize) -> Vec<f64> + Sync,
    {
        let [_, num_s, num_f] = extents;
        let num_cells = extents.iter().product();

        let values = (0..num_cells)
            .into_par_iter()
            .map(|cell| {
                let p = cell / (num_s * num_f);
                let s = (cell / num_f) % num_s;
                let f = cell % num_f;

                let samples = gather(p, s, f);
                let sd = if circulars[p] {
                    sd_circular(&samples)
                } else {
                    sd_linear(&samples, variance)
                };
                sd.into_option().unwrap_or(std::f64::NAN)
            })
            .collect();

        StandardDeviation {
            values,
            extents,
            scope,
        }
    }

    /// The granularity these values were computed at.
    #[inline]
    pub fn scope(&self) -> SdScope {
        self.scope
    }

    /// Stored extents `[parameters, stations, lead times]`; shared axes have an extent of 1.
    #[inline]
    pub fn extents(&self) -> [usize; 3] {
        self.extents
    }

    /// The standard deviation for a parameter at a station and lead time, or none if undefined.
    /// Station and lead time are ignored when the scope shares them.
    #[inline]
    pub fn get(&self, parameter: usize, station: usize, flt: usize) -> Optioned<f64> {
        match self.offset(parameter, station, flt) {
            Some(idx) => Optioned::from(self.values[idx]),
            None => Optioned::default(),
        }
    }

    fn offset(&self, parameter: usize, station: usize, flt: usize) -> Option<usize> {
        let [num_p, num_s, num_f] = self.extents;
        let s = if num_s == 1 { 0 } else { station };
        let f = if num_f == 1 { 0 } else { flt };
        if parameter >= num_p || s >= num_s || f >= num_f {
            return None;
        }
        Some((parameter * num_s + s) * num_f + f)
    }

    /// The value to divide a difference by. Undefined and zero deviations are replaced by the
    /// fallback when one is given, otherwise they are an error.
    #[inline]
    pub fn normalizer(
        &self,
        parameter: usize,
        station: usize,
        flt: usize,
        fallback: Option<f64>,
    ) -> Result<f64> {
        match self.get(parameter, station, flt).into_option() {
            Some(sd) if sd > 0.0 => Ok(sd),
            _ => fallback.ok_or(AnEnError::UndefinedStatistic {
                parameter,
                station,
                flt,
            }),
        }
    }

    /// Number of undefined cells.
    pub fn count_undefined(&self) -> usize {
        self.values.iter().filter(|v| v.is_nan()).count()
    }
}

fn scoped_extents(
    scope: SdScope,
    num_pars: usize,
    num_stations: usize,
    num_flts: usize,
) -> [usize; 3] {
    match scope {
        SdScope::Parameter => [num_pars, 1, 1],
        SdScope::ParameterStation => [num_pars, num_stations, 1],
        SdScope::ParameterStationFlt => [num_pars, num_stations, num_flts],
    }
}

fn check_circulars(circulars: &[bool], num_pars: usize) -> Result<()> {
    if circulars.len() != num_pars {
        return Err(AnEnError::DimensionMismatch {
            what: "circular flags",
            expected: num_pars,
            found: circulars.len(),
        });
    }
    Ok(())
}
