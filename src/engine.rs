//! The analog search engine.
//!
//! A run validates its inputs, precomputes everything that is shared between test cases into a
//! read only search context, and then scores, ranks, and selects candidates for every
//! (test station, test time, lead time) case in parallel. Cases never share mutable state and
//! results are collected in case order, so the output does not depend on the number of threads.
use crate::{
    analogs::Analogs,
    config::Config,
    error::{AnEnError, Result},
    forecasts::Forecasts,
    keys::{Operation, SdSource, ShortfallPolicy},
    observations::Observations,
    partition::AnalogBlock,
    similarity::{parameter_term, rank, Candidate, SimilarityMatrices},
    standard_deviation::StandardDeviation,
    stations::Stations,
    window::{admissible_time, flt_window, station_map, TimeTable},
};
use rayon::prelude::*;
use std::{ops::Range, time::Instant};
use tracing::{debug, info, warn};

mod independent;
mod space_extended;

pub use independent::Independent;
pub use space_extended::SpaceExtended;

/// The parts of a search that differ between strategies.
pub trait AnalogSearch: Send + Sync {
    /// The forecast stations searched on behalf of `test_station`, as `(index, distance)` pairs.
    fn search_stations(&self, stations: &Stations, test_station: usize)
        -> Result<Vec<(usize, f64)>>;

    /// The final score of a candidate found at a station `distance` away from the test station.
    #[inline]
    fn adjust_score(&self, score: f64, _distance: f64) -> f64 {
        score
    }

    /// The forecast station whose observations supply the member for a match at
    /// `search_station`.
    fn member_station(&self, test_station: usize, search_station: usize) -> usize;
}

/// Everything a run produces.
#[derive(Debug, Clone)]
pub struct AnEnOutput {
    /// The ensemble.
    pub analogs: Analogs,
    /// The standard deviation used to normalize differences.
    pub standard_deviation: StandardDeviation,
    /// The stations searched for each test station, as `(index, distance)` pairs.
    pub search_stations: Vec<Vec<(usize, f64)>>,
    /// The ranked candidates of every case, if requested with `save_sims`.
    pub similarity: Option<SimilarityMatrices>,
}

/// An analog ensemble generator.
///
/// Test and search times are both indexes into the forecast times. Every forecast station is a
/// test station.
///
/// # Examples
///
/// ```rust
/// use analog_ensemble::{
///     AnEn, Config, Forecasts, Observations, Parameter, Parameters, Station, Stations, Times,
/// };
/// use std::sync::Arc;
///
/// let pars = Arc::new(Parameters::from_parameters(vec![Parameter::new("t2")]).unwrap());
/// let stns = Arc::new(Stations::from_stations(vec![Station::new("a")]).unwrap());
/// let times = Arc::new(Times::from_values(vec![0, 10, 20, 30]).unwrap());
/// let flts = Arc::new(Times::from_values(vec![0]).unwrap());
///
/// let mut fcsts = Forecasts::new(pars.clone(), stns.clone(), times.clone(), flts).unwrap();
/// let mut obs = Observations::new(pars, stns, times).unwrap();
/// for (t, val) in [1.0, 5.0, 2.5, 1.5].iter().enumerate() {
///     fcsts.set_value(0, 0, t, 0, *val).unwrap();
///     obs.set_value(0, 0, t, val + 100.0).unwrap();
/// }
///
/// let anen = AnEn::new(Config::default().with_flt_radius(0)).unwrap();
/// let output = anen.generate(&fcsts, &obs, &[3], &[0, 1, 2]).unwrap();
///
/// // The closest earlier forecast to 1.5 is 1.0 at the first time.
/// assert_eq!(output.analogs.value(0, 0, 0, 0).unwrap().unpack(), 101.0);
/// ```
pub struct AnEn {
    config: Config,
    search: Box<dyn AnalogSearch>,
}

impl AnEn {
    /// Create a generator, choosing the search strategy from the configuration.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let search: Box<dyn AnalogSearch> = match config.operation {
            Operation::Independent => Box::new(Independent),
            Operation::SpaceExtended => Box::new(SpaceExtended::from_config(&config)),
        };

        Ok(AnEn { config, search })
    }

    /// Create a generator with a custom search strategy.
    pub fn with_search(config: Config, search: Box<dyn AnalogSearch>) -> Result<Self> {
        config.validate()?;
        Ok(AnEn { config, search })
    }

    /// The configuration.
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of cases a run over these forecasts and test times has.
    pub fn num_cases(forecasts: &Forecasts, test_times: &[usize]) -> usize {
        forecasts.stations().len() * test_times.len() * forecasts.flts().len()
    }

    /// Generate the ensemble for every test station, test time, and lead time.
    pub fn generate(
        &self,
        forecasts: &Forecasts,
        observations: &Observations,
        test_times: &[usize],
        search_times: &[usize],
    ) -> Result<AnEnOutput> {
        let start = Instant::now();
        let ctx = SearchContext::new(
            &self.config,
            self.search.as_ref(),
            forecasts,
            observations,
            test_times,
            search_times,
        )?;

        let num_cases = ctx.num_cases();
        info!(
            operation = %self.config.operation,
            cases = num_cases,
            search_times = search_times.len(),
            "generating analogs"
        );

        let rows = self.run(&ctx, 0..num_cases)?;

        let mut analogs = Analogs::new(ctx.case_extents(), self.config.num_analogs)?;
        for (case, row) in rows.iter().enumerate() {
            analogs.set_case(case, row);
        }
        report_incomplete(&analogs);

        let similarity = if self.config.save_sims {
            Some(SimilarityMatrices::new(
                rows,
                ctx.case_extents(),
                ctx.keep(),
            ))
        } else {
            None
        };

        info!(
            cases = num_cases,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "analogs generated"
        );

        let SearchContext { sds, pools, .. } = ctx;
        Ok(AnEnOutput {
            analogs,
            standard_deviation: sds,
            search_stations: pools,
            similarity,
        })
    }

    /// Generate the ensemble for a contiguous range of cases. The blocks of a partitioned run are
    /// put back together with [`gather`](crate::partition::gather).
    pub fn generate_range(
        &self,
        forecasts: &Forecasts,
        observations: &Observations,
        test_times: &[usize],
        search_times: &[usize],
        range: Range<usize>,
    ) -> Result<AnalogBlock> {
        let ctx = SearchContext::new(
            &self.config,
            self.search.as_ref(),
            forecasts,
            observations,
            test_times,
            search_times,
        )?;

        let num_cases = ctx.num_cases();
        if range.start > range.end || range.end > num_cases {
            return Err(AnEnError::invalid(format!(
                "case range {:?} is not within 0..{}",
                range, num_cases
            )));
        }

        info!(
            operation = %self.config.operation,
            start = range.start,
            end = range.end,
            "generating analogs for a range of cases"
        );

        let rows = self.run(&ctx, range.clone())?;
        let members = rows
            .into_iter()
            .map(|mut row| {
                row.truncate(self.config.num_analogs);
                row
            })
            .collect();

        Ok(AnalogBlock::new(
            range,
            ctx.case_extents(),
            self.config.num_analogs,
            members,
        ))
    }

    fn run(&self, ctx: &SearchContext, range: Range<usize>) -> Result<Vec<Vec<Candidate>>> {
        let search = self.search.as_ref();
        // Every case runs to completion so the reported error is the first in case order, not the
        // first one a worker happened to hit.
        let job = || {
            range
                .clone()
                .into_par_iter()
                .map(|case| ctx.run_case(search, case))
                .collect::<Vec<Result<_>>>()
        };

        match self.config.num_threads {
            Some(num_threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(num_threads)
                    .build()
                    .map_err(|err| AnEnError::invalid(format!("thread pool: {}", err)))?;
                pool.install(job).into_iter().collect()
            }
            None => job().into_iter().collect(),
        }
    }
}

fn report_incomplete(analogs: &Analogs) {
    let incomplete = analogs.count_incomplete();
    if incomplete > 0 {
        warn!(
            incomplete,
            cases = analogs.num_cases(),
            members = analogs.num_members(),
            "cases without a full ensemble"
        );
    }
}

/// Read only state shared by every case of a run.
struct SearchContext<'a> {
    config: &'a Config,
    forecasts: &'a Forecasts,
    observations: &'a Observations,
    test_times: &'a [usize],
    search_times: &'a [usize],
    weights: Vec<f64>,
    circulars: Vec<bool>,
    // Normalizers by [parameter][forecast station][lead time], NaN where undefined.
    normalizers: Vec<f64>,
    windows: Vec<Range<usize>>,
    table: TimeTable,
    obs_stations: Vec<usize>,
    pools: Vec<Vec<(usize, f64)>>,
    sds: StandardDeviation,
}

impl<'a> SearchContext<'a> {
    fn new(
        config: &'a Config,
        search: &dyn AnalogSearch,
        forecasts: &'a Forecasts,
        observations: &'a Observations,
        test_times: &'a [usize],
        search_times: &'a [usize],
    ) -> Result<Self> {
        config.validate()?;
        forecasts.validate()?;
        observations.validate()?;

        let num_pars = forecasts.parameters().len();
        let num_stations = forecasts.stations().len();
        let num_times = forecasts.times().len();
        let num_flts = forecasts.flts().len();

        if test_times.is_empty() || search_times.is_empty() {
            return Err(AnEnError::invalid("test and search times must not be empty"));
        }
        if let Some(&bad) = test_times
            .iter()
            .chain(search_times)
            .find(|&&t| t >= num_times)
        {
            return Err(AnEnError::OutOfRange {
                index: [0, 0, bad, 0],
                extents: forecasts.data().extents(),
            });
        }

        if config.obs_var_index >= observations.parameters().len() {
            return Err(AnEnError::invalid(format!(
                "obs_var_index {} with only {} observation parameters",
                config.obs_var_index,
                observations.parameters().len()
            )));
        }

        let weights = match config.weights {
            Some(ref weights) => weights.clone(),
            None => forecasts.parameters().weights(),
        };
        let circulars = match config.circulars {
            Some(ref circulars) => circulars.clone(),
            None => forecasts.parameters().circulars(),
        };
        for &(what, found) in &[("weights", weights.len()), ("circular flags", circulars.len())] {
            if found != num_pars {
                return Err(AnEnError::DimensionMismatch {
                    what,
                    expected: num_pars,
                    found,
                });
            }
        }
        if weights.iter().any(|&w| !(w >= 0.0) || !w.is_finite()) {
            return Err(AnEnError::invalid("weights must be non-negative and finite"));
        }
        if weights.iter().all(|&w| w == 0.0) {
            return Err(AnEnError::invalid("at least one weight must be positive"));
        }

        let obs_stations = station_map(forecasts.stations(), observations.stations())?;
        let table = TimeTable::new(forecasts.times(), forecasts.flts(), observations.times())?;

        let sds = match config.sd_source {
            SdSource::Forecasts => StandardDeviation::from_forecasts(
                forecasts,
                search_times,
                &circulars,
                config.sd_scope,
                config.variance,
            )?,
            SdSource::Observations => StandardDeviation::from_observations(
                observations,
                forecasts.parameters(),
                forecasts.stations(),
                &circulars,
                config.sd_scope,
                config.variance,
            )?,
        };

        let mut normalizers = Vec::with_capacity(num_pars * num_stations * num_flts);
        for p in 0..num_pars {
            for s in 0..num_stations {
                for f in 0..num_flts {
                    let norm = sds.normalizer(p, s, f, config.sd_fallback).ok();
                    normalizers.push(norm.unwrap_or(std::f64::NAN));
                }
            }
        }

        let windows = (0..num_flts)
            .map(|f| flt_window(f, config.flt_radius, num_flts))
            .collect();

        let pools = (0..num_stations)
            .map(|s| search.search_stations(forecasts.stations(), s))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            undefined_sds = sds.count_undefined(),
            resolved_times = table.count_resolved(),
            largest_pool = pools.iter().map(Vec::len).max().unwrap_or(0),
            "preprocessing done"
        );

        Ok(SearchContext {
            config,
            forecasts,
            observations,
            test_times,
            search_times,
            weights,
            circulars,
            normalizers,
            windows,
            table,
            obs_stations,
            pools,
            sds,
        })
    }

    #[inline]
    fn case_extents(&self) -> [usize; 3] {
        [
            self.forecasts.stations().len(),
            self.test_times.len(),
            self.forecasts.flts().len(),
        ]
    }

    #[inline]
    fn num_cases(&self) -> usize {
        self.case_extents().iter().product()
    }

    // Candidates kept per case.
    #[inline]
    fn keep(&self) -> usize {
        if self.config.save_sims {
            self.config.num_sims_or_default()
        } else {
            self.config.num_analogs
        }
    }

    /// Score, rank, and select the candidates of one case.
    fn run_case(&self, search: &dyn AnalogSearch, case: usize) -> Result<Vec<Candidate>> {
        let [_, nt, nf] = self.case_extents();
        let test_station = case / (nt * nf);
        let test_pos = (case / nf) % nt;
        let flt = case % nf;

        let times = self.forecasts.times();
        let test_time = self.test_times[test_pos];
        let test_time_value = times.get(test_time).unwrap_or_default();
        let flt_value = self.forecasts.flts().get(flt).unwrap_or_default();

        let mut candidates =
            Vec::with_capacity(self.pools[test_station].len() * self.search_times.len());
        for &(search_station, distance) in &self.pools[test_station] {
            let member_station = search.member_station(test_station, search_station);
            let obs_station = self.obs_stations[member_station];

            for &search_time in self.search_times {
                let search_time_value = times.get(search_time).unwrap_or_default();
                if !admissible_time(
                    test_time,
                    test_time_value,
                    search_time,
                    search_time_value,
                    flt_value,
                    self.config.prevent_search_future,
                ) {
                    continue;
                }

                let obs_time = match self.table.get(search_time, flt) {
                    Some(obs_time) => obs_time,
                    None => continue,
                };
                let value = self
                    .observations
                    .at(self.config.obs_var_index, obs_station, obs_time);
                if value.is_nan() {
                    continue;
                }

                if let Some((score, na_count)) =
                    self.score(test_station, test_time, search_station, search_time, flt)?
                {
                    candidates.push(Candidate {
                        score: search.adjust_score(score, distance),
                        na_count,
                        search_station,
                        search_time,
                        search_time_value,
                        obs_station,
                        obs_time,
                        value,
                    });
                }
            }
        }

        let found = candidates.len();
        let required = self.config.num_analogs;
        if found < required && self.config.shortfall == ShortfallPolicy::Fail {
            return Err(AnEnError::InsufficientCandidates {
                station: test_station,
                time: test_pos,
                flt,
                found,
                required,
            });
        }

        Ok(rank(candidates, self.keep()))
    }

    /// The score and missing parameter count of one candidate, or none if it is not admissible.
    fn score(
        &self,
        test_station: usize,
        test_time: usize,
        search_station: usize,
        search_time: usize,
        flt: usize,
    ) -> Result<Option<(f64, usize)>> {
        let window = self.windows[flt].clone();
        let len = window.len();
        let data = self.forecasts.data();
        let values = data.as_slice();
        let [_, num_stations, _, num_flts] = data.extents();

        let mut total = 0.0;
        let mut na_count = 0;
        let mut valid = 0;

        for (p, (&weight, &circular)) in self.weights.iter().zip(&self.circulars).enumerate() {
            if weight == 0.0 {
                continue;
            }

            let test_start = data.offset_unchecked(p, test_station, test_time, window.start);
            let search_start = data.offset_unchecked(p, search_station, search_time, window.start);
            let norm_start = (p * num_stations + search_station) * num_flts + window.start;

            let term = parameter_term(
                &values[test_start..test_start + len],
                &values[search_start..search_start + len],
                &self.normalizers[norm_start..norm_start + len],
                circular,
                self.config.max_flt_nan,
            )
            .map_err(|i| AnEnError::UndefinedStatistic {
                parameter: p,
                station: search_station,
                flt: window.start + i,
            })?;

            match term.into_option() {
                Some(term) => {
                    total += weight * term;
                    valid += 1;
                }
                None => na_count += 1,
            }
        }

        let too_many_missing = self
            .config
            .max_par_nan
            .map_or(false, |max| na_count > max);
        if valid == 0 || too_many_missing {
            return Ok(None);
        }

        Ok(Some((total, na_count)))
    }
}
