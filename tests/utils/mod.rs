#![allow(dead_code)]
use analog_ensemble::{
    Forecasts, Observations, Parameter, Parameters, Station, Stations, Time, Times,
};
use std::sync::Arc;

/// Time between forecast initializations.
pub const CYCLE: i64 = 24;

/// Time between observations.
pub const OBS_STEP: i64 = 6;

/// A synthetic archive: forecasts initialized every `CYCLE` with lead times that are multiples of
/// `OBS_STEP`, and observations every `OBS_STEP` covering every valid time.
pub struct Archive {
    pub forecasts: Forecasts,
    pub observations: Observations,
}

pub struct ArchiveBuilder {
    stations: Vec<Station>,
    parameters: Vec<Parameter>,
    num_times: usize,
    flts: Vec<i64>,
    seed: u64,
    missing_every: Option<usize>,
}

impl ArchiveBuilder {
    pub fn new(num_times: usize) -> Self {
        ArchiveBuilder {
            stations: vec![Station::new("a").with_xy((0.0, 0.0))],
            parameters: vec![
                Parameter::new("t2"),
                Parameter::new("rh"),
                Parameter::new("wdir").with_circular(true).with_weight(2.0),
            ],
            num_times,
            flts: vec![0, 6, 12],
            seed: 1,
            missing_every: None,
        }
    }

    pub fn stations(mut self, stations: Vec<Station>) -> Self {
        self.stations = stations;
        self
    }

    pub fn flts(mut self, flts: Vec<i64>) -> Self {
        self.flts = flts;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Knock out every n-th forecast value.
    pub fn missing_every(mut self, n: usize) -> Self {
        self.missing_every = Some(n);
        self
    }

    pub fn build(self) -> Archive {
        let pars = Arc::new(Parameters::from_parameters(self.parameters.clone()).unwrap());
        let stns = Arc::new(Stations::from_stations(self.stations.clone()).unwrap());
        let times = Arc::new(
            Times::from_values((0..self.num_times as i64).map(|t| t * CYCLE)).unwrap(),
        );
        let flts = Arc::new(Times::from_values(self.flts.clone()).unwrap());

        let last_valid = (self.num_times as i64 - 1) * CYCLE + self.flts.iter().max().unwrap();
        let obs_values = (0..=last_valid / OBS_STEP).map(|i| i * OBS_STEP);
        let obs_times = Arc::new(Times::from_values(obs_values).unwrap());

        let mut forecasts =
            Forecasts::new(pars.clone(), stns.clone(), times.clone(), flts.clone()).unwrap();
        let mut observations =
            Observations::new(pars.clone(), stns.clone(), obs_times.clone()).unwrap();

        let mut counter = 0usize;
        for (p, par) in pars.iter().enumerate() {
            for s in 0..stns.len() {
                for t in 0..times.len() {
                    for f in 0..flts.len() {
                        counter += 1;
                        if self.missing_every.map_or(false, |n| counter % n == 0) {
                            continue;
                        }
                        let val = synthetic(self.seed, par, p, s, t, f);
                        forecasts.set_value(p, s, t, f, val).unwrap();
                    }
                }

                for (i, obs_t) in obs_times.iter().enumerate() {
                    let val = synthetic(self.seed, par, p, s, obs_t.0 as usize, 99);
                    observations.set_value(p, s, i, val).unwrap();
                }
            }
        }

        Archive {
            forecasts,
            observations,
        }
    }
}

/// A deterministic value in the natural range of the parameter.
pub fn synthetic(seed: u64, par: &Parameter, p: usize, s: usize, t: usize, f: usize) -> f64 {
    let unit = hash(seed, &[p, s, t, f]);
    if par.circular() {
        unit * 360.0
    } else {
        10.0 * (p as f64 + 1.0) + 20.0 * unit
    }
}

// SplitMix64 over the indexes, mapped to [0, 1).
fn hash(seed: u64, idx: &[usize]) -> f64 {
    let mut z = seed;
    for &i in idx {
        z = z.wrapping_add(0x9E37_79B9_7F4A_7C15).wrapping_add(i as u64);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
    }
    (z >> 11) as f64 / (1u64 << 53) as f64
}

/// The value of a forecast time index.
pub fn time_value(forecasts: &Forecasts, idx: usize) -> Time {
    forecasts.times().get(idx).unwrap()
}

/// Station layout on a line, one unit apart.
pub fn stations_on_a_line(n: usize) -> Vec<Station> {
    (0..n)
        .map(|i| Station::new(format!("s{}", i)).with_xy((i as f64, 0.0)))
        .collect()
}

#[allow(unused_macros)] // Only used by some test crates.
macro_rules! check_thread_independence {
    ($test_name:ident, $operation:expr, $num_nearest:expr) => {
        #[test]
        fn $test_name() {
            let archive = utils::ArchiveBuilder::new(12)
                .stations(utils::stations_on_a_line(4))
                .seed(7)
                .build();

            let base = analog_ensemble::Config {
                num_analogs: 3,
                operation: $operation,
                num_nearest: $num_nearest,
                save_sims: true,
                ..analog_ensemble::Config::default()
            };

            let test_times = [9, 10, 11];
            let search_times: Vec<usize> = (0..12).collect();

            let mut outputs = vec![];
            for &threads in &[1usize, 3, 8] {
                let config = base.clone().with_num_threads(threads);
                let anen = analog_ensemble::AnEn::new(config).unwrap();
                let output = anen
                    .generate(
                        &archive.forecasts,
                        &archive.observations,
                        &test_times,
                        &search_times,
                    )
                    .unwrap();
                outputs.push(output);
            }

            for other in &outputs[1..] {
                assert_eq!(outputs[0].analogs, other.analogs);
                assert_eq!(outputs[0].similarity, other.similarity);
            }
        }
    };
}
