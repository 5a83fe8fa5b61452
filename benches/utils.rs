use analog_ensemble::{
    Forecasts, Observations, Parameter, Parameters, Station, Stations, Times,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

/// A synthetic archive with `num_stations` stations on a grid, daily forecasts out to two days
/// every 6 hours, and observations every 6 hours.
pub fn build_archive(num_stations: usize, num_times: usize) -> (Forecasts, Observations) {
    let pars = Arc::new(
        Parameters::from_parameters(vec![
            Parameter::new("t2"),
            Parameter::new("rh"),
            Parameter::new("wspd"),
            Parameter::new("wdir").with_circular(true),
            Parameter::new("mslp").with_weight(0.5),
        ])
        .unwrap(),
    );

    let side = (num_stations as f64).sqrt().ceil() as usize;
    let stns = Arc::new(
        Stations::from_stations((0..num_stations).map(|i| {
            Station::new(format!("stn{}", i)).with_xy(((i % side) as f64, (i / side) as f64))
        }))
        .unwrap(),
    );

    let times = Arc::new(Times::from_values((0..num_times as i64).map(|t| t * 86_400)).unwrap());
    let flts = Arc::new(Times::from_values((0..9).map(|f| f * 21_600)).unwrap());
    let last = (num_times as i64 + 2) * 4;
    let obs_times = Arc::new(Times::from_values((0..last).map(|i| i * 21_600)).unwrap());

    let mut fcsts = Forecasts::new(pars.clone(), stns.clone(), times, flts).unwrap();
    let mut obs = Observations::new(pars, stns, obs_times).unwrap();

    let mut rng = ChaCha8Rng::seed_from_u64(0x2545_F491);

    for v in fcsts.values_mut() {
        *v = rng.gen_range(0.0..360.0);
    }
    for v in obs.values_mut() {
        *v = rng.gen_range(0.0..40.0);
    }

    (fcsts, obs)
}
