mod utils;

use analog_ensemble::{
    fold_circular, AnEn, Config, Forecasts, Observations, Parameter, Parameters, Station,
    Stations, Times,
};
use std::sync::Arc;

// Test values at the test time: t2, rh, wdir.
const TEST: [f64; 3] = [10.0, 50.0, 355.0];

// Historical forecasts at the test station.
const HISTORY: [[f64; 3]; 5] = [
    [10.0, 50.0, 5.0],
    [12.0, 55.0, 350.0],
    [10.5, 50.0, 355.0],
    [20.0, 80.0, 180.0],
    [10.0, 51.0, 90.0],
];

// 2 stations, 3 parameters (wdir circular with weight 2), 5 historical times and 1 test time.
fn archive() -> (Forecasts, Observations) {
    let pars = Arc::new(
        Parameters::from_parameters(vec![
            Parameter::new("t2"),
            Parameter::new("rh"),
            Parameter::new("wdir").with_circular(true).with_weight(2.0),
        ])
        .unwrap(),
    );
    let stns = Arc::new(
        Stations::from_stations(vec![
            Station::new("test").with_xy((0.0, 0.0)),
            Station::new("other").with_xy((10.0, 0.0)),
        ])
        .unwrap(),
    );
    let times = Arc::new(Times::from_values((0..6).map(|t| t * 24)).unwrap());
    let flts = Arc::new(Times::from_values(vec![0]).unwrap());

    let mut fcsts = Forecasts::new(pars.clone(), stns.clone(), times.clone(), flts).unwrap();
    let mut obs = Observations::new(pars, stns, times).unwrap();

    for (t, row) in HISTORY.iter().enumerate() {
        for (p, &val) in row.iter().enumerate() {
            fcsts.set_value(p, 0, t, 0, val).unwrap();
            // The other station drifts away from the test values over time.
            fcsts.set_value(p, 1, t, 0, TEST[p] + t as f64).unwrap();
        }
        obs.set_value(0, 0, t, 100.0 + t as f64).unwrap();
        obs.set_value(0, 1, t, 200.0 + t as f64).unwrap();
    }
    for (p, &val) in TEST.iter().enumerate() {
        fcsts.set_value(p, 0, 5, 0, val).unwrap();
        fcsts.set_value(p, 1, 5, 0, val + 1.0).unwrap();
    }

    (fcsts, obs)
}

fn config() -> Config {
    Config {
        save_sims: true,
        num_sims: 5,
        ..Config::default().with_flt_radius(0).with_num_analogs(2)
    }
}

#[test]
fn two_closest_historical_times() {
    let (fcsts, obs) = archive();
    let anen = AnEn::new(config()).unwrap();
    let output = anen.generate(&fcsts, &obs, &[5], &[0, 1, 2, 3, 4]).unwrap();

    // Score every candidate by hand with the standard deviations the run used.
    let sds = &output.standard_deviation;
    let weights = [1.0, 1.0, 2.0];
    let mut expected: Vec<(f64, usize)> = HISTORY
        .iter()
        .enumerate()
        .map(|(t, row)| {
            let score = (0..3)
                .map(|p| {
                    let d = if p == 2 {
                        fold_circular(TEST[p], row[p])
                    } else {
                        TEST[p] - row[p]
                    };
                    let norm = d / sds.get(p, 0, 0).unpack();
                    weights[p] * norm * norm
                })
                .sum::<f64>();
            (score, t)
        })
        .collect();
    expected.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap().then(a.1.cmp(&b.1)));

    // The nearly identical forecast wins.
    assert_eq!(expected[0].1, 2);

    let members = output.analogs.members(0, 0, 0).unwrap();
    assert_eq!(members, &[100.0 + expected[0].1 as f64, 100.0 + expected[1].1 as f64]);
    assert!(output.analogs.is_complete(0, 0, 0).unwrap());

    let row = output.similarity.as_ref().unwrap().row(0, 0, 0).unwrap();
    assert_eq!(row.len(), 5);
    for (cand, &(score, t)) in row.iter().zip(&expected) {
        assert_eq!(cand.search_time, t);
        assert_eq!(cand.search_station, 0);
        assert!((cand.score - score).abs() < 1.0e-9);
    }
}

#[test]
fn stations_search_independently() {
    let (fcsts, obs) = archive();
    let anen = AnEn::new(config()).unwrap();
    let output = anen.generate(&fcsts, &obs, &[5], &[0, 1, 2, 3, 4]).unwrap();

    for m in 0..2 {
        let src = output.analogs.source(0, 0, 0, m).unwrap().unwrap();
        assert_eq!((src.search_station, src.obs_station), (0, 0));

        let src = output.analogs.source(1, 0, 0, m).unwrap().unwrap();
        assert_eq!((src.search_station, src.obs_station), (1, 1));
    }

    // Time 1 matches exactly, times 0 and 2 tie and the earlier one wins.
    assert_eq!(output.analogs.members(1, 0, 0).unwrap(), &[201.0, 200.0]);
    assert_eq!(output.search_stations, vec![vec![(0, 0.0)], vec![(1, 0.0)]]);
}

#[test]
fn single_analog_is_the_best() {
    let (fcsts, obs) = archive();
    let anen = AnEn::new(config().with_num_analogs(1)).unwrap();
    let output = anen.generate(&fcsts, &obs, &[5], &[0, 1, 2, 3, 4]).unwrap();

    assert_eq!(output.analogs.num_members(), 1);
    assert_eq!(output.analogs.members(0, 0, 0).unwrap(), &[102.0]);
}

#[test]
fn weights_from_the_configuration() {
    let (fcsts, obs) = archive();

    // Only relative humidity counts, so times 0 and 2 tie and the earlier one wins.
    let config = Config {
        weights: Some(vec![0.0, 1.0, 0.0]),
        ..config()
    };
    let output = AnEn::new(config)
        .unwrap()
        .generate(&fcsts, &obs, &[5], &[0, 1, 2, 3, 4])
        .unwrap();
    assert_eq!(output.analogs.members(0, 0, 0).unwrap(), &[100.0, 102.0]);
}
