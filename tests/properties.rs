mod utils;

use analog_ensemble::{dissimilarity, fold_circular, AnEn, Config, CIRCULAR_RANGE};
use proptest::prelude::*;
use utils::ArchiveBuilder;

fn run(
    num_times: usize,
    seed: u64,
    missing: Option<usize>,
    config: Config,
) -> analog_ensemble::AnEnOutput {
    let mut builder = ArchiveBuilder::new(num_times).seed(seed);
    if let Some(n) = missing {
        builder = builder.missing_every(n);
    }
    let archive = builder.build();

    let test_times = [num_times - 2, num_times - 1];
    let search_times: Vec<usize> = (0..num_times).collect();

    AnEn::new(config)
        .unwrap()
        .generate(
            &archive.forecasts,
            &archive.observations,
            &test_times,
            &search_times,
        )
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_fold_symmetric_and_bounded(a in -720.0f64..720.0, b in -720.0f64..720.0) {
        let ab = fold_circular(a, b);
        let ba = fold_circular(b, a);

        prop_assert_eq!(ab, ba);
        prop_assert!(ab >= 0.0);
        prop_assert!(ab <= CIRCULAR_RANGE / 2.0);
    }

    #[test]
    fn prop_fold_shift_invariant(a in 0.0f64..360.0, b in 0.0f64..360.0, turns in -3i32..3) {
        let shifted = a + f64::from(turns) * CIRCULAR_RANGE;
        prop_assert!((fold_circular(a, b) - fold_circular(shifted, b)).abs() < 1.0e-9);
    }

    #[test]
    fn prop_metric_symmetric(
        pars in proptest::collection::vec(
            (-100.0f64..100.0, -100.0f64..100.0, 0.1f64..10.0, 0.0f64..5.0, any::<bool>()),
            1..6,
        )
    ) {
        let test: Vec<f64> = pars.iter().map(|p| p.0).collect();
        let search: Vec<f64> = pars.iter().map(|p| p.1).collect();
        let sds: Vec<f64> = pars.iter().map(|p| p.2).collect();
        let weights: Vec<f64> = pars.iter().map(|p| p.3).collect();
        let circulars: Vec<bool> = pars.iter().map(|p| p.4).collect();

        let forward = dissimilarity(&test, &search, &sds, &weights, &circulars).unwrap();
        let backward = dissimilarity(&search, &test, &sds, &weights, &circulars).unwrap();

        match (forward, backward) {
            (Some((f, f_na)), Some((b, b_na))) => {
                prop_assert!(f >= 0.0);
                prop_assert!((f - b).abs() <= 1.0e-9 * f.max(1.0));
                prop_assert_eq!(f_na, b_na);
            }
            (None, None) => prop_assert!(weights.iter().all(|&w| w == 0.0)),
            _ => prop_assert!(false, "symmetry broken: {:?} vs {:?}", forward, backward),
        }
    }

    #[test]
    fn prop_no_future_leakage(
        num_times in 5usize..14,
        seed in 0u64..1_000,
        num_analogs in 1usize..5,
        flt_radius in 0usize..3,
    ) {
        let mut builder = ArchiveBuilder::new(num_times).seed(seed);
        builder = builder.flts(vec![0, 6, 12, 18]);
        let archive = builder.build();

        let test_times = [num_times - 2, num_times - 1];
        let search_times: Vec<usize> = (0..num_times).collect();
        let config = Config {
            num_analogs,
            num_sims: 50,
            flt_radius,
            save_sims: true,
            ..Config::default()
        };

        let output = AnEn::new(config)
            .unwrap()
            .generate(&archive.forecasts, &archive.observations, &test_times, &search_times)
            .unwrap();
        let sims = output.similarity.unwrap();

        for (pos, &test_time) in test_times.iter().enumerate() {
            let test_value = utils::time_value(&archive.forecasts, test_time);
            for (f, flt) in archive.forecasts.flts().iter().enumerate() {
                for cand in sims.row(0, pos, f).unwrap() {
                    prop_assert!(cand.search_time_value + flt < test_value);
                    prop_assert!(cand.search_time != test_time);
                }
                for m in 0..num_analogs {
                    if let Some(src) = output.analogs.source(0, pos, f, m).unwrap() {
                        let search_value = utils::time_value(&archive.forecasts, src.search_time);
                        prop_assert!(search_value + flt < test_value);
                    }
                }
            }
        }
    }

    #[test]
    fn prop_deterministic(
        seed in 0u64..1_000,
        missing in proptest::option::of(3usize..9),
        threads in 2usize..6,
    ) {
        let config = Config {
            num_analogs: 3,
            save_sims: true,
            num_sims: 6,
            sd_fallback: Some(1.0),
            ..Config::default()
        };

        let single = run(10, seed, missing, config.clone().with_num_threads(1));
        let again = run(10, seed, missing, config.clone().with_num_threads(1));
        let many = run(10, seed, missing, config.with_num_threads(threads));

        prop_assert_eq!(&single.analogs, &again.analogs);
        prop_assert_eq!(&single.analogs, &many.analogs);
        prop_assert_eq!(&single.similarity, &many.similarity);
    }

    #[test]
    fn prop_single_analog_is_lowest(seed in 0u64..1_000) {
        let config = Config {
            num_analogs: 1,
            num_sims: 10,
            save_sims: true,
            ..Config::default()
        };
        let output = run(9, seed, None, config);
        let sims = output.similarity.unwrap();

        let [_, nt, nf] = output.analogs.case_extents();
        for t in 0..nt {
            for f in 0..nf {
                let row = sims.row(0, t, f).unwrap();
                prop_assert!(row.windows(2).all(|w| w[0].rank_cmp(&w[1]).is_lt()));

                let src = output.analogs.source(0, t, f, 0).unwrap().unwrap();
                prop_assert_eq!(src.search_time, row[0].search_time);
                prop_assert_eq!(output.analogs.value(0, t, f, 0).unwrap().unpack(), row[0].value);
            }
        }
    }
}
