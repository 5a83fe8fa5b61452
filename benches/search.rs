//! Run these benches with `cargo bench --bench search -- --verbose`
use analog_ensemble::{AnEn, Config, DistanceWeighting, Operation};
use criterion::{criterion_group, criterion_main, Criterion};

mod utils;

fn build_tester() -> Criterion {
    Criterion::default()
        .sample_size(20)
        .measurement_time(std::time::Duration::from_secs(20))
        .noise_threshold(0.03)
        .significance_level(0.01)
}

criterion_main!(search_benches);

criterion_group!(
    name = search_benches;
    config = build_tester();
    targets = independent_bench, space_extended_bench
);

const NUM_TIMES: usize = 200;

fn independent_bench(c: &mut Criterion) {
    let (fcsts, obs) = utils::build_archive(16, NUM_TIMES);
    let test_times: Vec<usize> = (NUM_TIMES - 10..NUM_TIMES).collect();
    let search_times: Vec<usize> = (0..NUM_TIMES).collect();

    let anen = AnEn::new(Config::default().with_num_analogs(20)).unwrap();

    c.bench_function("independent", |b| {
        b.iter(|| {
            anen.generate(&fcsts, &obs, &test_times, &search_times)
                .unwrap()
        });
    });
}

fn space_extended_bench(c: &mut Criterion) {
    let (fcsts, obs) = utils::build_archive(16, NUM_TIMES);
    let test_times: Vec<usize> = (NUM_TIMES - 10..NUM_TIMES).collect();
    let search_times: Vec<usize> = (0..NUM_TIMES).collect();

    let config = Config {
        distance_weighting: DistanceWeighting::Inverse,
        ..Config::default()
            .with_num_analogs(20)
            .with_operation(Operation::SpaceExtended)
            .with_num_nearest(4)
    };
    let anen = AnEn::new(config).unwrap();

    c.bench_function("space_extended", |b| {
        b.iter(|| {
            anen.generate(&fcsts, &obs, &test_times, &search_times)
                .unwrap()
        });
    });
}
