//! Benchmarks for the CPU physics step and cloth construction.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use drape::{forces, network, provot, ClothConfig};

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("step");

    for cells in [10usize, 20, 40, 80] {
        let config = ClothConfig::new().with_grid(cells, cells);
        group.bench_with_input(BenchmarkId::from_parameter(cells), &config, |b, config| {
            let mut cloth = network::build(config).unwrap();
            b.iter(|| {
                cloth.step(black_box(config.time_step));
            })
        });
    }

    group.finish();
}

fn bench_passes(c: &mut Criterion) {
    let mut group = c.benchmark_group("passes");
    let config = ClothConfig::new().with_grid(40, 40);

    group.bench_function("forces", |b| {
        let mut cloth = network::build(&config).unwrap();
        b.iter(|| forces::accumulate(black_box(&mut cloth)))
    });

    group.bench_function("provot", |b| {
        let mut cloth = network::build(&config).unwrap();
        for _ in 0..60 {
            cloth.step(config.time_step);
        }
        b.iter(|| provot::correct(black_box(&mut cloth)))
    });

    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");

    for cells in [20usize, 80] {
        let config = ClothConfig::new().with_grid(cells, cells);
        group.bench_with_input(BenchmarkId::from_parameter(cells), &config, |b, config| {
            b.iter(|| black_box(network::build(config).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_step, bench_passes, bench_build);
criterion_main!(benches);
