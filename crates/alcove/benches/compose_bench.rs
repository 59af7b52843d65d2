//! Criterion benchmarks for the composition pipeline.
//!
//! Covers the static inequality generator and a full compose-and-project
//! call, the two costs that dominate a coverage-set search. Exact rational
//! arithmetic makes these orders of magnitude slower than float geometry;
//! the benchmarks track that baseline.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use alcove::compose::compose;
use alcove::polytope::Polytope;
use alcove::qlr::{alcove_c2, generate_inequalities, identity_polytope};
use alcove::rat::rat;

fn interaction_point(num: i64, den: i64) -> Polytope {
    let quarter = rat(num, den * 4);
    Polytope::point(&[quarter.clone(), quarter.clone(), -quarter])
}

fn bench_generate(c: &mut Criterion) {
    c.bench_function("qlr_generate_inequalities", |b| {
        b.iter(|| {
            let rows = generate_inequalities().unwrap();
            black_box(rows.len());
        });
    });
}

fn bench_compose(c: &mut Criterion) {
    let mut group = c.benchmark_group("compose");
    group.sample_size(10);

    // Point-shaped next gate against two prefix shapes: a single point (the
    // first search step) and the full target alcove (the worst case).
    for &(name, num, den) in &[("full_xx", 1i64, 1i64), ("half_xx", 1, 2)] {
        let gate = interaction_point(num, den);
        group.bench_with_input(
            BenchmarkId::new("identity_prefix", name),
            &gate,
            |b, gate| {
                b.iter(|| {
                    let result = compose(identity_polytope(), gate).unwrap();
                    black_box(result.regions.len());
                });
            },
        );
        group.bench_with_input(
            BenchmarkId::new("alcove_prefix", name),
            &gate,
            |b, gate| {
                b.iter(|| {
                    let result = compose(alcove_c2(), gate).unwrap();
                    black_box(result.regions.len());
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_generate, bench_compose);
criterion_main!(benches);
