//! Benchmarks for running complete matches.
//!
//! This benchmarks the full tick loop - gather, gate, execute, shell
//! advancement, arbitration - which is the hot path of a tournament sweep.

#![allow(missing_docs)]

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use skirmish::find_algorithm;
use skirmish::tournament::{parse_map, run_match, EngineManager};

const ARENA: &str = "bench arena\nMaxSteps=500\nNumShells=10\nRows=12\nCols=16\n1               \n                \n   ##      ##   \n                \n       @@       \n     #    #     \n     #    #     \n       @@       \n                \n   ##      ##   \n                \n               2\n";

fn bench_single_match(c: &mut Criterion) {
    let (map, _) = parse_map(ARENA).expect("valid bench map");
    let hybrid = find_algorithm("hybrid").expect("registered");
    let sniper = find_algorithm("sniper").expect("registered");

    c.bench_function("single_match_hybrid_vs_sniper", |b| {
        b.iter(|| {
            let result = run_match(black_box(&map), &EngineManager, hybrid, sniper);
            black_box(result)
        });
    });

    c.bench_function("single_match_hybrid_mirror", |b| {
        b.iter(|| {
            let result = run_match(black_box(&map), &EngineManager, hybrid, hybrid);
            black_box(result)
        });
    });
}

criterion_group!(benches, bench_single_match);
criterion_main!(benches);
