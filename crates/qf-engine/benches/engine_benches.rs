//! Matcher and prediction benchmarks over synthetic rounds.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use qf_engine::{RoundConfig, RoundEngine, RoundInputs};
use qf_core::types::{Address, Contribution, Grant};

fn synthetic_round(grants: usize, donors_per_grant: usize) -> (Vec<Contribution>, Vec<Grant>) {
    let registry: Vec<Grant> = (0..grants as u64)
        .map(|id| Grant {
            id,
            payout_address: Address::new(format!("0xpay{id:04x}")),
        })
        .collect();
    let contributions: Vec<Contribution> = (0..grants as u64)
        .flat_map(|id| {
            (0..donors_per_grant).map(move |d| Contribution {
                grant_id: id,
                contributor: Address::new(format!("0xdonor{d:05x}")),
                amount: 1.0 + (d % 7) as f64,
            })
        })
        .collect();
    (contributions, registry)
}

fn bench_compute_matches(c: &mut Criterion) {
    let engine = RoundEngine::linear();
    let config = RoundConfig::new(100_000.0, 18);

    let mut group = c.benchmark_group("compute_matches");
    for (grants, donors) in [(10usize, 50usize), (100, 50), (100, 500)] {
        let (contributions, registry) = synthetic_round(grants, donors);
        let label = format!("{grants}g_{donors}d");
        group.bench_with_input(
            BenchmarkId::from_parameter(label),
            &(contributions, registry),
            |b, (contributions, registry)| {
                let inputs = RoundInputs::new(contributions, registry);
                b.iter(|| engine.compute_matches(&inputs, &config).unwrap());
            },
        );
    }
    group.finish();
}

fn bench_prediction_curve(c: &mut Criterion) {
    let engine = RoundEngine::linear();
    let config = RoundConfig::new(100_000.0, 18);
    let (contributions, registry) = synthetic_round(50, 100);
    let inputs = RoundInputs::new(&contributions, &registry);

    c.bench_function("prediction_curve_50g_100d", |b| {
        b.iter(|| engine.prediction_curve(&inputs, &config, 25).unwrap());
    });
}

criterion_group!(benches, bench_compute_matches, bench_prediction_curve);
criterion_main!(benches);
