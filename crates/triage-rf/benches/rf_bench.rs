//! Criterion benchmarks for triage-rf: forest training and batch prediction.

use criterion::{Criterion, criterion_group, criterion_main};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use triage_rf::RandomForestConfig;

fn make_dataset(n_samples: usize, seed: u64) -> (Vec<Vec<f64>>, Vec<usize>, Vec<String>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut features = Vec::with_capacity(n_samples);
    let mut labels = Vec::with_capacity(n_samples);
    for i in 0..n_samples {
        let class = i % 3;
        let row: Vec<f64> = (0..6)
            .map(|f| {
                let base = if f < 2 { class as f64 * 2.0 } else { 0.0 };
                base + rng.r#gen::<f64>()
            })
            .collect();
        features.push(row);
        labels.push(class);
    }
    let names = (0..6).map(|f| format!("f{f}")).collect();
    (features, labels, names)
}

fn bench_train(c: &mut Criterion) {
    let (features, labels, names) = make_dataset(800, 42);
    let cfg = RandomForestConfig::new(100).unwrap();

    c.bench_function("rf_train_800x6_100trees", |b| {
        b.iter(|| cfg.fit(&features, &labels, 3, &names).unwrap());
    });
}

fn bench_predict_batch(c: &mut Criterion) {
    let (features, labels, names) = make_dataset(800, 42);
    let forest = RandomForestConfig::new(100)
        .unwrap()
        .fit(&features, &labels, 3, &names)
        .unwrap()
        .into_forest();

    c.bench_function("rf_predict_batch_800x6_100trees", |b| {
        b.iter(|| forest.predict_batch(&features).unwrap());
    });
}

criterion_group!(benches, bench_train, bench_predict_batch);
criterion_main!(benches);
