//! Inference benchmark: feature vector → shipped tree ensemble probability.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use quake_risk::features::FeatureVector;
use quake_risk::model::load_scorer;
use std::path::Path;

fn bench_shipped_model(c: &mut Criterion) {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("models/earthquake_model.json");
    let scorer = load_scorer(&path, None).unwrap();
    let fv = FeatureVector::new(7.0, 50.0, 8.0, 9.0, 50.5).unwrap();

    c.bench_function("score_shipped_model", |b| {
        b.iter(|| scorer.score(black_box(&fv)))
    });
}

fn bench_model_load(c: &mut Criterion) {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("models/earthquake_model.json");

    c.bench_function("load_shipped_model", |b| {
        b.iter(|| load_scorer(black_box(&path), None).unwrap())
    });
}

criterion_group!(benches, bench_shipped_model, bench_model_load);
criterion_main!(benches);
