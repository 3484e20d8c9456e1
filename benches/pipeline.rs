//! Pipeline benchmark: raw input → normalize → classify.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use quake_risk::features::{normalize, RawInput};
use quake_risk::model::ModelSlot;
use quake_risk::{RiskService, ServiceConfig};
use std::path::Path;

fn sample() -> RawInput {
    RawInput {
        magnitude: 7.0,
        depth_km: 50.0,
        cdi: 8.0,
        mmi: 9.0,
        significance: 700.0,
    }
}

fn bench_normalize(c: &mut Criterion) {
    let raw = sample();
    c.bench_function("normalize", |b| b.iter(|| normalize(black_box(&raw))));
}

fn bench_classify_risk(c: &mut Criterion) {
    let config = ServiceConfig {
        model_path: Path::new(env!("CARGO_MANIFEST_DIR")).join("models/earthquake_model.json"),
        ..ServiceConfig::default()
    };
    let service = RiskService::start(&config, &ModelSlot::new()).unwrap();
    let raw = sample();

    c.bench_function("classify_risk", |b| {
        b.iter(|| service.classify_risk(black_box(&raw)))
    });
}

criterion_group!(benches, bench_normalize, bench_classify_risk);
criterion_main!(benches);
