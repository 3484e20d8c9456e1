//! Model artifact loading: integrity digest, column order, format checks,
//! and the logistic form.

use quake_risk::{
    features::normalize,
    model::{load_scorer, sha256_hex, sigmoid, ArtifactScorer, ModelError},
    RawInput,
};
use serde_json::json;
use std::path::{Path, PathBuf};

fn shipped_model() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("models/earthquake_model.json")
}

fn logistic_artifact() -> serde_json::Value {
    json!({
        "format_version": 1,
        "name": "logit-test",
        "feature_names": ["magnitude", "depth", "cdi", "mmi", "sig"],
        "scaler": { "mean": [0.0, 0.0, 0.0, 0.0, 0.0], "scale": [1.0, 1.0, 1.0, 1.0, 1.0] },
        "model": {
            "kind": "logistic",
            "coefficients": [0.5, 0.0, 0.0, 0.0, 0.01],
            "intercept": -3.0
        }
    })
}

fn write_artifact(dir: &Path, value: &serde_json::Value) -> PathBuf {
    let path = dir.join("model.json");
    std::fs::write(&path, serde_json::to_vec_pretty(value).unwrap()).unwrap();
    path
}

#[test]
fn digest_verified_when_configured() {
    let path = shipped_model();
    let digest = sha256_hex(&std::fs::read(&path).unwrap());
    assert!(load_scorer(&path, Some(&digest)).is_ok());
    assert!(load_scorer(&path, Some(&digest.to_uppercase())).is_ok());

    let wrong = "0".repeat(64);
    match load_scorer(&path, Some(&wrong)) {
        Err(ModelError::DigestMismatch { expected, actual }) => {
            assert_eq!(expected, wrong);
            assert_eq!(actual, digest);
        }
        Err(e) => panic!("expected digest mismatch, got {e}"),
        Ok(_) => panic!("expected digest mismatch"),
    }
}

#[test]
fn logistic_artifact_scores() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_artifact(dir.path(), &logistic_artifact());
    let scorer = load_scorer(&path, None).unwrap();
    assert_eq!(scorer.name(), "logit-test");

    let fv = normalize(&RawInput {
        magnitude: 6.0,
        depth_km: 10.0,
        cdi: 3.0,
        mmi: 4.0,
        significance: 500.0,
    })
    .unwrap();
    // -3 + 0.5 * 6 + 0.01 * -0.5
    let expected = sigmoid(-0.005);
    assert!((scorer.score(&fv).unwrap() - expected).abs() < 1e-12);
}

#[test]
fn column_order_must_match() {
    let mut artifact = logistic_artifact();
    artifact["feature_names"] = json!(["depth", "magnitude", "cdi", "mmi", "sig"]);
    let err = ArtifactScorer::from_slice(&serde_json::to_vec(&artifact).unwrap()).unwrap_err();
    assert!(matches!(err, ModelError::FeatureOrder { .. }), "{err}");
}

#[test]
fn unsupported_version_rejected() {
    let mut artifact = logistic_artifact();
    artifact["format_version"] = json!(2);
    let err = ArtifactScorer::from_slice(&serde_json::to_vec(&artifact).unwrap()).unwrap_err();
    assert!(matches!(err, ModelError::UnsupportedVersion { found: 2, expected: 1 }));
}

#[test]
fn zero_scale_rejected() {
    let mut artifact = logistic_artifact();
    artifact["scaler"]["scale"][2] = json!(0.0);
    let err = ArtifactScorer::from_slice(&serde_json::to_vec(&artifact).unwrap()).unwrap_err();
    assert!(matches!(err, ModelError::Invalid(_)));
    assert!(err.to_string().contains("cdi"));
}

#[test]
fn wrong_coefficient_count_rejected() {
    let mut artifact = logistic_artifact();
    artifact["model"]["coefficients"] = json!([0.5, 0.0, 0.0, 0.0]);
    let err = ArtifactScorer::from_slice(&serde_json::to_vec(&artifact).unwrap()).unwrap_err();
    assert!(matches!(err, ModelError::Parse(_)));
}

#[test]
fn cyclic_tree_rejected() {
    let mut artifact = logistic_artifact();
    artifact["model"] = json!({
        "kind": "tree_ensemble",
        "base_score": 0.0,
        "trees": [{ "nodes": [
            { "split": { "feature": 0, "threshold": 1.0, "left": 1, "right": 2 } },
            { "split": { "feature": 1, "threshold": 1.0, "left": 0, "right": 2 } },
            { "leaf": 0.1 }
        ]}]
    });
    let err = ArtifactScorer::from_slice(&serde_json::to_vec(&artifact).unwrap()).unwrap_err();
    assert!(matches!(err, ModelError::Invalid(_)), "{err}");
}

#[test]
fn missing_artifact_is_not_found() {
    let err = load_scorer(Path::new("does/not/exist.json"), None).err().unwrap();
    assert!(matches!(err, ModelError::NotFound(_)));
}

#[cfg(not(feature = "onnx"))]
#[test]
fn onnx_needs_feature() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.onnx");
    std::fs::write(&path, b"not really onnx").unwrap();
    let err = load_scorer(&path, None).err().unwrap();
    assert!(matches!(err, ModelError::UnsupportedFormat(_)));
}

#[test]
fn shipped_artifact_metadata() {
    let scorer = ArtifactScorer::from_slice(&std::fs::read(shipped_model()).unwrap()).unwrap();
    assert_eq!(scorer.kind(), "tree_ensemble");
    assert!(scorer.trained_at().is_some());
    assert_eq!(
        scorer.artifact().feature_names,
        ["magnitude", "depth", "cdi", "mmi", "sig"]
    );
}
