//! Trained significance model: artifact loading, the scorer seam, and the
//! one-shot load lifecycle.

mod artifact;
mod linear;
#[cfg(feature = "onnx")]
mod onnx;
mod tree;

pub use artifact::{ArtifactScorer, ModelArtifact, ModelSpec, Scaler, ARTIFACT_FORMAT_VERSION};
pub use linear::LogisticModel;
#[cfg(feature = "onnx")]
pub use onnx::OnnxScorer;
pub use tree::{Node, Split, Tree, TreeEnsemble};

use crate::features::FeatureVector;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use thiserror::Error;

/// Deterministic, reentrant probability model over the five ordered features.
///
/// Implementations must not keep per-call mutable state; one instance is
/// shared by every concurrent caller.
pub trait Scorer: Send + Sync {
    /// Probability that the event is significant. Callers clamp into [0, 1];
    /// an `Err` means the backend could not produce a score at all.
    fn score(&self, features: &FeatureVector) -> Result<f64, ModelError>;

    fn name(&self) -> &str;
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model artifact not found at {0}")]
    NotFound(PathBuf),
    #[error("failed to read model artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed model artifact: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unsupported artifact format_version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("artifact feature order {found:?} does not match {expected:?}")]
    FeatureOrder {
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error("invalid model artifact: {0}")]
    Invalid(String),
    #[error("artifact digest mismatch: expected {expected}, got {actual}")]
    DigestMismatch { expected: String, actual: String },
    #[error("unsupported model format: {0}")]
    UnsupportedFormat(String),
    #[error("inference failed: {0}")]
    Inference(String),
    #[cfg(feature = "onnx")]
    #[error("onnx runtime: {0}")]
    Onnx(#[from] ort::OrtError),
}

pub fn sigmoid(margin: f64) -> f64 {
    1.0 / (1.0 + (-margin).exp())
}

/// Lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Read, verify and parse a model artifact. `.onnx` files need the `onnx`
/// feature; everything else is treated as a JSON artifact.
pub fn load_scorer(path: &Path, expected_sha256: Option<&str>) -> Result<Arc<dyn Scorer>, ModelError> {
    if !path.exists() {
        return Err(ModelError::NotFound(path.to_path_buf()));
    }
    let bytes = std::fs::read(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let digest = sha256_hex(&bytes);
    if let Some(expected) = expected_sha256 {
        if !expected.trim().eq_ignore_ascii_case(&digest) {
            return Err(ModelError::DigestMismatch {
                expected: expected.trim().to_ascii_lowercase(),
                actual: digest,
            });
        }
    }

    let is_onnx = path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("onnx"))
        .unwrap_or(false);
    if is_onnx {
        #[cfg(feature = "onnx")]
        {
            let scorer = OnnxScorer::load(path)?;
            tracing::info!(path = %path.display(), sha256 = %digest, "onnx model loaded");
            return Ok(Arc::new(scorer));
        }
        #[cfg(not(feature = "onnx"))]
        return Err(ModelError::UnsupportedFormat(
            "onnx artifacts require the `onnx` feature".to_string(),
        ));
    }

    let scorer = ArtifactScorer::from_slice(&bytes)?;
    tracing::info!(
        path = %path.display(),
        sha256 = %digest,
        name = scorer.name(),
        kind = scorer.kind(),
        trained_at = ?scorer.trained_at(),
        "model loaded"
    );
    Ok(Arc::new(scorer))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelStatus {
    Unloaded,
    Loading,
    Ready,
    Failed,
}

/// Holds the process-wide model. Loads at most once; `Ready` and `Failed`
/// are terminal.
#[derive(Default)]
pub struct ModelSlot {
    loading: AtomicBool,
    state: OnceLock<Result<Arc<dyn Scorer>, Arc<ModelError>>>,
}

impl ModelSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the artifact on first call; later calls return the first outcome.
    pub fn load(
        &self,
        path: &Path,
        expected_sha256: Option<&str>,
    ) -> Result<Arc<dyn Scorer>, Arc<ModelError>> {
        self.state
            .get_or_init(|| {
                self.loading.store(true, Ordering::Release);
                load_scorer(path, expected_sha256).map_err(|e| {
                    tracing::error!(path = %path.display(), error = %e, "model load failed");
                    Arc::new(e)
                })
            })
            .clone()
    }

    pub fn status(&self) -> ModelStatus {
        match self.state.get() {
            Some(Ok(_)) => ModelStatus::Ready,
            Some(Err(_)) => ModelStatus::Failed,
            None if self.loading.load(Ordering::Acquire) => ModelStatus::Loading,
            None => ModelStatus::Unloaded,
        }
    }

    pub fn scorer(&self) -> Option<Arc<dyn Scorer>> {
        match self.state.get() {
            Some(Ok(s)) => Some(Arc::clone(s)),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<Arc<ModelError>> {
        match self.state.get() {
            Some(Err(e)) => Some(Arc::clone(e)),
            _ => None,
        }
    }
}
