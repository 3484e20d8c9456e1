//! The composed core: normalize, then classify.

use crate::config::{ConfigError, ServiceConfig};
use crate::error::{ErrorBody, RiskError};
use crate::features::{self, RawInput};
use crate::model::{ModelSlot, ModelStatus, Scorer};
use crate::risk::{ClassifierError, PredictionResult, RiskClassifier, RiskThresholds};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Reasons the service refuses to start.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Model(#[from] ClassifierError),
}

/// One response line: a prediction, or `{"error": {...}}`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Response {
    Prediction(PredictionResult),
    Error { error: ErrorBody },
}

#[derive(Clone)]
pub struct RiskService {
    classifier: RiskClassifier,
}

impl RiskService {
    pub fn new(classifier: RiskClassifier) -> Self {
        Self { classifier }
    }

    /// Load the configured model into `slot` and build the service. Fails with
    /// `ModelUnavailable` when the artifact cannot be loaded, so the process
    /// refuses to start instead of failing requests one at a time.
    pub fn start(config: &ServiceConfig, slot: &ModelSlot) -> Result<Self, StartupError> {
        let thresholds = RiskThresholds::try_from(&config.risk)?;
        if slot.status() != ModelStatus::Unloaded {
            tracing::warn!(
                model_path = %config.model_path.display(),
                status = ?slot.status(),
                "model slot already loaded; configured model_path ignored"
            );
        }
        let scorer = slot
            .load(&config.model_path, config.model_sha256.as_deref())
            .map_err(|e| ClassifierError::ModelUnavailable {
                reason: e.to_string(),
            })?;
        let classifier = RiskClassifier::new(scorer, thresholds);
        tracing::info!(
            model = classifier.model_name(),
            medium_threshold = thresholds.medium(),
            high_threshold = thresholds.high(),
            "risk service ready"
        );
        Ok(Self::new(classifier))
    }

    pub fn with_scorer(scorer: Arc<dyn Scorer>, thresholds: RiskThresholds) -> Self {
        Self::new(RiskClassifier::new(scorer, thresholds))
    }

    pub fn classifier(&self) -> &RiskClassifier {
        &self.classifier
    }

    /// Validation runs first; the model is never invoked for rejected input.
    pub fn classify_risk(&self, raw: &RawInput) -> Result<PredictionResult, RiskError> {
        let features = features::normalize(raw).inspect_err(|e| {
            tracing::debug!(field = %e.field, reason = e.reason.as_str(), "input rejected");
        })?;
        Ok(self.classifier.classify(&features)?)
    }

    /// Handle one JSON request line (`{magnitude, depth, cdi, mmi, sig}`).
    pub fn respond(&self, line: &str) -> Response {
        let raw: RawInput = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "malformed request");
                return Response::Error {
                    error: ErrorBody::malformed(&e),
                };
            }
        };
        match self.classify_risk(&raw) {
            Ok(result) => Response::Prediction(result),
            Err(e) => {
                if !e.is_client_error() {
                    tracing::error!(error = %e, "classification failed");
                }
                Response::Error {
                    error: ErrorBody::from(&e),
                }
            }
        }
    }
}
