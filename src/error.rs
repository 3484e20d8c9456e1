//! Errors surfaced by [`crate::RiskService::classify_risk`].

use crate::features::ValidationError;
use crate::risk::ClassifierError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum RiskError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
}

/// How a service layer should treat the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad caller input; do not retry.
    Validation,
    /// No model loaded.
    Unavailable,
    /// Contract violation inside the core.
    Internal,
}

impl RiskError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RiskError::Validation(_) => ErrorKind::Validation,
            RiskError::Classifier(ClassifierError::ModelUnavailable { .. }) => ErrorKind::Unavailable,
            RiskError::Classifier(
                ClassifierError::FeatureVectorInvalid(_) | ClassifierError::Inference { .. },
            ) => ErrorKind::Internal,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    /// `out_of_range`, `not_finite`, `model_unavailable`, `feature_vector_invalid`
    /// or `inference_failed`.
    pub fn reason(&self) -> &'static str {
        match self {
            RiskError::Validation(v) => v.reason.as_str(),
            RiskError::Classifier(c) => c.reason(),
        }
    }

    pub fn field(&self) -> Option<&'static str> {
        match self {
            RiskError::Validation(v) => Some(v.field.name()),
            RiskError::Classifier(_) => None,
        }
    }
}

/// Wire form of a failed request.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
    pub reason: &'static str,
    pub message: String,
}

impl ErrorBody {
    /// The request body did not deserialize into the expected fields.
    pub fn malformed(e: &serde_json::Error) -> Self {
        Self {
            kind: ErrorKind::Validation,
            field: None,
            reason: "malformed_request",
            message: e.to_string(),
        }
    }
}

impl From<&RiskError> for ErrorBody {
    fn from(e: &RiskError) -> Self {
        Self {
            kind: e.kind(),
            field: e.field(),
            reason: e.reason(),
            message: e.to_string(),
        }
    }
}
