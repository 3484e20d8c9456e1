//! Combines the model probability with configurable thresholds; produces a risk category.

use crate::config::{ConfigError, RiskConfig, DEFAULT_HIGH_THRESHOLD, DEFAULT_MEDIUM_THRESHOLD};
use crate::features::{FeatureVector, ValidationError};
use crate::model::Scorer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Ordered: `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    Low,
    Medium,
    High,
}

impl RiskCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskCategory::Low => "low",
            RiskCategory::Medium => "medium",
            RiskCategory::High => "high",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Band boundaries over [0, 1]: `[0, medium)` low, `[medium, high)` medium,
/// `[high, 1]` high.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskThresholds {
    medium: f64,
    high: f64,
}

impl RiskThresholds {
    pub const DEFAULT: RiskThresholds = RiskThresholds {
        medium: DEFAULT_MEDIUM_THRESHOLD,
        high: DEFAULT_HIGH_THRESHOLD,
    };

    pub fn new(medium: f64, high: f64) -> Result<Self, ConfigError> {
        let config = RiskConfig {
            medium_threshold: medium,
            high_threshold: high,
        };
        config.validate()?;
        Ok(Self { medium, high })
    }

    pub fn medium(&self) -> f64 {
        self.medium
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn category(&self, probability: f64) -> RiskCategory {
        if probability >= self.high {
            RiskCategory::High
        } else if probability >= self.medium {
            RiskCategory::Medium
        } else {
            RiskCategory::Low
        }
    }
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<&RiskConfig> for RiskThresholds {
    type Error = ConfigError;

    fn try_from(config: &RiskConfig) -> Result<Self, Self::Error> {
        Self::new(config.medium_threshold, config.high_threshold)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub probability: f64,
    pub risk_category: RiskCategory,
}

#[derive(Debug, Clone, Error)]
pub enum ClassifierError {
    /// The trained artifact did not load; the process should not serve.
    #[error("model unavailable: {reason}")]
    ModelUnavailable { reason: String },
    /// Normalizer/classifier contract violation.
    #[error("feature vector invalid: {0}")]
    FeatureVectorInvalid(ValidationError),
    /// The scorer could not produce a probability (runtime failure or NaN).
    #[error("inference failed: {reason}")]
    Inference { reason: String },
}

impl ClassifierError {
    pub fn reason(&self) -> &'static str {
        match self {
            ClassifierError::ModelUnavailable { .. } => "model_unavailable",
            ClassifierError::FeatureVectorInvalid(_) => "feature_vector_invalid",
            ClassifierError::Inference { .. } => "inference_failed",
        }
    }
}

/// Scores a feature vector and buckets the probability. Holds only shared,
/// read-only state; clone freely across threads.
#[derive(Clone)]
pub struct RiskClassifier {
    scorer: Arc<dyn Scorer>,
    thresholds: RiskThresholds,
}

impl RiskClassifier {
    pub fn new(scorer: Arc<dyn Scorer>, thresholds: RiskThresholds) -> Self {
        Self { scorer, thresholds }
    }

    pub fn thresholds(&self) -> &RiskThresholds {
        &self.thresholds
    }

    pub fn model_name(&self) -> &str {
        self.scorer.name()
    }

    pub fn classify(&self, features: &FeatureVector) -> Result<PredictionResult, ClassifierError> {
        features
            .validate()
            .map_err(ClassifierError::FeatureVectorInvalid)?;

        let raw = self.scorer.score(features).map_err(|e| {
            tracing::error!(model = self.scorer.name(), error = %e, "scoring failed");
            ClassifierError::Inference {
                reason: e.to_string(),
            }
        })?;
        if raw.is_nan() {
            tracing::error!(model = self.scorer.name(), "model returned NaN");
            return Err(ClassifierError::Inference {
                reason: "model returned NaN".to_string(),
            });
        }
        let probability = clamp_probability(raw);
        if probability.to_bits() != raw.to_bits() {
            tracing::warn!(
                raw_score = raw,
                clamped = probability,
                model = self.scorer.name(),
                "model score outside [0, 1]; clamped"
            );
        }

        Ok(PredictionResult {
            probability,
            risk_category: self.thresholds.category(probability),
        })
    }
}

/// Callers reject NaN first.
fn clamp_probability(raw: f64) -> f64 {
    raw.clamp(0.0, 1.0)
}
