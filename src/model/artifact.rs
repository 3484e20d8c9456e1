//! Persisted model artifact: standard scaler + classifier, with the training
//! column order recorded alongside.

use super::{LogisticModel, ModelError, Scorer, TreeEnsemble};
use crate::features::{Feature, FeatureVector, FEATURE_COUNT};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Per-column standardization: `(x - mean) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scaler {
    pub mean: [f64; FEATURE_COUNT],
    pub scale: [f64; FEATURE_COUNT],
}

impl Scaler {
    pub fn validate(&self) -> Result<(), ModelError> {
        for (i, (m, s)) in self.mean.iter().zip(&self.scale).enumerate() {
            if !m.is_finite() || !s.is_finite() || *s == 0.0 {
                return Err(ModelError::Invalid(format!(
                    "scaler column {} has mean={m}, scale={s}",
                    Feature::ALL[i]
                )));
            }
        }
        Ok(())
    }

    pub fn transform(&self, x: &[f64; FEATURE_COUNT]) -> [f64; FEATURE_COUNT] {
        let mut out = [0.0; FEATURE_COUNT];
        for i in 0..FEATURE_COUNT {
            out[i] = (x[i] - self.mean[i]) / self.scale[i];
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    TreeEnsemble(TreeEnsemble),
    Logistic(LogisticModel),
}

impl ModelSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            ModelSpec::TreeEnsemble(_) => "tree_ensemble",
            ModelSpec::Logistic(_) => "logistic",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trained_at: Option<DateTime<Utc>>,
    pub feature_names: Vec<String>,
    pub scaler: Scaler,
    pub model: ModelSpec,
}

impl ModelArtifact {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ModelError::UnsupportedVersion {
                found: self.format_version,
                expected: ARTIFACT_FORMAT_VERSION,
            });
        }
        let expected: Vec<String> = Feature::ALL.iter().map(|f| f.name().to_string()).collect();
        if self.feature_names != expected {
            return Err(ModelError::FeatureOrder {
                expected,
                found: self.feature_names.clone(),
            });
        }
        self.scaler.validate()?;
        match &self.model {
            ModelSpec::TreeEnsemble(e) => e.validate(),
            ModelSpec::Logistic(l) => l.validate(),
        }
    }
}

/// A validated [`ModelArtifact`] ready to score.
#[derive(Debug, Clone)]
pub struct ArtifactScorer {
    artifact: ModelArtifact,
}

impl ArtifactScorer {
    pub fn new(artifact: ModelArtifact) -> Result<Self, ModelError> {
        artifact.validate()?;
        Ok(Self { artifact })
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, ModelError> {
        Self::new(serde_json::from_slice(bytes)?)
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    pub fn kind(&self) -> &'static str {
        self.artifact.model.kind()
    }

    pub fn trained_at(&self) -> Option<DateTime<Utc>> {
        self.artifact.trained_at
    }
}

impl Scorer for ArtifactScorer {
    fn score(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        let x = self.artifact.scaler.transform(&features.to_array());
        Ok(match &self.artifact.model {
            ModelSpec::TreeEnsemble(e) => e.probability(&x),
            ModelSpec::Logistic(l) => l.probability(&x),
        })
    }

    fn name(&self) -> &str {
        &self.artifact.name
    }
}
