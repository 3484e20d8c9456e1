//! Service configuration: model artifact location, risk thresholds, logging.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default lower bound of the medium band.
pub const DEFAULT_MEDIUM_THRESHOLD: f64 = 0.4;
/// Default lower bound of the high band.
pub const DEFAULT_HIGH_THRESHOLD: f64 = 0.7;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid risk thresholds: medium={medium}, high={high} (need 0 <= medium <= high <= 1)")]
    Thresholds { medium: f64, high: f64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Path to the trained model artifact (JSON, or ONNX with the `onnx` feature)
    pub model_path: PathBuf,
    /// Expected SHA-256 of the artifact, lowercase hex; skipped when absent
    pub model_sha256: Option<String>,
    /// Risk bucketing thresholds
    pub risk: RiskConfig,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Probability at or above this is medium risk
    pub medium_threshold: f64,
    /// Probability at or above this is high risk
    pub high_threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/earthquake_model.json"),
            model_sha256: None,
            risk: RiskConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            medium_threshold: DEFAULT_MEDIUM_THRESHOLD,
            high_threshold: DEFAULT_HIGH_THRESHOLD,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: true,
        }
    }
}

impl RiskConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (m, h) = (self.medium_threshold, self.high_threshold);
        let ok = m.is_finite() && h.is_finite() && 0.0 <= m && m <= h && h <= 1.0;
        if ok {
            Ok(())
        } else {
            Err(ConfigError::Thresholds { medium: m, high: h })
        }
    }
}

impl ServiceConfig {
    /// Load from a JSON file. A missing file yields the defaults; an unreadable
    /// or malformed one is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config not found; using defaults");
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&data).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    pub fn from_json(data: &str) -> Result<Self, ConfigError> {
        let config: ServiceConfig =
            serde_json::from_str(data).map_err(|source| ConfigError::Parse {
                path: PathBuf::new(),
                source,
            })?;
        config.risk.validate()?;
        Ok(config)
    }
}
