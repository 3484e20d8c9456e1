//! Seismic input features: raw request values, the model-scale feature vector,
//! and the normalizer that maps one onto the other.

mod normalizer;

pub use normalizer::{
    inverse_normalize_significance, normalize, normalize_significance, ValidationError,
    ValidationReason,
};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of model input columns.
pub const FEATURE_COUNT: usize = 5;

/// Model input columns, in the order the model was trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Magnitude,
    Depth,
    Cdi,
    Mmi,
    #[serde(rename = "sig")]
    Significance,
}

impl Feature {
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::Magnitude,
        Feature::Depth,
        Feature::Cdi,
        Feature::Mmi,
        Feature::Significance,
    ];

    /// Wire / artifact column name.
    pub fn name(self) -> &'static str {
        match self {
            Feature::Magnitude => "magnitude",
            Feature::Depth => "depth",
            Feature::Cdi => "cdi",
            Feature::Mmi => "mmi",
            Feature::Significance => "sig",
        }
    }

    /// Accepted closed interval for the value as it arrives from a caller.
    pub fn raw_range(self) -> (f64, f64) {
        match self {
            Feature::Significance => (SIG_RAW_MIN, SIG_RAW_MAX),
            other => other.model_range(),
        }
    }

    /// Closed interval of the value as the model sees it.
    pub fn model_range(self) -> (f64, f64) {
        match self {
            Feature::Magnitude => (0.0, 10.0),
            Feature::Depth => (0.0, 700.0),
            Feature::Cdi => (0.0, 12.0),
            Feature::Mmi => (0.0, 12.0),
            Feature::Significance => (SIG_MODEL_MIN, SIG_MODEL_MAX),
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// USGS significance, natural unit.
pub const SIG_RAW_MIN: f64 = 0.0;
pub const SIG_RAW_MAX: f64 = 1000.0;
/// Significance encoding the model was trained on.
pub const SIG_MODEL_MIN: f64 = -128.0;
pub const SIG_MODEL_MAX: f64 = 127.0;

/// Request values before normalization. Field names on the wire follow the
/// public API: `magnitude`, `depth`, `cdi`, `mmi`, `sig`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawInput {
    pub magnitude: f64,
    #[serde(rename = "depth")]
    pub depth_km: f64,
    pub cdi: f64,
    pub mmi: f64,
    /// USGS significance, 0..=1000. Never pre-normalized by callers.
    #[serde(rename = "sig")]
    pub significance: f64,
}

impl RawInput {
    pub fn get(&self, feature: Feature) -> f64 {
        match feature {
            Feature::Magnitude => self.magnitude,
            Feature::Depth => self.depth_km,
            Feature::Cdi => self.cdi,
            Feature::Mmi => self.mmi,
            Feature::Significance => self.significance,
        }
    }
}

/// Model-scale feature vector. Only constructible through [`normalize`] or
/// [`FeatureVector::new`], so every instance is finite and in range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector {
    magnitude: f64,
    depth_km: f64,
    cdi: f64,
    mmi: f64,
    significance: f64,
}

impl FeatureVector {
    /// Build from model-scale values (significance already in [-128, 127]).
    pub fn new(
        magnitude: f64,
        depth_km: f64,
        cdi: f64,
        mmi: f64,
        significance: f64,
    ) -> Result<Self, ValidationError> {
        let fv = Self {
            magnitude,
            depth_km,
            cdi,
            mmi,
            significance,
        };
        fv.validate()?;
        Ok(fv)
    }

    pub(crate) fn new_unchecked(
        magnitude: f64,
        depth_km: f64,
        cdi: f64,
        mmi: f64,
        significance: f64,
    ) -> Self {
        Self {
            magnitude,
            depth_km,
            cdi,
            mmi,
            significance,
        }
    }

    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    pub fn depth_km(&self) -> f64 {
        self.depth_km
    }

    pub fn cdi(&self) -> f64 {
        self.cdi
    }

    pub fn mmi(&self) -> f64 {
        self.mmi
    }

    pub fn significance(&self) -> f64 {
        self.significance
    }

    pub fn get(&self, feature: Feature) -> f64 {
        match feature {
            Feature::Magnitude => self.magnitude,
            Feature::Depth => self.depth_km,
            Feature::Cdi => self.cdi,
            Feature::Mmi => self.mmi,
            Feature::Significance => self.significance,
        }
    }

    /// Columns in training order. The single place where names become positions.
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.magnitude,
            self.depth_km,
            self.cdi,
            self.mmi,
            self.significance,
        ]
    }

    /// Check every field against its model-scale range.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for feature in Feature::ALL {
            normalizer::check(feature, self.get(feature), feature.model_range())?;
        }
        Ok(())
    }
}
