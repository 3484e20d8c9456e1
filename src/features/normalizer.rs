//! Raw input → model-scale feature vector: range validation and the
//! significance rescale.

use super::{
    Feature, FeatureVector, RawInput, SIG_MODEL_MAX, SIG_MODEL_MIN, SIG_RAW_MAX, SIG_RAW_MIN,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationReason {
    OutOfRange,
    NotFinite,
}

impl ValidationReason {
    pub fn as_str(self) -> &'static str {
        match self {
            ValidationReason::OutOfRange => "out_of_range",
            ValidationReason::NotFinite => "not_finite",
        }
    }
}

/// A caller-supplied value was unusable. Names the field and its valid range.
#[derive(Debug, Clone, Copy, PartialEq, Error, Serialize)]
#[error("{field} must be a finite number within [{min}, {max}], got {value}")]
pub struct ValidationError {
    pub field: Feature,
    pub reason: ValidationReason,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

pub(super) fn check(feature: Feature, value: f64, (min, max): (f64, f64)) -> Result<(), ValidationError> {
    let reason = if !value.is_finite() {
        ValidationReason::NotFinite
    } else if value < min || value > max {
        ValidationReason::OutOfRange
    } else {
        return Ok(());
    };
    Err(ValidationError {
        field: feature,
        reason,
        value,
        min,
        max,
    })
}

/// Affine map of significance from [0, 1000] onto [-128, 127].
pub fn normalize_significance(raw: f64) -> f64 {
    (raw - SIG_RAW_MIN) / (SIG_RAW_MAX - SIG_RAW_MIN) * (SIG_MODEL_MAX - SIG_MODEL_MIN)
        + SIG_MODEL_MIN
}

/// Inverse of [`normalize_significance`].
pub fn inverse_normalize_significance(normalized: f64) -> f64 {
    (normalized - SIG_MODEL_MIN) / (SIG_MODEL_MAX - SIG_MODEL_MIN) * (SIG_RAW_MAX - SIG_RAW_MIN)
        + SIG_RAW_MIN
}

/// Validate every raw field (first failure in column order wins), then rescale
/// significance. The other four fields pass through untouched.
pub fn normalize(raw: &RawInput) -> Result<FeatureVector, ValidationError> {
    for feature in Feature::ALL {
        check(feature, raw.get(feature), feature.raw_range())?;
    }
    Ok(FeatureVector::new_unchecked(
        raw.magnitude,
        raw.depth_km,
        raw.cdi,
        raw.mmi,
        normalize_significance(raw.significance),
    ))
}
