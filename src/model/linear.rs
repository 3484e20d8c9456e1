//! Logistic regression over standardized features.

use super::{sigmoid, ModelError};
use crate::features::FEATURE_COUNT;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub coefficients: [f64; FEATURE_COUNT],
    pub intercept: f64,
}

impl LogisticModel {
    pub fn validate(&self) -> Result<(), ModelError> {
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ModelError::Invalid("non-finite logistic parameter".into()));
        }
        Ok(())
    }

    pub fn margin(&self, x: &[f64; FEATURE_COUNT]) -> f64 {
        self.coefficients
            .iter()
            .zip(x)
            .fold(self.intercept, |acc, (c, v)| acc + c * v)
    }

    pub fn probability(&self, x: &[f64; FEATURE_COUNT]) -> f64 {
        sigmoid(self.margin(x))
    }
}
