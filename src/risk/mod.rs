//! Probability → risk category, and the classifier that produces both.

mod engine;

pub use engine::{ClassifierError, PredictionResult, RiskCategory, RiskClassifier, RiskThresholds};
