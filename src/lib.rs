//! quake-risk: earthquake significance classifier.
//!
//! Modular structure:
//! - [`features`]: Raw inputs, range validation, significance rescaling
//! - [`model`]: Trained model artifact, scorer backends, load lifecycle
//! - [`risk`]: Probability clamping and low/medium/high bucketing
//! - [`service`]: `classify_risk`: normalize then classify
//! - [`config`]: JSON service configuration
//! - [`logging`]: Structured logging

pub mod config;
pub mod error;
pub mod features;
pub mod logging;
pub mod model;
pub mod risk;
pub mod service;

pub use config::ServiceConfig;
pub use error::{ErrorKind, RiskError};
pub use features::{normalize, FeatureVector, RawInput, ValidationError};
pub use logging::StructuredLogger;
pub use model::{ModelSlot, Scorer};
pub use risk::{ClassifierError, PredictionResult, RiskCategory, RiskClassifier, RiskThresholds};
pub use service::{Response, RiskService, StartupError};
