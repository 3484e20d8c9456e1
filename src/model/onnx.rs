//! ONNX Runtime scoring backend. Input: `[1, 5]` f32 in training column order
//! (the exported graph carries its own scaler). The probability output is the
//! f32 tensor named like `probabilities`, else the first f32 output; its last
//! element is the positive-class probability. Classifier exports put an int64
//! label first, so output 0 is not assumed. Export with zipmap disabled.

use super::{ModelError, Scorer};
use crate::features::{FeatureVector, FEATURE_COUNT};
use ndarray::{Array2, CowArray};
use ort::{
    tensor::TensorElementDataType, Environment, GraphOptimizationLevel, Session, SessionBuilder,
    Value,
};
use std::path::Path;
use std::sync::{Arc, OnceLock};

static ORT_ENV: OnceLock<Arc<Environment>> = OnceLock::new();

fn init_env() -> Result<Arc<Environment>, ModelError> {
    if let Some(env) = ORT_ENV.get() {
        return Ok(Arc::clone(env));
    }
    let env = Environment::builder()
        .with_name("quake-risk")
        .build()?
        .into_arc();
    Ok(Arc::clone(ORT_ENV.get_or_init(|| env)))
}

pub struct OnnxScorer {
    session: Session,
    prob_output: usize,
    name: String,
}

fn probability_output(session: &Session) -> Option<usize> {
    let floats = || {
        session
            .outputs
            .iter()
            .enumerate()
            .filter(|(_, o)| o.output_type == TensorElementDataType::Float32)
    };
    floats()
        .find(|(_, o)| o.name.to_ascii_lowercase().contains("prob"))
        .or_else(|| floats().next())
        .map(|(i, _)| i)
}

impl OnnxScorer {
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let env = init_env()?;
        let session = SessionBuilder::new(&env)?
            .with_optimization_level(GraphOptimizationLevel::Level1)?
            .with_model_from_file(path)?;
        if session.inputs.is_empty() {
            return Err(ModelError::Invalid("onnx graph has no input".into()));
        }
        let prob_output = probability_output(&session)
            .ok_or_else(|| ModelError::Invalid("onnx graph has no f32 output".into()))?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "onnx".to_string());
        tracing::debug!(
            output = %session.outputs[prob_output].name,
            "onnx probability output selected"
        );
        Ok(Self {
            session,
            prob_output,
            name,
        })
    }

    fn run_inference(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        let values: Vec<f32> = features.to_array().iter().map(|v| *v as f32).collect();
        let arr = Array2::from_shape_vec((1, FEATURE_COUNT), values)
            .map_err(|e| ModelError::Invalid(e.to_string()))?;
        let input = CowArray::from(arr.into_dyn());
        let outputs = self
            .session
            .run(vec![Value::from_array(self.session.allocator(), &input)?])?;
        let out = outputs.get(self.prob_output).ok_or_else(|| {
            ModelError::Inference(format!("onnx graph produced no output {}", self.prob_output))
        })?;
        let tensor = out.try_extract::<f32>()?;
        let view = tensor.view();
        let p = view
            .iter()
            .last()
            .copied()
            .ok_or_else(|| ModelError::Inference("empty onnx output tensor".into()))?;
        Ok(f64::from(p))
    }
}

impl Scorer for OnnxScorer {
    fn score(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        self.run_inference(features)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
