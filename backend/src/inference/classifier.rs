use ndarray::Array4;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::ServiceConfig;

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("Model error: {0}")]
    Model(String),
    #[error("Unexpected model output: {0}")]
    UnexpectedOutput(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ModelLoadError {
    #[error("Model artifact not found at {0}")]
    NotFound(PathBuf),
    #[error("Failed to load model from {path}: {reason}")]
    Load { path: PathBuf, reason: String },
    #[error("No model runtime compiled in, rebuild with the `torch` feature")]
    RuntimeUnavailable,
}

/// The pre-trained model: one forward pass per call, one score per label.
///
/// Implementations are shared between in-flight requests.
pub trait Classifier: Send + Sync {
    fn classify(&self, input: &Array4<f32>) -> Result<Vec<f32>, InferenceError>;
}

#[cfg(feature = "torch")]
pub use torch::TorchClassifier;

#[cfg(feature = "torch")]
mod torch {
    use super::{Classifier, InferenceError, ModelLoadError};
    use crate::config::DeviceKind;
    use ndarray::Array4;
    use std::path::Path;
    use tch::{CModule, Device, Kind, Tensor};

    pub struct TorchClassifier {
        model: CModule,
        device: Device,
    }

    impl TorchClassifier {
        pub fn load(model_path: &Path, device: DeviceKind) -> Result<Self, ModelLoadError> {
            if !model_path.exists() {
                return Err(ModelLoadError::NotFound(model_path.to_path_buf()));
            }
            let device = match device {
                DeviceKind::Cpu => Device::Cpu,
                DeviceKind::Cuda => Device::cuda_if_available(),
            };
            let mut model =
                CModule::load_on_device(model_path, device).map_err(|e| ModelLoadError::Load {
                    path: model_path.to_path_buf(),
                    reason: e.to_string(),
                })?;
            model.set_eval();
            log::info!("Loaded TorchScript model on {:?}", device);
            Ok(Self { model, device })
        }
    }

    impl Classifier for TorchClassifier {
        fn classify(&self, input: &Array4<f32>) -> Result<Vec<f32>, InferenceError> {
            let shape: Vec<i64> = input.shape().iter().map(|&d| d as i64).collect();
            let contiguous = input.as_standard_layout();
            let data = contiguous
                .as_slice()
                .ok_or_else(|| InferenceError::Model("input tensor is not contiguous".into()))?;
            let tensor = Tensor::from_slice(data)
                .view(shape.as_slice())
                .to_device(self.device);

            let output = tch::no_grad(|| self.model.forward_ts(&[tensor]))
                .map_err(|e| InferenceError::Model(e.to_string()))?;

            let output_flat = output
                .to_kind(Kind::Float)
                .to_device(Device::Cpu)
                .view([-1]);
            Vec::<f32>::try_from(&output_flat).map_err(|e| InferenceError::Model(e.to_string()))
        }
    }
}

/// Loads the configured model artifact once, at startup.
#[cfg(feature = "torch")]
pub fn load_classifier(config: &ServiceConfig) -> Result<Arc<dyn Classifier>, ModelLoadError> {
    let classifier = TorchClassifier::load(&config.model_path, config.device)?;
    Ok(Arc::new(classifier))
}

#[cfg(not(feature = "torch"))]
pub fn load_classifier(config: &ServiceConfig) -> Result<Arc<dyn Classifier>, ModelLoadError> {
    if !config.model_path.exists() {
        return Err(ModelLoadError::NotFound(config.model_path.clone()));
    }
    Err(ModelLoadError::RuntimeUnavailable)
}
