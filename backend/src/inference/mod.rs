pub mod classifier;
pub mod prediction;
pub mod preprocess;

use std::sync::Arc;

use crate::config::TensorLayout;
use classifier::{Classifier, InferenceError};
use prediction::Prediction;
use preprocess::PreprocessError;

#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    #[error(transparent)]
    Preprocess(#[from] PreprocessError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

/// Decode, preprocess, run the model once and shape its output.
#[derive(Clone)]
pub struct Predictor {
    classifier: Arc<dyn Classifier>,
    layout: TensorLayout,
    apply_softmax: bool,
}

impl Predictor {
    pub fn new(classifier: Arc<dyn Classifier>, layout: TensorLayout, apply_softmax: bool) -> Self {
        Self {
            classifier,
            layout,
            apply_softmax,
        }
    }

    pub fn predict(&self, image: &[u8]) -> Result<Prediction, PredictError> {
        let tensor = preprocess::preprocess(image, self.layout)?;
        let scores = self.classifier.classify(&tensor)?;
        Ok(Prediction::from_scores(&scores, self.apply_softmax)?)
    }
}
