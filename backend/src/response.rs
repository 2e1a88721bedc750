use shared::{PatientInfo, PredictionResponse};

use crate::inference::prediction::Prediction;

pub fn assemble(patient: PatientInfo, prediction: Prediction) -> PredictionResponse {
    PredictionResponse {
        prediction: prediction.label,
        accuracy: prediction.formatted_confidence(),
        all_predictions: prediction.breakdown,
        patient_info: patient,
    }
}
