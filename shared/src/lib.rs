use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

pub use strum::{EnumCount, IntoEnumIterator};

/// Tumor classes in the order the model emits its scores.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumCount,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Label {
    Glioma,
    Meningioma,
    Notumor,
    Pituitary,
}

impl Label {
    pub fn from_index(index: usize) -> Option<Self> {
        Self::iter().nth(index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientInfo {
    pub name: String,
    pub age: u8,
    pub sex: Sex,
}

/// Body of a successful `POST /predict/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    #[serde(rename = "Prediction")]
    pub prediction: Label,
    #[serde(rename = "Accuracy")]
    pub accuracy: String,
    #[serde(rename = "All predictions")]
    pub all_predictions: BTreeMap<Label, f64>,
    #[serde(rename = "Patient info.")]
    pub patient_info: PatientInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub message: String,
    pub model_path_exists: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}
