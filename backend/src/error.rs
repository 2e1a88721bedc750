use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use shared::ErrorResponse;

use crate::inference::PredictError;
use crate::inference::classifier::InferenceError;
use crate::inference::preprocess::PreprocessError;
use crate::validation::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("Malformed multipart request: {0}")]
    Multipart(String),
    #[error("Upload exceeds the {0} byte limit")]
    PayloadTooLarge(usize),
    #[error("{0}")]
    Decode(#[from] PreprocessError),
    #[error("Prediction failed: {0}")]
    Inference(#[from] InferenceError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<PredictError> for ApiError {
    fn from(err: PredictError) -> Self {
        match err {
            PredictError::Preprocess(e) => ApiError::Decode(e),
            PredictError::Inference(e) => ApiError::Inference(e),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            // Existing callers key on 404 for a rejected file type.
            ApiError::Validation(ValidationError::UnsupportedImageFormat) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) | ApiError::Multipart(_) | ApiError::Decode(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Inference(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            detail: self.to_string(),
        })
    }
}
