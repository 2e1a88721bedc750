use actix_multipart::{Field, Multipart};
use actix_web::{HttpResponse, web};
use futures::{StreamExt, TryStreamExt};
use log::{error, info, warn};
use shared::HealthResponse;

use crate::config::ServiceConfig;
use crate::error::ApiError;
use crate::inference::Predictor;
use crate::response::assemble;
use crate::validation::{PatientForm, ValidationError, validate_image_filename};

pub const SERVICE_MESSAGE: &str = "Brain Tumor Detection API.";

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(root))
        .route("/predict/", web::post().to(predict))
        .route("/predict", web::post().to(predict));
}

async fn root(config: web::Data<ServiceConfig>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        message: SERVICE_MESSAGE.to_string(),
        model_path_exists: config.model_path.exists(),
    })
}

struct UploadedImage {
    filename: Option<String>,
    bytes: Vec<u8>,
}

#[derive(Default)]
struct PredictionUpload {
    form: PatientForm,
    image: Option<UploadedImage>,
}

async fn read_field(
    field: &mut Field,
    budget: &mut usize,
    limit: usize,
) -> Result<Vec<u8>, ApiError> {
    let mut data = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| ApiError::Multipart(e.to_string()))?;
        if chunk.len() > *budget {
            return Err(ApiError::PayloadTooLarge(limit));
        }
        *budget -= chunk.len();
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

fn into_text(name: &str, data: Vec<u8>) -> Result<String, ApiError> {
    String::from_utf8(data)
        .map_err(|_| ApiError::Multipart(format!("field `{name}` is not valid UTF-8")))
}

async fn read_upload(mut payload: Multipart, limit: usize) -> Result<PredictionUpload, ApiError> {
    let mut upload = PredictionUpload::default();
    let mut budget = limit;

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| ApiError::Multipart(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let data = read_field(&mut field, &mut budget, limit).await?;

        match name.as_str() {
            "file" => {
                let filename = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename())
                    .map(String::from);
                upload.image = Some(UploadedImage {
                    filename,
                    bytes: data,
                });
            }
            "name" => upload.form.name = Some(into_text("name", data)?),
            "age" => upload.form.age = Some(into_text("age", data)?),
            "sex" => upload.form.sex = Some(into_text("sex", data)?),
            _ => {}
        }
    }

    Ok(upload)
}

async fn predict(
    predictor: web::Data<Predictor>,
    config: web::Data<ServiceConfig>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let upload = read_upload(payload, config.max_upload_bytes).await?;

    let image = upload.image.ok_or(ValidationError::MissingField("file"))?;
    let patient = upload.form.validate().inspect_err(|e| {
        warn!("Rejected patient info: {}", e);
    })?;
    validate_image_filename(image.filename.as_deref()).inspect_err(|_| {
        warn!("Rejected upload with filename {:?}", image.filename);
    })?;

    let predictor = predictor.into_inner();
    let prediction = web::block(move || predictor.predict(&image.bytes))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(ApiError::from)
        .inspect_err(|e| match e {
            ApiError::Decode(_) => warn!("{}", e),
            _ => error!("{}", e),
        })?;

    info!(
        "Predicted {} ({})",
        prediction.label,
        prediction.formatted_confidence()
    );
    Ok(HttpResponse::Ok().json(assemble(patient, prediction)))
}
