#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use backend::config::ServiceConfig;
use common::FixedClassifier;
use pretty_assertions::assert_eq;
use shared::HealthResponse;
use std::sync::Arc;

#[actix_web::test]
async fn root_reports_model_presence() {
    let model_file = tempfile::NamedTempFile::new().unwrap();
    let config = ServiceConfig {
        model_path: model_file.path().to_path_buf(),
        ..ServiceConfig::default()
    };
    let app = test_app!(Arc::new(FixedClassifier::new(&[0.25; 4])), config);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: HealthResponse = test::read_body_json(resp).await;
    assert_eq!(
        body,
        HealthResponse {
            message: "Brain Tumor Detection API.".to_string(),
            model_path_exists: true,
        }
    );
}

#[actix_web::test]
async fn root_reports_missing_model() {
    let dir = tempfile::tempdir().unwrap();
    let config = ServiceConfig {
        model_path: dir.path().join("model.pt"),
        ..ServiceConfig::default()
    };
    let app = test_app!(Arc::new(FixedClassifier::new(&[0.25; 4])), config);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;

    let body: HealthResponse = test::read_body_json(resp).await;
    assert!(!body.model_path_exists);
}
