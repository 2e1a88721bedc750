#![allow(dead_code)]

use backend::inference::classifier::{Classifier, InferenceError};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use ndarray::Array4;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex};
use std::time::Duration;

/// Builds an actix test service around the given classifier and config.
macro_rules! test_app {
    ($classifier:expr, $config:expr) => {{
        let config: backend::config::ServiceConfig = $config;
        let predictor = backend::inference::Predictor::new(
            $classifier,
            config.tensor_layout,
            config.apply_softmax,
        );
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new(predictor))
                .app_data(actix_web::web::Data::new(config))
                .configure(backend::routes::configure_routes),
        )
        .await
    }};
}

/// Returns the same scores for every input and counts calls.
pub struct FixedClassifier {
    scores: Vec<f32>,
    calls: AtomicUsize,
}

impl FixedClassifier {
    pub fn new(scores: &[f32]) -> Self {
        Self {
            scores: scores.to_vec(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Classifier for FixedClassifier {
    fn classify(&self, _input: &Array4<f32>) -> Result<Vec<f32>, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.scores.clone())
    }
}

/// Fails the first `failures` calls, then answers with fixed scores.
pub struct FlakyClassifier {
    failures: usize,
    calls: AtomicUsize,
}

impl FlakyClassifier {
    pub fn new(failures: usize) -> Self {
        Self {
            failures,
            calls: AtomicUsize::new(0),
        }
    }
}

impl Classifier for FlakyClassifier {
    fn classify(&self, _input: &Array4<f32>) -> Result<Vec<f32>, InferenceError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            return Err(InferenceError::Model("out of memory".into()));
        }
        Ok(vec![0.7, 0.1, 0.1, 0.1])
    }
}

/// Holds each call until `expected` calls are in flight at once.
/// A call that waits longer than `timeout` for its peers fails.
pub struct RendezvousClassifier {
    expected: usize,
    timeout: Duration,
    arrived: Mutex<usize>,
    all_arrived: Condvar,
}

impl RendezvousClassifier {
    pub fn new(expected: usize, timeout: Duration) -> Self {
        Self {
            expected,
            timeout,
            arrived: Mutex::new(0),
            all_arrived: Condvar::new(),
        }
    }
}

impl Classifier for RendezvousClassifier {
    fn classify(&self, _input: &Array4<f32>) -> Result<Vec<f32>, InferenceError> {
        let mut arrived = self.arrived.lock().unwrap();
        *arrived += 1;
        self.all_arrived.notify_all();
        let (_arrived, wait) = self
            .all_arrived
            .wait_timeout_while(arrived, self.timeout, |n| *n < self.expected)
            .unwrap();
        if wait.timed_out() {
            return Err(InferenceError::Model("other requests never reached the model".into()));
        }
        Ok(vec![0.1, 0.1, 0.1, 0.7])
    }
}

pub fn scan_bytes(format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_fn(64, 48, |x, y| Rgb([(x * 3) as u8, (y * 5) as u8, 128]));
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img).write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

/// Minimal `multipart/form-data` encoder for test requests.
pub struct MultipartBody {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self {
            boundary: "----tumor-test-boundary-7MA4YWxkTrZu0gW".to_string(),
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                self.boundary, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                self.boundary, name, filename, content_type
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn patient(self, name: &str, age: &str, sex: &str) -> Self {
        self.text("name", name).text("age", age).text("sex", sex)
    }

    /// Returns the `Content-Type` header value and the encoded body.
    pub fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (
            format!("multipart/form-data; boundary={}", self.boundary),
            self.body,
        )
    }
}
