use actix_web::http::Uri;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const DEFAULT_CONFIG_PATH: &str = "config/service.yaml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("Invalid value for {key}: {value}")]
    InvalidEnv { key: &'static str, value: String },
    #[error("Invalid CORS origin: {0}")]
    InvalidOrigin(String),
}

/// Axis order of the tensor handed to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TensorLayout {
    /// `[1, H, W, C]`
    #[default]
    Nhwc,
    /// `[1, C, H, W]`
    Nchw,
}

impl FromStr for TensorLayout {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nhwc" => Ok(TensorLayout::Nhwc),
            "nchw" => Ok(TensorLayout::Nchw),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    #[default]
    Cpu,
    Cuda,
}

impl FromStr for DeviceKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cpu" => Ok(DeviceKind::Cpu),
            "cuda" | "gpu" => Ok(DeviceKind::Cuda),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
    pub max_upload_bytes: usize,
    pub tensor_layout: TensorLayout,
    pub apply_softmax: bool,
    pub device: DeviceKind,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            model_path: PathBuf::from("model/model.pt"),
            max_upload_bytes: 10 * 1024 * 1024,
            tensor_layout: TensorLayout::Nhwc,
            apply_softmax: false,
            device: DeviceKind::Cpu,
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl ServiceConfig {
    /// Defaults, then the YAML file at `CONFIG_PATH` if it exists, then env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::from_file_or_default(Path::new(&config_path))?;
        config.apply_env(|key| env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let config_str = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&config_str).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overrides fields from variables resolved through `lookup`, then checks
    /// the resulting CORS origins.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.port = parse_env("PORT", port)?;
        }
        if let Some(model_path) = lookup("MODEL_PATH") {
            self.model_path = PathBuf::from(model_path);
        }
        if let Some(limit) = lookup("MAX_UPLOAD_BYTES") {
            self.max_upload_bytes = parse_env("MAX_UPLOAD_BYTES", limit)?;
        }
        if let Some(layout) = lookup("TENSOR_LAYOUT") {
            self.tensor_layout = parse_env("TENSOR_LAYOUT", layout)?;
        }
        if let Some(softmax) = lookup("APPLY_SOFTMAX") {
            self.apply_softmax = parse_env("APPLY_SOFTMAX", softmax)?;
        }
        if let Some(device) = lookup("TORCH_DEVICE") {
            self.device = parse_env("TORCH_DEVICE", device)?;
        }
        if let Some(origins) = lookup("CORS_ALLOWED_ORIGINS") {
            self.cors_allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
        }
        self.normalize_origins()
    }

    /// `*` anywhere means any origin, which is the empty list. Every other
    /// entry must be a `scheme://host[:port]` origin.
    fn normalize_origins(&mut self) -> Result<(), ConfigError> {
        if self.cors_allowed_origins.iter().any(|o| o == "*") {
            self.cors_allowed_origins.clear();
            return Ok(());
        }
        for origin in &self.cors_allowed_origins {
            let valid = origin.parse::<Uri>().is_ok_and(|uri| {
                uri.scheme().is_some()
                    && uri.host().is_some()
                    && uri.path_and_query().is_none_or(|p| matches!(p.as_str(), "" | "/"))
            });
            if !valid {
                return Err(ConfigError::InvalidOrigin(origin.clone()));
            }
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_env<T: FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { key, value })
}
