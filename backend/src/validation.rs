use shared::{PatientInfo, Sex};
use std::path::Path;

pub const MAX_NAME_CHARS: usize = 100;
pub const MIN_AGE: i64 = 1;
pub const MAX_AGE: i64 = 119;
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "bmp"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Field required: {0}")]
    MissingField(&'static str),
    #[error("Name must be between 1 and 100 characters")]
    InvalidName,
    #[error("Age must be an integer")]
    AgeNotInteger,
    #[error("Age must be greater than 0 and less than 120")]
    AgeOutOfRange,
    #[error("Sex must be Male or Female")]
    InvalidSex,
    #[error("Invalid image format")]
    UnsupportedImageFormat,
}

/// Raw multipart text fields as they arrived on the wire.
#[derive(Debug, Default, Clone)]
pub struct PatientForm {
    pub name: Option<String>,
    pub age: Option<String>,
    pub sex: Option<String>,
}

impl PatientForm {
    pub fn validate(&self) -> Result<PatientInfo, ValidationError> {
        let name = self
            .name
            .as_deref()
            .ok_or(ValidationError::MissingField("name"))?;
        let age = self
            .age
            .as_deref()
            .ok_or(ValidationError::MissingField("age"))?;
        let sex = self
            .sex
            .as_deref()
            .ok_or(ValidationError::MissingField("sex"))?;

        Ok(PatientInfo {
            name: validate_name(name)?,
            age: parse_age(age)?,
            sex: normalize_sex(sex)?,
        })
    }
}

pub fn validate_name(name: &str) -> Result<String, ValidationError> {
    let len = name.chars().count();
    if len == 0 || len > MAX_NAME_CHARS {
        return Err(ValidationError::InvalidName);
    }
    Ok(name.to_string())
}

pub fn parse_age(raw: &str) -> Result<u8, ValidationError> {
    let age: i64 = raw
        .trim()
        .parse()
        .map_err(|_| ValidationError::AgeNotInteger)?;
    if !(MIN_AGE..=MAX_AGE).contains(&age) {
        return Err(ValidationError::AgeOutOfRange);
    }
    u8::try_from(age).map_err(|_| ValidationError::AgeOutOfRange)
}

pub fn normalize_sex(raw: &str) -> Result<Sex, ValidationError> {
    match raw.to_lowercase().as_str() {
        "male" => Ok(Sex::Male),
        "female" => Ok(Sex::Female),
        _ => Err(ValidationError::InvalidSex),
    }
}

/// Extension check on the client-supplied filename. Runs before any decoding.
pub fn validate_image_filename(filename: Option<&str>) -> Result<(), ValidationError> {
    let extension = filename
        .and_then(|f| Path::new(f).extension())
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or(ValidationError::UnsupportedImageFormat)?;

    if SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(())
    } else {
        Err(ValidationError::UnsupportedImageFormat)
    }
}
