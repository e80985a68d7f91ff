use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HairgenError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Unknown hairstyle: {0}")]
    UnknownStyle(String),
    #[error("Upload error: {0}")]
    UploadError(String),
    #[error("Field '{field}' exceeds the {limit} byte limit")]
    PayloadTooLarge { field: &'static str, limit: usize },
    #[error("Request error: {0}")]
    RequestError(String),
    #[error("Response error: {0}")]
    ResponseError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Prediction {id} ended with status '{status}': {detail}")]
    PredictionFailed {
        id: String,
        status: String,
        detail: String,
    },
    #[error("Prediction did not finish within {0:?}")]
    Timeout(Duration),
}

impl From<reqwest::Error> for HairgenError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            HairgenError::ResponseError(err.to_string())
        } else {
            HairgenError::RequestError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for HairgenError {
    fn from(err: serde_json::Error) -> Self {
        HairgenError::SerializationError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, HairgenError>;
