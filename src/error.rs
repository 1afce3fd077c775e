// for error definitions
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdmissionError {
    /// Returned when a limit or capacity is not a positive integer
    #[error("Invalid limit: {0}")]
    InvalidLimit(String),

    /// Returned when a window or refill interval is not a positive duration
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    /// Configuration-related errors (malformed files, unknown strategies)
    #[error("Configuration error: {0}")]
    Config(String),
}

// implement conversions from serde_json::Error to AdmissionError
impl From<serde_json::Error> for AdmissionError {
    fn from(err: serde_json::Error) -> Self {
        AdmissionError::Config(err.to_string())
    }
}

// define a Result type alias for convenience
pub type Result<T> = std::result::Result<T, AdmissionError>;
