use thiserror::Error;

#[derive(Error, Debug)]
pub enum DonorAnalyticsError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to decode {format} input: {details}")]
    DecodeError { format: String, details: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DonorAnalyticsError>;
