//! Error types for spotifetch-core

use thiserror::Error;

/// Main error type for the spotifetch-core library
#[derive(Error, Debug)]
pub enum Error {
    /// History service unreachable, non-2xx response, or malformed record
    #[error("event source error: {0}")]
    EventSource(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Time window whose start is not before its end
    #[error("invalid time window: {from} is not before {to}")]
    InvalidWindow { from: String, to: String },
}

/// Result type alias for spotifetch-core
pub type Result<T> = std::result::Result<T, Error>;
