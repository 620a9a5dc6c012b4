//! Error types shared across Domus crates

use thiserror::Error;

/// Result type alias for Domus operations
pub type Result<T> = std::result::Result<T, DomusError>;

/// Main error type for Domus
#[derive(Error, Debug)]
pub enum DomusError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}
