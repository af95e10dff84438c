//! Error types for FPD

use thiserror::Error;

/// Result type alias for FPD operations
pub type Result<T> = std::result::Result<T, FpdError>;

/// Main error type for FPD
#[derive(Error, Debug)]
pub enum FpdError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}
