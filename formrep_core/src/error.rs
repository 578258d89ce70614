//! Error types for the formrep_core library.
//!
//! Data-quality problems inside a landmark frame (missing joints, degenerate
//! geometry) are never errors; they are skipped where they occur. This type
//! only covers I/O, configuration and malformed input.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for formrep_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input that violates the landmark stream contract
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
