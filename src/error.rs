use std::io;

/// All error types for the uv-repacker pipeline.
#[derive(thiserror::Error, Debug)]
pub enum RepackError {
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
    #[error("Incompatible merge: {0}")]
    Incompatible(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Packing error: {0}")]
    Packing(String),
    #[error("Input error: {0}")]
    Input(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RepackError>;
