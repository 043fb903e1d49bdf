// src/error.rs
use sift_resources::ProcessError;
use thiserror::Error;

/// Top-level error for configuring and running resource processing.
#[derive(Error, Debug)]
pub enum SiftError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Processing failed: {0}")]
    Process(#[from] ProcessError),
}
