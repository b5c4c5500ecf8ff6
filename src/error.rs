//! Error types for classifier loading

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading a classifier artifact
///
/// Email parsing and feature extraction never fail, so every error in this
/// crate comes from the model artifact.
#[derive(Error, Debug)]
pub enum ModelError {
    /// The artifact could not be read from disk
    #[error("Failed to read model artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The artifact is not valid JSON for any known model kind
    #[error("Malformed model artifact: {0}")]
    Format(#[from] serde_json::Error),

    /// The artifact parsed but does not match the expected feature schema
    #[error("Invalid model schema: {0}")]
    Schema(String),
}

/// Result type for model operations
pub type Result<T> = std::result::Result<T, ModelError>;
