//! Error types for the quickthumb pipeline.
//!
//! Errors are organized by stage so the caller gets one descriptive failure
//! per run: validation, enumeration, hashing, or transformation.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for quickthumb operations.
#[derive(Error, Debug)]
pub enum ThumbError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Pipeline errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Source and/or destination path is missing
    #[error("{0}")]
    Validation(String),

    /// Non-whitelisted files present while `ignore_unsupported` is off
    #[error("Your source directory contains unsupported files: {}", .files.join(", "))]
    UnsupportedFormat { files: Vec<String> },

    /// Listing the source directory failed
    #[error("Cannot list {path}: {message}")]
    Enumerate { path: PathBuf, message: String },

    /// Computing the content digest failed
    #[error("Hash error: {message} {}", .path.display())]
    Hash { path: PathBuf, message: String },

    /// Decoding, resizing or writing an image failed
    #[error("{message} {}", .path.display())]
    Transform { path: PathBuf, message: String },

    /// A worker task died before reporting its outcome
    #[error("Worker failed: {0}")]
    Worker(String),
}

impl PipelineError {
    /// Build the validation error for a missing source and/or destination.
    ///
    /// Returns `None` when both paths exist.
    pub fn missing_paths(
        source: &std::path::Path,
        destination: &std::path::Path,
        source_exists: bool,
        destination_exists: bool,
    ) -> Option<Self> {
        let message = match (source_exists, destination_exists) {
            (true, true) => return None,
            (true, false) => format!("Destination '{}' does not exist.", destination.display()),
            (false, true) => format!("Source '{}' does not exist.", source.display()),
            (false, false) => format!(
                "Source '{}' and destination '{}' do not exist.",
                source.display(),
                destination.display()
            ),
        };
        Some(Self::Validation(message))
    }

    /// Build a transform error from any displayable cause.
    pub fn transform(path: &std::path::Path, cause: impl std::fmt::Display) -> Self {
        Self::Transform {
            path: path.to_path_buf(),
            message: cause.to_string(),
        }
    }
}

/// Convenience type alias for quickthumb results.
pub type Result<T> = std::result::Result<T, ThumbError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
