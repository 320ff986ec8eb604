//! Error types for the upscale queue.
//!
//! Provides a hierarchy of error types using `thiserror` for ergonomic error handling.
//! Per-item failures never surface through these types at the command level; they
//! are recorded on the item itself and the run carries on.

use std::io;
use std::path::PathBuf;
use thiserror::Error;
use serde::Serialize;

/// Validation errors for run requests and item sources.
#[derive(Error, Debug, Serialize)]
pub enum ValidationError {
    /// Path-related validation error
    #[error("Path error: {0}")]
    Path(#[from] PathError),
    /// Model id is not in the catalog
    #[error("Unknown model: {0}")]
    UnknownModel(String),
    /// Target scale outside the accepted range
    #[error("Invalid scale: {0}")]
    Scale(String),
    /// Item has no native file path the backend could read
    #[error("Missing native file path for '{0}'; add it from disk instead of dropping it")]
    UnresolvableSource(String),
}

/// File path errors.
#[derive(Error, Debug, Serialize)]
pub enum PathError {
    /// File does not exist
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    /// Path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotDirectory(PathBuf),
    /// IO error accessing the path
    #[error("IO error: {0}")]
    IO(String),
}

/// Main error type for the queue.
///
/// All errors are converted to this type before being returned to the caller.
#[derive(Error, Debug, Serialize)]
pub enum UpscaleError {
    /// Request or item validation failed
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Backend call failed (classification, listing, cancellation plumbing)
    #[error("Backend error: {0}")]
    Backend(String),

    /// Image transformation failed
    #[error("Transform error: {0}")]
    Transform(String),

    /// File IO error
    #[error("IO error: {0}")]
    IO(String),

    /// Unsupported or invalid image format
    #[error("Format error: {0}")]
    Format(String),

    /// Model asset missing or not downloadable
    #[error("Model error: {0}")]
    Model(String),

    /// Configuration could not be loaded or is invalid
    #[error("Config error: {0}")]
    Config(String),

    /// A run is already in progress
    #[error("A processing run is already active")]
    Busy,
}

/// Convenience result type for queue operations.
pub type UpscaleResult<T> = Result<T, UpscaleError>;

impl UpscaleError {
    pub fn backend<T: Into<String>>(msg: T) -> Self {
        Self::Backend(msg.into())
    }

    pub fn transform<T: Into<String>>(msg: T) -> Self {
        Self::Transform(msg.into())
    }

    pub fn format<T: Into<String>>(msg: T) -> Self {
        Self::Format(msg.into())
    }

    pub fn model<T: Into<String>>(msg: T) -> Self {
        Self::Model(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::Config(msg.into())
    }
}

impl ValidationError {
    pub fn not_a_directory(path: impl Into<PathBuf>) -> Self {
        Self::Path(PathError::NotDirectory(path.into()))
    }

    pub fn scale(msg: impl Into<String>) -> Self {
        Self::Scale(msg.into())
    }
}

// Convert std::io::Error to UpscaleError
impl From<io::Error> for UpscaleError {
    fn from(err: io::Error) -> Self {
        Self::IO(err.to_string())
    }
}

// Convert io::Error to PathError
impl From<io::Error> for PathError {
    fn from(err: io::Error) -> Self {
        Self::IO(err.to_string())
    }
}

// Convert PathError to UpscaleError
impl From<PathError> for UpscaleError {
    fn from(err: PathError) -> Self {
        Self::Validation(ValidationError::Path(err))
    }
}

impl From<serde_json::Error> for UpscaleError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<image::ImageError> for UpscaleError {
    fn from(err: image::ImageError) -> Self {
        Self::Transform(err.to_string())
    }
}
