//! Error types for the batch converter.
//!
//! Provides a hierarchy of error types using `thiserror` for ergonomic error handling.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Validation errors for inputs and run configuration.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Path-related validation error
    #[error("Path error: {0}")]
    Path(#[from] PathError),
    /// Invalid settings error
    #[error("Settings error: {0}")]
    Settings(String),
}

/// File path errors.
#[derive(Error, Debug)]
pub enum PathError {
    /// File does not exist
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    /// Output directory could not be created
    #[error("Cannot create output directory {0}: {1}")]
    OutputDir(PathBuf, String),
    /// IO error accessing the path
    #[error("IO error on {0}: {1}")]
    IO(PathBuf, String),
}

/// Main error type for the converter.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Input or configuration validation failed
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Decoding, preprocessing or encoding failed
    #[error("Processing error: {0}")]
    Processing(String),

    /// File IO error
    #[error("IO error: {0}")]
    IO(String),

    /// Unsupported or invalid image format
    #[error("Format error: {0}")]
    Format(String),

    /// Worker pool misuse or shutdown failure
    #[error("Worker pool error: {0}")]
    Pool(String),
}

/// Convenience result type for converter operations.
pub type ConvertResult<T> = Result<T, ConvertError>;

impl ConvertError {
    pub fn processing<T: Into<String>>(msg: T) -> Self {
        Self::Processing(msg.into())
    }

    pub fn format<T: Into<String>>(msg: T) -> Self {
        Self::Format(msg.into())
    }

    pub fn pool<T: Into<String>>(msg: T) -> Self {
        Self::Pool(msg.into())
    }

    pub fn settings<T: Into<String>>(msg: T) -> Self {
        Self::Validation(ValidationError::settings(msg))
    }

    /// Whether this error must stop the run before any chunk starts.
    pub fn is_fatal_setup(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl ValidationError {
    pub fn path_not_found(path: impl Into<PathBuf>) -> Self {
        Self::Path(PathError::NotFound(path.into()))
    }

    pub fn settings(msg: impl Into<String>) -> Self {
        Self::Settings(msg.into())
    }
}

impl PathError {
    pub fn io(path: impl Into<PathBuf>, err: io::Error) -> Self {
        Self::IO(path.into(), err.to_string())
    }
}

// Convert std::io::Error to ConvertError
impl From<io::Error> for ConvertError {
    fn from(err: io::Error) -> Self {
        Self::IO(err.to_string())
    }
}

// Convert PathError to ConvertError
impl From<PathError> for ConvertError {
    fn from(err: PathError) -> Self {
        Self::Validation(ValidationError::Path(err))
    }
}

impl From<image::ImageError> for ConvertError {
    fn from(err: image::ImageError) -> Self {
        Self::Processing(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ConvertError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Processing(format!("Codec task panicked: {err}"))
    }
}
