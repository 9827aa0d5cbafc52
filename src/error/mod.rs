//! Error types and handling for `bugtracker`.
//!
//! # Design
//!
//! - Uses `thiserror` for derive-based error types
//! - Wraps `anyhow` for startup plumbing that has no typed variant
//! - Every variant classifies into an [`ErrorCode`], which the HTTP layer
//!   turns into a status code without looking at message text

mod structured;

pub use structured::{ErrorBody, ErrorCode};

use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for `bugtracker` operations.
#[derive(Error, Debug)]
pub enum TrackerError {
    // === Storage Errors ===
    /// The engine could not be opened (lock held elsewhere, bad path, ...).
    #[error("storage unavailable at '{path}': {reason}")]
    StorageUnavailable { path: PathBuf, reason: String },

    /// Engine failure during an operation.
    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),

    /// A persisted value had an unexpected shape.
    #[error("corrupt record in '{bucket}': {reason}")]
    CorruptRecord { bucket: &'static str, reason: String },

    // === Record Errors ===
    /// Bug with the specified ID was not found.
    #[error("bug not found")]
    BugNotFound { id: u64 },

    /// Path identifier is not a well-formed bug ID.
    #[error("invalid bug ID")]
    InvalidId { id: String },

    // === Validation Errors ===
    /// Request body could not be decoded.
    #[error("invalid request body")]
    InvalidBody { reason: String },

    /// Field validation failed.
    #[error("{reason}")]
    Validation { field: String, reason: String },

    /// Multiple validation errors occurred.
    #[error("{}", join_messages(errors))]
    ValidationErrors { errors: Vec<ValidationError> },

    /// Invalid status value.
    #[error("invalid status")]
    InvalidStatus { status: String },

    /// Invalid priority value.
    #[error("invalid priority")]
    InvalidPriority { priority: String },

    // === Configuration Errors ===
    /// Configuration file or value error.
    #[error("configuration error: {0}")]
    Config(String),

    // === I/O Errors ===
    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Wrapped anyhow error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// A single field validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The field that failed validation.
    pub field: String,
    /// Client-facing message, e.g. "title is required".
    pub message: String,
}

impl ValidationError {
    /// Create a new validation error.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl TrackerError {
    /// Machine-readable classification of this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::StorageUnavailable { .. } => ErrorCode::StorageUnavailable,
            Self::Storage(_) | Self::CorruptRecord { .. } => ErrorCode::EngineFailure,
            Self::BugNotFound { .. } => ErrorCode::NotFound,
            Self::InvalidId { .. } => ErrorCode::InvalidId,
            Self::InvalidBody { .. } => ErrorCode::InvalidBody,
            Self::Validation { .. }
            | Self::ValidationErrors { .. }
            | Self::InvalidStatus { .. }
            | Self::InvalidPriority { .. } => ErrorCode::ValidationFailed,
            Self::Config(_) | Self::Yaml(_) => ErrorCode::ConfigError,
            Self::Io(_) | Self::Json(_) => ErrorCode::IoError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Is this the client's fault (4xx) rather than ours?
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.code().is_client_error()
    }

    /// Create from multiple validation errors.
    #[must_use]
    pub fn from_validation_errors(mut errors: Vec<ValidationError>) -> Self {
        if errors.len() == 1 {
            let err = errors.remove(0);
            Self::Validation {
                field: err.field,
                reason: err.message,
            }
        } else {
            Self::ValidationErrors { errors }
        }
    }
}

/// Result type using `TrackerError`.
pub type Result<T> = std::result::Result<T, TrackerError>;
