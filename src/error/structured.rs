//! Error classification and the JSON error body.
//!
//! The HTTP layer never inspects message text: every [`TrackerError`]
//! variant maps to one [`ErrorCode`], and the code alone decides the
//! status line.

use crate::error::TrackerError;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // === Input Errors (400) ===
    /// Request body was not valid JSON for the expected shape
    InvalidBody,
    /// A required field was missing or a value was out of range
    ValidationFailed,
    /// Path identifier was not numeric
    InvalidId,

    // === Lookup Errors (404) ===
    /// Referenced bug does not exist
    NotFound,

    // === Storage Errors (500) ===
    /// Engine could not be opened
    StorageUnavailable,
    /// Engine failed mid-operation
    EngineFailure,

    // === Startup/Internal Errors (500) ===
    /// Configuration error
    ConfigError,
    /// File or encoding I/O error
    IoError,
    /// Unexpected internal error
    InternalError,
}

impl ErrorCode {
    /// Get the string representation for logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidBody => "INVALID_BODY",
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::InvalidId => "INVALID_ID",
            Self::NotFound => "NOT_FOUND",
            Self::StorageUnavailable => "STORAGE_UNAVAILABLE",
            Self::EngineFailure => "ENGINE_FAILURE",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// HTTP status for this error category.
    #[must_use]
    pub const fn http_status(&self) -> StatusCode {
        match self {
            Self::InvalidBody | Self::ValidationFailed | Self::InvalidId => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::StorageUnavailable
            | Self::EngineFailure
            | Self::ConfigError
            | Self::IoError
            | Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidBody | Self::ValidationFailed | Self::InvalidId | Self::NotFound
        )
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `{"error": "<message>"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }

    #[must_use]
    pub fn from_error(err: &TrackerError) -> Self {
        Self::new(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_covers_taxonomy() {
        assert_eq!(ErrorCode::InvalidBody.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::InvalidId.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorCode::ValidationFailed.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ErrorCode::NotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorCode::EngineFailure.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ErrorCode::StorageUnavailable.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn error_body_serializes_single_field() {
        let body = ErrorBody::from_error(&TrackerError::BugNotFound { id: 7 });
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"error":"bug not found"}"#);
    }

    #[test]
    fn code_strings_are_screaming_snake() {
        assert_eq!(ErrorCode::NotFound.to_string(), "NOT_FOUND");
        assert_eq!(ErrorCode::EngineFailure.as_str(), "ENGINE_FAILURE");
    }
}
