//! Error responses.

use crate::error::{ErrorBody, TrackerError, ValidationError};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use tracing::{debug, error};

impl IntoResponse for TrackerError {
    fn into_response(self) -> Response {
        let code = self.code();
        if self.is_client_error() {
            debug!(code = %code, error = %self, "Request rejected");
        } else {
            error!(code = %code, error = %self, "Request failed");
        }
        (code.http_status(), Json(ErrorBody::from_error(&self))).into_response()
    }
}

/// Any body the JSON extractor refuses is reported the same way.
pub fn invalid_body(rejection: &JsonRejection) -> TrackerError {
    TrackerError::InvalidBody {
        reason: rejection.body_text(),
    }
}

pub fn invalid_fields(errors: Vec<ValidationError>) -> TrackerError {
    TrackerError::from_validation_errors(errors)
}
