//! Validation helpers for `bugtracker`.
//!
//! These routines turn raw request payloads into validated drafts and
//! collect every problem they find instead of stopping at the first one.
//! Messages are client-facing and end up verbatim in `{"error": ...}`.

use crate::error::ValidationError;
use crate::model::{BugDraft, BugPayload, CommentDraft, CommentPayload, Priority, Status};

/// Validates bug payloads.
pub struct BugValidator;

impl BugValidator {
    /// Validate a bug payload, returning the draft or all validation errors.
    ///
    /// Omitted `status` and `priority` fall back to `Open` / `Medium`.
    ///
    /// # Errors
    ///
    /// Returns a `Vec<ValidationError>` if any validation rules are violated.
    pub fn validate(payload: &BugPayload) -> Result<BugDraft, Vec<ValidationError>> {
        let mut errors = Vec::new();

        // Title: Required. No length limit.
        let title = payload.title.as_deref().unwrap_or_default().trim();
        if title.is_empty() {
            errors.push(ValidationError::new("title", "title is required"));
        }

        let description = payload.description.clone().unwrap_or_default();

        let status = match blank_to_none(payload.status.as_deref()) {
            None => Some(Status::default()),
            Some(raw) => raw.parse::<Status>().ok(),
        };
        if status.is_none() {
            errors.push(ValidationError::new("status", "invalid status"));
        }

        let priority = match blank_to_none(payload.priority.as_deref()) {
            None => Some(Priority::default()),
            Some(raw) => raw.parse::<Priority>().ok(),
        };
        if priority.is_none() {
            errors.push(ValidationError::new("priority", "invalid priority"));
        }

        match (status, priority) {
            (Some(status), Some(priority)) if errors.is_empty() => Ok(BugDraft {
                title: title.to_string(),
                description,
                status,
                priority,
            }),
            _ => Err(errors),
        }
    }
}

/// Validates comment payloads.
pub struct CommentValidator;

impl CommentValidator {
    /// Validate a comment payload.
    ///
    /// # Errors
    ///
    /// Returns a `Vec<ValidationError>` if any validation rules are violated.
    pub fn validate(payload: &CommentPayload) -> Result<CommentDraft, Vec<ValidationError>> {
        let mut errors = Vec::new();

        let author = payload.author.as_deref().unwrap_or_default().trim();
        if author.is_empty() {
            errors.push(ValidationError::new("author", "author is required"));
        }

        let content = payload.content.as_deref().unwrap_or_default();
        if content.trim().is_empty() {
            errors.push(ValidationError::new("content", "content is required"));
        }

        if errors.is_empty() {
            Ok(CommentDraft {
                author: author.to_string(),
                content: content.to_string(),
            })
        } else {
            Err(errors)
        }
    }
}

fn blank_to_none(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
