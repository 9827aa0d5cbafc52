//! Core data types for `bugtracker`.
//!
//! - `Bug` - The tracked work item
//! - `Status` - Bug lifecycle states
//! - `Priority` - Bug urgency
//! - `Comment` - Threaded remarks on a bug
//! - `BugPayload` / `CommentPayload` - Request bodies as received
//! - `BugDraft` / `CommentDraft` - Validated inputs handed to storage

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bug lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Status {
    #[default]
    Open,
    #[serde(rename = "In Progress")]
    InProgress,
    Closed,
}

impl Status {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "In Progress",
            Self::Closed => "Closed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = crate::error::TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "in progress" | "in_progress" | "inprogress" => Ok(Self::InProgress),
            "closed" => Ok(Self::Closed),
            _ => Err(crate::error::TrackerError::InvalidStatus {
                status: s.to_string(),
            }),
        }
    }
}

/// Bug priority.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = crate::error::TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(crate::error::TrackerError::InvalidPriority {
                priority: s.to_string(),
            }),
        }
    }
}

/// The primary bug entity, as stored and as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Bug {
    /// Assigned by the store from the persisted counter; starts at 1.
    pub id: u64,

    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub status: Status,

    #[serde(default)]
    pub priority: Priority,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Bug {
    /// Overwrite the mutable fields from a draft, leaving identity and
    /// creation time alone.
    pub fn apply(&mut self, draft: &BugDraft, now: DateTime<Utc>) {
        self.title.clone_from(&draft.title);
        self.description.clone_from(&draft.description);
        self.status = draft.status;
        self.priority = draft.priority;
        // Never let a stepped-back clock put updated_at before created_at.
        self.updated_at = now.max(self.created_at);
    }
}

/// A comment on a bug.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Comment {
    pub id: u64,
    pub bug_id: u64,
    pub author: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /bugs` and `PUT /bugs/{id}`.
///
/// Everything is optional at the decoding stage so that a missing title
/// surfaces as "title is required" rather than a generic decode failure.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct BugPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
}

/// Body of `POST /bugs/{id}/comments`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct CommentPayload {
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Validated bug fields, produced by `validation::BugValidator`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BugDraft {
    pub title: String,
    pub description: String,
    pub status: Status,
    pub priority: Priority,
}

/// Validated comment fields, produced by `validation::CommentValidator`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentDraft {
    pub author: String,
    pub content: String,
}

/// `DELETE /bugs` response.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeletedCount {
    pub deleted: usize,
}
