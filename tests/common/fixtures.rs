#![allow(dead_code)]

use bugtracker::model::{BugDraft, CommentDraft, Priority, Status};
use serde_json::{Value, json};

pub fn draft(title: &str) -> BugDraft {
    BugDraft {
        title: title.to_string(),
        description: String::new(),
        status: Status::Open,
        priority: Priority::Medium,
    }
}

pub struct DraftBuilder {
    draft: BugDraft,
}

impl DraftBuilder {
    pub fn new(title: &str) -> Self {
        Self {
            draft: draft(title),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.draft.description = description.to_string();
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.draft.status = status;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.draft.priority = priority;
        self
    }

    pub fn build(self) -> BugDraft {
        self.draft
    }
}

pub fn comment(author: &str, content: &str) -> CommentDraft {
    CommentDraft {
        author: author.to_string(),
        content: content.to_string(),
    }
}

/// The request body used throughout the HTTP scenarios.
pub fn bug_body(title: &str) -> Value {
    json!({
        "title": title,
        "description": "D",
        "status": "Open",
        "priority": "High",
    })
}

pub fn comment_body(author: &str, content: &str) -> Value {
    json!({ "author": author, "content": content })
}
