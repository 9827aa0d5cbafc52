//! Shared utilities for `bugtracker`.

pub mod id;

pub use id::{is_valid_bug_id, parse_bug_id};
