//! Bug identifier parsing.
//!
//! Bug IDs are positive integers assigned by the store. Path segments
//! arrive as text and are parsed here, at the HTTP boundary, so the store
//! only ever sees numbers.

use crate::error::{Result, TrackerError};

/// Parse a path segment into a bug ID.
///
/// Accepts an optional leading `+`. Zero parses (and will simply not be
/// found); whitespace, negative or non-numeric input does not.
///
/// # Errors
///
/// Returns `TrackerError::InvalidId` if the segment is not an unsigned
/// 64-bit integer.
pub fn parse_bug_id(raw: &str) -> Result<u64> {
    raw.parse::<u64>().map_err(|_| TrackerError::InvalidId {
        id: raw.to_string(),
    })
}

/// Is this segment a well-formed bug ID?
#[must_use]
pub fn is_valid_bug_id(raw: &str) -> bool {
    parse_bug_id(raw).is_ok()
}
