//! Key layout for the storage buckets.
//!
//! - `bugs`: 8-byte big-endian bug ID
//! - `comments`: 8-byte big-endian bug ID followed by 8-byte big-endian
//!   comment ID, so one bug's comments form a contiguous key range
//! - `counter`: named keys holding 8-byte big-endian integers
//!
//! Big-endian keeps the engine's byte-wise ordering equal to numeric order.

/// Counter key for the last assigned bug ID.
pub const LAST_BUG_ID: &[u8] = b"lastBugID";
/// Counter key for the last assigned comment ID.
pub const LAST_COMMENT_ID: &[u8] = b"lastCommentID";

#[must_use]
pub const fn bug_key(id: u64) -> [u8; 8] {
    id.to_be_bytes()
}

#[must_use]
pub fn comment_key(bug_id: u64, comment_id: u64) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&bug_id.to_be_bytes());
    key[8..].copy_from_slice(&comment_id.to_be_bytes());
    key
}

/// Prefix shared by every comment key of `bug_id`.
#[must_use]
pub const fn comment_prefix(bug_id: u64) -> [u8; 8] {
    bug_key(bug_id)
}

/// Decode an 8-byte big-endian integer; `None` on any other length.
#[must_use]
pub fn decode_u64(bytes: &[u8]) -> Option<u64> {
    <[u8; 8]>::try_from(bytes).ok().map(u64::from_be_bytes)
}

/// Split a comment key into `(bug_id, comment_id)`.
#[must_use]
pub fn decode_comment_key(bytes: &[u8]) -> Option<(u64, u64)> {
    if bytes.len() != 16 {
        return None;
    }
    Some((decode_u64(&bytes[..8])?, decode_u64(&bytes[8..])?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bug_key_is_big_endian() {
        assert_eq!(bug_key(1), [0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(bug_key(256), [0, 0, 0, 0, 0, 0, 1, 0]);
    }

    #[test]
    fn comment_key_starts_with_bug_prefix() {
        let key = comment_key(3, 9);
        assert!(key.starts_with(&comment_prefix(3)));
        assert!(!key.starts_with(&comment_prefix(30)));
        assert_eq!(decode_comment_key(&key), Some((3, 9)));
    }

    #[test]
    fn decode_rejects_wrong_lengths() {
        assert_eq!(decode_u64(&[1, 2, 3]), None);
        assert_eq!(decode_comment_key(&bug_key(1)), None);
    }
}
