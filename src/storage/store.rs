//! `sled` storage implementation.

use crate::error::{Result, TrackerError};
use crate::model::{Bug, BugDraft, Comment, CommentDraft};
use crate::storage::keys::{
    LAST_BUG_ID, LAST_COMMENT_ID, bug_key, comment_key, comment_prefix, decode_u64,
};
use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use sled::Transactional;
use sled::transaction::{
    ConflictableTransactionError, ConflictableTransactionResult, TransactionError,
    TransactionResult, TransactionalTree, abort,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const BUGS_BUCKET: &str = "bugs";
pub const COMMENTS_BUCKET: &str = "comments";
pub const COUNTER_BUCKET: &str = "counter";

/// Durable CRUD over bugs and comments.
///
/// Every write runs in exactly one engine transaction. The store is
/// `Send + Sync`; share it behind an `Arc` rather than a lock.
#[derive(Debug)]
pub struct RecordStore {
    db: sled::Db,
    path: Option<PathBuf>,
    bugs: sled::Tree,
    comments: sled::Tree,
    counter: sled::Tree,
}

impl RecordStore {
    /// Open (or create) the store at `path` and make sure all three buckets
    /// exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` if the engine cannot be opened, which
    /// includes another process holding the database lock.
    pub fn open(path: &Path) -> Result<Self> {
        let db = sled::Config::new()
            .path(path)
            .open()
            .map_err(|e| TrackerError::StorageUnavailable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        let store = Self::from_db(db, Some(path.to_path_buf()))?;
        info!(
            path = %path.display(),
            bugs = store.count_bugs(),
            "Database initialized"
        );
        Ok(store)
    }

    /// Open a throwaway store that is removed when dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot allocate its temporary files.
    pub fn open_temporary() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db, None)
    }

    fn from_db(db: sled::Db, path: Option<PathBuf>) -> Result<Self> {
        let bugs = db.open_tree(BUGS_BUCKET)?;
        let comments = db.open_tree(COMMENTS_BUCKET)?;
        let counter = db.open_tree(COUNTER_BUCKET)?;
        Ok(Self {
            db,
            path,
            bugs,
            comments,
            counter,
        })
    }

    /// On-disk location, `None` for temporary stores.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Create a new bug, assigning the next ID from the persisted counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails or the counter is corrupt.
    pub fn create_bug(&self, draft: &BugDraft) -> Result<Bug> {
        let now = Utc::now();
        let bug = finish(
            (&self.bugs, &self.counter).transaction(|(bugs, counter)| {
                let id = bump_counter(counter, LAST_BUG_ID)?;
                let bug = Bug {
                    id,
                    title: draft.title.clone(),
                    description: draft.description.clone(),
                    status: draft.status,
                    priority: draft.priority,
                    created_at: now,
                    updated_at: now,
                };
                bugs.insert(&bug_key(id)[..], encode(&bug)?)?;
                Ok(bug)
            }),
        )?;
        debug!(id = bug.id, "Created bug");
        Ok(bug)
    }

    /// Get a bug by ID.
    ///
    /// # Errors
    ///
    /// Returns `BugNotFound` if no record exists.
    pub fn get_bug(&self, id: u64) -> Result<Bug> {
        let raw = self
            .bugs
            .get(bug_key(id))?
            .ok_or(TrackerError::BugNotFound { id })?;
        decode(BUGS_BUCKET, &raw)
    }

    /// All bugs, in engine iteration order (ascending ID for this engine).
    ///
    /// # Errors
    ///
    /// Returns an error if the scan fails or a record does not decode.
    pub fn get_all_bugs(&self) -> Result<Vec<Bug>> {
        self.bugs
            .iter()
            .values()
            .map(|raw| decode(BUGS_BUCKET, &raw?))
            .collect()
    }

    /// Overwrite the mutable fields of an existing bug.
    ///
    /// `id` and `created_at` are preserved; `updated_at` is refreshed.
    ///
    /// # Errors
    ///
    /// Returns `BugNotFound` if the bug does not exist.
    pub fn update_bug(&self, id: u64, draft: &BugDraft) -> Result<Bug> {
        let now = Utc::now();
        let bug = finish(self.bugs.transaction(|bugs| {
            let key = bug_key(id);
            let Some(raw) = bugs.get(&key[..])? else {
                return abort(TrackerError::BugNotFound { id });
            };
            let mut bug: Bug =
                decode(BUGS_BUCKET, &raw).map_err(ConflictableTransactionError::Abort)?;
            bug.apply(draft, now);
            bugs.insert(&key[..], encode(&bug)?)?;
            Ok(bug)
        }))?;
        debug!(id, "Updated bug");
        Ok(bug)
    }

    /// Remove a bug. Its comments are left in place.
    ///
    /// # Errors
    ///
    /// Returns `BugNotFound` if the bug does not exist.
    pub fn delete_bug(&self, id: u64) -> Result<()> {
        match self.bugs.remove(bug_key(id))? {
            Some(_) => {
                debug!(id, "Deleted bug");
                Ok(())
            }
            None => Err(TrackerError::BugNotFound { id }),
        }
    }

    /// Remove every bug and reset the bug counter to zero.
    ///
    /// Runs as one transaction over the bug and counter buckets, so a
    /// concurrent `create_bug` either lands before (and is deleted) or after
    /// (and gets ID 1).
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails.
    pub fn delete_all_bugs(&self) -> Result<usize> {
        let removed = finish(
            (&self.bugs, &self.counter).transaction(|(bugs, counter)| {
                let last = read_counter(counter, LAST_BUG_ID)?;
                let mut removed = 0usize;
                for id in 1..=last {
                    if bugs.remove(&bug_key(id)[..])?.is_some() {
                        removed += 1;
                    }
                }
                counter.insert(LAST_BUG_ID, &0u64.to_be_bytes()[..])?;
                Ok(removed)
            }),
        )?;
        info!(removed, "Deleted all bugs");
        Ok(removed)
    }

    /// Attach a comment to an existing bug.
    ///
    /// # Errors
    ///
    /// Returns `BugNotFound` if the bug does not exist.
    pub fn create_comment(&self, bug_id: u64, draft: &CommentDraft) -> Result<Comment> {
        let now = Utc::now();
        let comment = finish(
            (&self.bugs, &self.comments, &self.counter).transaction(
                |(bugs, comments, counter)| {
                    if bugs.get(&bug_key(bug_id)[..])?.is_none() {
                        return abort(TrackerError::BugNotFound { id: bug_id });
                    }
                    let id = bump_counter(counter, LAST_COMMENT_ID)?;
                    let comment = Comment {
                        id,
                        bug_id,
                        author: draft.author.clone(),
                        content: draft.content.clone(),
                        created_at: now,
                    };
                    comments.insert(&comment_key(bug_id, id)[..], encode(&comment)?)?;
                    Ok(comment)
                },
            ),
        )?;
        debug!(bug_id, id = comment.id, "Created comment");
        Ok(comment)
    }

    /// Comments of one bug, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `BugNotFound` if the bug does not exist.
    pub fn get_comments(&self, bug_id: u64) -> Result<Vec<Comment>> {
        if !self.bugs.contains_key(bug_key(bug_id))? {
            return Err(TrackerError::BugNotFound { id: bug_id });
        }
        self.comments
            .scan_prefix(comment_prefix(bug_id))
            .values()
            .map(|raw| decode(COMMENTS_BUCKET, &raw?))
            .collect()
    }

    /// Number of stored bugs.
    #[must_use]
    pub fn count_bugs(&self) -> usize {
        self.bugs.len()
    }

    /// Number of stored comments, orphans included.
    #[must_use]
    pub fn count_comments(&self) -> usize {
        self.comments.len()
    }

    /// Current value of the bug counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails or the stored value is corrupt.
    pub fn last_bug_id(&self) -> Result<u64> {
        match self.counter.get(LAST_BUG_ID)? {
            None => Ok(0),
            Some(raw) => decode_u64(&raw).ok_or_else(|| corrupt_counter(LAST_BUG_ID)),
        }
    }

    /// Flush dirty pages to disk; returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot write.
    pub fn flush(&self) -> Result<usize> {
        Ok(self.db.flush()?)
    }

    /// Flush and release the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the final flush fails.
    pub fn close(self) -> Result<()> {
        let bytes = self.flush()?;
        info!(bytes, "Database closed");
        Ok(())
    }
}

fn finish<T>(result: TransactionResult<T, TrackerError>) -> Result<T> {
    result.map_err(|err| match err {
        TransactionError::Abort(err) => err,
        TransactionError::Storage(err) => TrackerError::Storage(err),
    })
}

fn read_counter(
    counter: &TransactionalTree,
    key: &[u8],
) -> ConflictableTransactionResult<u64, TrackerError> {
    match counter.get(key)? {
        None => Ok(0),
        Some(raw) => match decode_u64(&raw) {
            Some(value) => Ok(value),
            None => abort(corrupt_counter(key)),
        },
    }
}

fn bump_counter(
    counter: &TransactionalTree,
    key: &[u8],
) -> ConflictableTransactionResult<u64, TrackerError> {
    let next = read_counter(counter, key)?.saturating_add(1);
    counter.insert(key, &next.to_be_bytes()[..])?;
    Ok(next)
}

fn corrupt_counter(key: &[u8]) -> TrackerError {
    TrackerError::CorruptRecord {
        bucket: COUNTER_BUCKET,
        reason: format!("{} is not an 8-byte integer", String::from_utf8_lossy(key)),
    }
}

fn encode<T: Serialize>(value: &T) -> ConflictableTransactionResult<Vec<u8>, TrackerError> {
    serde_json::to_vec(value).map_err(|e| ConflictableTransactionError::Abort(e.into()))
}

fn decode<T: DeserializeOwned>(bucket: &'static str, raw: &[u8]) -> Result<T> {
    serde_json::from_slice(raw).map_err(|e| TrackerError::CorruptRecord {
        bucket,
        reason: e.to_string(),
    })
}
