//! Record storage over the embedded engine.

pub mod keys;
mod store;

pub use store::{BUGS_BUCKET, COMMENTS_BUCKET, COUNTER_BUCKET, RecordStore};
