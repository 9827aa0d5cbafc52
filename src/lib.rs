//! `bugtracker`: a minimal bug-tracking REST backend over an embedded
//! transactional key-value store.
//!
//! Bugs and their comments live in three `sled` trees (`bugs`, `comments`,
//! `counter`) owned by [`storage::RecordStore`]; [`api::router`] exposes
//! them over HTTP with `axum`.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod storage;
pub mod util;
pub mod validation;

pub use error::{ErrorBody, ErrorCode, Result, TrackerError, ValidationError};
pub use storage::RecordStore;
