#![allow(dead_code)]

use bugtracker::RecordStore;
use bugtracker::api::{self, AppState};
use bugtracker::config::CorsConfig;
use std::sync::{Arc, Once};
use std::time::Instant;
use tempfile::TempDir;
use tracing::info;

pub mod fixtures;
pub mod http;

static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        bugtracker::logging::init_test_logging();
    });
}

pub struct TestLogGuard {
    name: String,
    start: Instant,
}

impl TestLogGuard {
    fn new(name: &str) -> Self {
        init_test_logging();
        info!("{name}: starting");
        Self {
            name: name.to_string(),
            start: Instant::now(),
        }
    }
}

impl Drop for TestLogGuard {
    fn drop(&mut self) {
        info!(
            "{}: assertions passed (elapsed {:?})",
            self.name,
            self.start.elapsed()
        );
    }
}

pub fn test_log(name: &str) -> TestLogGuard {
    TestLogGuard::new(name)
}

pub fn test_store() -> RecordStore {
    init_test_logging();
    RecordStore::open_temporary().expect("Failed to create test store")
}

pub fn test_store_with_dir() -> (RecordStore, TempDir) {
    init_test_logging();
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = RecordStore::open(&dir.path().join("bugs.db")).expect("Failed to open test store");
    (store, dir)
}

/// Router over a fresh temporary store, default CORS policy.
pub fn test_app() -> (axum::Router, Arc<RecordStore>) {
    test_app_with_cors(CorsConfig::default())
}

pub fn test_app_with_cors(cors: CorsConfig) -> (axum::Router, Arc<RecordStore>) {
    let store = Arc::new(test_store());
    let router = api::router(AppState::new(Arc::clone(&store)), cors);
    (router, store)
}
