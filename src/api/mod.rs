//! HTTP surface.
//!
//! Every resource route is mounted twice: at the root and under `/api`.
//! CORS and request logging wrap the whole router, so preflights for
//! unknown paths are still answered.

mod bugs;
mod comments;
pub mod cors;
mod error;
mod health;

pub use health::HealthResponse;

use crate::config::CorsConfig;
use crate::storage::RecordStore;
use axum::Router;
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Arc<RecordStore>,
}

impl AppState {
    #[must_use]
    pub const fn new(store: Arc<RecordStore>) -> Self {
        Self { store }
    }
}

/// Build the application router.
pub fn router(state: AppState, cors_config: CorsConfig) -> Router {
    Router::new()
        .merge(routes())
        .nest("/api", routes())
        .layer(middleware::from_fn_with_state(Arc::new(cors_config), cors::apply))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route(
            "/bugs",
            get(bugs::list_bugs)
                .post(bugs::create_bug)
                .delete(bugs::delete_all_bugs),
        )
        .route(
            "/bugs/:id",
            get(bugs::get_bug)
                .put(bugs::update_bug)
                .delete(bugs::delete_bug),
        )
        .route(
            "/bugs/:id/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(request).await;

    info!(
        %method,
        path,
        status = response.status().as_u16(),
        elapsed = ?started.elapsed(),
        "Handled request"
    );
    response
}
