//! Bug handlers.

use super::AppState;
use super::error::{invalid_body, invalid_fields};
use crate::error::Result;
use crate::model::{Bug, BugPayload, DeletedCount};
use crate::util::parse_bug_id;
use crate::validation::BugValidator;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;

pub async fn create_bug(
    State(state): State<AppState>,
    payload: std::result::Result<Json<BugPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Bug>)> {
    let Json(payload) = payload.map_err(|rejection| invalid_body(&rejection))?;
    let draft = BugValidator::validate(&payload).map_err(invalid_fields)?;
    let bug = state.store.create_bug(&draft)?;
    Ok((StatusCode::CREATED, Json(bug)))
}

pub async fn list_bugs(State(state): State<AppState>) -> Result<Json<Vec<Bug>>> {
    Ok(Json(state.store.get_all_bugs()?))
}

pub async fn get_bug(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Bug>> {
    let id = parse_bug_id(&id)?;
    Ok(Json(state.store.get_bug(id)?))
}

/// Path is checked before the body, so a bad ID wins over a bad payload.
pub async fn update_bug(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<BugPayload>, JsonRejection>,
) -> Result<Json<Bug>> {
    let id = parse_bug_id(&id)?;
    let Json(payload) = payload.map_err(|rejection| invalid_body(&rejection))?;
    let draft = BugValidator::validate(&payload).map_err(invalid_fields)?;
    Ok(Json(state.store.update_bug(id, &draft)?))
}

pub async fn delete_bug(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_bug_id(&id)?;
    state.store.delete_bug(id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_all_bugs(State(state): State<AppState>) -> Result<Json<DeletedCount>> {
    let deleted = state.store.delete_all_bugs()?;
    Ok(Json(DeletedCount { deleted }))
}
