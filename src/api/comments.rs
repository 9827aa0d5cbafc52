//! Comment handlers.

use super::AppState;
use super::error::{invalid_body, invalid_fields};
use crate::error::Result;
use crate::model::{Comment, CommentPayload};
use crate::util::parse_bug_id;
use crate::validation::CommentValidator;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;

pub async fn create_comment(
    State(state): State<AppState>,
    Path(bug_id): Path<String>,
    payload: std::result::Result<Json<CommentPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Comment>)> {
    let bug_id = parse_bug_id(&bug_id)?;
    let Json(payload) = payload.map_err(|rejection| invalid_body(&rejection))?;
    let draft = CommentValidator::validate(&payload).map_err(invalid_fields)?;
    let comment = state.store.create_comment(bug_id, &draft)?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn list_comments(
    State(state): State<AppState>,
    Path(bug_id): Path<String>,
) -> Result<Json<Vec<Comment>>> {
    let bug_id = parse_bug_id(&bug_id)?;
    Ok(Json(state.store.get_comments(bug_id)?))
}
