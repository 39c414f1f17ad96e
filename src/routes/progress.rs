use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{delete, get};
use axum::Router;
use chrono::Utc;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::extractors::JsonBody;
use crate::response::{ok, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_progress).post(complete_item))
        .route("/:lesson_id", get(lesson_progress))
        .route("/:lesson_id/items/:item_id", delete(uncomplete_item))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompleteItemRequest {
    lesson_id: i64,
    item_id: String,
}

/// Lesson ids in paths are plain decimal digits.
fn parse_lesson_id(raw: &str) -> Result<i64, AppError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::bad_request(
            "INVALID_ARGUMENT",
            "lessonId must be a number",
        ));
    }
    raw.parse::<i64>()
        .map_err(|_| AppError::bad_request("INVALID_ARGUMENT", "lessonId is out of range"))
}

async fn list_progress(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.scheduler().list_progress(&auth.user_id)?))
}

async fn complete_item(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(req): JsonBody<CompleteItemRequest>,
) -> Result<impl IntoResponse, AppError> {
    let progress =
        state
            .scheduler()
            .complete_item(&auth.user_id, req.lesson_id, req.item_id.trim(), Utc::now())?;
    Ok(ok(progress))
}

async fn lesson_progress(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(lesson_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let lesson_id = parse_lesson_id(&lesson_id)?;
    Ok(ok(state
        .scheduler()
        .lesson_progress(&auth.user_id, lesson_id, Utc::now())?))
}

async fn uncomplete_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((lesson_id, item_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let lesson_id = parse_lesson_id(&lesson_id)?;
    let progress =
        state
            .scheduler()
            .uncomplete_item(&auth.user_id, lesson_id, &item_id, Utc::now())?;
    Ok(ok(progress))
}
