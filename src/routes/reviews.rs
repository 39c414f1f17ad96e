use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::Router;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::constants::STREAK_UPDATE_FAILED;
use crate::extractors::JsonBody;
use crate::response::{ok, ok_with_warnings, AppError};
use crate::scheduler::{Grade, SchedulerError};
use crate::state::AppState;
use crate::store::operations::reviews::ReviewRecord;
use crate::store::operations::streaks::StreakState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(grade_review))
        .route("/due", get(list_due))
        .route("/:item_id", delete(remove_review))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GradeRequest {
    item_id: String,
    grade: Option<i64>,
    /// Free-response convention: `true` grades 5, `false` grades 2.
    correct: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GradeResponse {
    review: ReviewRecord,
    streak: Option<StreakState>,
}

async fn list_due(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let due = state.scheduler().list_due(&auth.user_id, Utc::now())?;
    Ok(ok(due))
}

async fn grade_review(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(req): JsonBody<GradeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let item_id = req.item_id.trim();
    if item_id.is_empty() {
        return Err(AppError::bad_request("INVALID_ARGUMENT", "itemId is required"));
    }
    let grade = match (req.grade, req.correct) {
        (Some(grade), _) => grade,
        (None, Some(correct)) => i64::from(Grade::from_answer(correct).value()),
        (None, None) => {
            return Err(AppError::bad_request(
                "INVALID_ARGUMENT",
                "either grade or correct is required",
            ))
        }
    };

    match state
        .scheduler()
        .grade_review(&auth.user_id, item_id, grade, Utc::now())
    {
        Ok(outcome) => Ok(ok_with_warnings(
            GradeResponse {
                review: outcome.review,
                streak: Some(outcome.streak),
            },
            Vec::new(),
        )),
        // the grade itself is committed; report the streak miss without failing the request
        Err(SchedulerError::StreakUpdateFailed { review, source }) => {
            tracing::error!(user_id = %auth.user_id, item_id, error = %source, "Streak not updated");
            Ok(ok_with_warnings(
                GradeResponse {
                    review: *review,
                    streak: None,
                },
                vec![STREAK_UPDATE_FAILED.to_string()],
            ))
        }
        Err(e) => Err(e.into()),
    }
}

async fn remove_review(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(item_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.scheduler().remove_review(&auth.user_id, &item_id)?;
    Ok(ok(serde_json::json!({ "itemId": item_id, "removed": true })))
}
