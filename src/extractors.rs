use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use serde::de::DeserializeOwned;

use crate::response::AppError;

/// `axum::Json<T>` that rejects with the JSON error envelope instead of plain text.
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        axum::Json::<T>::from_request(req, state)
            .await
            .map(|axum::Json(value)| JsonBody(value))
            .map_err(rejection_to_app_error)
    }
}

fn rejection_to_app_error(rejection: JsonRejection) -> AppError {
    tracing::warn!(error = %rejection, "Rejected JSON request body");
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::payload_too_large("Request body is too large");
    }
    let message = match &rejection {
        JsonRejection::JsonDataError(_) => "Request body has missing or mistyped fields",
        JsonRejection::JsonSyntaxError(_) => "Request body is not valid JSON",
        JsonRejection::MissingJsonContentType(_) => "Expected Content-Type: application/json",
        _ => "Request body could not be read",
    };
    AppError::bad_request("INVALID_REQUEST_BODY", message)
}
