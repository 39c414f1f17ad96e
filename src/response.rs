use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::scheduler::SchedulerError;
use crate::store::StoreError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub success: bool,
    pub code: String,
    pub message: String,
    pub trace_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
    pub is_operational: bool,
}

impl AppError {
    pub fn bad_request(code: &str, message: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: code.to_string(),
            message: message.to_string(),
            is_operational: true,
        }
    }

    pub fn unauthorized(message: &str) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code: "AUTH_UNAUTHORIZED".to_string(),
            message: message.to_string(),
            is_operational: true,
        }
    }

    pub fn not_found(code: &str, message: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: code.to_string(),
            message: message.to_string(),
            is_operational: true,
        }
    }

    pub fn payload_too_large(message: &str) -> Self {
        Self {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            code: "PAYLOAD_TOO_LARGE".to_string(),
            message: message.to_string(),
            is_operational: true,
        }
    }

    pub fn internal(message: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL_ERROR".to_string(),
            message: message.to_string(),
            is_operational: false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let exposed_message = if self.is_operational {
            self.message.clone()
        } else {
            "Internal server error".to_string()
        };

        if self.is_operational {
            tracing::warn!(status = %self.status, code = %self.code, error = %self.message, "API error");
        } else {
            tracing::error!(status = %self.status, code = %self.code, error = %self.message, "Internal API error");
        }

        (
            self.status,
            Json(ErrorBody {
                success: false,
                code: self.code,
                message: exposed_message,
                trace_id: None,
            }),
        )
            .into_response()
    }
}

// Validation messages describe caller input and are safe to expose; everything else is
// replaced by the generic message in `into_response`.
impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        match &value {
            StoreError::Validation(msg) => AppError::bad_request("INVALID_ARGUMENT", msg),
            _ => AppError::internal(&value.to_string()),
        }
    }
}

impl From<SchedulerError> for AppError {
    fn from(value: SchedulerError) -> Self {
        match value {
            SchedulerError::InvalidArgument(msg) => AppError::bad_request("INVALID_ARGUMENT", &msg),
            SchedulerError::NotFound { .. } => {
                AppError::not_found("REVIEW_NOT_FOUND", &value.to_string())
            }
            SchedulerError::StoreUnavailable(_) | SchedulerError::StreakUpdateFailed { .. } => {
                AppError::internal(&value.to_string())
            }
        }
    }
}

pub fn ok<T: Serialize>(data: T) -> impl IntoResponse {
    ok_with_warnings(data, Vec::new())
}

pub fn ok_with_warnings<T: Serialize>(data: T, warnings: Vec<String>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(ApiResponse {
            success: true,
            data,
            warnings,
        }),
    )
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    async fn body_json(resp: Response) -> serde_json::Value {
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn internal_error_is_redacted() {
        let resp = AppError::internal("sled io failure").into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(resp).await;
        assert_eq!(json["message"], "Internal server error");
        assert!(!json.to_string().contains("sled io failure"));
    }

    #[tokio::test]
    async fn invalid_argument_maps_to_400() {
        let err = SchedulerError::InvalidArgument("grade must be between 0 and 5, got 9".into());
        let resp = AppError::from(err).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["code"], "INVALID_ARGUMENT");
        assert!(json["message"].as_str().unwrap().contains("got 9"));
    }

    #[tokio::test]
    async fn not_found_maps_to_404() {
        let err = SchedulerError::NotFound {
            user_id: "u1".into(),
            item_id: "w1".into(),
        };
        let resp = AppError::from(err).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(resp).await["code"], "REVIEW_NOT_FOUND");
    }

    #[tokio::test]
    async fn warnings_are_omitted_when_empty() {
        let json = body_json(ok(1).into_response()).await;
        assert!(json.get("warnings").is_none());

        let json = body_json(ok_with_warnings(1, vec!["W".into()]).into_response()).await;
        assert_eq!(json["warnings"][0], "W");
    }
}
