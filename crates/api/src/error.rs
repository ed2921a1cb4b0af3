use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use doclab_core::error::{DocError, ErrorCategory};
use doclab_core::uploads::UploadError;
use serde_json::json;

/// API error type rendered as a JSON error body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("validation failed on {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("unauthorized")]
    Unauthorized,

    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("service unavailable: {0}")]
    Unavailable(String),
}

impl From<DocError> for ApiError {
    fn from(err: DocError) -> Self {
        match (&err, err.category()) {
            (DocError::Validation(v), _) => ApiError::Validation {
                field: v.field(),
                message: v.to_string(),
            },
            (DocError::Section(_), _) => ApiError::Validation {
                field: "sections",
                message: err.to_string(),
            },
            (DocError::Upload(UploadError::TooLarge { .. }), _) => {
                ApiError::PayloadTooLarge(err.to_string())
            }
            (DocError::Upload(_), _) => ApiError::BadRequest(err.to_string()),
            // Forbidden and missing documents are indistinguishable to callers.
            (_, ErrorCategory::NotFound) => ApiError::NotFound("document not found".to_string()),
            (_, _) => ApiError::Unavailable(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message, field) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "notFound", msg.clone(), None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "badRequest", msg.clone(), None),
            ApiError::Validation { field, message } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation",
                message.clone(),
                Some(*field),
            ),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Authentication required".to_string(),
                None,
            ),
            ApiError::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "payloadTooLarge",
                msg.clone(),
                None,
            ),
            ApiError::Unavailable(msg) => {
                tracing::warn!("backend error: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "unavailable",
                    "The document service is unavailable, please retry".to_string(),
                    None,
                )
            }
        };

        let mut error = json!({
            "type": error_type,
            "message": message,
            "statusCode": status.as_u16(),
        });
        if let Some(field) = field {
            error["field"] = json!(field);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

/// Convenience type alias for route handlers.
pub type ApiResult<T> = Result<T, ApiError>;
