use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use folio_core::CoreError;
use folio_storage::StorageError;
use serde_json::json;

/// Error type for HTTP handlers.
///
/// Wraps [`StorageError`] (which in turn carries [`CoreError`]) and adds the
/// HTTP-only failures. Every variant renders as `{"error": ..., "code": ...}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Missing or empty x-owner-id header")]
    Unauthorized,

    #[error("Server is in read-only mode")]
    ReadOnly,

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::Storage(StorageError::Core(err))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut details = None;
        let (status, code, message) = match &self {
            ApiError::Storage(StorageError::Core(core)) => match core {
                CoreError::Validation { issues } => {
                    details = Some(issues.clone());
                    (
                        StatusCode::UNPROCESSABLE_ENTITY,
                        "VALIDATION_ERROR",
                        core.to_string(),
                    )
                }
                CoreError::NotFound { .. } => {
                    (StatusCode::NOT_FOUND, "NOT_FOUND", core.to_string())
                }
                CoreError::Range { .. } => {
                    (StatusCode::BAD_REQUEST, "OUT_OF_RANGE", core.to_string())
                }
                CoreError::Parse(_) => (StatusCode::BAD_REQUEST, "PARSE_ERROR", core.to_string()),
                CoreError::Precondition(msg) => {
                    (StatusCode::CONFLICT, "PRECONDITION_FAILED", msg.clone())
                }
                CoreError::Serialization(err) => internal("Serialization error", err),
            },
            ApiError::Storage(StorageError::Database(err)) => internal("Database error", err),
            ApiError::Storage(other) => internal("Storage error", other),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", self.to_string()),
            ApiError::ReadOnly => (StatusCode::FORBIDDEN, "READ_ONLY", self.to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let Some(issues) = details {
            body["issues"] = json!(issues);
        }

        (status, axum::Json(body)).into_response()
    }
}

fn internal(
    context: &str,
    err: &dyn std::fmt::Display,
) -> (StatusCode, &'static str, String) {
    tracing::error!(error = %err, "{}", context);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                ApiError::from(CoreError::Validation { issues: vec!["x".into()] }),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ApiError::from(CoreError::version_not_found("v1")),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::from(CoreError::Range { index: 4, len: 2 }),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::from(CoreError::Precondition("nothing saved".into())),
                StatusCode::CONFLICT,
            ),
            (ApiError::Unauthorized, StatusCode::UNAUTHORIZED),
            (ApiError::ReadOnly, StatusCode::FORBIDDEN),
            (
                ApiError::Storage(StorageError::Io(std::io::Error::other("disk full"))),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
