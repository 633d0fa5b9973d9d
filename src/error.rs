use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// The application's error type. Every variant maps to a non-2xx status
/// and the standard `{success: false, message}` envelope.
#[derive(Error, Debug)]
pub enum ApiError {
    /// No token, or a token that failed verification.
    #[error("{0}")]
    Unauthenticated(String),

    /// Valid token, wrong role.
    #[error("{0}")]
    Forbidden(String),

    /// A referenced entity is absent.
    #[error("{0}")]
    NotFound(String),

    /// Malformed or rejected input.
    #[error("{0}")]
    Validation(String),

    /// Uniqueness or state conflict.
    #[error("{0}")]
    Conflict(String),

    /// A database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Anything else unexpected.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthenticated(msg) => {
                tracing::warn!("authentication failed: {msg}");
                (StatusCode::UNAUTHORIZED, msg)
            }
            ApiError::Forbidden(msg) => {
                tracing::warn!("authorization failed: {msg}");
                (StatusCode::FORBIDDEN, msg)
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Database(ref e) => {
                tracing::error!(error = %e, "database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
            }
            ApiError::Internal(ref e) => {
                tracing::error!(error = %e, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
            }
        };

        (
            status,
            Json(json!({ "success": false, "message": message })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_taxonomy() {
        let cases = [
            (
                ApiError::Unauthenticated("no token".into()),
                StatusCode::UNAUTHORIZED,
            ),
            (
                ApiError::Forbidden("admins only".into()),
                StatusCode::FORBIDDEN,
            ),
            (
                ApiError::NotFound("Course not found".into()),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::Validation("Invalid email".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::Conflict("Email already registered".into()),
                StatusCode::CONFLICT,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn internal_hides_detail() {
        let err = ApiError::Internal(anyhow::anyhow!("connection refused to 10.0.0.3"));
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
