//! Error handling for the bookshelf HTTP layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Body for user-correctable failures: `{"status": "fail", "message": ...}`
#[derive(Debug, Serialize)]
pub struct FailBody {
    pub status: &'static str,
    pub message: String,
}

/// Body for unhandled failures: `{"error": ...}`
#[derive(Debug, Serialize)]
pub struct InternalErrorBody {
    pub error: String,
}

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("bad request: {message}")]
    BadRequest { message: String },

    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("payload too large: {message}")]
    PayloadTooLarge { message: String },

    /// No route matched the method and path.
    #[error("Not Found")]
    RouteNotFound,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::PayloadTooLarge {
            message: message.into(),
        }
    }

    /// Wrap any error as an unhandled failure, keeping its message verbatim.
    pub fn internal<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Internal(anyhow::Error::new(error))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } | AppError::RouteNotFound => StatusCode::NOT_FOUND,
            AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_id = Uuid::now_v7();
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(
                error_id = %error_id,
                status_code = %status.as_u16(),
                error = %self,
                "Request error"
            );
        } else {
            tracing::warn!(
                error_id = %error_id,
                status_code = %status.as_u16(),
                error = %self,
                "Request failed"
            );
        }

        match self {
            AppError::BadRequest { message }
            | AppError::NotFound { message }
            | AppError::PayloadTooLarge { message } => (
                status,
                Json(FailBody {
                    status: "fail",
                    message,
                }),
            )
                .into_response(),
            AppError::RouteNotFound => (
                status,
                Json(FailBody {
                    status: "error",
                    message: "Not Found".to_string(),
                }),
            )
                .into_response(),
            AppError::Internal(e) => (
                status,
                Json(InternalErrorBody {
                    error: e.to_string(),
                }),
            )
                .into_response(),
        }
    }
}

/// Fallback handler for unmatched paths and unrouted methods
pub async fn route_not_found() -> AppError {
    AppError::RouteNotFound
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::header::CONTENT_TYPE;
    use serde_json::{json, Value};

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn bad_request_uses_fail_shape() {
        let response = AppError::bad_request("readPage too large").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[CONTENT_TYPE].to_str().unwrap(),
            "application/json"
        );
        assert_eq!(
            body_json(response).await,
            json!({"status": "fail", "message": "readPage too large"})
        );
    }

    #[tokio::test]
    async fn not_found_uses_fail_shape() {
        let response = AppError::not_found("Book not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            json!({"status": "fail", "message": "Book not found"})
        );
    }

    #[tokio::test]
    async fn payload_too_large_uses_fail_shape() {
        let response = AppError::payload_too_large("Request body is too large").into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            body_json(response).await,
            json!({"status": "fail", "message": "Request body is too large"})
        );
    }

    #[tokio::test]
    async fn route_miss_uses_error_shape() {
        let response = route_not_found().await.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            json!({"status": "error", "message": "Not Found"})
        );
    }

    #[tokio::test]
    async fn internal_error_passes_message_through() {
        let error = AppError::Internal(anyhow::anyhow!("Database connection failed"));
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({"error": "Database connection failed"})
        );
    }

    #[test]
    fn internal_wraps_std_errors() {
        let parse = "x".parse::<i32>().unwrap_err();
        let error = AppError::internal(parse);
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.to_string(), "invalid digit found in string");
    }
}
