//! Custom error types for the API service
//!
//! Every error becomes the uniform envelope `{"errors": [...]}` so clients
//! never have to distinguish between field errors and top-level failures.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    extract::{FromRequest, FromRequestParts},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Invalid input, reported as a flattened list of field error messages
    #[error("Validation failed")]
    Validation(Vec<String>),

    /// Missing or invalid credentials
    #[error("Unauthorized")]
    Unauthorized,

    /// Acting on another owner's resource
    #[error("Forbidden")]
    Forbidden,

    /// Referenced entity does not exist
    #[error("{0}")]
    NotFound(String),

    /// Genuine infrastructure failure; detail is logged, never leaked
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Shorthand for a single field error
    pub fn field(message: impl Into<String>) -> Self {
        ApiError::Validation(vec![message.into()])
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, errors) = match self {
            ApiError::Validation(errors) => (StatusCode::BAD_REQUEST, errors),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                vec!["Authentication credentials were not provided or are invalid.".to_string()],
            ),
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                vec!["You do not have permission to perform this action.".to_string()],
            ),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, vec![message]),
            ApiError::Internal(err) => {
                tracing::error!("Internal server error: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    vec!["Internal server error.".to_string()],
                )
            }
        };

        let body = Json(json!({ "errors": errors }));
        (status, body).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::field(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::field(rejection.body_text())
    }
}

/// JSON body extractor whose rejections go through the error envelope
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

/// Query string extractor whose rejections go through the error envelope
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct AppQuery<T>(pub T);

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn validation_errors_are_flattened_into_one_list() {
        let err = ApiError::Validation(vec![
            "Passwords don't match!".to_string(),
            "Invalid phone number.".to_string(),
        ]);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(
            body,
            serde_json::json!({
                "errors": ["Passwords don't match!", "Invalid phone number."]
            })
        );
    }

    #[tokio::test]
    async fn not_found_uses_the_envelope() {
        let response = ApiError::NotFound("User with this email does not exist.".to_string())
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["errors"][0], "User with this email does not exist.");
    }

    #[tokio::test]
    async fn internal_errors_never_leak_detail() {
        let response = ApiError::Internal(anyhow::anyhow!("connection refused")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["errors"][0], "Internal server error.");
    }
}
