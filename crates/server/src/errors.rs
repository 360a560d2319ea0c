use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::auth::errors::AuthError;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::error;

/// Failures of the dispatch endpoint. Field-level problems are not here;
/// they travel inside the operation result.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),
    #[error("unknown operation: {0}")]
    UnknownOperation(String),
    #[error("invalid options for `{operation}`: {reason}")]
    InvalidOptions { operation: &'static str, reason: String },
    #[error("schema not installed")]
    SchemaNotInstalled,
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidBody(_) | ApiError::UnknownOperation(_) | ApiError::InvalidOptions { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::SchemaNotInstalled
            | ApiError::Auth(_)
            | ApiError::Service(_)
            | ApiError::Serialize(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status.is_server_error() {
            match &self {
                ApiError::Auth(e) => error!(error = %e, code = e.code(), "operation failed"),
                other => error!(error = %other, "operation failed"),
            }
            "internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(serde_json::json!({ "errors": [{ "message": message }] }))).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("migration failed: {0}")]
    Migration(String),
}
