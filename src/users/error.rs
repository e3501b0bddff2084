// User management error types

use crate::images::ImageError;
use crate::response::ApiResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::fmt;

/// Errors produced by the user management endpoints
#[derive(Debug)]
pub enum UserError {
    /// Missing or malformed input
    Validation(String),
    /// Caller is neither the target user nor an admin
    Forbidden,
    /// No user with the requested id/email
    NotFound,
    /// Image upload/delete rejected or failed on an explicit image endpoint
    Image(ImageError),
    /// Database failure; detail is logged, never sent to the client
    Database(String),
}

impl fmt::Display for UserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserError::Validation(msg) => write!(f, "Validation error: {}", msg),
            UserError::Forbidden => write!(f, "Access denied"),
            UserError::NotFound => write!(f, "User not found"),
            UserError::Image(err) => write!(f, "Image error: {}", err),
            UserError::Database(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for UserError {}

impl From<sqlx::Error> for UserError {
    fn from(err: sqlx::Error) -> Self {
        UserError::Database(err.to_string())
    }
}

impl From<ImageError> for UserError {
    fn from(err: ImageError) -> Self {
        UserError::Image(err)
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            UserError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            UserError::Forbidden => {
                tracing::warn!("Forbidden user operation attempted");
                (StatusCode::FORBIDDEN, "Access denied".to_string())
            }
            UserError::NotFound => (StatusCode::NOT_FOUND, "User not found".to_string()),
            UserError::Image(err) => {
                tracing::warn!("Image operation failed: {}", err);
                (StatusCode::BAD_REQUEST, err.client_message())
            }
            UserError::Database(msg) => {
                tracing::error!("Database error in users module: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ApiResponse::<serde_json::Value>::error(message));
        (status, body).into_response()
    }
}
