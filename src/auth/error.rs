// Authentication and authorization error types

use crate::response::ApiResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::fmt;
use tracing::{error, warn};

/// Authentication and authorization error types
#[derive(Debug)]
pub enum AuthError {
    /// Missing/malformed input (400)
    Validation(String),
    /// Unknown identity or wrong password; message is deliberately uniform
    /// so the two cases are indistinguishable (401)
    InvalidCredentials,
    /// Token malformed, bad signature, or wrong type (401)
    InvalidToken,
    /// Token past its expiry (401)
    ExpiredToken,
    /// No bearer token supplied on a protected route (401)
    MissingToken,
    /// Email already registered (409)
    EmailTaken,
    /// Token subject no longer resolves to an existing user (404)
    UserNotFound,
    /// Caller lacks the admin role (403)
    AdminRequired,
    /// Password hashing failed (500)
    Hash,
    /// Token signing failed (500)
    Token(String),
    /// Database failure; detail is logged, never sent to the client (500)
    Database(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Validation(msg) => write!(f, "Validation error: {}", msg),
            AuthError::InvalidCredentials => write!(f, "Invalid credentials"),
            AuthError::InvalidToken => write!(f, "Invalid token"),
            AuthError::ExpiredToken => write!(f, "Token has expired"),
            AuthError::MissingToken => write!(f, "Missing authentication token"),
            AuthError::EmailTaken => write!(f, "Email already registered"),
            AuthError::UserNotFound => write!(f, "User not found"),
            AuthError::AdminRequired => write!(f, "Admin access required"),
            AuthError::Hash => write!(f, "Password hashing error"),
            AuthError::Token(msg) => write!(f, "Token generation error: {}", msg),
            AuthError::Database(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        // A duplicate email insert races past the pre-check sometimes;
        // map the unique violation to the same conflict error
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return AuthError::EmailTaken;
            }
        }
        AuthError::Database(err.to_string())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AuthError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AuthError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
            }
            AuthError::InvalidToken => {
                warn!("Invalid token attempt");
                (StatusCode::UNAUTHORIZED, "Invalid token".to_string())
            }
            AuthError::ExpiredToken => {
                warn!("Expired token attempt");
                (StatusCode::UNAUTHORIZED, "Token has expired".to_string())
            }
            AuthError::MissingToken => {
                warn!("Missing token in request");
                (
                    StatusCode::UNAUTHORIZED,
                    "Missing authentication token".to_string(),
                )
            }
            AuthError::EmailTaken => (
                StatusCode::CONFLICT,
                "Email already registered".to_string(),
            ),
            AuthError::UserNotFound => (StatusCode::NOT_FOUND, "User not found".to_string()),
            AuthError::AdminRequired => {
                warn!("Admin-only endpoint hit by non-admin");
                (StatusCode::FORBIDDEN, "Admin access required".to_string())
            }
            AuthError::Hash => {
                error!("Password hashing error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AuthError::Token(msg) => {
                error!("Token generation error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AuthError::Database(msg) => {
                error!("Database error in auth: {}", msg);
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

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials
            | AuthError::InvalidToken
            | AuthError::ExpiredToken
            | AuthError::MissingToken => StatusCode::UNAUTHORIZED,
            AuthError::EmailTaken => StatusCode::CONFLICT,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::AdminRequired => StatusCode::FORBIDDEN,
            AuthError::Hash | AuthError::Token(_) | AuthError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
