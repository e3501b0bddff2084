// Request authentication and role enforcement for protected routes

use crate::auth::{error::AuthError, token::TokenType};
use crate::users::models::{Role, User};
use crate::users::repository::UserRepository;
use crate::AppState;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use tracing::debug;

/// Pull the bearer token out of the Authorization header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken)?;

    auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidToken)
}

/// Authenticated caller extractor for protected routes
///
/// Verifies the bearer token (access type only; a refresh token presented
/// here is rejected) and re-resolves the subject against the users table, so
/// a still-valid token for a deleted account is turned away. The resolved
/// user lives only for the duration of the request.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;

        let claims = state.tokens.decode(token, TokenType::Access)?;
        let user_id = claims.user_id()?;

        let user = UserRepository::new(state.db.clone())
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        debug!("Authenticated user {} for {}", user.id, parts.uri.path());
        Ok(AuthenticatedUser(user))
    }
}

/// Admin-only extractor, layered on top of [`AuthenticatedUser`]
///
/// Identity resolution always runs first; the role check never sees an
/// unverified caller.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(user) = AuthenticatedUser::from_request_parts(parts, state).await?;

        if user.role != Role::Admin {
            return Err(AuthError::AdminRequired);
        }

        Ok(AdminUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_auth(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_extracted() {
        let headers = headers_with_auth("Bearer abc.def.ghi");
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_missing_header_rejected() {
        let headers = HeaderMap::new();
        assert!(matches!(
            bearer_token(&headers),
            Err(AuthError::MissingToken)
        ));
    }

    #[test]
    fn test_non_bearer_schemes_rejected() {
        for value in ["Basic dXNlcjpwYXNz", "token_without_scheme", "bearer abc"] {
            let headers = headers_with_auth(value);
            assert!(matches!(
                bearer_token(&headers),
                Err(AuthError::InvalidToken)
            ));
        }
    }
}
