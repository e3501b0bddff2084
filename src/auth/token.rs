// JWT token generation and validation service

use crate::auth::error::AuthError;
use crate::config::REFRESH_TOKEN_TTL_SECS;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Marker distinguishing the two token kinds. Both share one signing key and
/// encoding, so every decode checks the marker against the kind the call
/// site expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id, string-encoded
    pub sub: String,
    pub token_type: TokenType,
    /// Issued-at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

impl Claims {
    /// Parse the subject back into a user id
    pub fn user_id(&self) -> Result<i32, AuthError> {
        self.sub.parse().map_err(|_| AuthError::InvalidToken)
    }
}

/// Token service for JWT operations
///
/// The signing secret is loaded once at startup and never rotated for the
/// process lifetime. Access token lifetime is configurable; refresh tokens
/// are fixed at 30 days.
#[derive(Clone)]
pub struct TokenService {
    secret: String,
    access_token_ttl_secs: i64,
}

impl TokenService {
    pub fn new(secret: String, access_token_ttl_secs: i64) -> Self {
        Self {
            secret,
            access_token_ttl_secs,
        }
    }

    fn ttl_for(&self, token_type: TokenType) -> i64 {
        match token_type {
            TokenType::Access => self.access_token_ttl_secs,
            TokenType::Refresh => REFRESH_TOKEN_TTL_SECS,
        }
    }

    /// Issue a signed token of the given type for a user
    pub fn issue(&self, user_id: i32, token_type: TokenType) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();

        let claims = Claims {
            sub: user_id.to_string(),
            token_type,
            iat: now,
            exp: now + self.ttl_for(token_type),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AuthError::Token(e.to_string()))
    }

    /// Issue an access/refresh pair for a user
    pub fn issue_pair(&self, user_id: i32) -> Result<(String, String), AuthError> {
        let access = self.issue(user_id, TokenType::Access)?;
        let refresh = self.issue(user_id, TokenType::Refresh)?;
        Ok((access, refresh))
    }

    /// Verify signature and expiry, and require the expected token type.
    /// A refresh token where an access token is expected (or vice versa)
    /// is rejected as invalid.
    pub fn decode(&self, token: &str, expected: TokenType) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
            _ => AuthError::InvalidToken,
        })?;

        if data.claims.token_type != expected {
            return Err(AuthError::InvalidToken);
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // Helper to create a test token service with a 1 hour access TTL
    fn test_token_service() -> TokenService {
        TokenService::new("test_secret_key_for_testing_purposes".to_string(), 3600)
    }

    // Helper to hand-craft a token with arbitrary claims
    fn encode_raw(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_access_token_round_trip() {
        let service = test_token_service();
        let token = service.issue(42, TokenType::Access).unwrap();
        let claims = service.decode(&token, TokenType::Access).unwrap();

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.user_id().unwrap(), 42);
        assert_eq!(claims.token_type, TokenType::Access);
    }

    #[test]
    fn test_access_token_expiration_matches_configured_ttl() {
        let service = test_token_service();
        let token = service.issue(1, TokenType::Access).unwrap();
        let claims = service.decode(&token, TokenType::Access).unwrap();

        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_refresh_token_expiration_is_30_days() {
        let service = test_token_service();
        let token = service.issue(1, TokenType::Refresh).unwrap();
        let claims = service.decode(&token, TokenType::Refresh).unwrap();

        assert_eq!(claims.exp - claims.iat, 30 * 24 * 60 * 60);
    }

    #[test]
    fn test_token_pair_tokens_differ() {
        let service = test_token_service();
        let (access, refresh) = service.issue_pair(1).unwrap();

        assert_ne!(access, refresh);
        assert!(service.decode(&access, TokenType::Access).is_ok());
        assert!(service.decode(&refresh, TokenType::Refresh).is_ok());
    }

    #[test]
    fn test_type_confusion_rejected_both_directions() {
        let service = test_token_service();
        let access = service.issue(1, TokenType::Access).unwrap();
        let refresh = service.issue(1, TokenType::Refresh).unwrap();

        // A refresh token is never accepted where an access token is expected
        assert!(matches!(
            service.decode(&refresh, TokenType::Access),
            Err(AuthError::InvalidToken)
        ));
        // And the other way around
        assert!(matches!(
            service.decode(&access, TokenType::Refresh),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = test_token_service();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "1".to_string(),
            token_type: TokenType::Access,
            iat: now - 1000,
            exp: now - 500,
        };
        let token = encode_raw(&claims, "test_secret_key_for_testing_purposes");

        assert!(matches!(
            service.decode(&token, TokenType::Access),
            Err(AuthError::ExpiredToken)
        ));
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        let service = test_token_service();

        for token in ["", "not.a.token", "garbage"] {
            assert!(matches!(
                service.decode(token, TokenType::Access),
                Err(AuthError::InvalidToken)
            ));
        }
    }

    #[test]
    fn test_tampered_token_rejected() {
        let service = test_token_service();
        let token = service.issue(1, TokenType::Access).unwrap();

        // Flip a character in the payload segment
        let mut tampered: Vec<char> = token.chars().collect();
        let mid = tampered.len() / 2;
        tampered[mid] = if tampered[mid] == 'a' { 'b' } else { 'a' };
        let tampered: String = tampered.into_iter().collect();

        assert!(service.decode(&tampered, TokenType::Access).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = TokenService::new("secret1".to_string(), 3600);
        let verifier = TokenService::new("secret2".to_string(), 3600);

        let token = issuer.issue(1, TokenType::Access).unwrap();
        assert!(issuer.decode(&token, TokenType::Access).is_ok());
        assert!(matches!(
            verifier.decode(&token, TokenType::Access),
            Err(AuthError::InvalidToken)
        ));
    }

    proptest! {
        // Round-trip holds for any user id
        #[test]
        fn prop_round_trip_preserves_subject(user_id in 1i32..1_000_000) {
            let service = test_token_service();
            let token = service.issue(user_id, TokenType::Access)?;
            let claims = service.decode(&token, TokenType::Access)?;
            prop_assert_eq!(claims.user_id().unwrap(), user_id);
        }

        // Random strings are never valid tokens
        #[test]
        fn prop_random_strings_rejected(garbage in "[a-zA-Z0-9]{10,60}") {
            let service = test_token_service();
            prop_assert!(service.decode(&garbage, TokenType::Access).is_err());
        }

        // Refresh tokens issued for any user are rejected as access tokens
        #[test]
        fn prop_refresh_never_passes_as_access(user_id in 1i32..1_000_000) {
            let service = test_token_service();
            let refresh = service.issue(user_id, TokenType::Refresh)?;
            prop_assert!(service.decode(&refresh, TokenType::Access).is_err());
        }
    }
}
