// Authentication service - business logic layer

use crate::auth::{
    error::AuthError,
    models::{AuthResponse, ImageUpload, LoginRequest, RefreshResponse, RegisterRequest, TokenPair},
    password::PasswordService,
    token::{TokenService, TokenType},
};
use crate::images::ImageClient;
use crate::users::models::{NewUser, Role};
use crate::users::repository::UserRepository;
use validator::Validate;

/// Authentication service coordinating registration, login, and refresh
#[derive(Clone)]
pub struct AuthService {
    users: UserRepository,
    tokens: TokenService,
    images: ImageClient,
}

impl AuthService {
    pub fn new(users: UserRepository, tokens: TokenService, images: ImageClient) -> Self {
        Self {
            users,
            tokens,
            images,
        }
    }

    /// Register a new user and issue their first token pair
    ///
    /// A profile image, when attached, is handled best-effort: a failed
    /// upload or a failed image-column write is logged and registration
    /// still succeeds without an image.
    pub async fn register(
        &self,
        request: RegisterRequest,
        image: Option<ImageUpload>,
    ) -> Result<AuthResponse, AuthError> {
        // 1. Validate request
        request
            .validate()
            .map_err(|e| AuthError::Validation(format!("Validation failed: {}", e)))?;

        // 2. Reject duplicate emails (the unique index catches races)
        if self.users.email_exists(&request.email).await? {
            return Err(AuthError::EmailTaken);
        }

        // 3. Hash the password; plaintext is never persisted
        let password_hash = PasswordService::hash_password(&request.password)?;

        // 4. Persist the identity; self-registration is always `user`
        let new_user = NewUser {
            name: request.name,
            email: request.email,
            phone: request.phone,
            password_hash,
            address: request.address,
            state: request.state,
            city: request.city,
            country: request.country,
            pincode: request.pincode,
            role: Role::User,
        };
        let mut user = self.users.create(&new_user).await?;

        // 5. Best-effort image upload, now that we have an id to name it by.
        //    The user row is already committed, so neither a failed upload
        //    nor a failed column write is allowed to abort the registration.
        if let Some(image) = image {
            match self.images.upload(user.id, &image.filename, image.bytes).await {
                Ok(uploaded) => match self
                    .users
                    .set_profile_image(user.id, Some(&uploaded.url))
                    .await
                {
                    Ok(Some(updated)) => user = updated,
                    Ok(None) => {}
                    Err(e) => {
                        tracing::warn!(
                            "Failed to record profile image for user {}: {}",
                            user.id,
                            e
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        "Profile image upload failed during registration of user {}: {}",
                        user.id,
                        e
                    );
                }
            }
        }

        // 6. Issue the first token pair
        let tokens = self.token_pair(user.id)?;

        tracing::info!("Registered user {} ({})", user.id, user.email);
        Ok(AuthResponse {
            user: user.into(),
            tokens,
        })
    }

    /// Authenticate by email or phone plus password
    ///
    /// Unknown identifier and wrong password produce the identical
    /// `InvalidCredentials` error so neither case is distinguishable.
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AuthError> {
        // 1. Validate: some identifier and a password are required
        let email = request.email.as_deref().filter(|e| !e.is_empty());
        let phone = request.phone.as_deref().filter(|p| !p.is_empty());
        if email.is_none() && phone.is_none() {
            return Err(AuthError::Validation(
                "Email or phone is required".to_string(),
            ));
        }

        let password = match request.password.as_deref() {
            Some(p) if !p.is_empty() => p,
            _ => return Err(AuthError::Validation("Password is required".to_string())),
        };

        // 2. Resolve the identity; email wins when both are supplied
        let user = if let Some(email) = email {
            self.users.find_by_email(email).await?
        } else if let Some(phone) = phone {
            self.users.find_by_phone(phone).await?
        } else {
            return Err(AuthError::Validation(
                "Email or phone is required".to_string(),
            ));
        };

        let user = user.ok_or(AuthError::InvalidCredentials)?;

        // 3. Verify the password
        if !PasswordService::verify_password(password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        // 4. Issue a fresh token pair
        let tokens = self.token_pair(user.id)?;

        tracing::debug!("User {} logged in", user.id);
        Ok(AuthResponse {
            user: user.into(),
            tokens,
        })
    }

    /// Exchange a valid refresh token for a rotated token pair
    ///
    /// Rotation issues a brand-new access AND refresh token. There is no
    /// revocation store, so the old refresh token stays independently valid
    /// until its own expiry; two concurrent refreshes with the same token
    /// both succeed and return distinct pairs.
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, AuthError> {
        // 1. Decode, requiring the refresh type; an access token here is
        //    rejected outright
        let claims = self.tokens.decode(refresh_token, TokenType::Refresh)?;
        let user_id = claims.user_id()?;

        // 2. The subject must still resolve to an existing user
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        // 3. Rotate
        let tokens = self.token_pair(user.id)?;

        tracing::debug!("Rotated token pair for user {}", user.id);
        Ok(RefreshResponse { tokens })
    }

    fn token_pair(&self, user_id: i32) -> Result<TokenPair, AuthError> {
        let (access_token, refresh_token) = self.tokens.issue_pair(user_id)?;
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}
