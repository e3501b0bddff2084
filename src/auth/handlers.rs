// HTTP handlers for authentication endpoints
// The outer layer normalizes JSON and multipart bodies into one structured
// request before anything reaches the auth service.

use crate::auth::{
    error::AuthError,
    middleware::{bearer_token, AuthenticatedUser},
    models::{AuthResponse, ImageUpload, LoginRequest, RefreshRequest, RefreshResponse, RegisterRequest},
};
use crate::response::ApiResponse;
use crate::AppState;
use axum::{
    extract::{FromRequest, Multipart, Request, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};

/// Register a new user
/// POST /api/auth/register
///
/// Accepts JSON or multipart form data; the multipart form may attach a
/// `profile_image` file.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered, token pair issued", body = AuthResponse),
        (status = 400, description = "Missing or invalid field"),
        (status = 409, description = "Email already registered")
    ),
    tag = "auth"
)]
pub async fn register_handler(
    State(state): State<AppState>,
    request: Request,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), AuthError> {
    let (payload, image) = parse_register_request(request, &state).await?;

    let response = state.auth_service().register(payload, image).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("User registered successfully", response)),
    ))
}

/// Normalize a register body into a structured request plus optional image
async fn parse_register_request(
    request: Request,
    state: &AppState,
) -> Result<(RegisterRequest, Option<ImageUpload>), AuthError> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("multipart/form-data"))
        .unwrap_or(false);

    if !is_multipart {
        let Json(payload) = Json::<RegisterRequest>::from_request(request, state)
            .await
            .map_err(|e| AuthError::Validation(e.body_text()))?;
        return Ok((payload, None));
    }

    let mut multipart = Multipart::from_request(request, state)
        .await
        .map_err(|e| AuthError::Validation(e.body_text()))?;

    let mut name = None;
    let mut email = None;
    let mut password = None;
    let mut phone = None;
    let mut address = None;
    let mut form_state = None;
    let mut city = None;
    let mut country = None;
    let mut pincode = None;
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AuthError::Validation(e.body_text()))?
    {
        let Some(field_name) = field.name().map(str::to_string) else {
            continue;
        };

        if field_name == "profile_image" {
            let filename = field.file_name().unwrap_or_default().to_string();
            if filename.is_empty() {
                continue;
            }
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AuthError::Validation(e.body_text()))?;
            image = Some(ImageUpload {
                filename,
                bytes: bytes.to_vec(),
            });
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AuthError::Validation(e.body_text()))?;

        match field_name.as_str() {
            "name" => name = Some(value),
            "email" => email = Some(value),
            "password" => password = Some(value),
            "phone" => phone = Some(value),
            "address" => address = Some(value),
            "state" => form_state = Some(value),
            "city" => city = Some(value),
            "country" => country = Some(value),
            "pincode" => pincode = Some(value),
            _ => {}
        }
    }

    // Missing required fields become empty strings and fail validation
    // downstream with a field-specific message
    let payload = RegisterRequest {
        name: name.unwrap_or_default(),
        email: email.unwrap_or_default(),
        password: password.unwrap_or_default(),
        phone,
        address,
        state: form_state,
        city,
        country,
        pincode,
    };

    Ok((payload, image))
}

/// Login with email or phone plus password
/// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, token pair issued", body = AuthResponse),
        (status = 400, description = "Missing credential"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, AuthError> {
    let response = state.auth_service().login(request).await?;
    Ok(Json(ApiResponse::success("Login successful", response)))
}

/// Logout (stateless tokens; the client discards them)
/// POST /api/auth/logout
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logout acknowledged"),
        (status = 401, description = "Missing or invalid access token")
    ),
    tag = "auth"
)]
pub async fn logout_handler(_user: AuthenticatedUser) -> Json<ApiResponse> {
    Json(ApiResponse::message("Logout successful"))
}

/// Refresh the token pair
/// POST /api/auth/refresh
///
/// The refresh token is read from the `refreshToken` body field first, then
/// from the Authorization header.
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New token pair issued", body = RefreshResponse),
        (status = 400, description = "Refresh token missing"),
        (status = 401, description = "Refresh token invalid or expired"),
        (status = 404, description = "User no longer exists")
    ),
    tag = "auth"
)]
pub async fn refresh_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<RefreshRequest>>,
) -> Result<Json<ApiResponse<RefreshResponse>>, AuthError> {
    let from_body = body
        .and_then(|Json(request)| request.refresh_token)
        .filter(|token| !token.is_empty());

    let token = match from_body {
        Some(token) => token,
        None => bearer_token(&headers)
            .map_err(|_| {
                AuthError::Validation(
                    "Refresh token is required in body or Authorization header".to_string(),
                )
            })?
            .to_string(),
    };

    let response = state.auth_service().refresh(&token).await?;
    Ok(Json(ApiResponse::success(
        "Token refreshed successfully",
        response,
    )))
}
