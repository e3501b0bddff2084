// HTTP handlers for user management endpoints

use crate::auth::middleware::{AdminUser, AuthenticatedUser};
use crate::response::{ApiResponse, PaginatedResponse};
use crate::users::error::UserError;
use crate::users::models::{
    ListUsersQuery, RoleByEmailRequest, RoleUpdateRequest, UpdateUserRequest, UserResponse,
};
use crate::AppState;
use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};

/// List users with optional search and role filters
/// GET /api/users
#[utoipa::path(
    get,
    path = "/api/users",
    params(
        ("page" = Option<i64>, Query, description = "Page number, starting at 1"),
        ("limit" = Option<i64>, Query, description = "Page size, default 10"),
        ("search" = Option<String>, Query, description = "Substring match on name, email, or phone"),
        ("role" = Option<String>, Query, description = "Filter by role: user or admin")
    ),
    responses(
        (status = 200, description = "Paginated user list", body = [UserResponse]),
        (status = 401, description = "Missing or invalid access token"),
        (status = 403, description = "Caller is not an admin")
    ),
    tag = "users"
)]
pub async fn list_users(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<PaginatedResponse<UserResponse>>, UserError> {
    let (users, pagination) = state.user_service().list(query).await?;

    Ok(Json(PaginatedResponse::new(
        "Users retrieved successfully",
        users,
        pagination,
    )))
}

/// Fetch the caller's own profile
/// GET /api/users/me
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Caller profile", body = UserResponse),
        (status = 401, description = "Missing or invalid access token")
    ),
    tag = "users"
)]
pub async fn get_me(
    AuthenticatedUser(user): AuthenticatedUser,
) -> Json<ApiResponse<UserResponse>> {
    Json(ApiResponse::success(
        "User retrieved successfully",
        user.into(),
    ))
}

/// Fetch a user by id (owner or admin)
/// GET /api/users/:id
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "User profile", body = UserResponse),
        (status = 403, description = "Caller is neither the target user nor an admin"),
        (status = 404, description = "No such user")
    ),
    tag = "users"
)]
pub async fn get_user(
    AuthenticatedUser(caller): AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<UserResponse>>, UserError> {
    let user = state.user_service().get_user(&caller, id).await?;
    Ok(Json(ApiResponse::success(
        "User retrieved successfully",
        user,
    )))
}

/// Update the caller's own profile
/// PUT /api/users/me
#[utoipa::path(
    put,
    path = "/api/users/me",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserResponse),
        (status = 400, description = "Invalid field"),
        (status = 401, description = "Missing or invalid access token")
    ),
    tag = "users"
)]
pub async fn update_me(
    AuthenticatedUser(caller): AuthenticatedUser,
    State(state): State<AppState>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, UserError> {
    let target_id = caller.id;
    let user = state.user_service().update(&caller, target_id, request).await?;
    Ok(Json(ApiResponse::success("User updated successfully", user)))
}

/// Update a user by id (owner or admin)
/// PUT /api/users/:id
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = i32, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserResponse),
        (status = 403, description = "Caller is neither the target user nor an admin"),
        (status = 404, description = "No such user")
    ),
    tag = "users"
)]
pub async fn update_user(
    AuthenticatedUser(caller): AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, UserError> {
    let user = state.user_service().update(&caller, id, request).await?;
    Ok(Json(ApiResponse::success("User updated successfully", user)))
}

/// Delete the caller's own account
/// DELETE /api/users/me
#[utoipa::path(
    delete,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Account deleted"),
        (status = 401, description = "Missing or invalid access token")
    ),
    tag = "users"
)]
pub async fn delete_me(
    AuthenticatedUser(caller): AuthenticatedUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse>, UserError> {
    let target_id = caller.id;
    state.user_service().delete(&caller, target_id).await?;
    Ok(Json(ApiResponse::message("User deleted successfully")))
}

/// Delete a user by id (owner or admin)
/// DELETE /api/users/:id
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "Account deleted"),
        (status = 403, description = "Caller is neither the target user nor an admin"),
        (status = 404, description = "No such user")
    ),
    tag = "users"
)]
pub async fn delete_user(
    AuthenticatedUser(caller): AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse>, UserError> {
    state.user_service().delete(&caller, id).await?;
    Ok(Json(ApiResponse::message("User deleted successfully")))
}

/// Set a user's role by id
/// PATCH /api/users/:id/role
#[utoipa::path(
    patch,
    path = "/api/users/{id}/role",
    params(("id" = i32, Path, description = "User id")),
    request_body = RoleUpdateRequest,
    responses(
        (status = 200, description = "Role updated", body = UserResponse),
        (status = 400, description = "Unknown role value"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No such user")
    ),
    tag = "users"
)]
pub async fn update_role(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<RoleUpdateRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, UserError> {
    let user = state.user_service().update_role(id, &request.role).await?;
    Ok(Json(ApiResponse::success(
        "User role updated successfully",
        user,
    )))
}

/// Set a user's role by email
/// PATCH /api/users/role/by-email
#[utoipa::path(
    patch,
    path = "/api/users/role/by-email",
    request_body = RoleByEmailRequest,
    responses(
        (status = 200, description = "Role updated", body = UserResponse),
        (status = 400, description = "Unknown role value"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No user with that email")
    ),
    tag = "users"
)]
pub async fn update_role_by_email(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Json(request): Json<RoleByEmailRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, UserError> {
    let user = state
        .user_service()
        .update_role_by_email(&request.email, &request.role)
        .await?;
    Ok(Json(ApiResponse::success(
        "User role updated successfully",
        user,
    )))
}

/// Upload and set the caller's profile image
/// POST /api/users/me/image
///
/// Multipart body with a single `profile_image` file field.
#[utoipa::path(
    post,
    path = "/api/users/me/image",
    responses(
        (status = 200, description = "Profile image updated", body = UserResponse),
        (status = 400, description = "Missing file, bad type, or too large"),
        (status = 401, description = "Missing or invalid access token")
    ),
    tag = "users"
)]
pub async fn upload_profile_image(
    AuthenticatedUser(caller): AuthenticatedUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<UserResponse>>, UserError> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| UserError::Validation(e.body_text()))?
    {
        if field.name() != Some("profile_image") {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .filter(|f| !f.is_empty())
            .ok_or_else(|| UserError::Validation("profile_image file is required".to_string()))?;

        let bytes = field
            .bytes()
            .await
            .map_err(|e| UserError::Validation(e.body_text()))?;

        upload = Some((filename, bytes.to_vec()));
        break;
    }

    let (filename, bytes) = upload
        .ok_or_else(|| UserError::Validation("profile_image file is required".to_string()))?;

    let user = state
        .user_service()
        .set_profile_image(&caller, &filename, bytes)
        .await?;

    Ok(Json(ApiResponse::success(
        "Profile image updated successfully",
        user,
    )))
}

/// Remove the caller's profile image
/// DELETE /api/users/me/image
#[utoipa::path(
    delete,
    path = "/api/users/me/image",
    responses(
        (status = 200, description = "Profile image removed", body = UserResponse),
        (status = 400, description = "No profile image set"),
        (status = 401, description = "Missing or invalid access token")
    ),
    tag = "users"
)]
pub async fn delete_profile_image(
    AuthenticatedUser(caller): AuthenticatedUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<UserResponse>>, UserError> {
    let user = state.user_service().remove_profile_image(&caller).await?;
    Ok(Json(ApiResponse::success(
        "Profile image removed successfully",
        user,
    )))
}
