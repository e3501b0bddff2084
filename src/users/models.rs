// User data models and DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use validator::Validate;

/// User role for authorization decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(()),
        }
    }
}

/// User database model
/// The password hash never leaves this struct; outward serialization goes
/// through [`UserResponse`]
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub profile_image: Option<String>,
    pub address: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub pincode: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User response model (excludes password_hash)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub profile_image: Option<String>,
    pub address: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub pincode: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            profile_image: user.profile_image,
            address: user.address,
            state: user.state,
            city: user.city,
            country: user.country,
            pincode: user.pincode,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Columns for inserting a new user row
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub address: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub pincode: Option<String>,
    pub role: Role,
}

/// Partial update applied to an existing user row; `None` keeps the
/// current value
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub pincode: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
}

/// Profile update request DTO
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub pincode: Option<String>,
    #[validate(length(min = 8))]
    pub password: Option<String>,
    /// Only honored when the caller is an admin
    #[validate(custom = "crate::validation::validate_role_value")]
    pub role: Option<String>,
}

/// Role update request DTO (admin only)
#[derive(Debug, Deserialize, ToSchema)]
pub struct RoleUpdateRequest {
    pub role: String,
}

/// Role update by email request DTO (admin only)
#[derive(Debug, Deserialize, ToSchema)]
pub struct RoleByEmailRequest {
    pub email: String,
    pub role: String,
}

/// Query parameters for the admin user listing
#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub role: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_strings() {
        assert_eq!("user".parse::<Role>(), Ok(Role::User));
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert!("root".parse::<Role>().is_err());
        assert_eq!(Role::Admin.to_string(), "admin");
    }

    #[test]
    fn test_update_request_rejects_unknown_role() {
        let request = UpdateUserRequest {
            name: None,
            phone: None,
            address: None,
            state: None,
            city: None,
            country: None,
            pincode: None,
            password: None,
            role: Some("root".to_string()),
        };
        assert!(request.validate().is_err());

        let request = UpdateUserRequest {
            role: Some("admin".to_string()),
            ..request
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_user_response_excludes_password_hash() {
        let user = User {
            id: 7,
            name: Some("Alice".to_string()),
            email: "a@x.com".to_string(),
            phone: None,
            password_hash: "$argon2id$not-for-the-wire".to_string(),
            profile_image: None,
            address: None,
            state: None,
            city: None,
            country: None,
            pincode: None,
            role: Role::User,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let serialized = serde_json::to_string(&UserResponse::from(user)).unwrap();
        assert!(!serialized.contains("argon2"));
        assert!(!serialized.contains("password"));
        assert!(serialized.contains("\"email\":\"a@x.com\""));
    }
}
