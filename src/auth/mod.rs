// Authentication module
// Provides JWT-based authentication with user registration, login, and token
// refresh, plus the request extractors that gate protected routes

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod service;
pub mod token;

// Re-export commonly used types
pub use error::AuthError;
pub use handlers::{login_handler, logout_handler, refresh_handler, register_handler};
pub use middleware::{AdminUser, AuthenticatedUser};
pub use models::{AuthResponse, LoginRequest, RefreshRequest, RegisterRequest, TokenPair};
pub use service::AuthService;
pub use token::{TokenService, TokenType};

#[cfg(test)]
mod tests;
