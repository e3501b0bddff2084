pub mod auth;
pub mod config;
pub mod db;
pub mod images;
pub mod response;
pub mod users;
pub mod validation;

use axum::{
    routing::{get, patch, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use auth::service::AuthService;
use auth::token::TokenService;
use config::Config;
use images::ImageClient;
use users::repository::UserRepository;
use users::service::UserService;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::handlers::register_handler,
        auth::handlers::login_handler,
        auth::handlers::logout_handler,
        auth::handlers::refresh_handler,
        users::handlers::list_users,
        users::handlers::get_me,
        users::handlers::get_user,
        users::handlers::update_me,
        users::handlers::update_user,
        users::handlers::delete_me,
        users::handlers::delete_user,
        users::handlers::update_role,
        users::handlers::update_role_by_email,
        users::handlers::upload_profile_image,
        users::handlers::delete_profile_image,
    ),
    components(
        schemas(
            auth::models::RegisterRequest,
            auth::models::LoginRequest,
            auth::models::RefreshRequest,
            auth::models::TokenPair,
            auth::models::AuthResponse,
            auth::models::RefreshResponse,
            users::models::Role,
            users::models::UserResponse,
            users::models::UpdateUserRequest,
            users::models::RoleUpdateRequest,
            users::models::RoleByEmailRequest,
        )
    ),
    tags(
        (name = "auth", description = "Registration, login, and token refresh endpoints"),
        (name = "users", description = "Profile, role, and profile-image endpoints")
    ),
    info(
        title = "User Management API",
        version = "1.0.0",
        description = "RESTful API for user accounts with JWT authentication and role-based access"
    )
)]
struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        let tokens = TokenService::new(config.jwt_secret.clone(), config.access_token_ttl_secs);
        Self {
            db,
            config: Arc::new(config),
            tokens,
        }
    }

    pub fn image_client(&self) -> ImageClient {
        ImageClient::new(self.config.image_host.clone())
    }

    pub fn auth_service(&self) -> AuthService {
        AuthService::new(
            UserRepository::new(self.db.clone()),
            self.tokens.clone(),
            self.image_client(),
        )
    }

    pub fn user_service(&self) -> UserService {
        UserService::new(UserRepository::new(self.db.clone()), self.image_client())
    }
}

/// Liveness endpoint for load balancers and container orchestration
async fn health_check() -> axum::Json<response::ApiResponse> {
    axum::Json(response::ApiResponse::message("Server is running"))
}

/// Creates and configures the application router
/// Maps all API endpoints to their handlers and adds CORS middleware
pub fn create_router(state: AppState) -> Router {
    use tower_http::cors::{Any, CorsLayer};

    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(health_check))
        // Authentication routes
        .route("/api/auth/register", post(auth::register_handler))
        .route("/api/auth/login", post(auth::login_handler))
        .route("/api/auth/logout", post(auth::logout_handler))
        .route("/api/auth/refresh", post(auth::refresh_handler))
        // User management routes; the static segments are registered
        // alongside the :id routes and take precedence
        .route("/api/users", get(users::list_users))
        .route("/api/users/role/by-email", patch(users::update_role_by_email))
        .route(
            "/api/users/me",
            get(users::get_me)
                .put(users::update_me)
                .delete(users::delete_me),
        )
        .route(
            "/api/users/me/image",
            post(users::upload_profile_image).delete(users::delete_profile_image),
        )
        .route(
            "/api/users/:id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/api/users/:id/role", patch(users::update_role))
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("User Management API - Starting...");

    let config = Config::from_env();

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");

    // Run SQLx migrations on startup
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations completed successfully");

    let addr = format!("{}:{}", config.host, config.port);
    let app = create_router(AppState::new(db_pool, config));

    // Start the Axum server
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("User Management API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app)
        .await
        .expect("Server error");
}

#[cfg(test)]
mod tests;
