// Application configuration loaded once at startup

/// Refresh tokens are long-lived and not independently tunable
pub const REFRESH_TOKEN_TTL_SECS: i64 = 30 * 24 * 60 * 60;

/// Default access token lifetime (1 hour)
const DEFAULT_ACCESS_TOKEN_TTL_SECS: i64 = 3600;

/// Default maximum profile image size (2 MiB)
const DEFAULT_MAX_FILE_SIZE: usize = 2 * 1024 * 1024;

/// Process-wide configuration, built from environment variables once at
/// startup and injected into the services that need it. Nothing reads the
/// environment after this point.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: String,
    pub jwt_secret: String,
    pub access_token_ttl_secs: i64,
    pub image_host: ImageHostConfig,
}

/// Settings for the third-party image host (Cloudinary-style upload API)
#[derive(Debug, Clone)]
pub struct ImageHostConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: String,
    pub max_file_size: usize,
    pub allowed_extensions: Vec<String>,
}

impl Config {
    /// Build the configuration from environment variables.
    /// DATABASE_URL and JWT_SECRET are required; everything else has a
    /// sensible default so local development works out of the box.
    pub fn from_env() -> Self {
        let database_url =
            std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");
        let jwt_secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in environment");

        let access_token_ttl_secs = std::env::var("JWT_ACCESS_TOKEN_EXPIRES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_ACCESS_TOKEN_TTL_SECS);

        let max_file_size = std::env::var("MAX_FILE_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_FILE_SIZE);

        let allowed_extensions = std::env::var("ALLOWED_EXTENSIONS")
            .unwrap_or_else(|_| "jpg,jpeg,png,webp".to_string())
            .split(',')
            .map(|ext| ext.trim().to_lowercase())
            .collect();

        Self {
            database_url,
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT").unwrap_or_else(|_| "8080".to_string()),
            jwt_secret,
            access_token_ttl_secs,
            image_host: ImageHostConfig {
                cloud_name: std::env::var("CLOUDINARY_CLOUD_NAME").unwrap_or_default(),
                api_key: std::env::var("CLOUDINARY_API_KEY").unwrap_or_default(),
                api_secret: std::env::var("CLOUDINARY_API_SECRET").unwrap_or_default(),
                folder: std::env::var("CLOUDINARY_FOLDER")
                    .unwrap_or_else(|_| "user_management_system/profile_images".to_string()),
                max_file_size,
                allowed_extensions,
            },
        }
    }
}

#[cfg(test)]
impl Config {
    /// Fixed configuration for tests, no environment access
    pub fn for_tests() -> Self {
        Self {
            database_url: String::new(),
            host: "127.0.0.1".to_string(),
            port: "0".to_string(),
            jwt_secret: "test_secret_key_for_testing_purposes".to_string(),
            access_token_ttl_secs: DEFAULT_ACCESS_TOKEN_TTL_SECS,
            image_host: ImageHostConfig {
                cloud_name: "test-cloud".to_string(),
                api_key: "key".to_string(),
                api_secret: "secret".to_string(),
                folder: "test/profile_images".to_string(),
                max_file_size: DEFAULT_MAX_FILE_SIZE,
                allowed_extensions: vec![
                    "jpg".to_string(),
                    "jpeg".to_string(),
                    "png".to_string(),
                    "webp".to_string(),
                ],
            },
        }
    }
}
