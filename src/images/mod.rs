// Image host integration
// Thin client for a Cloudinary-style upload API. Callers decide whether a
// failure is fatal: registration treats uploads as best-effort, the explicit
// image endpoints surface failures to the client.

use crate::config::ImageHostConfig;
use crate::validation::validate_image_extension;
use chrono::Utc;
use regex::Regex;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::sync::OnceLock;
use thiserror::Error;

/// Errors from image validation or the image host
#[derive(Debug, Error)]
pub enum ImageError {
    /// File extension not in the allow-list
    #[error("invalid file type, allowed: {allowed}")]
    InvalidFileType { allowed: String },
    /// File exceeds the configured maximum size
    #[error("file exceeds maximum size of {max_bytes} bytes")]
    FileTooLarge { max_bytes: usize },
    /// Upload/destroy call failed upstream
    #[error("image host error: {0}")]
    Upstream(String),
}

impl ImageError {
    /// Message safe to show to clients
    pub fn client_message(&self) -> String {
        match self {
            ImageError::InvalidFileType { allowed } => {
                format!("Invalid file type. Allowed: {}", allowed)
            }
            ImageError::FileTooLarge { max_bytes } => {
                let max_mb = *max_bytes as f64 / (1024.0 * 1024.0);
                format!("File too large. Maximum size: {}MB", max_mb)
            }
            ImageError::Upstream(_) => "Image upload failed".to_string(),
        }
    }
}

/// Result of a successful upload
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub url: String,
    pub public_id: String,
}

#[derive(Deserialize)]
struct UploadApiResponse {
    secure_url: String,
    public_id: String,
}

/// Client for the image host's signed upload/destroy API
#[derive(Clone)]
pub struct ImageClient {
    http: reqwest::Client,
    config: ImageHostConfig,
}

impl ImageClient {
    pub fn new(config: ImageHostConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Validate filename extension and size against the configured limits
    pub fn validate_file(&self, filename: &str, size: usize) -> Result<(), ImageError> {
        validate_image_extension(filename, &self.config.allowed_extensions).map_err(|_| {
            ImageError::InvalidFileType {
                allowed: self.config.allowed_extensions.join(", "),
            }
        })?;

        if size > self.config.max_file_size {
            return Err(ImageError::FileTooLarge {
                max_bytes: self.config.max_file_size,
            });
        }

        Ok(())
    }

    /// Upload an image, returning its delivery URL and public id.
    /// The public id embeds the owning user's id so re-uploads overwrite.
    pub async fn upload(
        &self,
        user_id: i32,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedImage, ImageError> {
        self.validate_file(filename, bytes.len())?;

        let stem = filename
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(filename);
        let public_id = format!("user_{}_{}", user_id, stem);
        let timestamp = Utc::now().timestamp().to_string();

        let signature = self.sign(&[
            ("folder", self.config.folder.as_str()),
            ("overwrite", "true"),
            ("public_id", public_id.as_str()),
            ("timestamp", timestamp.as_str()),
        ]);

        let form = reqwest::multipart::Form::new()
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature", signature)
            .text("folder", self.config.folder.clone())
            .text("public_id", public_id)
            .text("overwrite", "true")
            .part(
                "file",
                reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string()),
            );

        let url = format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            self.config.cloud_name
        );

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ImageError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ImageError::Upstream(format!(
                "upload returned {}: {}",
                status, body
            )));
        }

        let parsed: UploadApiResponse = response
            .json()
            .await
            .map_err(|e| ImageError::Upstream(e.to_string()))?;

        Ok(UploadedImage {
            url: parsed.secure_url,
            public_id: parsed.public_id,
        })
    }

    /// Delete an image by public id
    pub async fn delete(&self, public_id: &str) -> Result<(), ImageError> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.sign(&[
            ("public_id", public_id),
            ("timestamp", timestamp.as_str()),
        ]);

        let url = format!(
            "https://api.cloudinary.com/v1_1/{}/image/destroy",
            self.config.cloud_name
        );

        let response = self
            .http
            .post(&url)
            .form(&[
                ("public_id", public_id),
                ("timestamp", timestamp.as_str()),
                ("api_key", self.config.api_key.as_str()),
                ("signature", signature.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ImageError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ImageError::Upstream(format!(
                "destroy returned {}",
                response.status()
            )));
        }

        Ok(())
    }

    /// SHA-256 request signature: parameters sorted by name, joined with `&`,
    /// with the API secret appended
    fn sign(&self, params: &[(&str, &str)]) -> String {
        let mut sorted: Vec<_> = params.to_vec();
        sorted.sort_by_key(|(name, _)| *name);

        let joined = sorted
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha256::new();
        hasher.update(joined.as_bytes());
        hasher.update(self.config.api_secret.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Recover the public id from a delivery URL
/// Format: https://res.cloudinary.com/{cloud}/image/upload/v{version}/{public_id}.{ext}
pub fn extract_public_id(url: &str) -> Option<String> {
    static PUBLIC_ID_RE: OnceLock<Regex> = OnceLock::new();
    let re = PUBLIC_ID_RE
        .get_or_init(|| Regex::new(r"/upload/(?:v\d+/)?(.+)\.[A-Za-z0-9]+$").expect("valid regex"));

    if !url.contains("cloudinary.com") {
        return None;
    }

    re.captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn test_client() -> ImageClient {
        ImageClient::new(Config::for_tests().image_host)
    }

    #[test]
    fn test_extract_public_id_with_version() {
        let url = "https://res.cloudinary.com/demo/image/upload/v1700000000/profiles/user_1_avatar.jpg";
        assert_eq!(
            extract_public_id(url),
            Some("profiles/user_1_avatar".to_string())
        );
    }

    #[test]
    fn test_extract_public_id_without_version() {
        let url = "https://res.cloudinary.com/demo/image/upload/profiles/user_2_pic.png";
        assert_eq!(
            extract_public_id(url),
            Some("profiles/user_2_pic".to_string())
        );
    }

    #[test]
    fn test_extract_public_id_foreign_url() {
        assert_eq!(extract_public_id("https://example.com/image.jpg"), None);
        assert_eq!(extract_public_id(""), None);
    }

    #[test]
    fn test_validate_file_rejects_bad_extension() {
        let client = test_client();
        assert!(matches!(
            client.validate_file("malware.exe", 100),
            Err(ImageError::InvalidFileType { .. })
        ));
    }

    #[test]
    fn test_validate_file_rejects_oversize() {
        let client = test_client();
        assert!(matches!(
            client.validate_file("big.png", 3 * 1024 * 1024),
            Err(ImageError::FileTooLarge { .. })
        ));
    }

    #[test]
    fn test_validate_file_accepts_valid() {
        let client = test_client();
        assert!(client.validate_file("avatar.webp", 1024).is_ok());
    }

    #[test]
    fn test_signature_is_deterministic_and_order_insensitive() {
        let client = test_client();
        let a = client.sign(&[("public_id", "x"), ("timestamp", "123")]);
        let b = client.sign(&[("timestamp", "123"), ("public_id", "x")]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }
}
