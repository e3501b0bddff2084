// Validation utilities module
// Provides custom validation functions for domain-specific rules

use validator::ValidationError;

/// Validates that a role value is one of the accepted values
/// Valid values: "user", "admin"
pub fn validate_role_value(role: &str) -> Result<(), ValidationError> {
    if role == "user" || role == "admin" {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_role"))
    }
}

/// Validates that an image filename carries an allowed extension
/// (case-insensitive; a file without an extension is rejected)
pub fn validate_image_extension(filename: &str, allowed: &[String]) -> Result<(), ValidationError> {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .ok_or_else(|| ValidationError::new("missing_file_extension"))?;

    if allowed.iter().any(|a| a == &extension) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_file_type"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed() -> Vec<String> {
        vec![
            "jpg".to_string(),
            "jpeg".to_string(),
            "png".to_string(),
            "webp".to_string(),
        ]
    }

    #[test]
    fn test_valid_roles_accepted() {
        assert!(validate_role_value("user").is_ok());
        assert!(validate_role_value("admin").is_ok());
    }

    #[test]
    fn test_invalid_roles_rejected() {
        assert!(validate_role_value("superadmin").is_err());
        assert!(validate_role_value("Admin").is_err());
        assert!(validate_role_value("").is_err());
    }

    #[test]
    fn test_allowed_extensions_accepted() {
        assert!(validate_image_extension("avatar.png", &allowed()).is_ok());
        assert!(validate_image_extension("photo.JPG", &allowed()).is_ok());
        assert!(validate_image_extension("a.b.webp", &allowed()).is_ok());
    }

    #[test]
    fn test_disallowed_extensions_rejected() {
        assert!(validate_image_extension("script.exe", &allowed()).is_err());
        assert!(validate_image_extension("archive.tar.gz", &allowed()).is_err());
        assert!(validate_image_extension("noextension", &allowed()).is_err());
    }
}
