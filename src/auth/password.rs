// Password hashing and verification

use crate::auth::error::AuthError;
use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};

/// Password service for hashing and verification
pub struct PasswordService;

impl PasswordService {
    /// Hash a password with Argon2id and a fresh random salt.
    /// The PHC output string carries algorithm, parameters, salt, and digest,
    /// so verification needs no state beyond the stored string.
    pub fn hash_password(password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|_| AuthError::Hash)?;

        Ok(hash.to_string())
    }

    /// Verify a password against a stored hash.
    /// Comparison is constant-time inside the argon2 crate. A malformed
    /// stored hash verifies as false rather than erroring.
    pub fn verify_password(password: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hash_then_verify_round_trip() {
        let hash = PasswordService::hash_password("secret123").unwrap();
        assert!(PasswordService::verify_password("secret123", &hash));
    }

    #[test]
    fn test_wrong_password_rejected() {
        let hash = PasswordService::hash_password("secret123").unwrap();
        assert!(!PasswordService::verify_password("secret124", &hash));
        assert!(!PasswordService::verify_password("", &hash));
        assert!(!PasswordService::verify_password("Secret123", &hash));
    }

    #[test]
    fn test_same_password_hashes_differently() {
        // Fresh salt per call, so two hashes of the same input differ
        let first = PasswordService::hash_password("secret123").unwrap();
        let second = PasswordService::hash_password("secret123").unwrap();
        assert_ne!(first, second);

        // Both still verify
        assert!(PasswordService::verify_password("secret123", &first));
        assert!(PasswordService::verify_password("secret123", &second));
    }

    #[test]
    fn test_malformed_hash_verifies_false() {
        assert!(!PasswordService::verify_password("secret123", ""));
        assert!(!PasswordService::verify_password("secret123", "not-a-hash"));
        assert!(!PasswordService::verify_password(
            "secret123",
            "$argon2id$v=19$truncated"
        ));
    }

    #[test]
    fn test_hash_is_phc_encoded() {
        let hash = PasswordService::hash_password("secret123").unwrap();
        assert!(hash.starts_with("$argon2id$"));
    }

    proptest! {
        // Argon2 is intentionally slow, keep the case count small
        #![proptest_config(ProptestConfig::with_cases(8))]

        // Verification is deterministic across repeated calls against the
        // same stored hash
        #[test]
        fn prop_verify_deterministic(password in "[a-zA-Z0-9]{8,24}") {
            let hash = PasswordService::hash_password(&password).unwrap();
            prop_assert!(PasswordService::verify_password(&password, &hash));
            prop_assert!(PasswordService::verify_password(&password, &hash));
        }

        // Any different plaintext fails against the stored hash
        #[test]
        fn prop_different_password_rejected(
            password in "[a-z]{8,16}",
            other in "[A-Z]{8,16}"
        ) {
            let hash = PasswordService::hash_password(&password).unwrap();
            prop_assert!(!PasswordService::verify_password(&other, &hash));
        }
    }
}
