//! bcrypt password hashes.
//!
//! bcrypt at cost 10 takes tens of milliseconds per call, so request
//! handlers go through the `*_blocking` variants, which run on tokio's
//! blocking pool instead of the single runtime thread.

use bcrypt::BcryptError;

use crate::core::{Error, Result};

/// Work factor for new hashes.
pub const HASH_COST: u32 = 10;

/// Hash a password with a fresh random salt (modular crypt format, `$2b$10$...`).
pub fn hash_password(password: &str) -> std::result::Result<String, BcryptError> {
    bcrypt::hash(password, HASH_COST)
}

/// Check `password` against a stored hash. Malformed hashes never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    bcrypt::verify(password, stored).unwrap_or(false)
}

pub async fn hash_password_blocking(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| Error::Custom(format!("password hashing task failed: {}", e)))?
        .map_err(Error::from)
}

pub async fn verify_password_blocking(password: String, stored: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &stored))
        .await
        .map_err(|e| Error::Custom(format!("password check task failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let stored = hash_password("joes-pantry").unwrap();
        assert!(stored.starts_with("$2b$10$"));
        assert!(verify_password("joes-pantry", &stored));
        assert!(!verify_password("joes-pantrY", &stored));
    }

    #[test]
    fn test_salts_differ() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }

    #[test]
    fn test_malformed_hashes_never_verify() {
        for stored in ["", "$2b$", "sha256$10000$salt$abcd", "$2b$10$tooshort"] {
            assert!(!verify_password("anything", stored), "{}", stored);
        }
    }

    #[tokio::test]
    async fn test_blocking_pool_variants() {
        let stored = hash_password_blocking("correct horse".into()).await.unwrap();
        assert!(verify_password_blocking("correct horse".into(), stored.clone())
            .await
            .unwrap());
        assert!(!verify_password_blocking("wrong horse".into(), stored)
            .await
            .unwrap());
    }
}
