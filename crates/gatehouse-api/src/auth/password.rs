// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Argon2id password hashing.
//!
//! Hashing is CPU-bound, so the async helpers run it on the blocking pool.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use gatehouse_core::{AuthError, AuthResult};

/// Hashes a password into a PHC string with a random salt.
pub fn hash_password_blocking(password: &str) -> AuthResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            tracing::error!(error = %e, "Password hashing failed");
            AuthError::internal("failed to hash password")
        })
}

/// Checks a password against a PHC string.
///
/// A stored hash that does not parse is reported as `Internal`, never as a
/// mismatch.
pub fn verify_password_blocking(password: &str, phc: &str) -> AuthResult<bool> {
    let parsed = PasswordHash::new(phc).map_err(|e| {
        tracing::error!(error = %e, "Stored password hash is malformed");
        AuthError::internal("stored credential is malformed")
    })?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Hashes a password on the blocking pool.
pub async fn hash_password(password: String) -> AuthResult<String> {
    tokio::task::spawn_blocking(move || hash_password_blocking(&password))
        .await
        .map_err(|_| AuthError::internal("password hashing task failed"))?
}

/// Checks a password on the blocking pool.
pub async fn verify_password(password: String, phc: String) -> AuthResult<bool> {
    tokio::task::spawn_blocking(move || verify_password_blocking(&password, &phc))
        .await
        .map_err(|_| AuthError::internal("password verification task failed"))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let phc = hash_password_blocking("hunter22").unwrap();
        assert!(phc.starts_with("$argon2id$"));
        assert!(verify_password_blocking("hunter22", &phc).unwrap());
        assert!(!verify_password_blocking("hunter23", &phc).unwrap());
    }

    #[test]
    fn test_salted() {
        let a = hash_password_blocking("same").unwrap();
        let b = hash_password_blocking("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_is_internal() {
        let err = verify_password_blocking("x", "plaintext").unwrap_err();
        assert_eq!(err.kind(), gatehouse_core::ErrorKind::Internal);
    }

    #[tokio::test]
    async fn test_async_helpers() {
        let phc = hash_password("secret1".to_string()).await.unwrap();
        assert!(verify_password("secret1".to_string(), phc).await.unwrap());
    }
}
