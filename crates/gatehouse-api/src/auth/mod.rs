// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication and authorization module.
//!
//! This module provides:
//! - JWT issuance and verification
//! - Role-Based Access Control (RBAC) over the permission registry
//! - Argon2id password hashing
//! - The `AuthService` that composes them into the credential lifecycle

mod claims;
mod context;
mod jwt;
pub mod password;
mod rbac;
mod service;

use std::future::Future;
use std::time::Duration;

use gatehouse_core::{AuthError, AuthResult, DirectoryError};

pub use claims::Claims;
pub use context::VerifiedPrincipal;
pub use jwt::{CredentialVerifier, IssuedToken, JwtConfig, SigningAlgorithm, TokenIssuer};
pub use rbac::{RbacEngine, permits};
pub use service::{AuthService, LoginRequest, RegisterRequest};

/// Runs a directory call under a deadline and classifies its error.
pub(crate) async fn bounded<T>(
    timeout: Duration,
    operation: &'static str,
    call: impl Future<Output = Result<T, DirectoryError>>,
) -> AuthResult<T> {
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result.map_err(AuthError::from),
        Err(_) => {
            tracing::warn!(operation, timeout = ?timeout, "Directory call timed out");
            Err(AuthError::transient("directory timed out"))
        }
    }
}
