// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The credential lifecycle.
//!
//! [`AuthService`] composes the user directory, the token issuer, the
//! credential verifier and the RBAC engine into the operations exposed over
//! HTTP: register, login, verify, logout and introspect.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use gatehouse_core::{
    AuthError, AuthResult, FieldViolation, NewPrincipal, Principal, PrincipalSnapshot,
    ResourceRequest, RoleId, UserDirectory,
};
use serde::Deserialize;
use tracing::{info, warn};

use super::jwt::{CredentialVerifier, IssuedToken, TokenIssuer};
use super::password;
use super::rbac::RbacEngine;
use super::{VerifiedPrincipal, bounded};

const INVALID_CREDENTIALS: &str = "invalid email or password";

// =============================================================================
// Requests
// =============================================================================

/// Self-registration input.
#[derive(Clone, Deserialize)]
pub struct RegisterRequest {
    /// First name, 2 to 100 characters.
    #[serde(default)]
    pub first_name: String,
    /// Last name, at most 100 characters.
    #[serde(default)]
    pub last_name: String,
    /// Email.
    #[serde(default)]
    pub email: String,
    /// Password, at least 6 characters.
    #[serde(default)]
    pub password: String,
}

impl RegisterRequest {
    /// Checks every field and reports all violations at once.
    pub fn validate(&self) -> AuthResult<()> {
        let mut violations = Vec::new();

        let first_name = self.first_name.trim().chars().count();
        if first_name == 0 {
            violations.push(FieldViolation::new("first_name", "first name is required"));
        } else if !(2..=100).contains(&first_name) {
            violations.push(FieldViolation::new(
                "first_name",
                "first name must be between 2 and 100 characters",
            ));
        }

        if self.last_name.trim().chars().count() > 100 {
            violations.push(FieldViolation::new(
                "last_name",
                "last name must be at most 100 characters",
            ));
        }

        let email = self.email.trim();
        if email.is_empty() {
            violations.push(FieldViolation::new("email", "email is required"));
        } else if !is_valid_email(email) {
            violations.push(FieldViolation::new("email", "email is not valid"));
        }

        if self.password.chars().count() < 6 {
            violations.push(FieldViolation::new(
                "password",
                "password must be at least 6 characters",
            ));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(AuthError::validation("validation failed", violations))
        }
    }
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish_non_exhaustive()
    }
}

/// Login input.
#[derive(Clone, Deserialize)]
pub struct LoginRequest {
    /// Email.
    #[serde(default)]
    pub email: String,
    /// Password.
    #[serde(default)]
    pub password: String,
}

impl LoginRequest {
    /// Creates a login request.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Minimal structural email check: one `@`, a non-empty local part and a
/// dotted domain, no whitespace.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

// =============================================================================
// AuthService
// =============================================================================

/// Credential lifecycle operations.
#[derive(Debug, Clone)]
pub struct AuthService {
    users: Arc<dyn UserDirectory>,
    issuer: TokenIssuer,
    verifier: CredentialVerifier,
    rbac: RbacEngine,
    default_roles: Arc<[RoleId]>,
    directory_timeout: Duration,
}

impl AuthService {
    /// Creates the service.
    pub fn new(
        users: Arc<dyn UserDirectory>,
        issuer: TokenIssuer,
        verifier: CredentialVerifier,
        rbac: RbacEngine,
        directory_timeout: Duration,
    ) -> Self {
        Self {
            users,
            issuer,
            verifier,
            rbac,
            default_roles: Arc::from(Vec::new()),
            directory_timeout,
        }
    }

    /// Sets the roles assigned to self-registered principals.
    pub fn with_default_roles(mut self, roles: Vec<RoleId>) -> Self {
        self.default_roles = Arc::from(roles);
        self
    }

    /// Returns the verifier.
    pub fn verifier(&self) -> &CredentialVerifier {
        &self.verifier
    }

    /// Returns the RBAC engine.
    pub fn rbac(&self) -> &RbacEngine {
        &self.rbac
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Registers a principal.
    ///
    /// A duplicate email is `Conflict` and leaves the existing record alone.
    /// No session is created.
    pub async fn register(&self, request: RegisterRequest) -> AuthResult<PrincipalSnapshot> {
        request.validate()?;
        let email = request.email.trim().to_string();

        match self.find_user(&email).await {
            Ok(_) => return Err(AuthError::conflict("email already registered")),
            Err(AuthError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        let password_hash = password::hash_password(request.password).await?;
        let created = bounded(
            self.directory_timeout,
            "create",
            self.users.create(NewPrincipal {
                email,
                first_name: request.first_name.trim().to_string(),
                last_name: request.last_name.trim().to_string(),
                password_hash,
                roles: self.default_roles.to_vec(),
            }),
        )
        .await
        .map_err(|e| match e {
            AuthError::Conflict { .. } => AuthError::conflict("email already registered"),
            other => other,
        })?;

        info!(email = %created.email, "Principal registered");
        Ok(created.snapshot())
    }

    /// Exchanges credentials for a token backed by a new session.
    pub async fn login(&self, request: LoginRequest) -> AuthResult<IssuedToken> {
        let email = request.email.trim();
        if email.is_empty() || request.password.is_empty() {
            return Err(AuthError::bad_request("email and password are required"));
        }

        let principal = match self.find_user(email).await {
            Ok(principal) => principal,
            Err(AuthError::NotFound { .. }) => {
                warn!(email = %email, reason = "unknown email", "Login failed");
                return Err(AuthError::unauthorized(INVALID_CREDENTIALS));
            }
            Err(e) => return Err(e),
        };

        let matches =
            password::verify_password(request.password, principal.password_hash.clone()).await?;
        if !matches {
            warn!(email = %principal.email, reason = "wrong password", "Login failed");
            return Err(AuthError::unauthorized(INVALID_CREDENTIALS));
        }

        let issued = self.issuer.mint_default(&principal)?;
        // The token is dropped if the session cannot be recorded.
        self.verifier
            .sessions()
            .open(&issued.token, &issued.claims.snapshot(), issued.session_ttl)
            .await?;

        info!(email = %principal.email, jti = %issued.claims.jti, "Login succeeded");
        Ok(issued)
    }

    /// Verifies a token.
    pub async fn verify(&self, token: &str) -> AuthResult<VerifiedPrincipal> {
        self.verifier.verify(token).await
    }

    /// Revokes a token. A token without a session is `NotFound`.
    pub async fn logout(&self, token: &str) -> AuthResult<()> {
        let claims = self.verifier.verify_claims(token)?;
        let removed = self.verifier.sessions().revoke(token.trim()).await?;
        if removed == 0 {
            return Err(AuthError::not_found("token not found"));
        }
        info!(email = %claims.email, jti = %claims.jti, "Logout succeeded");
        Ok(())
    }

    /// Decides whether the principal with `email` may invoke `request`.
    ///
    /// Roles are re-read from the directory; token claims are not consulted.
    pub async fn enforce_authorization(
        &self,
        email: &str,
        request: &ResourceRequest,
    ) -> AuthResult<Principal> {
        let principal = self.find_user(email).await.map_err(|e| match e {
            AuthError::NotFound { .. } => {
                warn!(email = %email, "Verified principal no longer in directory");
                AuthError::unauthorized("principal not found")
            }
            other => other,
        })?;
        self.rbac.enforce(&principal, request).await?;
        Ok(principal)
    }

    /// Verifies a token and authorizes its principal for `request`.
    pub async fn introspect(
        &self,
        token: &str,
        request: &ResourceRequest,
    ) -> AuthResult<VerifiedPrincipal> {
        let verified = self.verify(token).await?;
        self.enforce_authorization(verified.email(), request).await?;
        Ok(verified)
    }

    /// Checks that the session store is reachable.
    pub async fn ready(&self) -> AuthResult<()> {
        self.verifier.sessions().ping().await
    }

    async fn find_user(&self, email: &str) -> AuthResult<Principal> {
        bounded(
            self.directory_timeout,
            "find_by_email",
            self.users.find_by_email(email),
        )
        .await
    }
}

// =============================================================================
// Tests
// =============================================================================
