// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for Gatehouse.
//!
//! `AuthError` is the taxonomy every credential and authorization operation
//! reports through. Messages carried by `AuthError` are safe to hand back to
//! callers; raw storage or transport details stay in the logs.
//!
//! `DirectoryError` is what collaborator backends report. It is classified into
//! an `AuthError` at the boundary via the `From` implementation below.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for credential and authorization operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Result type alias for directory and registry operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

// =============================================================================
// AuthError
// =============================================================================

/// Errors raised by the credential lifecycle and the RBAC engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Malformed input or header.
    #[error("malformed request: {message}")]
    BadRequest {
        /// What could not be parsed.
        message: String,
    },

    /// Well-formed input that fails field validation.
    #[error("rejected input: {message}")]
    Validation {
        /// Summary; the detail is in `fields`.
        message: String,
        /// Field-specific violations.
        fields: Vec<FieldViolation>,
    },

    /// Bad credentials, invalid/expired/revoked token or insufficient permission.
    #[error("denied: {message}")]
    Unauthorized {
        /// Reason, e.g. `token expired`.
        message: String,
    },

    /// Duplicate registration.
    #[error("conflict: {message}")]
    Conflict {
        /// Which uniqueness rule was hit.
        message: String,
    },

    /// Unknown endpoint registration or token already absent.
    #[error("not found: {message}")]
    NotFound {
        /// What was looked up.
        message: String,
    },

    /// Misconfiguration, signing failure or collaborator transport failure.
    #[error("{message}")]
    Internal {
        /// Log-facing description; never rendered to callers verbatim.
        message: String,
        /// Whether retrying the same call may succeed.
        transient: bool,
    },
}

impl AuthError {
    /// A request that could not be parsed.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// One violation per broken rule, all reported together.
    pub fn validation(message: impl Into<String>, fields: Vec<FieldViolation>) -> Self {
        Self::Validation {
            message: message.into(),
            fields,
        }
    }

    /// A security decision: bad credentials, a dead token or a missing grant.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// A duplicate registration.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// An absent token or endpoint.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// A fault that retrying will not fix.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            transient: false,
        }
    }

    /// A timeout or an unreachable collaborator.
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            transient: true,
        }
    }

    /// Category, independent of the message.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::BadRequest { .. } => ErrorKind::BadRequest,
            AuthError::Validation { .. } => ErrorKind::Validation,
            AuthError::Unauthorized { .. } => ErrorKind::Unauthorized,
            AuthError::Conflict { .. } => ErrorKind::Conflict,
            AuthError::NotFound { .. } => ErrorKind::NotFound,
            AuthError::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// The message without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            AuthError::BadRequest { message }
            | AuthError::Validation { message, .. }
            | AuthError::Unauthorized { message }
            | AuthError::Conflict { message }
            | AuthError::NotFound { message }
            | AuthError::Internal { message, .. } => message,
        }
    }

    /// Whether retrying the same call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::Internal { transient: true, .. })
    }

    /// Whether this is a decision rather than a fault.
    pub fn is_denial(&self) -> bool {
        matches!(self, AuthError::Unauthorized { .. })
    }
}

/// Category of an [`AuthError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed input.
    BadRequest,
    /// Field validation failure.
    Validation,
    /// Authentication or authorization denial.
    Unauthorized,
    /// Duplicate resource.
    Conflict,
    /// Missing resource.
    NotFound,
    /// Server-side fault.
    Internal,
}

/// One broken input rule, e.g. `{"field": "email", "message": "email is required"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// JSON name of the offending field.
    pub field: String,
    /// Readable rule description.
    pub message: String,
}

impl FieldViolation {
    /// Pairs a field with the rule it broke.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

// =============================================================================
// DirectoryError
// =============================================================================

/// Errors reported by `UserDirectory` and `PermissionRegistry` backends.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// No record matches the lookup key.
    #[error("{entity} not found: {key}")]
    NotFound {
        /// Kind of record (user, endpoint, role).
        entity: &'static str,
        /// Lookup key.
        key: String,
    },

    /// A record with the same unique key already exists.
    #[error("{entity} already exists: {key}")]
    Conflict {
        /// Kind of record.
        entity: &'static str,
        /// Conflicting key.
        key: String,
    },

    /// The backend could not be reached.
    #[error("backend unreachable: {message}")]
    Unavailable {
        /// Transport detail, logged only.
        message: String,
    },

    /// Seed data references something that does not exist.
    #[error("inconsistent seed: {message}")]
    InvalidSeed {
        /// The dangling or duplicate reference.
        message: String,
    },

    /// Any other backend failure.
    #[error("backend failure: {message}")]
    Backend {
        /// Backend detail, logged only.
        message: String,
        /// Driver error, when there is one.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl DirectoryError {
    /// No `entity` matches `key`.
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            key: key.into(),
        }
    }

    /// `key` is already taken.
    pub fn conflict(entity: &'static str, key: impl Into<String>) -> Self {
        Self::Conflict {
            entity,
            key: key.into(),
        }
    }

    /// Classified as transient at the boundary.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// A seed reference that does not resolve.
    pub fn invalid_seed(message: impl Into<String>) -> Self {
        Self::InvalidSeed {
            message: message.into(),
        }
    }

    /// Classified as a permanent internal fault at the boundary.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
            source: None,
        }
    }

    /// Whether no record matched.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DirectoryError::NotFound { .. })
    }
}

impl From<DirectoryError> for AuthError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::NotFound { entity, .. } => {
                AuthError::not_found(format!("{} not found", entity))
            }
            DirectoryError::Conflict { entity, .. } => {
                AuthError::conflict(format!("{} already exists", entity))
            }
            DirectoryError::Unavailable { ref message } => {
                tracing::warn!(error = %message, "Directory unavailable");
                AuthError::transient("directory unavailable")
            }
            other => {
                tracing::error!(error = %other, "Directory backend failure");
                AuthError::internal("directory failure")
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(AuthError::bad_request("x").kind(), ErrorKind::BadRequest);
        assert_eq!(AuthError::unauthorized("x").kind(), ErrorKind::Unauthorized);
        assert_eq!(AuthError::conflict("x").kind(), ErrorKind::Conflict);
        assert_eq!(AuthError::not_found("x").kind(), ErrorKind::NotFound);
        assert_eq!(AuthError::internal("x").kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_transient_flag() {
        assert!(AuthError::transient("timeout").is_transient());
        assert!(!AuthError::internal("bad secret").is_transient());
        assert!(!AuthError::unauthorized("token expired").is_transient());
    }

    #[test]
    fn test_directory_classification() {
        let err: AuthError = DirectoryError::not_found("endpoint", "GET billing /x").into();
        assert_eq!(err, AuthError::not_found("endpoint not found"));

        let err: AuthError = DirectoryError::conflict("user", "a@b.io").into();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let err: AuthError = DirectoryError::unavailable("connection refused").into();
        assert!(err.is_transient());
        // Raw backend text never reaches the caller.
        assert!(!err.message().contains("refused"));

        let err: AuthError = DirectoryError::backend("syntax error at or near").into();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(!err.is_transient());
        assert_eq!(err.message(), "directory failure");
    }
}
