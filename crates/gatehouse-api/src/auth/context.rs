// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Verified identity.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use gatehouse_core::{AuthError, AuthResult, PrincipalSnapshot};
use serde::Serialize;

use super::Claims;

/// The identity behind a token that passed every verification step.
///
/// `snapshot` comes from the session store and is the identity callers act on.
/// `claims` is what the token itself says.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifiedPrincipal {
    /// Snapshot stored with the session at issuance.
    pub snapshot: PrincipalSnapshot,
    /// Signed claims.
    #[serde(skip)]
    pub claims: Claims,
}

impl VerifiedPrincipal {
    /// Creates a verified principal.
    pub fn new(snapshot: PrincipalSnapshot, claims: Claims) -> Self {
        Self { snapshot, claims }
    }

    /// Returns the email.
    pub fn email(&self) -> &str {
        &self.snapshot.email
    }

    /// Returns `true` if the principal held the role at issuance.
    pub fn has_role(&self, role: &str) -> bool {
        self.snapshot.roles.contains(role)
    }

    /// Returns the token id.
    pub fn token_id(&self) -> &str {
        &self.claims.jti
    }

    /// Encodes the snapshot as base64url JSON, the form forwarded to
    /// downstream services.
    pub fn encoded_snapshot(&self) -> AuthResult<String> {
        let json = serde_json::to_vec(&self.snapshot)
            .map_err(|_| AuthError::internal("failed to encode principal"))?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }
}

// =============================================================================
// Tests
// =============================================================================
