// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! JWT claims structure.

use std::time::Duration;

use chrono::{DateTime, Utc};
use gatehouse_core::{PrincipalSnapshot, RoleNames};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims for authentication.
///
/// Serialized as `{first_name, last_name, email, roles, exp, iat, jti}` with
/// roles pipe-joined in the principal's role order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    // =========================================================================
    // Principal Claims
    // =========================================================================
    /// First name.
    pub first_name: String,

    /// Last name.
    pub last_name: String,

    /// Email.
    pub email: String,

    /// Role names at issuance.
    pub roles: RoleNames,

    // =========================================================================
    // Registered Claims (RFC 7519)
    // =========================================================================
    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Issued at time (Unix timestamp).
    pub iat: i64,

    /// JWT ID (UUIDv7).
    pub jti: String,
}

impl Claims {
    /// Creates claims for a snapshot issued at `issued_at` and valid for `ttl`.
    pub fn new(snapshot: &PrincipalSnapshot, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        let iat = issued_at.timestamp();
        Self {
            first_name: snapshot.first_name.clone(),
            last_name: snapshot.last_name.clone(),
            email: snapshot.email.clone(),
            roles: snapshot.roles.clone(),
            exp: iat.saturating_add(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX)),
            iat,
            jti: Uuid::now_v7().to_string(),
        }
    }

    /// Returns the embedded principal snapshot.
    pub fn snapshot(&self) -> PrincipalSnapshot {
        PrincipalSnapshot {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            roles: self.roles.clone(),
        }
    }

    /// Returns `true` if the claims have the given role.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    /// Returns `true` if the token has expired at `now`.
    ///
    /// A token is valid strictly before its `exp` second.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    /// Returns the expiration time as a DateTime.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Returns the issued at time as a DateTime.
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    /// Returns the time remaining until expiration, measured from `now`.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> Option<Duration> {
        let remaining = self.exp - now.timestamp();
        if remaining > 0 {
            Some(Duration::from_secs(remaining as u64))
        } else {
            None
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
