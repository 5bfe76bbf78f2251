// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Role-Based Access Control (RBAC).
//!
//! The engine holds no policy of its own. Every decision reads the endpoint
//! registration and the role permissions from the [`PermissionRegistry`], so
//! policy edits apply to the next check.

use std::sync::Arc;
use std::time::Duration;

use gatehouse_core::{
    AuthError, AuthResult, Permission, PermissionId, PermissionRegistry, Principal,
    ResourceRequest,
};
use tracing::{debug, info};

use super::bounded;

/// Denial message for a missing permission.
pub(crate) const NO_PERMISSION: &str = "no permission to access this endpoint";

/// Returns `true` if `permissions` satisfy `required`.
///
/// A `grants_all` permission satisfies anything.
pub fn permits(permissions: &[Permission], required: PermissionId) -> bool {
    permissions
        .iter()
        .any(|p| p.grants_all() || p.id == required)
}

/// RBAC decision engine.
///
/// Cheap to clone; created once at startup and shared across requests.
#[derive(Debug, Clone)]
pub struct RbacEngine {
    registry: Arc<dyn PermissionRegistry>,
    timeout: Duration,
}

impl RbacEngine {
    /// Creates an engine over a registry, bounding each lookup by `timeout`.
    pub fn new(registry: Arc<dyn PermissionRegistry>, timeout: Duration) -> Self {
        Self { registry, timeout }
    }

    /// Decides whether `principal` may invoke `request`.
    ///
    /// An unregistered triple is `NotFound` regardless of the principal's
    /// permissions.
    pub async fn enforce(&self, principal: &Principal, request: &ResourceRequest) -> AuthResult<()> {
        let role_ids = principal.role_ids();

        let endpoint = bounded(
            self.timeout,
            "find_endpoint",
            self.registry.find_endpoint(request),
        )
        .await
        .map_err(|e| match e {
            AuthError::NotFound { .. } => AuthError::not_found("endpoint not found"),
            other => other,
        })?;

        let permissions = bounded(
            self.timeout,
            "permissions_for_roles",
            self.registry.permissions_for_roles(&role_ids),
        )
        .await?;

        if permits(&permissions, endpoint.permission) {
            debug!(email = %principal.email, resource = %request, "Access granted");
            Ok(())
        } else {
            info!(
                email = %principal.email,
                resource = %request,
                required = %endpoint.permission,
                "Access denied"
            );
            Err(AuthError::unauthorized(NO_PERMISSION))
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
