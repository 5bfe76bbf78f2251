// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-memory directory.
//!
//! [`MemoryDirectory`] implements both [`UserDirectory`] and
//! [`PermissionRegistry`] over a single `parking_lot::RwLock`. It is populated
//! from a [`DirectorySeed`] at startup and can be edited at runtime through the
//! admin methods, which is how tests change policy between two checks.
//!
//! Principals store role *ids*. Roles are materialized on every read, so a role
//! or permission edit is visible to the next authorization check.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use crate::directory::{DirectorySeed, PermissionRegistry, UserDirectory};
use crate::error::{DirectoryError, DirectoryResult};
use crate::model::{
    Endpoint, NewPrincipal, Permission, PermissionId, Principal, ResourceRequest, Role, RoleId,
};

// =============================================================================
// Storage
// =============================================================================

#[derive(Debug, Clone)]
struct StoredUser {
    email: String,
    first_name: String,
    last_name: String,
    password_hash: String,
    roles: Vec<RoleId>,
}

#[derive(Debug, Default)]
struct Tables {
    /// Keyed by lowercased email.
    users: HashMap<String, StoredUser>,
    roles: HashMap<RoleId, Role>,
    permissions: HashMap<PermissionId, Permission>,
    endpoints: HashMap<ResourceRequest, Endpoint>,
}

impl Tables {
    fn materialize(&self, user: &StoredUser) -> Principal {
        Principal {
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            password_hash: user.password_hash.clone(),
            roles: user
                .roles
                .iter()
                .filter_map(|id| self.roles.get(id).cloned())
                .collect(),
        }
    }

    fn check_roles(&self, roles: &[RoleId]) -> DirectoryResult<()> {
        match roles.iter().find(|id| !self.roles.contains_key(id)) {
            Some(missing) => Err(DirectoryError::not_found("role", missing.to_string())),
            None => Ok(()),
        }
    }
}

fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}

// =============================================================================
// Memory Directory
// =============================================================================

/// A `UserDirectory` and `PermissionRegistry` held in process memory.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    tables: RwLock<Tables>,
}

impl MemoryDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a directory from validated seed data.
    pub fn from_seed(seed: DirectorySeed) -> DirectoryResult<Self> {
        seed.validate()?;

        let mut tables = Tables::default();
        for permission in seed.permissions {
            tables.permissions.insert(permission.id, permission);
        }
        for role in seed.roles {
            tables.roles.insert(role.id, role);
        }
        for endpoint in seed.endpoints {
            tables.endpoints.insert(endpoint.resource(), endpoint);
        }
        for user in seed.users {
            let key = email_key(&user.email);
            tables.users.insert(
                key,
                StoredUser {
                    email: user.email.trim().to_string(),
                    first_name: user.first_name,
                    last_name: user.last_name,
                    password_hash: user.password_hash,
                    roles: user.roles,
                },
            );
        }

        debug!(
            users = tables.users.len(),
            roles = tables.roles.len(),
            permissions = tables.permissions.len(),
            endpoints = tables.endpoints.len(),
            "Directory seeded"
        );

        Ok(Self {
            tables: RwLock::new(tables),
        })
    }

    // =========================================================================
    // Administration
    // =========================================================================

    /// Inserts or replaces a permission.
    pub fn insert_permission(&self, permission: Permission) {
        self.tables.write().permissions.insert(permission.id, permission);
    }

    /// Inserts or replaces a role. Every referenced permission must exist.
    pub fn insert_role(&self, role: Role) -> DirectoryResult<()> {
        let mut tables = self.tables.write();
        if let Some(missing) = role
            .permissions
            .iter()
            .find(|id| !tables.permissions.contains_key(id))
        {
            return Err(DirectoryError::not_found("permission", missing.to_string()));
        }
        tables.roles.insert(role.id, role);
        Ok(())
    }

    /// Registers an endpoint, replacing any registration for the same triple.
    pub fn upsert_endpoint(&self, endpoint: Endpoint) -> DirectoryResult<()> {
        let mut tables = self.tables.write();
        if !tables.permissions.contains_key(&endpoint.permission) {
            return Err(DirectoryError::not_found(
                "permission",
                endpoint.permission.to_string(),
            ));
        }
        tables.endpoints.insert(endpoint.resource(), endpoint);
        Ok(())
    }

    /// Removes an endpoint registration. Returns `true` if one was removed.
    pub fn remove_endpoint(&self, request: &ResourceRequest) -> bool {
        self.tables.write().endpoints.remove(request).is_some()
    }

    /// Replaces the roles assigned to a principal.
    pub fn assign_roles(&self, email: &str, roles: Vec<RoleId>) -> DirectoryResult<()> {
        let mut tables = self.tables.write();
        tables.check_roles(&roles)?;
        let user = tables
            .users
            .get_mut(&email_key(email))
            .ok_or_else(|| DirectoryError::not_found("user", email))?;
        user.roles = roles;
        Ok(())
    }

    /// Returns the number of principals.
    pub fn user_count(&self) -> usize {
        self.tables.read().users.len()
    }
}

#[async_trait]
impl UserDirectory for MemoryDirectory {
    async fn find_by_email(&self, email: &str) -> DirectoryResult<Principal> {
        let tables = self.tables.read();
        tables
            .users
            .get(&email_key(email))
            .map(|user| tables.materialize(user))
            .ok_or_else(|| DirectoryError::not_found("user", email))
    }

    async fn create(&self, principal: NewPrincipal) -> DirectoryResult<Principal> {
        let key = email_key(&principal.email);
        let mut tables = self.tables.write();

        if tables.users.contains_key(&key) {
            return Err(DirectoryError::conflict("user", principal.email));
        }
        tables.check_roles(&principal.roles)?;

        let stored = StoredUser {
            email: principal.email.trim().to_string(),
            first_name: principal.first_name,
            last_name: principal.last_name,
            password_hash: principal.password_hash,
            roles: principal.roles,
        };
        let created = tables.materialize(&stored);
        tables.users.insert(key, stored);
        Ok(created)
    }
}

#[async_trait]
impl PermissionRegistry for MemoryDirectory {
    async fn find_endpoint(&self, request: &ResourceRequest) -> DirectoryResult<Endpoint> {
        self.tables
            .read()
            .endpoints
            .get(request)
            .cloned()
            .ok_or_else(|| DirectoryError::not_found("endpoint", request.to_string()))
    }

    async fn permissions_for_roles(&self, roles: &[RoleId]) -> DirectoryResult<Vec<Permission>> {
        let tables = self.tables.read();
        let mut seen = HashSet::new();
        let mut resolved = Vec::new();

        for permission_id in roles
            .iter()
            .filter_map(|id| tables.roles.get(id))
            .flat_map(|role| role.permissions.iter())
        {
            if !seen.insert(*permission_id) {
                continue;
            }
            if let Some(permission) = tables.permissions.get(permission_id) {
                resolved.push(permission.clone());
            }
        }

        Ok(resolved)
    }
}

// =============================================================================
// Tests
// =============================================================================
