// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Collaborator contracts for identity and policy data.
//!
//! Gatehouse treats the user, role and permission tables as a queryable
//! directory. Two traits split that surface:
//!
//! - [`UserDirectory`]: principals by email, with their assigned roles
//! - [`PermissionRegistry`]: endpoint registrations and role-to-permission resolution
//!
//! [`DirectorySeed`] is the declarative form used to populate the bundled
//! in-memory implementation from configuration.

use std::collections::HashSet;
use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{DirectoryError, DirectoryResult};
use crate::model::{Endpoint, NewPrincipal, Permission, Principal, ResourceRequest, Role, RoleId};

// =============================================================================
// Traits
// =============================================================================

/// Lookup and creation of principals.
#[async_trait]
pub trait UserDirectory: Send + Sync + Debug {
    /// Finds a principal by email, with roles materialized.
    ///
    /// Returns `DirectoryError::NotFound` when no principal has that email.
    async fn find_by_email(&self, email: &str) -> DirectoryResult<Principal>;

    /// Creates a principal.
    ///
    /// Implementations check email uniqueness atomically with the insert and
    /// return `DirectoryError::Conflict` on a duplicate.
    async fn create(&self, principal: NewPrincipal) -> DirectoryResult<Principal>;
}

/// Endpoint registrations and permission resolution.
#[async_trait]
pub trait PermissionRegistry: Send + Sync + Debug {
    /// Finds the endpoint registered for the exact triple.
    async fn find_endpoint(&self, request: &ResourceRequest) -> DirectoryResult<Endpoint>;

    /// Resolves the union of permissions granted by the given roles.
    ///
    /// Unknown role ids contribute nothing.
    async fn permissions_for_roles(&self, roles: &[RoleId]) -> DirectoryResult<Vec<Permission>>;
}

// =============================================================================
// Seed
// =============================================================================

/// A bootstrap principal.
#[derive(Clone, Serialize, Deserialize)]
pub struct UserSeed {
    /// Email.
    pub email: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    #[serde(default)]
    pub last_name: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    /// Assigned role ids.
    #[serde(default)]
    pub roles: Vec<RoleId>,
}

impl Debug for UserSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserSeed")
            .field("email", &self.email)
            .field("roles", &self.roles)
            .finish_non_exhaustive()
    }
}

impl From<UserSeed> for NewPrincipal {
    fn from(seed: UserSeed) -> Self {
        NewPrincipal {
            email: seed.email,
            first_name: seed.first_name,
            last_name: seed.last_name,
            password_hash: seed.password_hash,
            roles: seed.roles,
        }
    }
}

/// Declarative directory content.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectorySeed {
    /// Permissions.
    #[serde(default)]
    pub permissions: Vec<Permission>,
    /// Roles, referencing permissions by id.
    #[serde(default)]
    pub roles: Vec<Role>,
    /// Endpoint registrations.
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
    /// Bootstrap users.
    #[serde(default)]
    pub users: Vec<UserSeed>,
    /// Roles assigned to self-registered principals.
    #[serde(default)]
    pub default_roles: Vec<RoleId>,
}

impl DirectorySeed {
    /// Checks the seed for duplicates and dangling references.
    pub fn validate(&self) -> DirectoryResult<()> {
        let mut permission_ids = HashSet::new();
        for permission in &self.permissions {
            if !permission_ids.insert(permission.id) {
                return Err(DirectoryError::invalid_seed(format!(
                    "duplicate permission id {}",
                    permission.id
                )));
            }
        }

        let mut role_ids = HashSet::new();
        for role in &self.roles {
            if !role_ids.insert(role.id) {
                return Err(DirectoryError::invalid_seed(format!(
                    "duplicate role id {}",
                    role.id
                )));
            }
            if let Some(missing) = role.permissions.iter().find(|p| !permission_ids.contains(p)) {
                return Err(DirectoryError::invalid_seed(format!(
                    "role '{}' references unknown permission {}",
                    role.name, missing
                )));
            }
        }

        let mut triples = HashSet::new();
        for endpoint in &self.endpoints {
            if !permission_ids.contains(&endpoint.permission) {
                return Err(DirectoryError::invalid_seed(format!(
                    "endpoint '{}' references unknown permission {}",
                    endpoint.resource(),
                    endpoint.permission
                )));
            }
            if !triples.insert(endpoint.resource()) {
                return Err(DirectoryError::invalid_seed(format!(
                    "duplicate endpoint '{}'",
                    endpoint.resource()
                )));
            }
        }

        let mut emails = HashSet::new();
        for user in &self.users {
            let email = user.email.trim().to_lowercase();
            if email.is_empty() {
                return Err(DirectoryError::invalid_seed("user with empty email"));
            }
            if user.password_hash.trim().is_empty() {
                return Err(DirectoryError::invalid_seed(format!(
                    "user '{}' has no password hash",
                    user.email
                )));
            }
            if !emails.insert(email) {
                return Err(DirectoryError::invalid_seed(format!(
                    "duplicate user '{}'",
                    user.email
                )));
            }
            if let Some(missing) = user.roles.iter().find(|r| !role_ids.contains(r)) {
                return Err(DirectoryError::invalid_seed(format!(
                    "user '{}' references unknown role {}",
                    user.email, missing
                )));
            }
        }

        if let Some(missing) = self.default_roles.iter().find(|r| !role_ids.contains(r)) {
            return Err(DirectoryError::invalid_seed(format!(
                "default role {} is not defined",
                missing
            )));
        }

        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn seed() -> DirectorySeed {
        DirectorySeed {
            permissions: vec![Permission::all_access(1, "ALL"), Permission::new(5, "READ_USERS")],
            roles: vec![
                Role::new(1, "SUPERADMIN").with_permissions([1]),
                Role::new(2, "ADMIN").with_permissions([5]),
            ],
            endpoints: vec![Endpoint::new("billing", "/invoices", "GET", 5)],
            users: vec![UserSeed {
                email: "root@example.com".to_string(),
                first_name: "Root".to_string(),
                last_name: String::new(),
                password_hash: "$argon2id$v=19$stub".to_string(),
                roles: vec![RoleId(1)],
            }],
            default_roles: vec![RoleId(2)],
        }
    }

    #[test]
    fn test_valid_seed() {
        assert!(seed().validate().is_ok());
        assert!(DirectorySeed::default().validate().is_ok());
    }

    #[test]
    fn test_dangling_permission() {
        let mut seed = seed();
        seed.roles.push(Role::new(3, "GHOST").with_permissions([42]));
        let err = seed.validate().unwrap_err();
        assert!(err.to_string().contains("unknown permission 42"));
    }

    #[test]
    fn test_duplicate_endpoint() {
        let mut seed = seed();
        seed.endpoints.push(Endpoint::new("billing", "/invoices", "GET", 1));
        assert!(seed.validate().is_err());
    }

    #[test]
    fn test_duplicate_email_is_case_insensitive() {
        let mut seed = seed();
        let mut twin = seed.users[0].clone();
        twin.email = "ROOT@example.com".to_string();
        seed.users.push(twin);
        assert!(seed.validate().is_err());
    }

    #[test]
    fn test_unknown_default_role() {
        let mut seed = seed();
        seed.default_roles.push(RoleId(99));
        assert!(seed.validate().is_err());
    }

    #[test]
    fn test_seed_from_yaml_like_json() {
        let json = r#"{
            "permissions": [{"id": 1, "name": "ALL", "grants_all": true}],
            "roles": [{"id": 1, "name": "SUPERADMIN", "permissions": [1]}]
        }"#;
        let seed: DirectorySeed = serde_json::from_str(json).unwrap();
        assert!(seed.permissions[0].grants_all);
        assert!(seed.endpoints.is_empty());
        assert!(seed.validate().is_ok());
    }
}
