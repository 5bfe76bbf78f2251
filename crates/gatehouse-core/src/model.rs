// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Domain model for Gatehouse.
//!
//! Principals hold roles, roles hold permissions, and endpoints require a
//! permission. The `PrincipalSnapshot` is the frozen view of a principal that
//! travels inside tokens and sessions.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// =============================================================================
// Identifiers
// =============================================================================

/// Identifier of a permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionId(pub u32);

impl fmt::Display for PermissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(pub u32);

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Permission
// =============================================================================

/// An atomic capability.
///
/// `grants_all` marks the super-admin permission. It is an explicit flag on
/// the record, so a permission that merely happens to be named `"ALL"` grants
/// nothing beyond itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// Permission ID.
    pub id: PermissionId,
    /// Permission name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Whether holding this permission grants access to every endpoint.
    #[serde(default)]
    pub grants_all: bool,
}

impl Permission {
    /// Creates a regular permission.
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id: PermissionId(id),
            name: name.into(),
            description: String::new(),
            grants_all: false,
        }
    }

    /// Creates the universal-access permission.
    pub fn all_access(id: u32, name: impl Into<String>) -> Self {
        Self {
            grants_all: true,
            ..Self::new(id, name)
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns `true` if this permission bypasses endpoint checks.
    #[inline]
    pub fn grants_all(&self) -> bool {
        self.grants_all
    }
}

// =============================================================================
// Role
// =============================================================================

/// A named bundle of permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Role ID.
    pub id: RoleId,
    /// Role name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Permissions granted by this role.
    #[serde(default)]
    pub permissions: Vec<PermissionId>,
}

impl Role {
    /// Creates a role without permissions.
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id: RoleId(id),
            name: name.into(),
            description: String::new(),
            permissions: Vec::new(),
        }
    }

    /// Sets the granted permissions.
    pub fn with_permissions(mut self, permissions: impl IntoIterator<Item = u32>) -> Self {
        self.permissions = permissions.into_iter().map(PermissionId).collect();
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

// =============================================================================
// Principal
// =============================================================================

/// An identity known to the user directory.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Email, the unique identity key.
    pub email: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    #[serde(default)]
    pub last_name: String,
    /// Argon2 PHC string of the password.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Assigned roles, in assignment order.
    #[serde(default)]
    pub roles: Vec<Role>,
}

impl Principal {
    /// Returns the IDs of all assigned roles.
    pub fn role_ids(&self) -> Vec<RoleId> {
        self.roles.iter().map(|r| r.id).collect()
    }

    /// Returns the names of all assigned roles.
    pub fn role_names(&self) -> RoleNames {
        RoleNames::new(self.roles.iter().map(|r| r.name.clone()))
    }

    /// Returns `true` if the principal holds the named role.
    pub fn has_role(&self, name: &str) -> bool {
        self.roles.iter().any(|r| r.name == name)
    }

    /// Takes the snapshot embedded in tokens and sessions.
    pub fn snapshot(&self) -> PrincipalSnapshot {
        PrincipalSnapshot {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            roles: self.role_names(),
        }
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal")
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("roles", &self.role_names())
            .finish()
    }
}

/// A principal to be created by the user directory.
#[derive(Clone, PartialEq, Eq)]
pub struct NewPrincipal {
    /// Email, already trimmed.
    pub email: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Argon2 PHC string of the password.
    pub password_hash: String,
    /// Roles assigned at creation.
    pub roles: Vec<RoleId>,
}

impl fmt::Debug for NewPrincipal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewPrincipal")
            .field("email", &self.email)
            .field("roles", &self.roles)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Principal Snapshot
// =============================================================================

/// The principal as it looked when a token was issued.
///
/// Serialized as `{"first_name", "last_name", "email", "roles"}` with roles
/// pipe-joined, which is the shape stored in sessions and emitted to
/// downstream services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalSnapshot {
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Email.
    pub email: String,
    /// Role names at issuance.
    pub roles: RoleNames,
}

/// Ordered role names with a stable pipe-joined encoding (`"SUPERADMIN|ADMIN"`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleNames(Vec<String>);

impl RoleNames {
    /// Separator used in the encoded form.
    pub const SEPARATOR: char = '|';

    /// Creates role names, preserving order.
    pub fn new(names: impl IntoIterator<Item = String>) -> Self {
        Self(names.into_iter().collect())
    }

    /// Parses the pipe-joined encoding. Empty segments are dropped.
    pub fn parse(encoded: &str) -> Self {
        Self(
            encoded
                .split(Self::SEPARATOR)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// Returns the pipe-joined encoding.
    pub fn encode(&self) -> String {
        self.0.join("|")
    }

    /// Returns `true` if the named role is present.
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }

    /// Returns the names as a slice.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Returns the number of roles.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no roles.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RoleNames {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl Serialize for RoleNames {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for RoleNames {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        Ok(Self::parse(&encoded))
    }
}

// =============================================================================
// Endpoint
// =============================================================================

/// A registered resource and the permission it requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Owning service name.
    pub service: String,
    /// Resource path, matched exactly.
    pub path: String,
    /// HTTP method, matched exactly.
    pub method: String,
    /// Permission required to invoke this endpoint.
    pub permission: PermissionId,
}

impl Endpoint {
    /// Creates an endpoint registration.
    pub fn new(
        service: impl Into<String>,
        path: impl Into<String>,
        method: impl Into<String>,
        permission: u32,
    ) -> Self {
        Self {
            service: service.into(),
            path: path.into(),
            method: method.into(),
            permission: PermissionId(permission),
        }
    }

    /// Returns the lookup key of this endpoint.
    pub fn resource(&self) -> ResourceRequest {
        ResourceRequest::new(&self.service, &self.path, &self.method)
    }
}

/// A `(service, path, method)` triple an authorization check is made for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRequest {
    /// Service name.
    pub service: String,
    /// Resource path.
    pub path: String,
    /// HTTP method.
    pub method: String,
}

impl ResourceRequest {
    /// Creates a resource request.
    pub fn new(
        service: impl Into<String>,
        path: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        Self {
            service: service.into(),
            path: path.into(),
            method: method.into(),
        }
    }
}

impl fmt::Display for ResourceRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.method, self.service, self.path)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_principal() -> Principal {
        Principal {
            email: "ada@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            roles: vec![Role::new(1, "SUPERADMIN"), Role::new(2, "ADMIN")],
        }
    }

    #[test]
    fn test_role_names_encoding() {
        let names = RoleNames::new(vec!["SUPERADMIN".to_string(), "ADMIN".to_string()]);
        assert_eq!(names.encode(), "SUPERADMIN|ADMIN");
        assert_eq!(RoleNames::parse("SUPERADMIN|ADMIN"), names);
        assert!(RoleNames::parse("").is_empty());
        assert_eq!(RoleNames::parse("A||B|").len(), 2);
    }

    #[test]
    fn test_snapshot_shape() {
        let snapshot = sample_principal().snapshot();
        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["email"], "ada@example.com");
        assert_eq!(json["roles"], "SUPERADMIN|ADMIN");
        assert_eq!(json.as_object().unwrap().len(), 4);
    }

    #[test]
    fn test_principal_hides_password_hash() {
        let principal = sample_principal();

        let json = serde_json::to_string(&principal).unwrap();
        assert!(!json.contains("argon2"));

        let debug = format!("{:?}", principal);
        assert!(!debug.contains("argon2"));
    }

    #[test]
    fn test_principal_role_ids() {
        let principal = sample_principal();
        assert_eq!(principal.role_ids(), vec![RoleId(1), RoleId(2)]);
        assert!(principal.has_role("ADMIN"));
        assert!(!principal.has_role("READER"));
    }

    #[test]
    fn test_all_access_is_a_flag_not_a_name() {
        assert!(Permission::all_access(1, "ROOT").grants_all());
        assert!(!Permission::new(2, "ALL").grants_all());
    }

    #[test]
    fn test_permission_deserialize_defaults() {
        let perm: Permission = serde_json::from_str(r#"{"id": 5, "name": "READ_USERS"}"#).unwrap();
        assert_eq!(perm.id, PermissionId(5));
        assert!(!perm.grants_all);
        assert!(perm.description.is_empty());
    }
}
