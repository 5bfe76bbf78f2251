// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Fixtures
//!
//! The reference directory every integration test runs against:
//!
//! | Role         | Permissions        |
//! |--------------|--------------------|
//! | `SUPERADMIN` | `ALL` (all access) |
//! | `ADMIN`      | `READ_USERS`       |
//! | `USER`       | none               |
//!
//! | Service   | Path               | Method | Requires         |
//! |-----------|--------------------|--------|------------------|
//! | `billing` | `/invoices`        | `GET`  | `READ_USERS`     |
//! | `billing` | `/invoices/export` | `POST` | `BILLING_EXPORT` |
//! | `users`   | `/users`           | `GET`  | `READ_USERS`     |
//! | `users`   | `/users`           | `POST` | `WRITE_USERS`    |
//!
//! Self-registered principals receive `USER`.

use std::sync::OnceLock;

use gatehouse_api::RegisterRequest;
use gatehouse_api::auth::password::hash_password_blocking;
use gatehouse_core::{DirectorySeed, Endpoint, Permission, ResourceRequest, Role, RoleId, UserSeed};

/// Permission granting every endpoint.
pub const PERM_ALL: u32 = 1;
/// Read access to users and invoices.
pub const PERM_READ_USERS: u32 = 5;
/// Write access to users.
pub const PERM_WRITE_USERS: u32 = 6;
/// Invoice export.
pub const PERM_BILLING_EXPORT: u32 = 9;

/// `SUPERADMIN` role id.
pub const ROLE_SUPERADMIN: u32 = 1;
/// `ADMIN` role id.
pub const ROLE_ADMIN: u32 = 2;
/// `USER` role id.
pub const ROLE_USER: u32 = 3;

/// Password shared by every seeded principal.
pub const FIXTURE_PASSWORD: &str = "correct-horse";
/// Seeded principal holding `SUPERADMIN`.
pub const ROOT_EMAIL: &str = "root@example.com";
/// Seeded principal holding `ADMIN`.
pub const ADMIN_EMAIL: &str = "ada@example.com";
/// Seeded principal holding `USER`.
pub const USER_EMAIL: &str = "bob@example.com";

/// Secret used by the harness.
pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Returns the PHC hash of [`FIXTURE_PASSWORD`], computed once per process.
pub fn fixture_password_hash() -> String {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| {
        hash_password_blocking(FIXTURE_PASSWORD).expect("fixture password should hash")
    })
    .clone()
}

/// Directory fixtures.
pub struct DirectoryFixtures;

impl DirectoryFixtures {
    /// The reference permissions.
    pub fn permissions() -> Vec<Permission> {
        vec![
            Permission::all_access(PERM_ALL, "ALL"),
            Permission::new(PERM_READ_USERS, "READ_USERS"),
            Permission::new(PERM_WRITE_USERS, "WRITE_USERS"),
            Permission::new(PERM_BILLING_EXPORT, "BILLING_EXPORT"),
        ]
    }

    /// The reference roles.
    pub fn roles() -> Vec<Role> {
        vec![
            Role::new(ROLE_SUPERADMIN, "SUPERADMIN").with_permissions([PERM_ALL]),
            Role::new(ROLE_ADMIN, "ADMIN").with_permissions([PERM_READ_USERS]),
            Role::new(ROLE_USER, "USER"),
        ]
    }

    /// The reference endpoint registrations.
    pub fn endpoints() -> Vec<Endpoint> {
        vec![
            Endpoint::new("billing", "/invoices", "GET", PERM_READ_USERS),
            Endpoint::new("billing", "/invoices/export", "POST", PERM_BILLING_EXPORT),
            Endpoint::new("users", "/users", "GET", PERM_READ_USERS),
            Endpoint::new("users", "/users", "POST", PERM_WRITE_USERS),
        ]
    }

    /// One principal per role.
    pub fn users() -> Vec<UserSeed> {
        let hash = fixture_password_hash();
        let user = |email: &str, first: &str, last: &str, role: u32| UserSeed {
            email: email.to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            password_hash: hash.clone(),
            roles: vec![RoleId(role)],
        };
        vec![
            user(ROOT_EMAIL, "Root", "Operator", ROLE_SUPERADMIN),
            user(ADMIN_EMAIL, "Ada", "Lovelace", ROLE_ADMIN),
            user(USER_EMAIL, "Bob", "Builder", ROLE_USER),
        ]
    }

    /// The full seed, users included.
    pub fn seed() -> DirectorySeed {
        DirectorySeed {
            permissions: Self::permissions(),
            roles: Self::roles(),
            endpoints: Self::endpoints(),
            users: Self::users(),
            default_roles: vec![RoleId(ROLE_USER)],
        }
    }
}

/// Request fixtures.
pub struct RequestFixtures;

impl RequestFixtures {
    /// A valid registration.
    pub fn register(email: &str) -> RegisterRequest {
        RegisterRequest {
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            email: email.to_string(),
            password: FIXTURE_PASSWORD.to_string(),
        }
    }

    /// `GET /invoices` on `billing`, requires `READ_USERS`.
    pub fn list_invoices() -> ResourceRequest {
        ResourceRequest::new("billing", "/invoices", "GET")
    }

    /// `POST /invoices/export` on `billing`, requires `BILLING_EXPORT`.
    pub fn export_invoices() -> ResourceRequest {
        ResourceRequest::new("billing", "/invoices/export", "POST")
    }

    /// `POST /users` on `users`, requires `WRITE_USERS`.
    pub fn create_user() -> ResourceRequest {
        ResourceRequest::new("users", "/users", "POST")
    }

    /// A triple with no registration.
    pub fn unregistered() -> ResourceRequest {
        ResourceRequest::new("billing", "/refunds", "DELETE")
    }
}
