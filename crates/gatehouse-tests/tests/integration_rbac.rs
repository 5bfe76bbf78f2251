// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # RBAC Integration Tests
//!
//! Authorization decisions over the reference directory:
//!
//! - Permission resolution through roles
//! - The all-access permission
//! - Unregistered endpoints
//! - Policy edits between two checks
//! - Directory outages
//!
//! ## Test Categories
//!
//! - `test_rbac_*`: Decisions
//! - `test_introspect_*`: Verify plus authorize
//! - `test_directory_*`: Directory failures

use std::sync::Arc;
use std::time::Duration;

use gatehouse_api::auth::permits;
use gatehouse_core::{Endpoint, ErrorKind, Permission, PermissionId, ResourceRequest, RoleId};
use gatehouse_tests::prelude::*;

// =============================================================================
// Decisions
// =============================================================================

#[tokio::test]
async fn test_rbac_admin_reads_but_cannot_export() {
    let gate = TestGate::new();

    let principal = gate
        .auth
        .enforce_authorization(ADMIN_EMAIL, &RequestFixtures::list_invoices())
        .await
        .unwrap();
    assert!(principal.has_role("ADMIN"));

    let result = gate
        .auth
        .enforce_authorization(ADMIN_EMAIL, &RequestFixtures::export_invoices())
        .await;
    assert_unauthorized(result, "no permission to access this endpoint");
}

#[tokio::test]
async fn test_rbac_superadmin_passes_everything_registered() {
    let gate = TestGate::new();

    for endpoint in DirectoryFixtures::endpoints() {
        let result = gate
            .auth
            .enforce_authorization(ROOT_EMAIL, &endpoint.resource())
            .await;
        assert!(result.is_ok(), "denied {}", endpoint.resource());
    }
}

#[tokio::test]
async fn test_rbac_user_without_permissions_is_denied() {
    let gate = TestGate::new();
    let result = gate
        .auth
        .enforce_authorization(USER_EMAIL, &RequestFixtures::list_invoices())
        .await;
    assert_error_kind(result, ErrorKind::Unauthorized);
}

#[tokio::test]
async fn test_rbac_unregistered_endpoint_is_not_found() {
    let gate = TestGate::new();

    // Even the all-access role gets NotFound for an unknown triple.
    for email in [ROOT_EMAIL, ADMIN_EMAIL, USER_EMAIL] {
        let result = gate
            .auth
            .enforce_authorization(email, &RequestFixtures::unregistered())
            .await;
        let err = assert_error_kind(result, ErrorKind::NotFound);
        assert_eq!(err.message(), "endpoint not found");
    }
}

#[tokio::test]
async fn test_rbac_triple_matches_exactly() {
    let gate = TestGate::new();

    let cases = [
        ResourceRequest::new("billing", "/invoices", "get"),
        ResourceRequest::new("billing", "/invoices/", "GET"),
        ResourceRequest::new("Billing", "/invoices", "GET"),
    ];
    for request in cases {
        let result = gate.auth.enforce_authorization(ROOT_EMAIL, &request).await;
        assert_error_kind(result, ErrorKind::NotFound);
    }
}

#[tokio::test]
async fn test_rbac_unknown_principal_is_unauthorized() {
    let gate = TestGate::new();
    let result = gate
        .auth
        .enforce_authorization("ghost@example.com", &RequestFixtures::list_invoices())
        .await;
    assert_unauthorized(result, "principal not found");
}

#[tokio::test]
async fn test_rbac_role_change_applies_to_next_check() {
    let gate = TestGate::new();
    let request = RequestFixtures::export_invoices();

    assert!(
        gate.auth
            .enforce_authorization(ADMIN_EMAIL, &request)
            .await
            .is_err()
    );

    gate.directory
        .assign_roles(ADMIN_EMAIL, vec![RoleId(ROLE_ADMIN), RoleId(ROLE_SUPERADMIN)])
        .unwrap();
    assert!(
        gate.auth
            .enforce_authorization(ADMIN_EMAIL, &request)
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_rbac_new_endpoint_registration_is_visible() {
    let gate = TestGate::new();
    let request = ResourceRequest::new("billing", "/refunds", "DELETE");

    gate.directory
        .upsert_endpoint(Endpoint::new("billing", "/refunds", "DELETE", PERM_READ_USERS))
        .unwrap();
    assert!(
        gate.auth
            .enforce_authorization(ADMIN_EMAIL, &request)
            .await
            .is_ok()
    );

    assert!(gate.directory.remove_endpoint(&request));
    assert_error_kind(
        gate.auth.enforce_authorization(ADMIN_EMAIL, &request).await,
        ErrorKind::NotFound,
    );
}

#[test]
fn test_rbac_permits() {
    let read = Permission::new(PERM_READ_USERS, "READ_USERS");
    let all = Permission::all_access(PERM_ALL, "ALL");

    assert!(permits(std::slice::from_ref(&read), PermissionId(PERM_READ_USERS)));
    assert!(!permits(std::slice::from_ref(&read), PermissionId(PERM_BILLING_EXPORT)));
    assert!(permits(&[all], PermissionId(PERM_BILLING_EXPORT)));
    assert!(!permits(&[], PermissionId(PERM_READ_USERS)));
}

// =============================================================================
// Introspection
// =============================================================================

#[tokio::test]
async fn test_introspect_uses_current_roles_not_token_roles() {
    let gate = TestGate::new();
    let token = gate.login(USER_EMAIL, FIXTURE_PASSWORD).await;
    let request = RequestFixtures::create_user();

    assert_error_kind(
        gate.auth.introspect(&token, &request).await,
        ErrorKind::Unauthorized,
    );

    gate.directory
        .assign_roles(USER_EMAIL, vec![RoleId(ROLE_SUPERADMIN)])
        .unwrap();
    let verified = gate.auth.introspect(&token, &request).await.unwrap();

    // The token still carries the roles it was issued with.
    assert_eq!(verified.snapshot.roles.encode(), "USER");
}

#[tokio::test]
async fn test_introspect_revoked_token_is_denied_before_rbac() {
    let gate = TestGate::new();
    let token = gate.login(ROOT_EMAIL, FIXTURE_PASSWORD).await;
    gate.auth.logout(&token).await.unwrap();

    assert_unauthorized(
        gate.auth
            .introspect(&token, &RequestFixtures::unregistered())
            .await,
        "token not valid or expired",
    );
}

// =============================================================================
// Directory Failures
// =============================================================================

#[tokio::test]
async fn test_directory_unavailable_is_transient() {
    let gate = TestGate::builder()
        .users(Arc::new(UnavailableDirectory))
        .registry(Arc::new(UnavailableDirectory))
        .build();

    assert_transient(
        gate.auth
            .enforce_authorization(ADMIN_EMAIL, &RequestFixtures::list_invoices())
            .await,
    );
    assert_transient(
        gate.auth
            .register(RequestFixtures::register("grace@example.com"))
            .await,
    );
}

#[tokio::test]
async fn test_directory_registry_outage_after_login() {
    let gate = TestGate::builder()
        .registry(Arc::new(UnavailableDirectory))
        .build();
    let token = gate.login(ADMIN_EMAIL, FIXTURE_PASSWORD).await;

    assert_transient(
        gate.auth
            .introspect(&token, &RequestFixtures::list_invoices())
            .await,
    );
}

#[tokio::test]
async fn test_directory_stalled_lookup_times_out() {
    let directory = Arc::new(
        gatehouse_core::MemoryDirectory::from_seed(DirectoryFixtures::seed()).unwrap(),
    );
    let gate = TestGate::builder()
        .registry(Arc::new(StalledRegistry::new(
            directory,
            Duration::from_millis(300),
        )))
        .directory_timeout(Duration::from_millis(50))
        .build();

    assert_transient(
        gate.auth
            .enforce_authorization(ADMIN_EMAIL, &RequestFixtures::list_invoices())
            .await,
    );
}
