// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Gatehouse Integration Tests
//!
//! Integration tests for the Gatehouse credential gate, plus the shared
//! fixtures, mocks and harness they are built on.
//!
//! ## Module Structure
//!
//! - [`common`]: Shared test utilities
//!   - `fixtures`: The reference directory seed and request payloads
//!   - `assertions`: Helpers for checking error kinds and JSON envelopes
//!   - `mocks`: Failing and slow collaborators
//!   - `harness`: [`TestGate`](common::harness::TestGate), a fully wired gate on a manual clock
//!
//! ## Running Tests
//!
//! ```bash
//! # Run all integration tests
//! cargo test -p gatehouse-tests
//!
//! # Run specific test suite
//! cargo test -p gatehouse-tests --test integration_auth
//! cargo test -p gatehouse-tests --test integration_rbac
//! cargo test -p gatehouse-tests --test integration_api
//! cargo test -p gatehouse-tests --test integration_config
//! ```
//!
//! ## Test Categories
//!
//! ### Auth Tests (`integration_auth.rs`)
//! - Registration, login, verification and logout
//! - Token expiry against the session lifetime
//! - Store outages and timeouts
//!
//! ### RBAC Tests (`integration_rbac.rs`)
//! - Permission resolution and the all-access permission
//! - Unregistered endpoints
//! - Role changes between two checks
//!
//! ### API Tests (`integration_api.rs`)
//! - HTTP status mapping and response envelopes
//! - Forward-auth introspection headers
//! - Transaction ids, health and readiness
//!
//! ### Config Tests (`integration_config.rs`)
//! - Loading a full configuration file and serving from it
//! - Environment overrides and validation failures
//!
//! ## Writing New Tests
//!
//! ```rust,ignore
//! use gatehouse_tests::prelude::*;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let gate = TestGate::new();
//!     let token = gate.login(ADMIN_EMAIL, FIXTURE_PASSWORD).await;
//!     // ... test logic
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod common;

/// Re-export commonly used items for convenience.
pub mod prelude {
    pub use crate::common::assertions::*;
    pub use crate::common::fixtures::*;
    pub use crate::common::harness::*;
    pub use crate::common::mocks::*;
}
