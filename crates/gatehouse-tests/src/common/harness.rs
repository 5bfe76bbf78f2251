// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Harness
//!
//! [`TestGate`] wires the reference directory, an in-memory session store,
//! the token issuer, verifier and RBAC engine together on a shared
//! [`ManualClock`], and exposes both the service and its HTTP router.
//!
//! Collaborators can be swapped through [`TestGateBuilder`] to exercise
//! outages.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use gatehouse_api::{
    ApiConfig, ApiServer, AppState, AuthService, CredentialVerifier, JwtConfig, LoginRequest,
    RbacEngine, TokenIssuer,
};
use gatehouse_core::{ManualClock, MemoryDirectory, PermissionRegistry, UserDirectory};
use gatehouse_session::{MemorySessionStore, SessionStore, Sessions};

use super::fixtures::{DirectoryFixtures, TEST_SECRET};

/// Bound on store and directory calls unless overridden.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_millis(500);

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`TestGate`].
pub struct TestGateBuilder {
    session_store: Option<Arc<dyn SessionStore>>,
    users: Option<Arc<dyn UserDirectory>>,
    registry: Option<Arc<dyn PermissionRegistry>>,
    jwt: JwtConfig,
    store_timeout: Duration,
    directory_timeout: Duration,
    base_path: String,
}

impl Default for TestGateBuilder {
    fn default() -> Self {
        Self {
            session_store: None,
            users: None,
            registry: None,
            jwt: JwtConfig::new(TEST_SECRET),
            store_timeout: DEFAULT_CALL_TIMEOUT,
            directory_timeout: DEFAULT_CALL_TIMEOUT,
            base_path: "/api/auth".to_string(),
        }
    }
}

impl TestGateBuilder {
    /// Replaces the session store.
    pub fn session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.session_store = Some(store);
        self
    }

    /// Replaces the user directory.
    pub fn users(mut self, users: Arc<dyn UserDirectory>) -> Self {
        self.users = Some(users);
        self
    }

    /// Replaces the permission registry.
    pub fn registry(mut self, registry: Arc<dyn PermissionRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Sets the token configuration.
    pub fn jwt(mut self, jwt: JwtConfig) -> Self {
        self.jwt = jwt;
        self
    }

    /// Sets the bound on session store calls.
    pub fn store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// Sets the bound on directory calls.
    pub fn directory_timeout(mut self, timeout: Duration) -> Self {
        self.directory_timeout = timeout;
        self
    }

    /// Sets the mount point of the credential routes.
    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Builds the gate.
    pub fn build(self) -> TestGate {
        let clock = Arc::new(ManualClock::starting_now());
        let directory = Arc::new(
            MemoryDirectory::from_seed(DirectoryFixtures::seed())
                .expect("fixture seed should be valid"),
        );
        let memory_store = Arc::new(MemorySessionStore::with_clock(clock.clone()));

        let store = self
            .session_store
            .unwrap_or_else(|| memory_store.clone() as Arc<dyn SessionStore>);
        let users = self
            .users
            .unwrap_or_else(|| directory.clone() as Arc<dyn UserDirectory>);
        let registry = self
            .registry
            .unwrap_or_else(|| directory.clone() as Arc<dyn PermissionRegistry>);

        let sessions = Sessions::new(store, self.store_timeout);
        let auth = AuthService::new(
            users,
            TokenIssuer::with_clock(self.jwt.clone(), clock.clone()),
            CredentialVerifier::with_clock(self.jwt, sessions, clock.clone()),
            RbacEngine::new(registry, self.directory_timeout),
            self.directory_timeout,
        )
        .with_default_roles(DirectoryFixtures::seed().default_roles);

        let config = ApiConfig::default()
            .with_base_path(self.base_path)
            .with_directory_timeout(self.directory_timeout);

        let server = ApiServer::new(AppState::new(config, auth.clone()));

        TestGate {
            clock,
            directory,
            memory_store,
            auth,
            router: server.router(),
        }
    }
}

// =============================================================================
// TestGate
// =============================================================================

/// A fully wired gate for integration tests.
pub struct TestGate {
    /// Clock shared by the issuer, verifier and memory store.
    pub clock: Arc<ManualClock>,
    /// The seeded directory.
    pub directory: Arc<MemoryDirectory>,
    /// The memory session store, also used when no other store is injected.
    pub memory_store: Arc<MemorySessionStore>,
    /// The credential service.
    pub auth: AuthService,
    /// The HTTP router.
    pub router: Router,
}

impl TestGate {
    /// Creates a gate over the reference directory.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a builder.
    pub fn builder() -> TestGateBuilder {
        TestGateBuilder::default()
    }

    /// Logs in through the service and returns the token.
    pub async fn login(&self, email: &str, password: &str) -> String {
        self.auth
            .login(LoginRequest::new(email, password))
            .await
            .expect("login should succeed")
            .token
    }

    /// Moves the shared clock forward.
    pub fn advance(&self, by: Duration) {
        self.clock
            .advance(chrono::Duration::from_std(by).expect("duration in range"));
    }

    // =========================================================================
    // HTTP
    // =========================================================================

    /// Sends a request through the router.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Sends a JSON `POST`.
    pub async fn post_json(&self, uri: &str, body: Value) -> TestResponse {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("valid request");
        self.send(request).await
    }

    /// Sends a request with a bearer token and extra headers.
    pub async fn send_with_token(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        self.send(builder.body(Body::empty()).expect("valid request"))
            .await
    }
}

impl Default for TestGate {
    fn default() -> Self {
        Self::new()
    }
}

/// A buffered HTTP response.
#[derive(Debug)]
pub struct TestResponse {
    /// Status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: axum::http::HeaderMap,
    /// Parsed JSON body, or the raw text as a JSON string.
    pub body: Value,
}

impl TestResponse {
    /// Returns a header value as a string.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
