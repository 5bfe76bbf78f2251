// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Mock Implementations
//!
//! Collaborators that misbehave on purpose: a session store that is down,
//! one that answers too slowly, and directories that cannot be reached.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use gatehouse_core::{
    DirectoryError, DirectoryResult, Endpoint, MemoryDirectory, NewPrincipal, Permission,
    PermissionRegistry, Principal, ResourceRequest, RoleId, UserDirectory,
};
use gatehouse_session::{MemorySessionStore, SessionError, SessionStore};

// =============================================================================
// Session Stores
// =============================================================================

/// A session store whose every call fails as unreachable.
///
/// Toggle with [`set_down`](Self::set_down) to simulate an outage that
/// starts after login.
#[derive(Debug)]
pub struct FailingSessionStore {
    inner: MemorySessionStore,
    down: AtomicBool,
    failures: AtomicU64,
}

impl FailingSessionStore {
    /// Creates a store that is down from the start.
    pub fn new() -> Self {
        Self {
            inner: MemorySessionStore::new(),
            down: AtomicBool::new(true),
            failures: AtomicU64::new(0),
        }
    }

    /// Creates a store that works until told otherwise.
    pub fn healthy() -> Self {
        let store = Self::new();
        store.set_down(false);
        store
    }

    /// Marks the store as down or up.
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    /// Returns how many calls were refused.
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), SessionError> {
        if self.down.load(Ordering::SeqCst) {
            self.failures.fetch_add(1, Ordering::SeqCst);
            Err(SessionError::unavailable("connection refused"))
        } else {
            Ok(())
        }
    }
}

impl Default for FailingSessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for FailingSessionStore {
    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), SessionError> {
        self.check()?;
        self.inner.put(key, value, ttl).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        self.check()?;
        self.inner.get(key).await
    }

    async fn delete(&self, key: &str) -> Result<u64, SessionError> {
        self.check()?;
        self.inner.delete(key).await
    }

    async fn ping(&self) -> Result<(), SessionError> {
        self.check()
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// A memory store that sleeps before answering lookups.
#[derive(Debug)]
pub struct SlowSessionStore {
    inner: Arc<MemorySessionStore>,
    delay: Duration,
}

impl SlowSessionStore {
    /// Wraps `inner`, delaying `get`, `delete` and `ping` by `delay`.
    ///
    /// `put` stays fast so that login still succeeds.
    pub fn new(inner: Arc<MemorySessionStore>, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

#[async_trait]
impl SessionStore for SlowSessionStore {
    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), SessionError> {
        self.inner.put(key, value, ttl).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        tokio::time::sleep(self.delay).await;
        self.inner.get(key).await
    }

    async fn delete(&self, key: &str) -> Result<u64, SessionError> {
        tokio::time::sleep(self.delay).await;
        self.inner.delete(key).await
    }

    async fn ping(&self) -> Result<(), SessionError> {
        tokio::time::sleep(self.delay).await;
        self.inner.ping().await
    }

    fn name(&self) -> &str {
        "slow"
    }
}

// =============================================================================
// Directories
// =============================================================================

/// A directory that cannot be reached.
#[derive(Debug, Default)]
pub struct UnavailableDirectory;

#[async_trait]
impl UserDirectory for UnavailableDirectory {
    async fn find_by_email(&self, _email: &str) -> DirectoryResult<Principal> {
        Err(DirectoryError::unavailable("connection reset"))
    }

    async fn create(&self, _principal: NewPrincipal) -> DirectoryResult<Principal> {
        Err(DirectoryError::unavailable("connection reset"))
    }
}

#[async_trait]
impl PermissionRegistry for UnavailableDirectory {
    async fn find_endpoint(&self, _request: &ResourceRequest) -> DirectoryResult<Endpoint> {
        Err(DirectoryError::unavailable("connection reset"))
    }

    async fn permissions_for_roles(&self, _roles: &[RoleId]) -> DirectoryResult<Vec<Permission>> {
        Err(DirectoryError::unavailable("connection reset"))
    }
}

/// A registry that answers endpoint lookups from `inner` but stalls on
/// permission resolution.
#[derive(Debug)]
pub struct StalledRegistry {
    inner: Arc<MemoryDirectory>,
    delay: Duration,
}

impl StalledRegistry {
    /// Wraps `inner`, delaying permission resolution by `delay`.
    pub fn new(inner: Arc<MemoryDirectory>, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

#[async_trait]
impl PermissionRegistry for StalledRegistry {
    async fn find_endpoint(&self, request: &ResourceRequest) -> DirectoryResult<Endpoint> {
        self.inner.find_endpoint(request).await
    }

    async fn permissions_for_roles(&self, roles: &[RoleId]) -> DirectoryResult<Vec<Permission>> {
        tokio::time::sleep(self.delay).await;
        self.inner.permissions_for_roles(roles).await
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_failing_store_toggle() {
        let store = FailingSessionStore::new();
        assert!(store.ping().await.is_err());
        assert_eq!(store.failures(), 1);

        store.set_down(false);
        store
            .put("k", "v".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_unavailable_directory_is_transient() {
        let err = UnavailableDirectory
            .find_by_email("a@b.c")
            .await
            .unwrap_err();
        assert!(gatehouse_core::AuthError::from(err).is_transient());
    }
}
