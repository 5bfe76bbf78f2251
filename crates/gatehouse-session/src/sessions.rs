// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Typed session facade.
//!
//! [`Sessions`] is the only code that reads or writes session values. It owns
//! the [`SessionEnvelope`] encoding and bounds every store call with
//! `tokio::time::timeout`, so callers see `AuthResult` and never a raw store
//! error.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use gatehouse_core::{AuthResult, PrincipalSnapshot};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::traits::{SessionConfig, SessionError, SessionStore};

/// The stored session value: `{"user": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEnvelope {
    /// Principal snapshot taken at issuance.
    pub user: PrincipalSnapshot,
}

impl SessionEnvelope {
    /// Wraps a snapshot.
    pub fn new(user: PrincipalSnapshot) -> Self {
        Self { user }
    }

    /// Encodes the envelope as JSON.
    pub fn encode(&self) -> Result<String, SessionError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decodes an envelope from JSON.
    pub fn decode(raw: &str) -> Result<Self, SessionError> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Bounded, typed access to a [`SessionStore`].
#[derive(Debug, Clone)]
pub struct Sessions {
    store: Arc<dyn SessionStore>,
    timeout: Duration,
}

impl Sessions {
    /// Creates a facade with an explicit call bound.
    pub fn new(store: Arc<dyn SessionStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Creates a facade from session configuration.
    pub fn from_config(store: Arc<dyn SessionStore>, config: &SessionConfig) -> Self {
        Self::new(store, config.store_timeout)
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Returns the per-call bound.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Records a session for `token`.
    pub async fn open(
        &self,
        token: &str,
        user: &PrincipalSnapshot,
        ttl: Duration,
    ) -> AuthResult<()> {
        let value = SessionEnvelope::new(user.clone()).encode()?;
        self.bounded("put", self.store.put(token, value, ttl)).await?;
        trace!(email = %user.email, ttl = ?ttl, "Session opened");
        Ok(())
    }

    /// Returns the snapshot stored for `token`, or `None` if there is no live session.
    pub async fn lookup(&self, token: &str) -> AuthResult<Option<PrincipalSnapshot>> {
        let raw = self.bounded("get", self.store.get(token)).await?;
        match raw {
            Some(raw) => Ok(Some(SessionEnvelope::decode(&raw)?.user)),
            None => Ok(None),
        }
    }

    /// Removes the session for `token`. Returns the number of sessions removed.
    pub async fn revoke(&self, token: &str) -> AuthResult<u64> {
        Ok(self.bounded("delete", self.store.delete(token)).await?)
    }

    /// Checks that the store answers within the bound.
    pub async fn ping(&self) -> AuthResult<()> {
        Ok(self.bounded("ping", self.store.ping()).await?)
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, SessionError>>,
    ) -> Result<T, SessionError> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(SessionError::Timeout {
                operation,
                after: self.timeout,
            }),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySessionStore;
    use async_trait::async_trait;
    use gatehouse_core::{ErrorKind, RoleNames};

    fn snapshot() -> PrincipalSnapshot {
        PrincipalSnapshot {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            roles: RoleNames::parse("SUPERADMIN|ADMIN"),
        }
    }

    #[derive(Debug)]
    struct StalledStore;

    #[async_trait]
    impl SessionStore for StalledStore {
        async fn put(&self, _: &str, _: String, _: Duration) -> Result<(), SessionError> {
            std::future::pending().await
        }
        async fn get(&self, _: &str) -> Result<Option<String>, SessionError> {
            std::future::pending().await
        }
        async fn delete(&self, _: &str) -> Result<u64, SessionError> {
            std::future::pending().await
        }
        async fn ping(&self) -> Result<(), SessionError> {
            std::future::pending().await
        }
        fn name(&self) -> &str {
            "stalled"
        }
    }

    #[test]
    fn test_envelope_shape() {
        let raw = SessionEnvelope::new(snapshot()).encode().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["user"]["email"], "ada@example.com");
        assert_eq!(json["user"]["roles"], "SUPERADMIN|ADMIN");
    }

    #[tokio::test]
    async fn test_open_lookup_revoke() {
        let sessions = Sessions::new(Arc::new(MemorySessionStore::new()), Duration::from_secs(1));
        sessions
            .open("tok", &snapshot(), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(sessions.lookup("tok").await.unwrap(), Some(snapshot()));
        assert_eq!(sessions.revoke("tok").await.unwrap(), 1);
        assert_eq!(sessions.revoke("tok").await.unwrap(), 0);
        assert!(sessions.lookup("tok").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_value_is_internal() {
        let store = Arc::new(MemorySessionStore::new());
        store
            .put("tok", "not json".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        let sessions = Sessions::new(store, Duration::from_secs(1));

        let err = sessions.lookup("tok").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_timeout_is_transient() {
        let sessions = Sessions::new(Arc::new(StalledStore), Duration::from_millis(20));

        let err = sessions.lookup("tok").await.unwrap_err();
        assert!(err.is_transient());
        assert!(!err.is_denial());

        assert!(sessions.ping().await.unwrap_err().is_transient());
    }
}
