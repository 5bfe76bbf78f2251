// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Session store contract.
//!
//! A session store is a string key-value map with per-key expiry. The key is
//! the signed token, the value is the JSON session envelope. Stores know
//! nothing about tokens or principals; typing happens in [`crate::Sessions`].
//!
//! # Design Principles
//!
//! - **Store of record**: a store is the authority on liveness, never a cache.
//! - **Lazy expiry**: an expired key reads as absent whether or not it has
//!   been swept.
//! - **Async first**: every call may cross a network boundary.
//!
//! # Example
//!
//! ```rust,ignore
//! use gatehouse_session::{MemorySessionStore, SessionStore};
//!
//! let store = MemorySessionStore::new();
//! store.put("token", r#"{"user":{}}"#.to_string(), Duration::from_secs(60)).await?;
//! assert!(store.get("token").await?.is_some());
//! assert_eq!(store.delete("token").await?, 1);
//! ```

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use gatehouse_core::AuthError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Session Error
// =============================================================================

/// Errors reported by session stores and the session facade.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The store could not be reached.
    #[error("Session store unavailable: {message}")]
    Unavailable {
        /// Error message.
        message: String,
    },

    /// A store call did not finish within the configured bound.
    #[error("Session store {operation} timed out after {after:?}")]
    Timeout {
        /// Store operation.
        operation: &'static str,
        /// Configured bound.
        after: Duration,
    },

    /// A session value could not be encoded or decoded.
    #[error("Session codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// Any other backend failure.
    #[error("Session backend error: {message}")]
    Backend {
        /// Error message.
        message: String,
    },
}

impl SessionError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Returns `true` if retrying the same call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::Timeout { .. })
    }
}

impl From<SessionError> for AuthError {
    fn from(err: SessionError) -> Self {
        if err.is_transient() {
            tracing::warn!(error = %err, "Session store unavailable");
            AuthError::transient("session store unavailable")
        } else {
            tracing::error!(error = %err, "Session store failure");
            AuthError::internal("session store failure")
        }
    }
}

// =============================================================================
// Session Configuration
// =============================================================================

/// Session store settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Upper bound on any single store call.
    #[serde(default = "default_store_timeout", with = "humantime_serde")]
    pub store_timeout: Duration,

    /// Interval of the background sweep of expired entries.
    #[serde(default = "default_purge_interval", with = "humantime_serde")]
    pub purge_interval: Duration,
}

fn default_store_timeout() -> Duration {
    Duration::from_secs(2)
}

fn default_purge_interval() -> Duration {
    Duration::from_secs(60)
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            store_timeout: default_store_timeout(),
            purge_interval: default_purge_interval(),
        }
    }
}

impl SessionConfig {
    /// Sets the store call bound.
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// Sets the sweep interval.
    pub fn with_purge_interval(mut self, interval: Duration) -> Self {
        self.purge_interval = interval;
        self
    }
}

// =============================================================================
// Session Store Trait
// =============================================================================

/// Server-side record of active tokens.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; a single store is shared by every
/// request through an `Arc<dyn SessionStore>`.
#[async_trait]
pub trait SessionStore: Send + Sync + Debug {
    /// Creates or overwrites the entry for `key`, expiring after `ttl`.
    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), SessionError>;

    /// Returns the live value for `key`, or `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, SessionError>;

    /// Deletes the entry for `key` and returns how many entries were removed.
    ///
    /// `0` means the key was already absent (or expired).
    async fn delete(&self, key: &str) -> Result<u64, SessionError>;

    /// Checks that the store is reachable.
    async fn ping(&self) -> Result<(), SessionError>;

    /// Returns the backend name, for logs and readiness output.
    fn name(&self) -> &str;
}

// =============================================================================
// Tests
// =============================================================================
