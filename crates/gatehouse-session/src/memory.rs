// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-process session store.
//!
//! This module provides a thread-safe, in-memory implementation of the
//! `SessionStore` trait. Entries are removed lazily when read after their
//! deadline and in bulk by [`MemorySessionStore::purge_expired`].
//!
//! # Features
//!
//! - **Thread-Safe**: Uses `parking_lot::RwLock` for minimal contention
//! - **Injectable Time**: Deadlines are read from a `gatehouse_core::Clock`
//! - **Lock-Free Statistics**: Counters are atomics
//! - **No Persistence**: Sessions are lost on restart, so every user logs in again
//!
//! # Example
//!
//! ```rust,ignore
//! use gatehouse_session::MemorySessionStore;
//!
//! let store = MemorySessionStore::new();
//! store.put("token", envelope_json, Duration::from_secs(3600)).await?;
//! let removed = store.purge_expired();
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gatehouse_core::{Clock, SystemClock};
use parking_lot::RwLock;
use serde::Serialize;
use tracing::debug;

use crate::traits::{SessionError, SessionStore};

// =============================================================================
// Entry
// =============================================================================

#[derive(Debug, Clone)]
struct SessionEntry {
    value: String,
    expires_at: DateTime<Utc>,
}

impl SessionEntry {
    #[inline]
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

// =============================================================================
// Statistics
// =============================================================================

/// A point-in-time copy of store counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    /// Entries currently held, including expired ones not yet swept.
    pub entries: u64,
    /// Total `put` calls.
    pub puts: u64,
    /// `get` calls that found a live entry.
    pub hits: u64,
    /// `get` calls that found nothing live.
    pub misses: u64,
    /// Entries removed by `delete`.
    pub deleted: u64,
    /// Entries removed because their deadline passed.
    pub expired: u64,
}

#[derive(Debug, Default)]
struct StatsInner {
    puts: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    deleted: AtomicU64,
    expired: AtomicU64,
}

// =============================================================================
// Memory Session Store
// =============================================================================

/// A session store held in process memory.
#[derive(Debug)]
pub struct MemorySessionStore {
    entries: RwLock<HashMap<String, SessionEntry>>,
    clock: Arc<dyn Clock>,
    stats: StatsInner,
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySessionStore {
    /// Creates an empty store driven by the wall clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty store driven by the given clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
            stats: StatsInner::default(),
        }
    }

    /// Removes every expired entry and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        let removed = before - entries.len();

        if removed > 0 {
            self.stats.expired.fetch_add(removed as u64, Ordering::Relaxed);
            debug!(removed, remaining = entries.len(), "Purged expired sessions");
        }
        removed
    }

    /// Returns the number of held entries, including unswept expired ones.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if no entries are held.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns `true` if a live entry exists for `key`.
    pub fn contains(&self, key: &str) -> bool {
        let now = self.clock.now();
        self.entries
            .read()
            .get(key)
            .is_some_and(|entry| entry.is_live(now))
    }

    /// Returns a snapshot of the counters.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            entries: self.len() as u64,
            puts: self.stats.puts.load(Ordering::Relaxed),
            hits: self.stats.hits.load(Ordering::Relaxed),
            misses: self.stats.misses.load(Ordering::Relaxed),
            deleted: self.stats.deleted.load(Ordering::Relaxed),
            expired: self.stats.expired.load(Ordering::Relaxed),
        }
    }

    fn deadline(&self, ttl: Duration) -> Result<DateTime<Utc>, SessionError> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|_| SessionError::backend(format!("ttl out of range: {:?}", ttl)))?;
        self.clock
            .now()
            .checked_add_signed(ttl)
            .ok_or_else(|| SessionError::backend("ttl overflows the calendar"))
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), SessionError> {
        let expires_at = self.deadline(ttl)?;
        self.entries
            .write()
            .insert(key.to_string(), SessionEntry { value, expires_at });
        self.stats.puts.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        let now = self.clock.now();
        {
            let entries = self.entries.read();
            match entries.get(key) {
                Some(entry) if entry.is_live(now) => {
                    self.stats.hits.fetch_add(1, Ordering::Relaxed);
                    return Ok(Some(entry.value.clone()));
                }
                Some(_) => {}
                None => {
                    self.stats.misses.fetch_add(1, Ordering::Relaxed);
                    return Ok(None);
                }
            }
        }

        // Expired: drop it unless a concurrent put has replaced it.
        let mut entries = self.entries.write();
        if entries.get(key).is_some_and(|entry| !entry.is_live(now)) {
            entries.remove(key);
            self.stats.expired.fetch_add(1, Ordering::Relaxed);
        }
        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        Ok(None)
    }

    async fn delete(&self, key: &str) -> Result<u64, SessionError> {
        let now = self.clock.now();
        let removed = self.entries.write().remove(key);
        match removed {
            Some(entry) if entry.is_live(now) => {
                self.stats.deleted.fetch_add(1, Ordering::Relaxed);
                Ok(1)
            }
            Some(_) => {
                self.stats.expired.fetch_add(1, Ordering::Relaxed);
                Ok(0)
            }
            None => Ok(0),
        }
    }

    async fn ping(&self) -> Result<(), SessionError> {
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

// =============================================================================
// Tests
// =============================================================================
