// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # gatehouse-session
//!
//! Server-side session storage for Gatehouse.
//!
//! A token is only usable while a session keyed by that token exists. This
//! crate provides:
//!
//! - **SessionStore**: the string key-value contract with per-key expiry
//! - **MemorySessionStore**: the bundled in-process backend
//! - **Sessions**: the typed facade that encodes [`SessionEnvelope`] values and
//!   bounds every store call
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use gatehouse_session::{MemorySessionStore, SessionConfig, Sessions};
//!
//! let sessions = Sessions::from_config(Arc::new(MemorySessionStore::new()), &SessionConfig::default());
//! sessions.open(&token, &snapshot, ttl).await?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod memory;
pub mod sessions;
pub mod traits;

// =============================================================================
// Re-exports
// =============================================================================

pub use memory::{MemorySessionStore, SessionStats};
pub use sessions::{SessionEnvelope, Sessions};
pub use traits::{SessionConfig, SessionError, SessionStore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
