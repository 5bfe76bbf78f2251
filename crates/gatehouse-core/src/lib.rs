// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # gatehouse-core
//!
//! Core abstractions and shared types for the Gatehouse authorization gate.
//!
//! This crate provides the foundational types and contracts used across all
//! Gatehouse components:
//!
//! - **Error**: The `AuthError` taxonomy every operation reports through
//! - **Model**: Principals, roles, permissions, endpoints and principal snapshots
//! - **Directory**: The `UserDirectory` and `PermissionRegistry` collaborator traits
//! - **Memory**: An in-memory directory seeded from configuration
//! - **Clock**: Injectable time source for expiry decisions
//!
//! ## Example
//!
//! ```rust,ignore
//! use gatehouse_core::directory::{DirectorySeed, PermissionRegistry};
//! use gatehouse_core::memory::MemoryDirectory;
//! use gatehouse_core::model::ResourceRequest;
//!
//! let directory = MemoryDirectory::from_seed(DirectorySeed::default())?;
//! let endpoint = directory
//!     .find_endpoint(&ResourceRequest::new("billing", "/invoices", "GET"))
//!     .await;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod clock;
pub mod directory;
pub mod error;
pub mod memory;
pub mod model;

// =============================================================================
// Re-exports
// =============================================================================

pub use clock::{Clock, ManualClock, SystemClock};
pub use directory::{DirectorySeed, PermissionRegistry, UserDirectory, UserSeed};
pub use error::{AuthError, AuthResult, DirectoryError, DirectoryResult, ErrorKind, FieldViolation};
pub use memory::MemoryDirectory;
pub use model::{
    Endpoint, NewPrincipal, Permission, PermissionId, Principal, PrincipalSnapshot,
    ResourceRequest, Role, RoleId, RoleNames,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
