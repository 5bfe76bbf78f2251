// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # gatehouse-bin
//!
//! CLI binary for Gatehouse.
//!
//! - CLI argument parsing with clap
//! - Runtime wiring of directory, sessions, tokens and RBAC
//! - Graceful shutdown handling
//! - Logging initialization
//!
//! ## Usage
//!
//! ```bash
//! # Start the server (default command)
//! gatehouse -c /etc/gatehouse/gatehouse.yaml
//!
//! # Validate configuration
//! gatehouse validate --show-config
//!
//! # Hash a password for a seeded user
//! gatehouse hash-password 'correct horse battery staple'
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod shutdown;

// =============================================================================
// Re-exports
// =============================================================================

pub use cli::{Cli, Commands};
pub use error::{BinError, BinResult};
pub use logging::init_logging;
pub use runtime::{Components, GatehouseRuntime, RuntimeBuilder};
pub use shutdown::{ShutdownCoordinator, ShutdownListener};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
