// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # gatehouse-config
//!
//! Configuration management for Gatehouse.
//!
//! ## Features
//!
//! - **Schema Definition**: server, security, session, logging and directory sections
//! - **Multi-Format Support**: YAML, TOML, and JSON configuration files
//! - **Environment Overrides**: `GATEHOUSE_*` variables and `${VAR:default}` placeholders
//! - **Secrets**: the signing secret never prints
//!
//! ## Quick Start
//!
//! ```no_run
//! use gatehouse_config::load_config;
//!
//! let config = load_config("gatehouse.yaml").unwrap();
//! println!("Roles: {}", config.directory.roles.len());
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod error;
pub mod loader;
pub mod schema;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigFormat, ConfigLoader, ENV_PREFIX, expand_placeholders, load_config};
pub use schema::{
    GatehouseConfig, LogFormat, LogLevel, LoggingConfig, SecretValue, SecurityConfig,
    ServerConfig, SessionConfig, SUPPORTED_ALGORITHMS,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
