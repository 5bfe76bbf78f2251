// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration schema for Gatehouse.
//!
//! ```yaml
//! server:
//!   port: 8080
//!   base_path: /api/auth
//! security:
//!   jwt_secret: "${GATEHOUSE_JWT_SECRET}"
//!   algorithm: HS256
//!   token_ttl: 12h
//! session:
//!   store_timeout: 2s
//!   purge_interval: 60s
//! logging:
//!   level: info
//!   format: text
//! directory:
//!   permissions:
//!     - { id: 1, name: ALL, grants_all: true }
//!   roles:
//!     - { id: 1, name: SUPERADMIN, permissions: [1] }
//! ```

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use gatehouse_core::DirectorySeed;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ConfigError, ConfigResult};

// =============================================================================
// Constants
// =============================================================================

/// Default server port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default base path of the auth routes.
pub const DEFAULT_BASE_PATH: &str = "/api/auth";

/// Default token lifetime (12 hours).
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// Signing algorithms accepted by the token issuer.
pub const SUPPORTED_ALGORITHMS: &[&str] = &["HS256", "HS384", "HS512"];

// =============================================================================
// Top-Level Configuration
// =============================================================================

/// The root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatehouseConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Token signing configuration.
    #[serde(default)]
    pub security: SecurityConfig,

    /// Session store configuration.
    #[serde(default)]
    pub session: SessionConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Directory seed data.
    #[serde(default)]
    pub directory: DirectorySeed,
}

impl GatehouseConfig {
    /// Validates the entire configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.server.validate()?;
        self.security.validate()?;
        self.session.validate()?;
        self.directory
            .validate()
            .map_err(|e| ConfigError::validation("directory", format!("is inconsistent: {}", e)))?;
        Ok(())
    }
}

// =============================================================================
// Server Configuration
// =============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Mount point of the auth routes.
    #[serde(default = "default_base_path")]
    pub base_path: String,

    /// Upper bound on a whole request.
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Upper bound on each directory call.
    #[serde(default = "default_directory_timeout", with = "humantime_serde")]
    pub directory_timeout: Duration,

    /// Grace period for in-flight requests on shutdown.
    #[serde(default = "default_shutdown_timeout", with = "humantime_serde")]
    pub shutdown_timeout: Duration,

    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0))
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_base_path() -> String {
    DEFAULT_BASE_PATH.to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_directory_timeout() -> Duration {
    Duration::from_secs(2)
}

fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_max_body_size() -> usize {
    64 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            base_path: default_base_path(),
            request_timeout: default_request_timeout(),
            directory_timeout: default_directory_timeout(),
            shutdown_timeout: default_shutdown_timeout(),
            max_body_size: default_max_body_size(),
        }
    }
}

impl ServerConfig {
    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Validates the server configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.port == 0 {
            return Err(ConfigError::validation("server.port", "must not be 0"));
        }
        if !self.base_path.starts_with('/') {
            return Err(ConfigError::validation(
                "server.base_path",
                "must start with '/'",
            ));
        }
        require_nonzero("server.request_timeout", self.request_timeout)?;
        require_nonzero("server.directory_timeout", self.directory_timeout)?;
        require_nonzero("server.shutdown_timeout", self.shutdown_timeout)?;
        if self.max_body_size == 0 {
            return Err(ConfigError::validation("server.max_body_size", "must not be 0"));
        }
        Ok(())
    }
}

// =============================================================================
// Security Configuration
// =============================================================================

/// Token signing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecurityConfig {
    /// HMAC signing secret.
    #[serde(default)]
    pub jwt_secret: Option<SecretValue>,

    /// Signing algorithm name.
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// Token and session lifetime.
    #[serde(default = "default_token_ttl", with = "humantime_serde")]
    pub token_ttl: Duration,
}

fn default_algorithm() -> String {
    "HS256".to_string()
}

fn default_token_ttl() -> Duration {
    DEFAULT_TOKEN_TTL
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            algorithm: default_algorithm(),
            token_ttl: default_token_ttl(),
        }
    }
}

impl SecurityConfig {
    /// Validates the security configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        match &self.jwt_secret {
            None => return Err(ConfigError::missing_field("security.jwt_secret")),
            Some(secret) if secret.expose().trim().is_empty() => {
                return Err(ConfigError::validation("security.jwt_secret", "must not be empty"));
            }
            Some(secret) if secret.is_unresolved_placeholder() => {
                return Err(ConfigError::validation(
                    "security.jwt_secret",
                    "environment placeholder was not resolved",
                ));
            }
            Some(_) => {}
        }

        if !SUPPORTED_ALGORITHMS
            .iter()
            .any(|a| a.eq_ignore_ascii_case(&self.algorithm))
        {
            return Err(ConfigError::validation(
                "security.algorithm",
                format!(
                    "unsupported algorithm '{}', expected one of {}",
                    self.algorithm,
                    SUPPORTED_ALGORITHMS.join(", ")
                ),
            ));
        }

        require_nonzero("security.token_ttl", self.token_ttl)
    }
}

// =============================================================================
// Session Configuration
// =============================================================================

/// Session store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Upper bound on each store call.
    #[serde(default = "default_store_timeout", with = "humantime_serde")]
    pub store_timeout: Duration,

    /// Interval of the expired-entry sweep.
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
    /// Validates the session configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        require_nonzero("session.store_timeout", self.store_timeout)?;
        require_nonzero("session.purge_interval", self.purge_interval)
    }
}

// =============================================================================
// Logging Configuration
// =============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Log format.
    #[serde(default)]
    pub format: LogFormat,
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Returns the filter directive for this level.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Parses a level name, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Single-line compact text.
    Compact,
    /// JSON lines.
    Json,
}

// =============================================================================
// Secret Value
// =============================================================================

/// A secret that never appears in `Debug`, `Display` or serialized output.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretValue(String);

impl SecretValue {
    /// Creates a new secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the secret text.
    pub fn expose(&self) -> &str {
        &self.0
    }

    fn is_unresolved_placeholder(&self) -> bool {
        self.0.starts_with("${") && self.0.ends_with('}')
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretValue(***)")
    }
}

impl fmt::Display for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

impl Serialize for SecretValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("***")
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(SecretValue)
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn require_nonzero(field: &str, value: Duration) -> ConfigResult<()> {
    if value.is_zero() {
        Err(ConfigError::validation(field, "must be greater than 0"))
    } else {
        Ok(())
    }
}
