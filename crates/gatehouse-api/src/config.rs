// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Listener and request limits for the HTTP surface.
//!
//! Token and session settings live with the services that use them; this
//! struct only shapes the router and the listening socket.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Interface to listen on.
    pub host: IpAddr,
    /// TCP port.
    pub port: u16,
    /// Prefix of the auth routes. `/` mounts them at the root.
    pub base_path: String,
    /// Whole-request deadline enforced by the timeout layer.
    pub request_timeout: Duration,
    /// Deadline for each user directory or permission registry call.
    pub directory_timeout: Duration,
    /// How long in-flight requests may drain after a shutdown signal.
    pub shutdown_timeout: Duration,
    /// Request body limit in bytes.
    pub max_body_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            base_path: "/api/auth".to_string(),
            request_timeout: Duration::from_secs(30),
            directory_timeout: Duration::from_secs(2),
            shutdown_timeout: Duration::from_secs(30),
            max_body_size: 64 * 1024,
        }
    }
}

impl ApiConfig {
    /// Address to bind.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Replaces the mount prefix.
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Replaces the directory call deadline.
    pub fn with_directory_timeout(mut self, timeout: Duration) -> Self {
        self.directory_timeout = timeout;
        self
    }

    /// The mount prefix without a trailing slash; empty for root.
    pub fn mount_prefix(&self) -> &str {
        self.base_path.trim_end_matches('/')
    }
}
