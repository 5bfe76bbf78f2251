// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Server runtime orchestration.
//!
//! Wires the configured directory, session store, token issuer, verifier
//! and RBAC engine into the API server, runs the session purge task and
//! coordinates graceful shutdown.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use gatehouse_api::{
    ApiConfig, ApiServer, AppState, AuthService, CredentialVerifier, JwtConfig, RbacEngine,
    SigningAlgorithm, TokenIssuer,
};
use gatehouse_config::{ConfigLoader, GatehouseConfig};
use gatehouse_core::MemoryDirectory;
use gatehouse_session::{MemorySessionStore, Sessions};

use crate::error::{BinError, BinResult};
use crate::shutdown::ShutdownCoordinator;

// =============================================================================
// Components
// =============================================================================

/// Everything the server needs, built from configuration.
pub struct Components {
    /// The API server, ready to run.
    pub server: ApiServer,
    /// The session store backing the server.
    pub session_store: Arc<MemorySessionStore>,
    /// The seeded directory.
    pub directory: Arc<MemoryDirectory>,
}

impl Components {
    /// Builds all components from a validated configuration.
    pub fn build(config: &GatehouseConfig) -> BinResult<Self> {
        let jwt = jwt_config(config)?;
        jwt.validate()
            .map_err(|e| BinError::config(format!("token settings: {}", e)))?;

        let directory = Arc::new(
            MemoryDirectory::from_seed(config.directory.clone())
                .map_err(|e| BinError::startup(format!("seeding directory: {}", e)))?,
        );

        let session_store = Arc::new(MemorySessionStore::new());
        let sessions = Sessions::new(session_store.clone(), config.session.store_timeout);

        let api_config = api_config(config);
        let auth = AuthService::new(
            directory.clone(),
            TokenIssuer::new(jwt.clone()),
            CredentialVerifier::new(jwt, sessions),
            RbacEngine::new(directory.clone(), api_config.directory_timeout),
            api_config.directory_timeout,
        )
        .with_default_roles(config.directory.default_roles.clone());

        info!(
            users = directory.user_count(),
            roles = config.directory.roles.len(),
            endpoints = config.directory.endpoints.len(),
            "Directory seeded"
        );

        Ok(Self {
            server: ApiServer::new(AppState::new(api_config, auth)),
            session_store,
            directory,
        })
    }
}

/// Maps the security section onto the token configuration.
pub fn jwt_config(config: &GatehouseConfig) -> BinResult<JwtConfig> {
    let security = &config.security;
    let secret = security
        .jwt_secret
        .as_ref()
        .ok_or_else(|| BinError::config("security.jwt_secret is not set"))?;
    let algorithm = SigningAlgorithm::parse(&security.algorithm.to_ascii_uppercase())
        .ok_or_else(|| {
            BinError::config(format!("Unsupported signing algorithm: {}", security.algorithm))
        })?;

    Ok(JwtConfig::new(secret.expose())
        .with_algorithm(algorithm)
        .with_token_ttl(security.token_ttl))
}

/// Maps the server section onto the API configuration.
pub fn api_config(config: &GatehouseConfig) -> ApiConfig {
    let server = &config.server;
    ApiConfig {
        host: server.host,
        port: server.port,
        base_path: server.base_path.clone(),
        request_timeout: server.request_timeout,
        directory_timeout: server.directory_timeout,
        shutdown_timeout: server.shutdown_timeout,
        max_body_size: server.max_body_size,
    }
}

// =============================================================================
// Session Housekeeping
// =============================================================================

/// Spawns the periodic sweep of expired sessions.
///
/// Verification never depends on this task; expired entries are already
/// invisible to lookups. The sweep only reclaims memory.
pub fn spawn_purge_task(
    store: Arc<MemorySessionStore>,
    interval: Duration,
    shutdown: &ShutdownCoordinator,
) -> JoinHandle<()> {
    let mut stop = shutdown.subscribe();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let purged = store.purge_expired();
                    if purged > 0 {
                        debug!(purged, remaining = store.len(), "Purged expired sessions");
                    }
                }
                _ = stop.stopped() => {
                    debug!("Session purge task stopped");
                    break;
                }
            }
        }
    })
}

// =============================================================================
// GatehouseRuntime
// =============================================================================

/// The server runtime.
pub struct GatehouseRuntime {
    config: Arc<GatehouseConfig>,
    shutdown: ShutdownCoordinator,
}

impl GatehouseRuntime {
    /// Creates a new runtime.
    pub fn new(config: GatehouseConfig) -> Self {
        Self {
            config: Arc::new(config),
            shutdown: ShutdownCoordinator::new(),
        }
    }

    /// Returns the shutdown coordinator.
    pub fn shutdown(&self) -> &ShutdownCoordinator {
        &self.shutdown
    }

    /// Runs the server until a shutdown signal arrives.
    pub async fn run(self) -> BinResult<()> {
        info!("Starting Gatehouse v{}", gatehouse_api::VERSION);

        let components = Components::build(&self.config)?;
        let purge = spawn_purge_task(
            components.session_store.clone(),
            self.config.session.purge_interval,
            &self.shutdown,
        );

        let signals = {
            let shutdown = self.shutdown.clone();
            tokio::spawn(async move { shutdown.wait_for_shutdown().await })
        };

        info!(
            addr = %components.server.addr(),
            base_path = %self.config.server.base_path,
            "Gatehouse is ready"
        );

        let result = components
            .server
            .run_with_shutdown(self.shutdown.shutdown_signal())
            .await;

        // The server may also stop on its own, e.g. a bind failure.
        self.shutdown.initiate_shutdown();
        signals.abort();
        if let Err(e) = purge.await {
            warn!(error = %e, "Session purge task ended abnormally");
        }

        info!("Gatehouse shutdown complete");
        result.map_err(BinError::from)
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for constructing the runtime.
#[derive(Default)]
pub struct RuntimeBuilder {
    config_path: Option<PathBuf>,
    config: Option<GatehouseConfig>,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration file path.
    pub fn config_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the configuration directly.
    pub fn config(mut self, config: GatehouseConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Builds the runtime.
    pub fn build(self) -> BinResult<GatehouseRuntime> {
        let config = match self.config {
            Some(config) => {
                config.validate()?;
                config
            }
            None => {
                let path = self
                    .config_path
                    .ok_or_else(|| BinError::config("No configuration provided"))?;
                ConfigLoader::new()
                    .load(&path)
                    .map_err(|e| BinError::from(e).with_context(format!("Loading {}", path.display())))?
            }
        };

        Ok(GatehouseRuntime::new(config))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_config::SecretValue;
    use gatehouse_core::{Permission, Role, RoleId};

    fn test_config() -> GatehouseConfig {
        let mut config = GatehouseConfig::default();
        config.security.jwt_secret = Some(SecretValue::new("runtime-test-secret"));
        config.security.algorithm = "hs384".to_string();
        config.directory.permissions = vec![Permission::new(1, "READ")];
        config.directory.roles = vec![Role::new(1, "READER").with_permissions([1])];
        config.directory.default_roles = vec![RoleId(1)];
        config
    }

    #[test]
    fn test_runtime_builder() {
        assert!(RuntimeBuilder::new().config(test_config()).build().is_ok());
    }

    #[test]
    fn test_runtime_builder_requires_config() {
        let result = RuntimeBuilder::new().build();
        assert!(result.is_err());
    }

    #[test]
    fn test_runtime_builder_rejects_invalid_config() {
        let err = RuntimeBuilder::new()
            .config(GatehouseConfig::default())
            .build()
            .err()
            .unwrap();
        assert_eq!(err.exit_code(), crate::error::exit::CONFIG);
    }

    #[test]
    fn test_config_mapping() {
        let config = test_config();
        let jwt = jwt_config(&config).unwrap();
        assert_eq!(jwt.algorithm, SigningAlgorithm::HS384);
        assert_eq!(jwt.token_ttl, config.security.token_ttl);

        let api = api_config(&config);
        assert_eq!(api.port, config.server.port);
        assert_eq!(api.base_path, "/api/auth");
    }

    #[tokio::test]
    async fn test_components_build() {
        let components = Components::build(&test_config()).unwrap();
        assert_eq!(components.directory.user_count(), 0);
        assert!(components.session_store.is_empty());
    }

    #[tokio::test]
    async fn test_purge_task_stops_on_shutdown() {
        let shutdown = ShutdownCoordinator::new();
        let store = Arc::new(MemorySessionStore::new());
        let handle = spawn_purge_task(store, Duration::from_millis(5), &shutdown);

        tokio::time::sleep(Duration::from_millis(20)).await;
        shutdown.initiate_shutdown();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("purge task should stop")
            .unwrap();
    }
}
