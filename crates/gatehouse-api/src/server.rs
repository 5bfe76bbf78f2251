// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API server implementation.

use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::handlers;
use crate::middleware::TransactionLayer;
use crate::state::AppState;

// =============================================================================
// ApiServer
// =============================================================================

/// The API server.
///
/// This is the main entry point for creating and running the HTTP server.
pub struct ApiServer {
    state: AppState,
    config: Arc<ApiConfig>,
}

impl ApiServer {
    /// Creates a new API server with the given state.
    pub fn new(state: AppState) -> Self {
        let config = state.config.clone();
        Self { state, config }
    }

    /// Creates the router with all routes and middleware.
    pub fn router(&self) -> Router {
        let middleware_stack = ServiceBuilder::new()
            .layer(TransactionLayer::new())
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                self.config.request_timeout,
            ));

        let auth_routes = Router::new()
            .route("/register", post(handlers::register))
            .route("/login", post(handlers::login))
            .route("/verify", get(handlers::verify))
            .route("/introspect", get(handlers::introspect))
            .route("/logout", post(handlers::logout));

        // Nesting at "/" is rejected by axum, so root mounts are merged.
        let base_path = self.config.mount_prefix();
        let router = if base_path.is_empty() {
            Router::new().merge(auth_routes)
        } else {
            Router::new().nest(base_path, auth_routes)
        };

        router
            .route("/health", get(handlers::health))
            .route("/ready", get(handlers::ready))
            .layer(DefaultBodyLimit::max(self.config.max_body_size))
            .layer(middleware_stack)
            .with_state(self.state.clone())
    }

    /// Binds the configured address and runs until `shutdown_signal` fires.
    pub async fn run_with_shutdown(
        self,
        shutdown_signal: impl Future<Output = ()> + Send + 'static,
    ) -> ApiResult<()> {
        let addr = self.config.socket_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ApiError::internal(format!("Failed to bind {}: {}", addr, e)))?;

        self.serve(listener, shutdown_signal).await
    }

    /// Serves on an already bound listener.
    ///
    /// In-flight requests get `shutdown_timeout` to drain once the signal
    /// fires; whatever is still running after that is dropped.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown_signal: impl Future<Output = ()> + Send + 'static,
    ) -> ApiResult<()> {
        let local_addr = listener
            .local_addr()
            .map_err(|e| ApiError::internal(format!("Failed to read local address: {}", e)))?;
        let router = self.router();
        let drain_timeout = self.config.shutdown_timeout;

        info!(addr = %local_addr, base_path = %self.config.base_path, "Starting API server");

        let (signalled_tx, signalled_rx) = watch::channel(false);
        let graceful = async move {
            shutdown_signal.await;
            let _ = signalled_tx.send(true);
        };

        let server = axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(graceful)
        .into_future();

        tokio::select! {
            result = server => {
                result.map_err(|e| ApiError::internal(format!("Server error: {}", e)))?;
            }
            _ = drain_deadline(signalled_rx, drain_timeout) => {
                warn!(timeout = ?drain_timeout, "Shutdown timeout elapsed, dropping open connections");
            }
        }

        info!("API server shutdown complete");
        Ok(())
    }

    /// Returns the server address.
    pub fn addr(&self) -> SocketAddr {
        self.config.socket_addr()
    }

    /// Returns the shared state.
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

/// Resolves `timeout` after the shutdown signal has fired. Never resolves
/// if the signal never fires.
async fn drain_deadline(mut signalled: watch::Receiver<bool>, timeout: Duration) {
    if signalled.wait_for(|fired| *fired).await.is_err() {
        std::future::pending::<()>().await;
    }
    tokio::time::sleep(timeout).await;
}

// =============================================================================
// Tests
// =============================================================================
