// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Graceful shutdown.
//!
//! A single `watch` flag flips from `false` to `true` exactly once, either on
//! SIGTERM/SIGINT or when the runtime decides to stop. The HTTP server and the
//! session purge task both listen on it.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info};

/// Owns the shutdown flag. Clones share it.
#[derive(Clone)]
pub struct ShutdownCoordinator {
    flag: Arc<watch::Sender<bool>>,
}

/// One subscriber's view of the shutdown flag.
pub struct ShutdownListener {
    flag: watch::Receiver<bool>,
}

impl ShutdownListener {
    /// Resolves once shutdown has begun, immediately if it already has.
    pub async fn stopped(&mut self) {
        // An error means every coordinator is gone, which is a shutdown too.
        let _ = self.flag.wait_for(|stopping| *stopping).await;
    }
}

impl ShutdownCoordinator {
    /// Creates a coordinator in the running state.
    pub fn new() -> Self {
        let (flag, _) = watch::channel(false);
        Self {
            flag: Arc::new(flag),
        }
    }

    /// Registers a new listener.
    pub fn subscribe(&self) -> ShutdownListener {
        ShutdownListener {
            flag: self.flag.subscribe(),
        }
    }

    /// An owned future for `axum::serve(..).with_graceful_shutdown`.
    pub fn shutdown_signal(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut listener = self.subscribe();
        async move { listener.stopped().await }
    }

    /// Flips the flag. Later calls are no-ops.
    pub fn initiate_shutdown(&self) {
        let first = self.flag.send_if_modified(|stopping| {
            let changed = !*stopping;
            *stopping = true;
            changed
        });
        if first {
            info!("Shutting down");
        }
    }

    /// Whether the flag has flipped.
    pub fn is_shutdown_initiated(&self) -> bool {
        *self.flag.borrow()
    }

    /// Blocks until an OS signal arrives or someone else initiates shutdown.
    pub async fn wait_for_shutdown(&self) {
        tokio::select! {
            _ = os_signal() => self.initiate_shutdown(),
            _ = self.shutdown_signal() => {}
        }
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
async fn os_signal() {
    use tokio::signal::unix::{Signal, SignalKind, signal};

    fn install(kind: SignalKind, name: &str) -> Option<Signal> {
        signal(kind)
            .inspect_err(|e| error!(signal = name, error = %e, "Cannot install signal handler"))
            .ok()
    }

    async fn next(stream: &mut Option<Signal>) {
        match stream {
            Some(stream) => {
                stream.recv().await;
            }
            None => std::future::pending().await,
        }
    }

    let mut sigterm = install(SignalKind::terminate(), "SIGTERM");
    let mut sigint = install(SignalKind::interrupt(), "SIGINT");

    tokio::select! {
        _ = next(&mut sigterm) => info!(signal = "SIGTERM", "Signal received"),
        _ = next(&mut sigint) => info!(signal = "SIGINT", "Signal received"),
    }
}

#[cfg(not(unix))]
async fn os_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Cannot install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    info!(signal = "ctrl-c", "Signal received");
}
