// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Application state shared across handlers.

use std::sync::Arc;

use crate::auth::AuthService;
use crate::config::ApiConfig;

/// Application state shared across all handlers.
///
/// Passed to handlers via Axum's state extraction. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct AppState {
    /// API configuration.
    pub config: Arc<ApiConfig>,
    /// Credential lifecycle operations.
    pub auth: AuthService,
}

impl AppState {
    /// Creates the state.
    pub fn new(config: ApiConfig, auth: AuthService) -> Self {
        Self {
            config: Arc::new(config),
            auth,
        }
    }

    /// Returns the auth service.
    pub fn auth(&self) -> &AuthService {
        &self.auth
    }
}
