// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # gatehouse-api
//!
//! Token lifecycle, RBAC engine and HTTP surface for Gatehouse.
//!
//! The [`auth`] module holds the protocol-independent operations
//! (registration, login, verification, introspection, logout). The rest of
//! the crate exposes them over HTTP with axum.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod server;
pub mod state;

pub use auth::{
    AuthService, Claims, CredentialVerifier, IssuedToken, JwtConfig, LoginRequest, RbacEngine,
    RegisterRequest, SigningAlgorithm, TokenIssuer, VerifiedPrincipal,
};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorEnvelope};
pub use server::ApiServer;
pub use state::AppState;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
