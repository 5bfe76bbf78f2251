// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API request handlers.
//!
//! - Auth: register, login, verify, introspect, logout
//! - Health: liveness and readiness probes

mod auth;
mod health;

pub use auth::{
    AUTH_EMAIL_HEADER, AUTH_ROLES_HEADER, AUTH_USER_HEADER, introspect, login, logout, register,
    verify,
};
pub use health::{health, ready};
