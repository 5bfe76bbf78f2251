// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication handlers.

use axum::{
    extract::State,
    http::{HeaderName, HeaderValue},
    response::{IntoResponse, Response},
};
use gatehouse_core::PrincipalSnapshot;

use crate::auth::{LoginRequest, RegisterRequest};
use crate::error::{ApiError, ApiResult};
use crate::extractors::{BearerToken, ForwardedResource, ValidatedJson};
use crate::response::{ApiResponse, BearerGrant};
use crate::state::AppState;

/// Email of the authorized principal.
pub const AUTH_EMAIL_HEADER: HeaderName = HeaderName::from_static("x-auth-email");
/// Pipe-joined role names of the authorized principal.
pub const AUTH_ROLES_HEADER: HeaderName = HeaderName::from_static("x-auth-roles");
/// Base64url JSON snapshot of the authorized principal.
pub const AUTH_USER_HEADER: HeaderName = HeaderName::from_static("x-auth-user");

// =============================================================================
// Register
// =============================================================================

/// POST /register
///
/// Creates a principal with the configured default roles.
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> ApiResult<ApiResponse<PrincipalSnapshot>> {
    let snapshot = state.auth().register(request).await?;
    Ok(ApiResponse::created(snapshot).with_message("registered"))
}

// =============================================================================
// Login
// =============================================================================

/// POST /login
///
/// Exchanges credentials for a bearer token.
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<ApiResponse<BearerGrant>> {
    let issued = state.auth().login(request).await?;
    let expires_at = issued.expires_at();
    Ok(ApiResponse::ok(BearerGrant::new(issued.token, expires_at)))
}

// =============================================================================
// Verify
// =============================================================================

/// GET /verify
///
/// Returns the principal behind a usable token.
pub async fn verify(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> ApiResult<ApiResponse<PrincipalSnapshot>> {
    let verified = state.auth().verify(&token).await?;
    Ok(ApiResponse::ok(verified.snapshot))
}

// =============================================================================
// Introspect
// =============================================================================

/// GET /introspect
///
/// Forward-auth check. Verifies the token, authorizes the forwarded
/// `(service, path, method)` triple and emits the principal as headers.
pub async fn introspect(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    ForwardedResource(resource): ForwardedResource,
) -> ApiResult<Response> {
    let verified = state.auth().introspect(&token, &resource).await?;

    let email = header_value(verified.email())?;
    let roles = header_value(&verified.snapshot.roles.encode())?;
    let user = header_value(&verified.encoded_snapshot()?)?;

    let mut response = ApiResponse::ok(verified.snapshot).into_response();
    let headers = response.headers_mut();
    headers.insert(AUTH_EMAIL_HEADER, email);
    headers.insert(AUTH_ROLES_HEADER, roles);
    headers.insert(AUTH_USER_HEADER, user);
    Ok(response)
}

fn header_value(value: &str) -> ApiResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| ApiError::internal("principal field is not a valid header value"))
}

// =============================================================================
// Logout
// =============================================================================

/// POST /logout
///
/// Revokes the presented token.
pub async fn logout(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> ApiResult<ApiResponse<()>> {
    state.auth().logout(&token).await?;
    Ok(ApiResponse::message("logged out"))
}
