// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! HTTP rendering of gate failures.
//!
//! Every failure leaves the server as
//! `{"success": false, "error": {"code", "message", "details"?}}` with a
//! status derived from the `AuthError` kind. Server-side faults keep their
//! text in the log and show callers a fixed message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use gatehouse_core::{AuthError, FieldViolation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

const UNAVAILABLE_MESSAGE: &str = "service temporarily unavailable";
const INTERNAL_MESSAGE: &str = "internal server error";

/// A failure on its way to becoming an HTTP response.
#[derive(Debug, Error)]
#[error("{code} ({status}): {message}")]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    fields: Vec<FieldViolation>,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// 400: the request could not be understood.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    /// 401: no valid credential, or the credential may not pass.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    /// 404
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    /// 409
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "CONFLICT", message)
    }

    /// 422 with one entry per offending field.
    pub fn validation(message: impl Into<String>, fields: Vec<FieldViolation>) -> Self {
        Self {
            fields,
            ..Self::new(StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR", message)
        }
    }

    /// 503: a dependency timed out or is down. Retrying may succeed.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE", message)
    }

    /// 500
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }

    /// HTTP status of the response.
    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    /// Stable machine-readable code, e.g. `UNAUTHORIZED`.
    pub fn error_code(&self) -> &'static str {
        self.code
    }

    /// The message callers see. 5xx faults never expose their cause.
    pub fn user_message(&self) -> &str {
        match self.status {
            StatusCode::SERVICE_UNAVAILABLE => UNAVAILABLE_MESSAGE,
            s if s.is_server_error() => INTERNAL_MESSAGE,
            _ => &self.message,
        }
    }

    /// Whether this is a 5xx fault rather than a refusal.
    pub fn is_server_error(&self) -> bool {
        self.status.is_server_error()
    }

    /// Field violations carried by a 422.
    pub fn fields(&self) -> &[FieldViolation] {
        &self.fields
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::BadRequest { message } => Self::bad_request(message),
            AuthError::Validation { message, fields } => Self::validation(message, fields),
            AuthError::Unauthorized { message } => Self::unauthorized(message),
            AuthError::Conflict { message } => Self::conflict(message),
            AuthError::NotFound { message } => Self::not_found(message),
            AuthError::Internal {
                message,
                transient: true,
            } => Self::service_unavailable(message),
            AuthError::Internal { message, .. } => Self::internal(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            tracing::error!(
                code = self.code,
                status = %self.status,
                cause = %self.message,
                "Request failed"
            );
        } else {
            tracing::debug!(
                code = self.code,
                status = %self.status,
                reason = %self.message,
                "Request refused"
            );
        }

        let details = (!self.fields.is_empty()).then(|| FieldDetails {
            fields: self.fields.clone(),
        });
        let body = ErrorEnvelope {
            success: false,
            error: ErrorBody {
                code: self.code.to_string(),
                message: self.user_message().to_string(),
                details,
            },
        };

        (self.status, Json(body)).into_response()
    }
}

/// Wire form of a failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Always `false`.
    pub success: bool,
    /// What went wrong.
    pub error: ErrorBody,
}

/// The `error` object of an envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// See [`ApiError::error_code`].
    pub code: String,
    /// See [`ApiError::user_message`].
    pub message: String,
    /// Present only for validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<FieldDetails>,
}

/// `details` of a 422: every rule the submitted body broke.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldDetails {
    /// One entry per violated rule.
    pub fields: Vec<FieldViolation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_mapping() {
        let cases = [
            (AuthError::bad_request("x"), StatusCode::BAD_REQUEST),
            (AuthError::validation("x", vec![]), StatusCode::UNPROCESSABLE_ENTITY),
            (AuthError::unauthorized("x"), StatusCode::UNAUTHORIZED),
            (AuthError::not_found("x"), StatusCode::NOT_FOUND),
            (AuthError::conflict("x"), StatusCode::CONFLICT),
            (AuthError::transient("x"), StatusCode::SERVICE_UNAVAILABLE),
            (AuthError::internal("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }

    #[test]
    fn test_server_faults_hide_their_cause() {
        let err = ApiError::from(AuthError::internal("JWT secret is not configured"));
        assert_eq!(err.user_message(), "internal server error");
        assert_eq!(err.error_code(), "INTERNAL_ERROR");

        let err = ApiError::from(AuthError::transient("session store timed out"));
        assert_eq!(err.user_message(), "service temporarily unavailable");
    }

    #[test]
    fn test_denial_message_is_kept() {
        let err = ApiError::from(AuthError::unauthorized("token expired"));
        assert_eq!(err.user_message(), "token expired");
        assert!(!err.is_server_error());
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let err = ApiError::from(AuthError::validation(
            "validation failed",
            vec![FieldViolation::new("email", "email is required")],
        ));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(json["error"]["details"]["fields"][0]["field"], "email");
    }

    #[tokio::test]
    async fn test_details_omitted_without_fields() {
        let response = ApiError::not_found("token not found").into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"]["message"], "token not found");
        assert!(json["error"].get("details").is_none());
    }
}
