// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Success bodies.
//!
//! Handlers return `{"success": true, "data"?, "message"?}`; the failure
//! counterpart lives in [`crate::error`].

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Success envelope carrying an optional payload and note.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    /// Always `true`.
    pub success: bool,
    /// The payload, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Human-readable outcome.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip)]
    status: StatusCode,
}

impl<T> ApiResponse<T> {
    fn with_status(status: StatusCode, data: Option<T>) -> Self {
        Self {
            success: true,
            data,
            message: None,
            status,
        }
    }

    /// 200 with `data`.
    pub fn ok(data: T) -> Self {
        Self::with_status(StatusCode::OK, Some(data))
    }

    /// 201 with `data`.
    pub fn created(data: T) -> Self {
        Self::with_status(StatusCode::CREATED, Some(data))
    }

    /// Attaches a `message`.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiResponse<()> {
    /// 200 with only a `message`, e.g. after logout.
    pub fn message(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::OK, None).with_message(message)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

/// `data` of a successful login.
#[derive(Debug, Serialize)]
pub struct BearerGrant {
    /// Signed token for the `Authorization` header.
    pub token: String,
    /// Always `Bearer`.
    pub token_type: &'static str,
    /// Same instant as the token's `exp` and the session's end.
    pub expires_at: Option<DateTime<Utc>>,
}

impl BearerGrant {
    /// Grants `token` as a bearer credential.
    pub fn new(token: String, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            token,
            token_type: "Bearer",
            expires_at,
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct Liveness {
    /// Always `ok`.
    pub status: &'static str,
    /// Server version.
    pub version: &'static str,
}

impl Liveness {
    /// The only liveness answer.
    pub fn alive() -> Self {
        Self {
            status: "ok",
            version: crate::VERSION,
        }
    }
}

/// Body of `GET /ready`.
#[derive(Debug, Serialize)]
pub struct Readiness {
    /// Whether the session store answered in time.
    pub ready: bool,
    /// Backend name reported by the session store.
    pub session_store: String,
    /// Why the gate is not ready.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Readiness {
    /// The store answered.
    pub fn up(session_store: impl Into<String>) -> Self {
        Self {
            ready: true,
            session_store: session_store.into(),
            reason: None,
        }
    }

    /// The store failed or timed out.
    pub fn down(session_store: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            ready: false,
            session_store: session_store.into(),
            reason: Some(reason.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_created_status() {
        let response = ApiResponse::created(serde_json::json!({"id": 1}))
            .with_message("registered")
            .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body(response).await;
        assert_eq!(json["data"]["id"], 1);
        assert_eq!(json["message"], "registered");
    }

    #[tokio::test]
    async fn test_message_only_body() {
        let json = body(ApiResponse::message("logged out").into_response()).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "logged out");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_bearer_grant_shape() {
        let json = serde_json::to_value(BearerGrant::new("t".to_string(), None)).unwrap();
        assert_eq!(json["token_type"], "Bearer");
        assert!(json["expires_at"].is_null());
    }

    #[test]
    fn test_readiness_reason_only_when_down() {
        let up = serde_json::to_value(Readiness::up("memory")).unwrap();
        assert!(up.get("reason").is_none());
        let down = serde_json::to_value(Readiness::down("memory", "timed out")).unwrap();
        assert_eq!(down["ready"], false);
        assert_eq!(down["reason"], "timed out");
    }
}
