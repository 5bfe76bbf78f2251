// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Liveness and readiness probes. Both are mounted outside the base path.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::response::{Liveness, Readiness};
use crate::state::AppState;

/// GET /health
///
/// Answers 200 whenever the process can serve HTTP at all.
pub async fn health() -> impl IntoResponse {
    Json(Liveness::alive())
}

/// GET /ready
///
/// 200 once the session store answers a ping within its call bound,
/// 503 otherwise.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.auth().verifier().sessions().store().name();

    match state.auth().ready().await {
        Ok(()) => (StatusCode::OK, Json(Readiness::up(store))),
        Err(e) => {
            tracing::warn!(error = %e, store, "Session store not ready");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(Readiness::down(store, e.message())),
            )
        }
    }
}
