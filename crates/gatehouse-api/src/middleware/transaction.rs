// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Transaction ID middleware.
//!
//! Every request gets a transaction id, taken from `X-Transaction-ID` when the
//! caller sent a usable one and generated otherwise. The id is stored in the
//! request extensions, recorded on the request span and echoed on the response.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request, Response},
};
use tower::{Layer, Service};
use tracing::Instrument;
use uuid::Uuid;

/// Header carrying the transaction id.
pub const TRANSACTION_ID_HEADER: HeaderName = HeaderName::from_static("x-transaction-id");

const MAX_LEN: usize = 128;

// =============================================================================
// TransactionId
// =============================================================================

/// Correlation id of a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransactionId(String);

impl TransactionId {
    /// Generates a fresh `TRX-<uuidv7>` id.
    pub fn generate() -> Self {
        Self(format!("TRX-{}", Uuid::now_v7()))
    }

    /// Accepts a caller-supplied id if it is non-empty visible ASCII of at
    /// most 128 characters.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let usable = !value.is_empty()
            && value.len() <= MAX_LEN
            && value.bytes().all(|b| b.is_ascii_graphic());
        usable.then(|| Self(value.to_string()))
    }

    /// Returns the id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// TransactionLayer
// =============================================================================

/// Layer that tags requests and responses with a transaction id.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionLayer;

impl TransactionLayer {
    /// Creates the layer.
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for TransactionLayer {
    type Service = TransactionMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TransactionMiddleware { inner }
    }
}

// =============================================================================
// TransactionMiddleware
// =============================================================================

/// Middleware produced by [`TransactionLayer`].
#[derive(Debug, Clone)]
pub struct TransactionMiddleware<S> {
    inner: S,
}

impl<S, B> Service<Request<Body>> for TransactionMiddleware<S>
where
    S: Service<Request<Body>, Response = Response<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let id = req
            .headers()
            .get(&TRANSACTION_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(TransactionId::parse)
            .unwrap_or_else(TransactionId::generate);

        let span = tracing::info_span!(
            "request",
            transaction_id = %id,
            method = %req.method(),
            path = %req.uri().path(),
        );
        req.extensions_mut().insert(id.clone());

        let mut inner = self.inner.clone();
        Box::pin(
            async move {
                let mut response = inner.call(req).await?;
                if let Ok(value) = HeaderValue::from_str(id.as_str()) {
                    response.headers_mut().insert(TRANSACTION_ID_HEADER, value);
                }
                Ok(response)
            }
            .instrument(span),
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
