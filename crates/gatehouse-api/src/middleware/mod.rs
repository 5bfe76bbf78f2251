// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Middleware implementations for the API server.
//!
//! - [`TransactionLayer`]: transaction id tagging and the per-request span
//!
//! Request tracing and the request-wide timeout come from `tower-http` and are
//! assembled in [`crate::server`].

mod transaction;

pub use transaction::{TRANSACTION_ID_HEADER, TransactionId, TransactionLayer, TransactionMiddleware};
