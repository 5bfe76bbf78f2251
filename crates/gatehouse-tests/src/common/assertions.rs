// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Custom Assertions

use std::fmt::Debug;

use gatehouse_core::{AuthError, AuthResult, ErrorKind};
use serde_json::Value;

/// Asserts that `result` failed with `kind` and returns the error.
#[track_caller]
pub fn assert_error_kind<T: Debug>(result: AuthResult<T>, kind: ErrorKind) -> AuthError {
    match result {
        Ok(value) => panic!("expected {:?} error, got Ok({:?})", kind, value),
        Err(err) => {
            assert_eq!(err.kind(), kind, "unexpected error: {}", err);
            err
        }
    }
}

/// Asserts an `Unauthorized` error carrying `message`.
#[track_caller]
pub fn assert_unauthorized<T: Debug>(result: AuthResult<T>, message: &str) {
    let err = assert_error_kind(result, ErrorKind::Unauthorized);
    assert_eq!(err.message(), message);
}

/// Asserts a retryable internal error.
#[track_caller]
pub fn assert_transient<T: Debug>(result: AuthResult<T>) {
    let err = assert_error_kind(result, ErrorKind::Internal);
    assert!(err.is_transient(), "expected a transient error, got {}", err);
}

/// Asserts the JSON error envelope `{success: false, error: {code, message}}`.
#[track_caller]
pub fn assert_error_body(body: &Value, code: &str, message: &str) {
    assert_eq!(body["success"], false, "body: {}", body);
    assert_eq!(body["error"]["code"], code, "body: {}", body);
    assert_eq!(body["error"]["message"], message, "body: {}", body);
}
