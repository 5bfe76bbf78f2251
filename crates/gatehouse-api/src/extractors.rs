// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Custom extractors for API handlers.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts},
    http::{HeaderMap, header, request::Parts},
};
use gatehouse_core::ResourceRequest;
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::middleware::TransactionId;

/// Header naming the downstream service.
pub const SERVICE_HEADER: &str = "x-auth-service";
/// Header carrying the original request URI.
pub const FORWARDED_URI_HEADER: &str = "x-forwarded-uri";
/// Header carrying the original request method.
pub const FORWARDED_METHOD_HEADER: &str = "x-forwarded-method";

// =============================================================================
// Bearer Token Extractor
// =============================================================================

/// Extractor for the bearer token in the `Authorization` header.
///
/// A missing or blank header is `401 token required`. Any other scheme, or
/// the scheme without a token, is `400`.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(BearerToken(token): BearerToken) -> impl IntoResponse {
///     format!("{} bytes", token.len())
/// }
/// ```
#[derive(Clone)]
pub struct BearerToken(pub String);

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken([REDACTED])")
    }
}

impl BearerToken {
    /// Parses the bearer token out of request headers.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, ApiError> {
        let Some(value) = headers.get(header::AUTHORIZATION) else {
            return Err(ApiError::unauthorized("token required"));
        };
        let value = value
            .to_str()
            .map_err(|_| ApiError::bad_request("malformed authorization header"))?
            .trim();
        if value.is_empty() {
            return Err(ApiError::unauthorized("token required"));
        }

        let (scheme, token) = match value.split_once(char::is_whitespace) {
            Some((scheme, token)) => (scheme, token.trim()),
            None => (value, ""),
        };
        if !scheme.eq_ignore_ascii_case("bearer") {
            return Err(ApiError::bad_request("unsupported authorization scheme"));
        }
        if token.is_empty() {
            return Err(ApiError::bad_request("bearer token missing"));
        }

        Ok(BearerToken(token.to_string()))
    }
}

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_headers(&parts.headers)
    }
}

// =============================================================================
// Forwarded Resource Extractor
// =============================================================================

/// Extractor for the `(service, path, method)` triple of a forward-auth check.
#[derive(Debug, Clone)]
pub struct ForwardedResource(pub ResourceRequest);

impl ForwardedResource {
    /// Reads the triple from request headers. The query string is stripped
    /// from the path.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, ApiError> {
        let service = required_header(headers, SERVICE_HEADER)?;
        let uri = required_header(headers, FORWARDED_URI_HEADER)?;
        let method = required_header(headers, FORWARDED_METHOD_HEADER)?;

        let path = uri
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        if path.is_empty() {
            return Err(ApiError::bad_request(format!(
                "header {} has no path",
                FORWARDED_URI_HEADER
            )));
        }

        Ok(ForwardedResource(ResourceRequest::new(service, path, method)))
    }
}

fn required_header<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, ApiError> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::bad_request(format!("missing header {}", name)))
}

impl<S> FromRequestParts<S> for ForwardedResource
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_headers(&parts.headers)
    }
}

// =============================================================================
// Validated JSON Extractor
// =============================================================================

/// Extractor for JSON payloads.
///
/// Extracts and deserializes JSON, returning `400` for malformed input.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(
        req: axum::http::Request<axum::body::Body>,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e.body_text())))?;

        Ok(ValidatedJson(value))
    }
}

// =============================================================================
// Transaction ID Extractor
// =============================================================================

impl<S> FromRequestParts<S> for TransactionId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<TransactionId>()
            .cloned()
            .unwrap_or_else(TransactionId::generate))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, StatusCode};

    fn auth_headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn status(result: Result<BearerToken, ApiError>) -> StatusCode {
        result.unwrap_err().status_code()
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(
            BearerToken::from_headers(&auth_headers("Bearer abc.def.ghi")).unwrap().0,
            "abc.def.ghi"
        );
        assert_eq!(
            BearerToken::from_headers(&auth_headers("bearer   abc")).unwrap().0,
            "abc"
        );
    }

    #[test]
    fn test_bearer_token_rejections() {
        assert_eq!(status(BearerToken::from_headers(&HeaderMap::new())), StatusCode::UNAUTHORIZED);
        assert_eq!(status(BearerToken::from_headers(&auth_headers("   "))), StatusCode::UNAUTHORIZED);
        assert_eq!(status(BearerToken::from_headers(&auth_headers("Basic abc"))), StatusCode::BAD_REQUEST);
        assert_eq!(status(BearerToken::from_headers(&auth_headers("Bearer"))), StatusCode::BAD_REQUEST);
        assert_eq!(status(BearerToken::from_headers(&auth_headers("Bearer   "))), StatusCode::BAD_REQUEST);
        assert_eq!(status(BearerToken::from_headers(&auth_headers("abc.def.ghi"))), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_bearer_debug_redacts() {
        assert!(!format!("{:?}", BearerToken("secret".to_string())).contains("secret"));
    }

    #[test]
    fn test_forwarded_resource() {
        let mut headers = HeaderMap::new();
        headers.insert(SERVICE_HEADER, HeaderValue::from_static("billing"));
        headers.insert(FORWARDED_URI_HEADER, HeaderValue::from_static("/invoices?page=2"));
        headers.insert(FORWARDED_METHOD_HEADER, HeaderValue::from_static("GET"));

        let ForwardedResource(resource) = ForwardedResource::from_headers(&headers).unwrap();
        assert_eq!(resource, ResourceRequest::new("billing", "/invoices", "GET"));

        headers.remove(FORWARDED_METHOD_HEADER);
        let err = ForwardedResource::from_headers(&headers).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
