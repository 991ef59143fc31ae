//! Correlation identifiers.
//!
//! # Responsibilities
//! - Read the inbound `X-Request-ID` header, defaulting to `"unknown"`
//! - Stamp the default onto requests that arrive without one, so the
//!   response layer can echo it back
//! - Rewrite unreadable ids to `"unknown"` before anything reads them
//!
//! # Design Decisions
//! - No identifier is generated; absent means `"unknown"` on every hop
//! - Header values that are not visible ASCII are treated as absent

use std::convert::Infallible;
use std::fmt;

use axum::{
    body::Body,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tower_http::request_id::MakeRequestId;

/// Header carrying the correlation identifier.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Value used when a request carries no identifier.
pub const UNKNOWN_REQUEST_ID: &str = "unknown";

/// Correlation identifier for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(String);

impl RequestId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn unknown() -> Self {
        Self(UNKNOWN_REQUEST_ID.to_string())
    }

    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .map(Self::new)
            .unwrap_or_else(Self::unknown)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<S> FromRequestParts<S> for RequestId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

/// `MakeRequestId` for `SetRequestIdLayer`: requests without an id get `"unknown"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnknownRequestId;

impl MakeRequestId for UnknownRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<tower_http::request_id::RequestId> {
        Some(tower_http::request_id::RequestId::new(HeaderValue::from_static(
            UNKNOWN_REQUEST_ID,
        )))
    }
}

/// Replace an `X-Request-ID` that is not visible ASCII with `"unknown"`.
///
/// Runs ahead of the echo layer so logs, bodies, the forwarded header and the
/// response header all carry the same id.
pub async fn normalize_request_id(mut request: Request<Body>, next: Next) -> Response {
    let unreadable = request
        .headers()
        .get(X_REQUEST_ID)
        .is_some_and(|v| v.to_str().is_err());
    if unreadable {
        request
            .headers_mut()
            .insert(X_REQUEST_ID, HeaderValue::from_static(UNKNOWN_REQUEST_ID));
    }
    next.run(request).await
}
