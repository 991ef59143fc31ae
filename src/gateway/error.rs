//! Gateway error mapping.
//!
//! | Downstream outcome            | Status |
//! |-------------------------------|--------|
//! | timeout                       | 504    |
//! | connection refused/unreachable| 503    |
//! | 4xx/5xx from the data service | 502    |
//! | anything else                 | 500    |

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::gateway::client::UpstreamError;
use crate::http::request::RequestId;

/// Client-facing failure of a proxied request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayError {
    Timeout,
    Unavailable,
    BadGateway,
    Internal,
}

/// JSON error body: `{"error": ..., "message": ..., "request_id": ...}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub request_id: String,
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::BadGateway => StatusCode::BAD_GATEWAY,
            GatewayError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error(&self) -> &'static str {
        match self {
            GatewayError::Timeout => "Backend service timeout",
            GatewayError::Unavailable => "Backend service unavailable",
            GatewayError::BadGateway => "Backend error",
            GatewayError::Internal => "Internal server error",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            GatewayError::Timeout => "The backend service took too long to respond",
            GatewayError::Unavailable => "Could not connect to backend service",
            GatewayError::BadGateway => "Backend returned an error",
            GatewayError::Internal => "An unexpected error occurred",
        }
    }

    /// Metric label for the upstream outcome.
    pub fn outcome(&self) -> &'static str {
        match self {
            GatewayError::Timeout => "timeout",
            GatewayError::Unavailable => "unavailable",
            GatewayError::BadGateway => "bad_gateway",
            GatewayError::Internal => "internal",
        }
    }

    pub fn into_response_for(self, request_id: &RequestId) -> Response {
        let body = ErrorResponse {
            error: self.error().to_string(),
            message: self.message().to_string(),
            request_id: request_id.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

impl From<&UpstreamError> for GatewayError {
    fn from(err: &UpstreamError) -> Self {
        match err {
            UpstreamError::Timeout => GatewayError::Timeout,
            UpstreamError::Unavailable(_) => GatewayError::Unavailable,
            UpstreamError::Status(_) => GatewayError::BadGateway,
            UpstreamError::Other(_) => GatewayError::Internal,
        }
    }
}

/// Last-resort response installed in the panic boundary.
pub fn internal_error(request_id: &RequestId) -> Response {
    GatewayError::Internal.into_response_for(request_id)
}

/// Response for a request cut off by the server timeout.
pub fn timeout_error(request_id: &RequestId) -> Response {
    GatewayError::Timeout.into_response_for(request_id)
}
