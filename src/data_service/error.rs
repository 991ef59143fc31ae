//! Data service error types and handling.
//!
//! `DbError` carries the store's diagnostic text and is only ever logged.
//! `DataError` is what a client sees: a status code and a fixed `detail`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::http::request::RequestId;

/// Errors raised by a catalog store.
#[derive(Debug, Error)]
pub enum DbError {
    /// No connection could be obtained, or the connection broke mid-query.
    #[error("database unavailable: {0}")]
    Unavailable(String),

    /// The query ran and the database rejected it, or rows failed to decode.
    #[error("query failed: {0}")]
    Query(String),

    /// The connectivity probe returned an unexpected result.
    #[error("connectivity probe returned an unexpected result")]
    ProbeFailed,
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => DbError::Unavailable("connection pool exhausted".to_string()),
            sqlx::Error::PoolClosed => DbError::Unavailable("connection pool closed".to_string()),
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::WorkerCrashed => DbError::Unavailable(err.to_string()),
            // SQLSTATE class 08 (connection exception) and 57 (operator intervention)
            sqlx::Error::Database(ref db_err)
                if db_err
                    .code()
                    .is_some_and(|code| code.starts_with("08") || code.starts_with("57")) =>
            {
                DbError::Unavailable(err.to_string())
            }
            _ => DbError::Query(err.to_string()),
        }
    }
}

/// Client-facing failure of a data service request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DataError {
    #[error("Database connection error")]
    ConnectionUnavailable,

    #[error("Database not responding")]
    NotResponding,

    #[error("Service not ready")]
    NotReady,

    #[error("Database query error")]
    Query,

    #[error("Internal server error")]
    Internal,
}

/// JSON error body: `{"detail": ..., "request_id": ...}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
    pub request_id: String,
}

impl DataError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DataError::ConnectionUnavailable | DataError::NotResponding | DataError::NotReady => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            DataError::Query | DataError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Classify a store failure on a data endpoint.
    pub fn from_query(err: &DbError) -> Self {
        match err {
            DbError::Unavailable(_) => DataError::ConnectionUnavailable,
            DbError::Query(_) | DbError::ProbeFailed => DataError::Query,
        }
    }

    /// Classify a store failure on the readiness probe.
    pub fn from_probe(err: &DbError) -> Self {
        match err {
            DbError::Unavailable(_) => DataError::ConnectionUnavailable,
            DbError::ProbeFailed => DataError::NotResponding,
            DbError::Query(_) => DataError::NotReady,
        }
    }

    pub fn into_response_for(self, request_id: &RequestId) -> Response {
        let body = ErrorResponse {
            detail: self.to_string(),
            request_id: request_id.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

/// Last-resort response installed in the panic boundary.
pub fn internal_error(request_id: &RequestId) -> Response {
    DataError::Internal.into_response_for(request_id)
}

/// Response for a request cut off by the server timeout, e.g. a hung query.
pub fn timeout_error(request_id: &RequestId) -> Response {
    DataError::NotResponding.into_response_for(request_id)
}
