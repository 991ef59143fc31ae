//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (pool sizes, timeouts > 0, attempts >= 1)
//! - Check that addresses and URLs parse
//! - Check that the gateway's retries fit inside the server timeout
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: StackConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::StatusCode;
use thiserror::Error;
use url::Url;

use crate::config::schema::StackConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("database.max_connections must be greater than zero")]
    ZeroPoolSize,

    #[error("database.min_connections ({min}) exceeds max_connections ({max})")]
    PoolBounds { min: u32, max: u32 },

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("retries.max_attempts must be at least 1")]
    NoAttempts,

    #[error("retries.retry_statuses contains invalid status code {0}")]
    InvalidStatus(u16),

    #[error("{field} is not a valid socket address: {value}")]
    InvalidBindAddress { field: &'static str, value: String },

    #[error("gateway.backend_base_url is not a valid http(s) URL: {0}")]
    InvalidBackendUrl(String),

    #[error(
        "worst-case gateway call ({budget_ms} ms across all retries) exceeds timeouts.request_secs ({limit_ms} ms)"
    )]
    RetryBudgetExceedsTimeout { budget_ms: u64, limit_ms: u64 },
}

/// Validate the whole configuration, collecting every problem found.
pub fn validate_config(config: &StackConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let db = &config.database;
    if db.max_connections == 0 {
        errors.push(ValidationError::ZeroPoolSize);
    }
    if db.min_connections > db.max_connections {
        errors.push(ValidationError::PoolBounds {
            min: db.min_connections,
            max: db.max_connections,
        });
    }
    if db.acquire_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("database.acquire_timeout_secs"));
    }

    if config.gateway.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("gateway.request_timeout_secs"));
    }
    if config.gateway.ready_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("gateway.ready_timeout_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.request_secs"));
    }

    if config.retries.max_attempts == 0 {
        errors.push(ValidationError::NoAttempts);
    }
    for &code in &config.retries.retry_statuses {
        if StatusCode::from_u16(code).is_err() {
            errors.push(ValidationError::InvalidStatus(code));
        }
    }

    let budget_ms = retry_budget_ms(config);
    let limit_ms = config.timeouts.request_secs.saturating_mul(1000);
    if budget_ms > limit_ms {
        errors.push(ValidationError::RetryBudgetExceedsTimeout { budget_ms, limit_ms });
    }

    check_bind(&mut errors, "data_service.bind_address", &config.data_service.bind_address);
    check_bind(&mut errors, "gateway.bind_address", &config.gateway.bind_address);

    match Url::parse(&config.gateway.backend_base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        _ => errors.push(ValidationError::InvalidBackendUrl(
            config.gateway.backend_base_url.clone(),
        )),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Upper bound on one proxied call: every attempt timing out, plus every
/// backoff at its maximum jitter.
fn retry_budget_ms(config: &StackConfig) -> u64 {
    let retries = &config.retries;
    let per_attempt_ms = config.gateway.request_timeout_secs.saturating_mul(1000);
    let mut total = per_attempt_ms.saturating_mul(u64::from(retries.max_attempts));

    let waits = retries.max_attempts.saturating_sub(1);
    for attempt in 1..=waits.min(63) {
        let delay = retries
            .base_delay_ms
            .saturating_mul(1u64 << (attempt - 1))
            .min(retries.max_delay_ms);
        total = total.saturating_add(delay.saturating_add(delay / 10));
    }
    // Beyond 63 doublings every wait is capped.
    let capped_waits = u64::from(waits.saturating_sub(63));
    let capped = retries.max_delay_ms.saturating_add(retries.max_delay_ms / 10);
    total.saturating_add(capped_waits.saturating_mul(capped))
}

fn check_bind(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress {
            field,
            value: value.to_string(),
        });
    }
}
