//! Retry policy for outbound calls.
//!
//! # Responsibilities
//! - Decide whether a response may be replayed (method + status)
//! - Hand out the backoff delay for each retry
//!
//! # Design Decisions
//! - Declarative: built once from `RetryConfig`, shared by every call
//! - Only transient statuses (429, 500, 502, 503, 504 by default) are retried
//! - Transport failures are not retried; they map straight to a gateway error

use std::time::Duration;

use axum::http::{Method, StatusCode};

use crate::config::RetryConfig;
use crate::resilience::backoff::calculate_backoff;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay_ms: u64,
    max_delay_ms: u64,
    statuses: Vec<StatusCode>,
    methods: Vec<Method>,
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay_ms: config.base_delay_ms,
            max_delay_ms: config.max_delay_ms,
            statuses: config
                .retry_statuses
                .iter()
                .filter_map(|code| StatusCode::from_u16(*code).ok())
                .collect(),
            methods: config
                .retry_methods
                .iter()
                .filter_map(|m| Method::from_bytes(m.to_ascii_uppercase().as_bytes()).ok())
                .collect(),
        }
    }

    /// Total attempts, including the first one.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Whether attempt number `attempt` (1-based) that ended in `status` should be replayed.
    pub fn should_retry(&self, method: &Method, status: StatusCode, attempt: u32) -> bool {
        attempt < self.max_attempts
            && self.methods.contains(method)
            && self.statuses.contains(&status)
    }

    /// Delay before the retry that follows attempt number `attempt`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        calculate_backoff(attempt, self.base_delay_ms, self.max_delay_ms)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}
