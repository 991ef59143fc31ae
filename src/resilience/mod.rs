//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Gateway call to the data service:
//!     → per-attempt timeout (reqwest)
//!     → On transient status: retries.rs (check if retryable, wait backoff.rs delay)
//!     → Final outcome mapped to a gateway status
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every outbound call has a deadline
//! - Retries only for the configured methods (GET, POST)

pub mod backoff;
pub mod retries;

pub use retries::RetryPolicy;
