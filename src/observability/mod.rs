//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Both services produce:
//!     → logging.rs (structured log events, JSON by default)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape of /metrics)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through the request span into every log line
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
