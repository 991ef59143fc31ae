//! Gateway: proxies browser requests to the data service and reshapes
//! the answers.
//!
//! # Data Flow
//! ```text
//! GET /, /clubs
//!     → handlers.rs (correlation id, logging)
//!     → client.rs (shared reqwest client, timeout, retry policy)
//!     → data service
//!     → error.rs (failure → 500/502/503/504 body)
//! ```

pub mod client;
pub mod error;
pub mod handlers;
pub mod server;

pub use client::{BackendClient, ClientBuildError, UpstreamError};
pub use error::GatewayError;
pub use server::{AppState, GatewayServer};
