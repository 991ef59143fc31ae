//! Two-tier demo stack library.
//!
//! ```text
//!   Browser ──▶ gateway ──HTTP──▶ data_service ──▶ PostgreSQL
//!   (/, /clubs)    retries,        (/data, /footballClub)
//!                  timeouts        pooled connections
//! ```

pub mod config;
pub mod data_service;
pub mod gateway;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::StackConfig;
pub use data_service::DataServer;
pub use gateway::GatewayServer;
pub use lifecycle::Shutdown;
