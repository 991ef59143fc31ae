//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! optional config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (environment overrides: DB_HOST, BACKEND_BASE_URL, ...)
//!     → validation.rs (semantic checks)
//!     → StackConfig (validated, immutable)
//!     → handed to the selected service at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults so the services start with no file at all
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    DataServiceConfig, DatabaseConfig, GatewayConfig, LogFormat, ObservabilityConfig,
    RetryConfig, StackConfig, TimeoutConfig,
};
pub use validation::ValidationError;
