//! Data service: read-only JSON endpoints over the `items` and
//! `football_clubs` tables.
//!
//! # Data Flow
//! ```text
//! GET /data, /footballClub, /ready
//!     → handlers.rs (correlation id, logging)
//!     → store.rs (CatalogStore trait)
//!     → postgres.rs (one pooled connection per call, released on drop)
//!     → error.rs (store failure → generic 500/503 body)
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod server;
pub mod store;

pub use error::{DataError, DbError};
pub use models::{FootballClub, Item};
pub use postgres::PgCatalogStore;
pub use server::{AppState, DataServer};
pub use store::{CatalogStore, PoolStatus};
