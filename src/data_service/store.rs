//! Storage seam between handlers and the relational store.

use async_trait::async_trait;
use serde::Serialize;

use crate::data_service::error::DbError;
use crate::data_service::models::{FootballClub, Item};

/// Pool accounting observed while a probe connection was checked out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStatus {
    /// Open connections, idle or in use.
    pub size: u32,
    /// Open connections sitting idle.
    pub idle: u32,
    /// Configured upper bound.
    pub max: u32,
}

impl PoolStatus {
    /// Connections that could still be handed out: `max - in_use`.
    pub fn available(&self) -> u32 {
        let in_use = self.size.saturating_sub(self.idle);
        self.max.saturating_sub(in_use)
    }
}

/// Read-only access to the catalog tables.
///
/// Every call checks out one connection and returns it before completing,
/// on success and on failure alike.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Run a trivial connectivity query and report pool headroom.
    async fn probe(&self) -> Result<PoolStatus, DbError>;

    /// All items, ascending by id.
    async fn list_items(&self) -> Result<Vec<Item>, DbError>;

    /// All football clubs, ascending by id.
    async fn list_clubs(&self) -> Result<Vec<FootballClub>, DbError>;

    /// Release pooled resources. Called once at shutdown.
    async fn close(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_counts_checked_out_connections() {
        let status = PoolStatus { size: 4, idle: 1, max: 10 };
        assert_eq!(status.available(), 7);
    }

    #[test]
    fn test_available_never_underflows() {
        let status = PoolStatus { size: 12, idle: 0, max: 10 };
        assert_eq!(status.available(), 0);
    }
}
