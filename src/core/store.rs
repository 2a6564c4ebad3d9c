//! Persistence abstraction for saved net-worth entries.

use crate::core::model::NetWorthEntry;
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Saved entries, at most one per calendar date.
#[async_trait]
pub trait EntryStore: Send + Sync {
    async fn get(&self, date: NaiveDate) -> Result<Option<NetWorthEntry>>;

    /// Inserts or replaces the entry for `entry.date`.
    async fn put(&self, entry: &NetWorthEntry) -> Result<()>;

    /// All entries, oldest first.
    async fn list(&self) -> Result<Vec<NetWorthEntry>>;

    async fn remove(&self, date: NaiveDate) -> Result<bool>;

    async fn latest(&self) -> Result<Option<NetWorthEntry>> {
        Ok(self.list().await?.pop())
    }
}
