use crate::core::model::NetWorthEntry;
use crate::core::store::EntryStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::debug;

const PARTITION: &str = "entries";

/// Entry store persisted in a fjall partition.
///
/// Keys are ISO dates, so the partition's natural order is chronological.
/// Values are the JSON form of the entry.
pub struct DiskEntryStore {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskEntryStore {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create data directory: {}", path.display()))?;
        let keyspace = Config::new(path)
            .open()
            .with_context(|| format!("Failed to open entry store at {}", path.display()))?;
        let partition = keyspace
            .open_partition(PARTITION, PartitionCreateOptions::default())
            .context("Failed to open entries partition")?;
        debug!("Opened entry store at {}", path.display());
        Ok(Self {
            keyspace,
            partition,
        })
    }

    fn key(date: NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }
}

#[async_trait]
impl EntryStore for DiskEntryStore {
    async fn get(&self, date: NaiveDate) -> Result<Option<NetWorthEntry>> {
        let Some(raw) = self.partition.get(Self::key(date))? else {
            debug!("Store MISS for date: {}", date);
            return Ok(None);
        };
        let entry = serde_json::from_slice(&raw)
            .with_context(|| format!("Corrupt entry stored for {date}"))?;
        Ok(Some(entry))
    }

    async fn put(&self, entry: &NetWorthEntry) -> Result<()> {
        entry.ensure_finite()?;
        let value = serde_json::to_vec(entry)?;
        self.partition.insert(Self::key(entry.date).as_bytes(), value)?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        debug!("Store PUT for date: {}", entry.date);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<NetWorthEntry>> {
        let mut entries = Vec::new();
        for item in self.partition.iter() {
            let (key, value) = item?;
            let entry: NetWorthEntry = serde_json::from_slice(&value).with_context(|| {
                format!("Corrupt entry stored under {}", String::from_utf8_lossy(&key))
            })?;
            entries.push(entry);
        }
        Ok(entries)
    }

    async fn remove(&self, date: NaiveDate) -> Result<bool> {
        let key = Self::key(date);
        if self.partition.get(&key)?.is_none() {
            return Ok(false);
        }
        self.partition.remove(key.as_bytes())?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        debug!("Store REMOVE for date: {}", date);
        Ok(true)
    }
}
