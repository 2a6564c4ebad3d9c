use crate::core::model::NetWorthEntry;
use crate::core::store::EntryStore;
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory entry store, ordered by date.
#[derive(Default)]
pub struct MemoryEntryStore {
    inner: Mutex<BTreeMap<NaiveDate, NetWorthEntry>>,
}

impl MemoryEntryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntryStore for MemoryEntryStore {
    async fn get(&self, date: NaiveDate) -> Result<Option<NetWorthEntry>> {
        let entries = self.inner.lock().await;
        Ok(entries.get(&date).cloned())
    }

    async fn put(&self, entry: &NetWorthEntry) -> Result<()> {
        entry.ensure_finite()?;
        let mut entries = self.inner.lock().await;
        debug!("Store PUT for date: {}", entry.date);
        entries.insert(entry.date, entry.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<NetWorthEntry>> {
        let entries = self.inner.lock().await;
        Ok(entries.values().cloned().collect())
    }

    async fn remove(&self, date: NaiveDate) -> Result<bool> {
        let mut entries = self.inner.lock().await;
        debug!("Store REMOVE for date: {}", date);
        Ok(entries.remove(&date).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(date: NaiveDate, net_worth: f64) -> NetWorthEntry {
        NetWorthEntry {
            id: NetWorthEntry::id_for(date),
            date,
            account_values: BTreeMap::from([("checking".to_string(), net_worth)]),
            total_assets: net_worth,
            total_liabilities: 0.0,
            net_worth,
            exchange_rates: None,
        }
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, day).unwrap()
    }

    #[tokio::test]
    async fn test_store_put_get_list() {
        let store = MemoryEntryStore::new();

        // Initially, store is empty
        assert!(store.get(d(1)).await.unwrap().is_none());
        assert!(store.latest().await.unwrap().is_none());

        store.put(&entry(d(10), 300.0)).await.unwrap();
        store.put(&entry(d(1), 100.0)).await.unwrap();
        store.put(&entry(d(5), 200.0)).await.unwrap();

        let dates: Vec<_> = store.list().await.unwrap().iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![d(1), d(5), d(10)]);
        assert_eq!(store.latest().await.unwrap().unwrap().net_worth, 300.0);
    }

    #[tokio::test]
    async fn test_store_put_replaces_same_date() {
        let store = MemoryEntryStore::new();
        store.put(&entry(d(1), 100.0)).await.unwrap();
        store.put(&entry(d(1), 150.0)).await.unwrap();

        assert_eq!(store.list().await.unwrap().len(), 1);
        assert_eq!(store.get(d(1)).await.unwrap().unwrap().net_worth, 150.0);
    }

    #[tokio::test]
    async fn test_store_remove() {
        let store = MemoryEntryStore::new();
        store.put(&entry(d(1), 100.0)).await.unwrap();

        assert!(store.remove(d(1)).await.unwrap());
        assert!(!store.remove(d(1)).await.unwrap());
        assert!(store.get(d(1)).await.unwrap().is_none());
    }
}
