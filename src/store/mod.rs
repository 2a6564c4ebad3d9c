pub mod disk;
pub mod memory;

pub use disk::DiskEntryStore;
pub use memory::MemoryEntryStore;

use crate::core::config::AppConfig;
use crate::core::store::EntryStore;
use anyhow::Result;
use std::sync::Arc;

/// Opens the on-disk entry ledger under the configured data directory.
pub fn open_store(config: &AppConfig) -> Result<Arc<dyn EntryStore>> {
    let path = config.data_dir()?.join("entries");
    Ok(Arc::new(DiskEntryStore::open(&path)?))
}
