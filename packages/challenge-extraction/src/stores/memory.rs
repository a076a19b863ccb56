//! In-memory storage implementation for testing and development.

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use super::table::Table;
use crate::error::{StoreError, StoreResult};
use crate::traits::store::RowStore;

/// In-memory row store.
///
/// Loads a fixed table and keeps the last persisted snapshot. Can simulate a
/// locked destination. Not suitable for production as data is lost on
/// restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    source: RwLock<Table>,
    persisted: RwLock<Option<Table>>,
    persist_count: AtomicUsize,
    locked: AtomicBool,
}

impl MemoryStore {
    /// Create a store whose source is `table`.
    pub fn new(table: Table) -> Self {
        Self {
            source: RwLock::new(table),
            ..Default::default()
        }
    }

    /// Simulate another process holding the destination.
    pub fn set_locked(&self, locked: bool) {
        self.locked.store(locked, Ordering::SeqCst);
    }

    /// The last persisted table, if any.
    pub fn persisted(&self) -> Option<Table> {
        self.persisted.read().unwrap().clone()
    }

    /// Number of successful persists.
    pub fn persist_count(&self) -> usize {
        self.persist_count.load(Ordering::SeqCst)
    }
}

impl RowStore for MemoryStore {
    fn load(&self) -> StoreResult<Table> {
        Ok(self.source.read().unwrap().clone())
    }

    fn probe_writable(&self) -> StoreResult<()> {
        if self.locked.load(Ordering::SeqCst) {
            return Err(StoreError::Locked {
                path: PathBuf::from(self.describe()),
                source: io::Error::new(io::ErrorKind::WouldBlock, "destination is locked"),
            });
        }
        Ok(())
    }

    fn persist(&self, table: &Table) -> StoreResult<()> {
        self.probe_writable()?;
        *self.persisted.write().unwrap() = Some(table.clone());
        self.persist_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
