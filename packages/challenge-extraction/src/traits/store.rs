//! Row store trait for tabular backends.

use crate::error::StoreResult;
use crate::stores::table::Table;

/// Loads and persists a table of rows keyed by URL.
///
/// Source and destination are a backend concern; they may differ.
#[cfg_attr(test, mockall::automock)]
pub trait RowStore: Send + Sync {
    /// Read the whole table from the source.
    fn load(&self) -> StoreResult<Table>;

    /// Check, without writing, that the destination can be written now.
    ///
    /// Fails with `StoreError::Locked` when another process holds the file.
    fn probe_writable(&self) -> StoreResult<()>;

    /// Write the whole table to the destination.
    ///
    /// Implementations must probe first and must not leave a partially
    /// written destination behind.
    fn persist(&self, table: &Table) -> StoreResult<()>;

    /// Human-readable destination for log lines.
    fn describe(&self) -> String;
}
