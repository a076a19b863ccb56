//! Storage implementations for the extraction library.
//!
//! Available backends:
//! - `CsvStore` - CSV file storage with lock detection and atomic writes
//! - `MemoryStore` - In-memory storage (tests, embedding)

pub mod csv_file;
pub mod memory;
pub mod table;

pub use csv_file::CsvStore;
pub use memory::MemoryStore;
pub use table::{Cell, Table};
