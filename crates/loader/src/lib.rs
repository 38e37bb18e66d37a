//! Data loading: reads the four campaign tables from flat files or a
//! warehouse snapshot, normalises them, and caches the base load.

pub mod cache;
pub mod loader;
pub mod normalize;
pub mod source;

pub use cache::{CacheEntry, DatasetCache};
pub use loader::DataLoader;
pub use source::{CsvDirectorySource, RawTable, TableKind, TableSource, WarehouseSnapshot};
