//! Storage adapters.
//!
//! Production: `RocksDbKeyedStore` (feature `rocksdb`)
//! Testing: `MemoryKeyedStore` (wp-02-keyed-store)

#[cfg(feature = "rocksdb")]
pub mod rocksdb_adapter;

#[cfg(feature = "rocksdb")]
pub use rocksdb_adapter::{RocksDbConfig, RocksDbKeyedStore};
