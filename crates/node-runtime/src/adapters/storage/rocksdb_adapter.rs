//! # RocksDB Storage Adapter
//!
//! Persistent implementation of the `KeyedStore` trait.
//!
//! ## Layout
//!
//! Namespaces collapse onto a single column family with composite keys
//! `<namespace> 0x00 <key>`. The NUL separator sorts before every printable
//! byte, so all keys of one namespace are contiguous and range scans within
//! a namespace are a bounded forward iteration.
//!
//! ## Configuration
//!
//! Tuned for small, hot correlation values:
//! - modest write buffers (entries are a few KB at most)
//! - bloom filters for point-lookup-heavy matching
//! - level compaction, Snappy compression

use async_trait::async_trait;
use rocksdb::{Direction, IteratorMode, Options, WriteBatch, WriteOptions, DB};
use std::path::PathBuf;
use wp_02_keyed_store::{BatchOp, KeyRange, KeyedStore, StoreError};

/// Separator between the namespace and key halves of a composite key.
const SEPARATOR: u8 = 0x00;

/// RocksDB configuration.
#[derive(Debug, Clone)]
pub struct RocksDbConfig {
    /// Path to the database directory.
    pub path: PathBuf,
    /// Block cache size in bytes.
    pub block_cache_size: usize,
    /// Write buffer size in bytes.
    pub write_buffer_size: usize,
    /// Enable fsync after each write.
    pub sync_writes: bool,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/waypoint"),
            block_cache_size: 64 * 1024 * 1024,
            write_buffer_size: 16 * 1024 * 1024,
            sync_writes: true,
        }
    }
}

impl RocksDbConfig {
    /// Default configuration at an explicit path.
    #[must_use]
    pub fn at_path(path: PathBuf) -> Self {
        Self {
            path,
            ..Self::default()
        }
    }

    /// Create config for testing (small buffers, no sync).
    pub fn for_testing(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            block_cache_size: 8 * 1024 * 1024,
            write_buffer_size: 4 * 1024 * 1024,
            sync_writes: false,
        }
    }
}

/// RocksDB-backed keyed store.
pub struct RocksDbKeyedStore {
    db: DB,
    write_opts_sync: bool,
}

impl RocksDbKeyedStore {
    /// Open or create a database.
    pub fn open(config: RocksDbConfig) -> Result<Self, StoreError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_compression_type(rocksdb::DBCompressionType::Snappy);

        let mut block_opts = rocksdb::BlockBasedOptions::default();
        block_opts.set_bloom_filter(10.0, false);
        block_opts.set_block_cache(&rocksdb::Cache::new_lru_cache(config.block_cache_size));
        opts.set_block_based_table_factory(&block_opts);

        let db = DB::open(&opts, &config.path)
            .map_err(|e| StoreError::backend(e.to_string()))?;
        Ok(Self {
            db,
            write_opts_sync: config.sync_writes,
        })
    }

    fn write_opts(&self) -> WriteOptions {
        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(self.write_opts_sync);
        write_opts
    }

    fn composite(ns: &str, key: &str) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(ns.len() + 1 + key.len());
        bytes.extend_from_slice(ns.as_bytes());
        bytes.push(SEPARATOR);
        bytes.extend_from_slice(key.as_bytes());
        bytes
    }
}

#[async_trait]
impl KeyedStore for RocksDbKeyedStore {
    async fn get(&self, ns: &str, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.db
            .get(Self::composite(ns, key))
            .map_err(|e| StoreError::backend(e.to_string()))
    }

    async fn put(&self, ns: &str, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.db
            .put_opt(Self::composite(ns, key), value, &self.write_opts())
            .map_err(|e| StoreError::backend(e.to_string()))
    }

    async fn delete(&self, ns: &str, key: &str) -> Result<(), StoreError> {
        self.db
            .delete_opt(Self::composite(ns, key), &self.write_opts())
            .map_err(|e| StoreError::backend(e.to_string()))
    }

    async fn batch(&self, ops: Vec<BatchOp>) -> Result<(), StoreError> {
        let mut batch = WriteBatch::default();
        for op in ops {
            match op {
                BatchOp::Put { ns, key, value } => {
                    batch.put(Self::composite(&ns, &key), value);
                }
                BatchOp::Delete { ns, key } => {
                    batch.delete(Self::composite(&ns, &key));
                }
            }
        }
        self.db
            .write_opt(batch, &self.write_opts())
            .map_err(|e| StoreError::backend(e.to_string()))
    }

    async fn range_scan(
        &self,
        ns: &str,
        range: KeyRange,
    ) -> Result<Vec<(String, Vec<u8>)>, StoreError> {
        let mut prefix = Vec::with_capacity(ns.len() + 1);
        prefix.extend_from_slice(ns.as_bytes());
        prefix.push(SEPARATOR);

        let start = match &range.gt {
            Some(gt) => {
                let mut start = prefix.clone();
                start.extend_from_slice(gt.as_bytes());
                start
            }
            None => prefix.clone(),
        };

        let mut entries = Vec::new();
        for item in self
            .db
            .iterator(IteratorMode::From(&start, Direction::Forward))
        {
            let (key, value) = item.map_err(|e| StoreError::backend(e.to_string()))?;
            if !key.starts_with(&prefix) {
                break;
            }
            let Ok(user_key) = std::str::from_utf8(&key[prefix.len()..]) else {
                continue;
            };
            if let Some(gt) = &range.gt {
                // The iterator start is inclusive; the bound is not.
                if user_key == gt {
                    continue;
                }
            }
            if let Some(lt) = &range.lt {
                if user_key >= lt.as_str() {
                    break;
                }
            }
            entries.push((user_key.to_string(), value.to_vec()));
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_temp() -> (tempfile::TempDir, RocksDbKeyedStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = RocksDbKeyedStore::open(RocksDbConfig::for_testing(dir.path())).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_round_trip_and_namespace_isolation() {
        let (_dir, store) = open_temp();

        store.put("out", "1000:0xaa", b"journey").await.unwrap();
        store.put("hop", "1000:0xaa", b"other").await.unwrap();

        assert_eq!(
            store.get("out", "1000:0xaa").await.unwrap(),
            Some(b"journey".to_vec())
        );
        assert_eq!(
            store.get("hop", "1000:0xaa").await.unwrap(),
            Some(b"other".to_vec())
        );

        store.delete("out", "1000:0xaa").await.unwrap();
        assert_eq!(store.get("out", "1000:0xaa").await.unwrap(), None);
        assert!(store.get("hop", "1000:0xaa").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_batch_is_atomic() {
        let (_dir, store) = open_temp();
        store.put("relay", "gone", b"x").await.unwrap();

        store
            .batch(vec![
                BatchOp::put("out", "a", b"1".to_vec()),
                BatchOp::delete("relay", "gone"),
            ])
            .await
            .unwrap();

        assert_eq!(store.get("out", "a").await.unwrap(), Some(b"1".to_vec()));
        assert_eq!(store.get("relay", "gone").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_range_scan_matches_memory_semantics() {
        let (_dir, store) = open_temp();
        store.put("hop", "1000:0x01", b"a").await.unwrap();
        store.put("hop", "1000:0xff", b"b").await.unwrap();
        store.put("hop", "2004:0x01", b"c").await.unwrap();

        let hits = store
            .range_scan("hop", KeyRange::between("1000:", "1000;"))
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].0, "1000:0x01");

        let all = store.range_scan("hop", KeyRange::all()).await.unwrap();
        assert_eq!(all.len(), 3);
    }
}
