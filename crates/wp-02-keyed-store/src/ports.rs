//! # Store Port
//!
//! Abstract interface for namespaced key-value operations.
//!
//! Production: `RocksDbKeyedStore` (node-runtime/adapters/storage)
//! Testing: `MemoryKeyedStore` (adapters/memory.rs)

use crate::errors::StoreError;
use async_trait::async_trait;

/// Abstract interface for the correlation store.
///
/// Namespaces and keys are strings; values are opaque bytes. Entries are
/// never mutated in place — a `put` on an existing key is a full overwrite.
#[async_trait]
pub trait KeyedStore: Send + Sync {
    /// Get a value by key within a namespace.
    async fn get(&self, ns: &str, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Put a single key-value pair within a namespace.
    async fn put(&self, ns: &str, key: &str, value: &[u8]) -> Result<(), StoreError>;

    /// Delete a key within a namespace. Deleting an absent key is a no-op.
    async fn delete(&self, ns: &str, key: &str) -> Result<(), StoreError>;

    /// Execute a batch of operations.
    ///
    /// Atomic where the backend supports it: either all operations are
    /// applied or none. Backends without transactions apply sequentially
    /// and may surface a partial batch on failure.
    async fn batch(&self, ops: Vec<BatchOp>) -> Result<(), StoreError>;

    /// Ordered scan of `(key, value)` entries within a namespace, bounded
    /// by an exclusive `(gt, lt)` range.
    async fn range_scan(
        &self,
        ns: &str,
        range: KeyRange,
    ) -> Result<Vec<(String, Vec<u8>)>, StoreError>;
}

/// Batch operation for multi-key writes.
#[derive(Debug, Clone)]
pub enum BatchOp {
    /// Put a key-value pair in a namespace.
    Put {
        ns: String,
        key: String,
        value: Vec<u8>,
    },
    /// Delete a key from a namespace.
    Delete { ns: String, key: String },
}

impl BatchOp {
    /// Create a Put operation.
    pub fn put(ns: impl Into<String>, key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        BatchOp::Put {
            ns: ns.into(),
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a Delete operation.
    pub fn delete(ns: impl Into<String>, key: impl Into<String>) -> Self {
        BatchOp::Delete {
            ns: ns.into(),
            key: key.into(),
        }
    }
}

/// Exclusive `(gt, lt)` bounds for a range scan.
///
/// `None` on either side leaves that side unbounded.
#[derive(Debug, Clone, Default)]
pub struct KeyRange {
    /// Keys strictly greater than this bound are included.
    pub gt: Option<String>,
    /// Keys strictly less than this bound are included.
    pub lt: Option<String>,
}

impl KeyRange {
    /// A fully unbounded range (whole namespace).
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// A range between two exclusive bounds.
    pub fn between(gt: impl Into<String>, lt: impl Into<String>) -> Self {
        Self {
            gt: Some(gt.into()),
            lt: Some(lt.into()),
        }
    }

    /// Whether a key falls inside the bounds.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        if let Some(gt) = &self.gt {
            if key <= gt.as_str() {
                return false;
            }
        }
        if let Some(lt) = &self.lt {
            if key >= lt.as_str() {
                return false;
            }
        }
        true
    }
}
