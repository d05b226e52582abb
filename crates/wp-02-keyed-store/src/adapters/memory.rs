//! In-memory keyed store.

use crate::errors::StoreError;
use crate::ports::{BatchOp, KeyRange, KeyedStore};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;

/// In-memory store for unit tests and light deployments.
///
/// One BTreeMap per namespace keeps keys ordered so range scans behave
/// exactly like the persistent backend. Batches apply under a single write
/// lock, which makes them atomic here.
#[derive(Default)]
pub struct MemoryKeyedStore {
    namespaces: RwLock<HashMap<String, BTreeMap<String, Vec<u8>>>>,
}

impl MemoryKeyedStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently held in a namespace.
    #[must_use]
    pub fn entry_count(&self, ns: &str) -> usize {
        self.namespaces
            .read()
            .get(ns)
            .map_or(0, BTreeMap::len)
    }
}

#[async_trait]
impl KeyedStore for MemoryKeyedStore {
    async fn get(&self, ns: &str, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self
            .namespaces
            .read()
            .get(ns)
            .and_then(|m| m.get(key).cloned()))
    }

    async fn put(&self, ns: &str, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.namespaces
            .write()
            .entry(ns.to_string())
            .or_default()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn delete(&self, ns: &str, key: &str) -> Result<(), StoreError> {
        if let Some(m) = self.namespaces.write().get_mut(ns) {
            m.remove(key);
        }
        Ok(())
    }

    async fn batch(&self, ops: Vec<BatchOp>) -> Result<(), StoreError> {
        let mut namespaces = self.namespaces.write();
        for op in ops {
            match op {
                BatchOp::Put { ns, key, value } => {
                    namespaces.entry(ns).or_default().insert(key, value);
                }
                BatchOp::Delete { ns, key } => {
                    if let Some(m) = namespaces.get_mut(&ns) {
                        m.remove(&key);
                    }
                }
            }
        }
        Ok(())
    }

    async fn range_scan(
        &self,
        ns: &str,
        range: KeyRange,
    ) -> Result<Vec<(String, Vec<u8>)>, StoreError> {
        let namespaces = self.namespaces.read();
        let Some(m) = namespaces.get(ns) else {
            return Ok(Vec::new());
        };
        let lower = range
            .gt
            .as_ref()
            .map_or(Bound::Unbounded, |k| Bound::Excluded(k.clone()));
        let upper = range
            .lt
            .as_ref()
            .map_or(Bound::Unbounded, |k| Bound::Excluded(k.clone()));
        Ok(m.range((lower, upper))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_put_delete() {
        let store = MemoryKeyedStore::new();

        store.put("out", "0:0xaa", b"v1").await.unwrap();
        assert_eq!(store.get("out", "0:0xaa").await.unwrap(), Some(b"v1".to_vec()));
        assert_eq!(store.get("out", "0:0xbb").await.unwrap(), None);
        assert_eq!(store.get("hop", "0:0xaa").await.unwrap(), None);

        store.delete("out", "0:0xaa").await.unwrap();
        assert_eq!(store.get("out", "0:0xaa").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let store = MemoryKeyedStore::new();
        store.put("out", "k", b"old").await.unwrap();
        store.put("out", "k", b"new").await.unwrap();
        assert_eq!(store.get("out", "k").await.unwrap(), Some(b"new".to_vec()));
    }

    #[tokio::test]
    async fn test_batch_spans_namespaces() {
        let store = MemoryKeyedStore::new();
        store.put("relay", "gone", b"x").await.unwrap();

        store
            .batch(vec![
                BatchOp::put("out", "a", b"1".to_vec()),
                BatchOp::put("hop", "b", b"2".to_vec()),
                BatchOp::delete("relay", "gone"),
            ])
            .await
            .unwrap();

        assert_eq!(store.get("out", "a").await.unwrap(), Some(b"1".to_vec()));
        assert_eq!(store.get("hop", "b").await.unwrap(), Some(b"2".to_vec()));
        assert_eq!(store.get("relay", "gone").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_range_scan_respects_exclusive_bounds() {
        let store = MemoryKeyedStore::new();
        store.put("hop", "1000:0x01", b"a").await.unwrap();
        store.put("hop", "1000:0xff", b"b").await.unwrap();
        store.put("hop", "2004:0x01", b"c").await.unwrap();

        let hits = store
            .range_scan("hop", KeyRange::between("1000:", "1000:\u{10ffff}"))
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].0, "1000:0x01");
        assert_eq!(hits[1].0, "1000:0xff");

        let all = store.range_scan("hop", KeyRange::all()).await.unwrap();
        assert_eq!(all.len(), 3);
    }
}
