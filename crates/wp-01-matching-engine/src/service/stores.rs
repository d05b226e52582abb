//! Typed views over the keyed store.
//!
//! One struct owns the store handle; the engine's mutex guards it, so a
//! `&CorrelationStores` is proof the caller holds the lock.

use crate::domain::MatchError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;
use wp_02_keyed_store::{BatchOp, KeyRange, KeyedStore};

/// Encode a record with the store codec.
pub(crate) fn encode<T: Serialize>(ns: &str, value: &T) -> Result<Vec<u8>, MatchError> {
    bincode::serialize(value).map_err(|e| MatchError::codec(ns, e.to_string()))
}

/// Decode a record with the store codec.
pub(crate) fn decode<T: DeserializeOwned>(ns: &str, bytes: &[u8]) -> Result<T, MatchError> {
    bincode::deserialize(bytes).map_err(|e| MatchError::codec(ns, e.to_string()))
}

/// The engine's store handles.
pub(crate) struct CorrelationStores {
    store: Arc<dyn KeyedStore>,
}

impl CorrelationStores {
    pub(crate) fn new(store: Arc<dyn KeyedStore>) -> Self {
        Self { store }
    }

    /// Typed get; `Ok(None)` is the expected miss, not an error.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        ns: &str,
        key: &str,
    ) -> Result<Option<T>, MatchError> {
        match self.store.get(ns, key).await? {
            Some(bytes) => Ok(Some(decode(ns, &bytes)?)),
            None => Ok(None),
        }
    }

    /// Whether a key exists, without decoding it.
    pub(crate) async fn exists(&self, ns: &str, key: &str) -> Result<bool, MatchError> {
        Ok(self.store.get(ns, key).await?.is_some())
    }

    /// Typed put (full overwrite).
    pub(crate) async fn put<T: Serialize>(
        &self,
        ns: &str,
        key: &str,
        value: &T,
    ) -> Result<(), MatchError> {
        let bytes = encode(ns, value)?;
        self.store.put(ns, key, &bytes).await?;
        Ok(())
    }

    /// Delete one key.
    pub(crate) async fn delete(&self, ns: &str, key: &str) -> Result<(), MatchError> {
        self.store.delete(ns, key).await?;
        Ok(())
    }

    /// Apply a batch of raw operations.
    pub(crate) async fn batch(&self, ops: Vec<BatchOp>) -> Result<(), MatchError> {
        if ops.is_empty() {
            return Ok(());
        }
        self.store.batch(ops).await?;
        Ok(())
    }

    /// Typed range scan. Entries that fail to decode are skipped with a
    /// warning rather than aborting the scan; one corrupt record must not
    /// stall correlation for a whole chain.
    pub(crate) async fn scan<T: DeserializeOwned>(
        &self,
        ns: &str,
        range: KeyRange,
    ) -> Result<Vec<(String, T)>, MatchError> {
        let entries = self.store.range_scan(ns, range).await?;
        let mut decoded = Vec::with_capacity(entries.len());
        for (key, bytes) in entries {
            match decode(ns, &bytes) {
                Ok(value) => decoded.push((key, value)),
                Err(e) => warn!(ns, key = %key, error = %e, "Skipping undecodable entry"),
            }
        }
        Ok(decoded)
    }
}
