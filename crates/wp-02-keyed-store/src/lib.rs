//! # WP-02 Keyed Store
//!
//! Namespaced key/value storage used as the matching engine's only
//! persistent state.
//!
//! ## Purpose
//!
//! Provide a narrow store boundary the correlator can be tested against:
//! - get/put/delete on `(namespace, key)` pairs
//! - atomic batches spanning namespaces
//! - ordered range scans within a namespace (correlation keys sort by
//!   chain prefix)
//!
//! Values are opaque bytes; the serialization codec belongs to the caller.
//! Expiry is not tracked here — the janitor (wp-03) schedules deletions
//! against this store.
//!
//! ## Module Structure
//!
//! ```text
//! wp-02-keyed-store/
//! ├── ports/       # KeyedStore trait, BatchOp, KeyRange
//! ├── adapters/    # MemoryKeyedStore (BTreeMap-backed)
//! └── errors       # StoreError
//! ```

pub mod adapters;
pub mod errors;
pub mod ports;

pub use adapters::MemoryKeyedStore;
pub use errors::StoreError;
pub use ports::{BatchOp, KeyRange, KeyedStore};
