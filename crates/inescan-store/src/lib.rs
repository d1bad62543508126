//! Storage layer: key-value blob stores and the extraction snapshot cache.

mod error;
pub use error::StoreError;

mod kv;
pub use kv::{FileStore, KeyValueStore, MemoryStore};

mod snapshot;
pub use snapshot::{KEY_RECORD, KEY_TIMESTAMP, MAX_AGE_SECS, Snapshot, SnapshotCache};
