//! Cache of the most recent reconciled extraction.
//!
//! The record and its write time are stored under two keys. A reader treats
//! anything older than [`MAX_AGE_SECS`], unparseable, or stamped in the
//! future as absent and clears it. Stored values cross a trust boundary, so
//! they are re-parsed into typed records on every read.
//!
//! The cache also keeps the last record it saved or read in memory. When
//! the store fails, or holds an older record than memory does, the
//! in-memory copy is returned instead.

use chrono::{DateTime, TimeDelta, Utc};
use inescan_core::CanonicalRecord;
use tracing::{debug, info, warn};

use crate::{KeyValueStore, StoreError};

/// Key holding the JSON-serialised [`CanonicalRecord`].
pub const KEY_RECORD: &str = "prd_datos_extraidos";
/// Key holding the write time in epoch milliseconds.
pub const KEY_TIMESTAMP: &str = "prd_timestamp";
/// Freshness window: one hour.
pub const MAX_AGE_SECS: i64 = 60 * 60;

/// A cached record and when it was written.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub record: CanonicalRecord,
    pub saved_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn age(&self, now: DateTime<Utc>) -> TimeDelta {
        now - self.saved_at
    }
}

pub struct SnapshotCache<S> {
    store: S,
    fallback: Option<Snapshot>,
    max_age: TimeDelta,
}

impl<S: KeyValueStore> SnapshotCache<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            fallback: None,
            max_age: TimeDelta::seconds(MAX_AGE_SECS),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Cache `record` as written at `now`.
    ///
    /// The in-memory copy is always updated, so a later [`load`](Self::load)
    /// still finds the record even when this returns an error.
    pub fn save(&mut self, record: &CanonicalRecord, now: DateTime<Utc>) -> Result<(), StoreError> {
        self.fallback = Some(Snapshot {
            record: record.clone(),
            saved_at: now,
        });

        let json = serde_json::to_string(record)?;
        if let Err(e) = self.write_pair(&json, now) {
            warn!(error = %e, "snapshot write failed, keeping in-memory copy");
            return Err(e);
        }
        info!(fields = record.populated(), "cached extraction snapshot");
        Ok(())
    }

    /// The newest fresh record at `now`, from the store or from memory.
    pub fn load(&mut self, now: DateTime<Utc>) -> Option<Snapshot> {
        if self
            .fallback
            .as_ref()
            .is_some_and(|snap| !self.is_fresh(snap.saved_at, now))
        {
            self.fallback = None;
        }

        let stored = match self.load_from_store(now) {
            Ok(found) => found,
            Err(e) => {
                warn!(error = %e, "snapshot store unavailable, using in-memory copy");
                None
            }
        };

        match (stored, self.fallback.clone()) {
            (Some(stored), Some(mem)) if mem.saved_at > stored.saved_at => {
                debug!(
                    stored_at = %stored.saved_at,
                    memory_at = %mem.saved_at,
                    "in-memory snapshot is newer than stored one"
                );
                Some(mem)
            }
            (Some(stored), _) => {
                self.fallback = Some(stored.clone());
                Some(stored)
            }
            (None, mem) => mem,
        }
    }

    /// Forget the cached record.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.fallback = None;
        self.store.remove(KEY_RECORD)?;
        self.store.remove(KEY_TIMESTAMP)?;
        debug!("cleared extraction snapshot");
        Ok(())
    }

    /// The stamp is removed first and written last, so an interrupted write
    /// leaves a record without a stamp, which reads as absent.
    fn write_pair(&mut self, json: &str, now: DateTime<Utc>) -> Result<(), StoreError> {
        self.store.remove(KEY_TIMESTAMP)?;
        self.store.set(KEY_RECORD, json)?;
        self.store
            .set(KEY_TIMESTAMP, &now.timestamp_millis().to_string())
    }

    fn load_from_store(&mut self, now: DateTime<Utc>) -> Result<Option<Snapshot>, StoreError> {
        let (Some(stamp), Some(json)) = (self.store.get(KEY_TIMESTAMP)?, self.store.get(KEY_RECORD)?)
        else {
            return Ok(None);
        };

        let Some(saved_at) = stamp
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
        else {
            warn!(stamp = %stamp, "discarding snapshot with unreadable timestamp");
            self.discard()?;
            return Ok(None);
        };

        if !self.is_fresh(saved_at, now) {
            debug!(saved_at = %saved_at, "discarding stale snapshot");
            self.discard()?;
            return Ok(None);
        }

        match serde_json::from_str::<CanonicalRecord>(&json) {
            Ok(record) => Ok(Some(Snapshot { record, saved_at })),
            Err(e) => {
                warn!(error = %e, "discarding malformed snapshot");
                self.discard()?;
                Ok(None)
            }
        }
    }

    fn is_fresh(&self, saved_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let age = now - saved_at;
        age >= TimeDelta::zero() && age < self.max_age
    }

    /// Remove the stored pair. The in-memory copy is left alone.
    fn discard(&mut self) -> Result<(), StoreError> {
        self.store.remove(KEY_RECORD)?;
        self.store.remove(KEY_TIMESTAMP)
    }
}
