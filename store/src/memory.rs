//! In-memory record store for tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use plenum_records::{Record, RecordKind};
use plenum_types::RecordId;
use tokio::sync::broadcast;

use crate::error::StoreError;
use crate::event::{ChangeFeed, StoreEvent};
use crate::store::RecordStore;

/// A `Mutex<Vec<Record>>`-backed store with the same visibility and
/// notification semantics as the persistent backend.
pub struct MemoryRecordStore {
    log: Mutex<Vec<Record>>,
    feed: ChangeFeed,
    revision: AtomicU64,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self {
            log: Mutex::new(Vec::new()),
            feed: ChangeFeed::new(),
            revision: AtomicU64::new(0),
        }
    }

    /// Build a store pre-seeded with records, for test setup.
    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            log: Mutex::new(records),
            feed: ChangeFeed::new(),
            revision: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Record>>, StoreError> {
        self.log
            .lock()
            .map_err(|_| StoreError::Backend("record log mutex poisoned".into()))
    }

    fn notify(&self) {
        let revision = self.revision.fetch_add(1, Ordering::SeqCst) + 1;
        self.feed.publish(StoreEvent::Changed { revision });
    }
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for MemoryRecordStore {
    fn load_all(&self) -> Result<Vec<Record>, StoreError> {
        Ok(self.lock()?.clone())
    }

    fn append(&self, record: Record) -> Result<(), StoreError> {
        self.lock()?.push(record);
        self.notify();
        Ok(())
    }

    fn update_by_id(&self, record: Record) -> Result<(), StoreError> {
        let mut log = self.lock()?;
        match log.iter_mut().find(|r| r.id() == record.id()) {
            Some(slot) => *slot = record,
            None => return Err(StoreError::NotFound(record.id().to_string())),
        }
        drop(log);
        self.notify();
        Ok(())
    }

    fn delete_by_id(&self, id: &RecordId) -> Result<(), StoreError> {
        self.lock()?.retain(|r| r.id() != id);
        self.notify();
        Ok(())
    }

    fn delete_many(&self, ids: &[RecordId]) -> Result<(), StoreError> {
        self.lock()?.retain(|r| !ids.contains(r.id()));
        self.notify();
        Ok(())
    }

    fn delete_by_kind(&self, kind: Option<RecordKind>) -> Result<(), StoreError> {
        let mut log = self.lock()?;
        match kind {
            Some(kind) => log.retain(|r| r.kind() != kind),
            None => log.clear(),
        }
        drop(log);
        self.notify();
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.feed.subscribe()
    }
}
