//! The record-store trait.

use plenum_records::{Record, RecordKind};
use plenum_types::RecordId;
use tokio::sync::broadcast;

use crate::error::StoreError;
use crate::event::StoreEvent;

/// Storage contract for the shared record log.
///
/// Within one process, mutations are visible to the very next `load_all`
/// (read-your-writes); subscribers on the change feed converge eventually.
/// All mutations are read-modify-write over the whole log — backends must
/// make that sequence atomic for in-process callers.
pub trait RecordStore: Send + Sync {
    /// Read the full trusted record sequence. Invalid or unparseable stored
    /// entries are excluded, never surfaced as errors.
    fn load_all(&self) -> Result<Vec<Record>, StoreError>;

    /// Append one record to the log.
    fn append(&self, record: Record) -> Result<(), StoreError>;

    /// Replace the stored record whose id matches. `NotFound` is recoverable;
    /// callers are expected to log and continue.
    fn update_by_id(&self, record: Record) -> Result<(), StoreError>;

    /// Delete the record with the given id, if present.
    fn delete_by_id(&self, id: &RecordId) -> Result<(), StoreError>;

    /// Delete every record whose id is in `ids`. Used by the per-proposal
    /// vote reset.
    fn delete_many(&self, ids: &[RecordId]) -> Result<(), StoreError>;

    /// Delete every record of the given kind; `None` wipes the whole log
    /// (hard reset only).
    fn delete_by_kind(&self, kind: Option<RecordKind>) -> Result<(), StoreError>;

    /// Subscribe to the change feed.
    fn subscribe(&self) -> broadcast::Receiver<StoreEvent>;
}
