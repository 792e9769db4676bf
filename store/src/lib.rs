//! Abstract storage for the Plenum record log.
//!
//! Every storage backend (LMDB, in-memory for testing) implements the
//! [`RecordStore`] trait. The rest of the workspace depends only on the
//! trait: engines append and update records through it, and the projection
//! layer re-reads the full log whenever the change feed fires.

pub mod error;
pub mod event;
pub mod memory;
pub mod store;

pub use error::StoreError;
pub use event::{ChangeFeed, StoreEvent};
pub use memory::MemoryRecordStore;
pub use store::RecordStore;
