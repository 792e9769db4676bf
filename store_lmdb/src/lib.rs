//! LMDB storage backend for the Plenum record log.
//!
//! Implements [`plenum_store::RecordStore`] using the `heed` LMDB bindings.
//! The whole log lives under a single key as a JSON array of tagged objects
//! — the same shared-slot layout browser clients used — and every mutation
//! performs its read-modify-write inside one LMDB write transaction, so
//! in-process writers can no longer lose each other's updates.

pub mod error;
pub mod log_store;

pub use error::LmdbError;
pub use log_store::LmdbRecordStore;
