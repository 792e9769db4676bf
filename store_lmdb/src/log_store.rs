//! LMDB implementation of the record store.
//!
//! Layout: a `records` database holding the whole log as a JSON array under
//! one `log` key, and a `meta` database carrying the schema version. The
//! mutation path reads the raw entry array, modifies it, and writes it back
//! inside the same write transaction.
//!
//! Two deliberate asymmetries between reads and writes:
//! - `load_all` decodes through the validation gate, so invalid entries are
//!   quarantined from every projection but stay in storage.
//! - mutations operate on the *raw* entry array, so quarantined entries
//!   survive read-modify-write cycles; if the stored log is not a JSON array
//!   at all, mutations refuse with a corruption error instead of overwriting
//!   the bytes.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions, RwTxn};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::warn;

use plenum_records::{decode_log, Record, RecordKind};
use plenum_store::{ChangeFeed, RecordStore, StoreError, StoreEvent};
use plenum_types::RecordId;

use crate::LmdbError;

const LOG_KEY: &[u8] = b"log";
const SCHEMA_VERSION_KEY: &[u8] = b"schema_version";
const SCHEMA_VERSION: u32 = 1;

pub struct LmdbRecordStore {
    env: Env,
    records_db: Database<Bytes, Bytes>,
    meta_db: Database<Bytes, Bytes>,
    feed: ChangeFeed,
    revision: AtomicU64,
}

impl LmdbRecordStore {
    /// Open or create the store at the given directory.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        let env = unsafe { EnvOpenOptions::new().map_size(map_size).max_dbs(2).open(path)? };

        let mut wtxn = env.write_txn()?;
        let records_db: Database<Bytes, Bytes> = env.create_database(&mut wtxn, Some("records"))?;
        let meta_db: Database<Bytes, Bytes> = env.create_database(&mut wtxn, Some("meta"))?;

        let stored = meta_db
            .get(&wtxn, SCHEMA_VERSION_KEY)?
            .map(<[u8]>::to_vec);
        match stored {
            None => {
                meta_db.put(&mut wtxn, SCHEMA_VERSION_KEY, &SCHEMA_VERSION.to_le_bytes())?;
            }
            Some(bytes) if bytes.len() == 4 => {
                let arr: [u8; 4] = bytes.try_into().expect("checked length");
                let found = u32::from_le_bytes(arr);
                if found != SCHEMA_VERSION {
                    return Err(LmdbError::Corruption(format!(
                        "unsupported schema version {found}, expected {SCHEMA_VERSION}"
                    )));
                }
            }
            Some(_) => {
                return Err(LmdbError::Corruption(
                    "schema_version has unexpected byte length".to_string(),
                ));
            }
        }
        wtxn.commit()?;

        Ok(Self {
            env,
            records_db,
            meta_db,
            feed: ChangeFeed::new(),
            revision: AtomicU64::new(0),
        })
    }

    /// The schema version recorded in the meta database.
    pub fn schema_version(&self) -> Result<u32, LmdbError> {
        let rtxn = self.env.read_txn()?;
        match self.meta_db.get(&rtxn, SCHEMA_VERSION_KEY)? {
            Some(bytes) if bytes.len() == 4 => {
                let arr: [u8; 4] = bytes.try_into().expect("checked length");
                Ok(u32::from_le_bytes(arr))
            }
            _ => Ok(0),
        }
    }

    /// Read the raw entry array for a read-modify-write cycle.
    ///
    /// An absent slot is an empty log; a present slot that is not a JSON
    /// array is corruption, and the caller must not write over it.
    fn read_raw_entries(&self, wtxn: &RwTxn) -> Result<Vec<Value>, LmdbError> {
        let Some(bytes) = self.records_db.get(wtxn, LOG_KEY)? else {
            return Ok(Vec::new());
        };
        let parsed: Value = serde_json::from_slice(bytes)
            .map_err(|e| LmdbError::Corruption(format!("log slot is not JSON: {e}")))?;
        match parsed {
            Value::Array(entries) => Ok(entries),
            other => Err(LmdbError::Corruption(format!(
                "log slot holds {} instead of an array",
                kind_of(&other)
            ))),
        }
    }

    fn write_entries(&self, wtxn: &mut RwTxn, entries: &[Value]) -> Result<(), LmdbError> {
        let bytes = serde_json::to_vec(entries).map_err(|e| LmdbError::Serialization(e.to_string()))?;
        self.records_db.put(wtxn, LOG_KEY, &bytes)?;
        Ok(())
    }

    /// Run one read-modify-write mutation atomically and publish the change.
    fn mutate<F>(&self, f: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Vec<Value>) -> Result<(), LmdbError>,
    {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let mut entries = self.read_raw_entries(&wtxn)?;
        f(&mut entries)?;
        self.write_entries(&mut wtxn, &entries)?;
        wtxn.commit().map_err(LmdbError::from)?;

        let revision = self.revision.fetch_add(1, Ordering::SeqCst) + 1;
        self.feed.publish(StoreEvent::Changed { revision });
        Ok(())
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn entry_id(entry: &Value) -> Option<&str> {
    entry.get("id").and_then(Value::as_str)
}

fn entry_kind(entry: &Value) -> Option<&str> {
    entry.get("kind").and_then(Value::as_str)
}

fn to_raw(record: &Record) -> Result<Value, LmdbError> {
    serde_json::to_value(record).map_err(|e| LmdbError::Serialization(e.to_string()))
}

impl RecordStore for LmdbRecordStore {
    fn load_all(&self) -> Result<Vec<Record>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let Some(bytes) = self
            .records_db
            .get(&rtxn, LOG_KEY)
            .map_err(LmdbError::from)?
        else {
            return Ok(Vec::new());
        };
        let Ok(text) = std::str::from_utf8(bytes) else {
            warn!("record log slot is not UTF-8, treating as empty");
            return Ok(Vec::new());
        };
        Ok(decode_log(text))
    }

    fn append(&self, record: Record) -> Result<(), StoreError> {
        let raw = to_raw(&record)?;
        self.mutate(|entries| {
            entries.push(raw);
            Ok(())
        })
    }

    fn update_by_id(&self, record: Record) -> Result<(), StoreError> {
        let raw = to_raw(&record)?;
        let id = record.id().to_string();
        self.mutate(|entries| {
            match entries.iter().position(|e| entry_id(e) == Some(id.as_str())) {
                Some(index) => {
                    entries[index] = raw;
                    Ok(())
                }
                None => Err(LmdbError::NotFound(id.clone())),
            }
        })
    }

    fn delete_by_id(&self, id: &RecordId) -> Result<(), StoreError> {
        self.mutate(|entries| {
            entries.retain(|e| entry_id(e) != Some(id.as_str()));
            Ok(())
        })
    }

    fn delete_many(&self, ids: &[RecordId]) -> Result<(), StoreError> {
        self.mutate(|entries| {
            entries.retain(|e| {
                entry_id(e).map_or(true, |id| !ids.iter().any(|wanted| wanted.as_str() == id))
            });
            Ok(())
        })
    }

    fn delete_by_kind(&self, kind: Option<RecordKind>) -> Result<(), StoreError> {
        self.mutate(|entries| {
            match kind {
                Some(kind) => entries.retain(|e| entry_kind(e) != Some(kind.as_str())),
                None => entries.clear(),
            }
            Ok(())
        })
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.feed.subscribe()
    }
}
