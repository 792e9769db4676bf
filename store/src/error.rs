use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Update/delete target missing. Recoverable — callers log and continue.
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    /// The stored log exists but cannot be interpreted. Reads fail soft to
    /// an empty sequence; writes refuse rather than overwrite the bytes.
    #[error("record log is corrupted: {0}")]
    Corruption(String),
}
