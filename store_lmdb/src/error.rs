use plenum_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LmdbError {
    #[error("lmdb error: {0}")]
    Heed(#[from] heed::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("corrupted log: {0}")]
    Corruption(String),
}

impl From<LmdbError> for StoreError {
    fn from(e: LmdbError) -> Self {
        match e {
            LmdbError::Heed(inner) => StoreError::Backend(inner.to_string()),
            LmdbError::NotFound(what) => StoreError::NotFound(what),
            LmdbError::Serialization(what) => StoreError::Serialization(what),
            LmdbError::Corruption(what) => StoreError::Corruption(what),
        }
    }
}
