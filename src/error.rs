use thiserror::Error;

/// Durable store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("lock poisoned: {0}")]
    LockError(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
