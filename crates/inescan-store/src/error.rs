use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid store key {0:?}")]
    InvalidKey(String),

    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not replace stored value: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
