use thiserror::Error;

pub type Result<T, E = StoreError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open registry store: {0}")]
    Open(String),
    #[error("registry query failed: {0}")]
    Query(String),
    #[error("registry commit failed: {0}")]
    Commit(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Query(e.to_string())
    }
}
