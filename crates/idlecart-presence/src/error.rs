//! Presence error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PresenceError {
    #[error("Storage error: {0}")]
    Storage(#[from] idlecart_storage::StorageError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
