//! Storage-local error type, converting upward into `fleetd_core::Error` at
//! the crate boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
}

impl From<StoreError> for fleetd_core::Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => fleetd_core::Error::NotFound(msg),
            StoreError::Conflict(msg) => fleetd_core::Error::Conflict(msg),
            StoreError::Io(e) => fleetd_core::Error::Internal(format!("storage io error: {e}")),
            StoreError::Json(e) => fleetd_core::Error::Internal(format!("storage serialization error: {e}")),
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
