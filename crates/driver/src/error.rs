//! Container Driver error taxonomy, converting upward into
//! `fleetd_core::Error` at the crate boundary (§7 of SPEC_FULL.md).

use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum DriverError {
    #[error("image pull failed: {0}")]
    ImagePullFailed(String),

    #[error("port conflict: {0}")]
    PortConflict(String),

    #[error("container runtime unavailable: {0}")]
    RuntimeUnavailable(String),

    #[error("invalid container spec: {0}")]
    InvalidSpec(String),

    #[error("exec timed out after {0:?}")]
    ExecTimeout(std::time::Duration),

    #[error("container is not running: {0}")]
    NotRunning(String),

    #[error("no such container: {0}")]
    NotFound(String),

    #[error("internal driver error: {0}")]
    Internal(String),
}

impl From<DriverError> for fleetd_core::Error {
    fn from(err: DriverError) -> Self {
        match err {
            DriverError::ImagePullFailed(msg) => fleetd_core::Error::ImagePull(msg),
            DriverError::PortConflict(msg) => fleetd_core::Error::Conflict(msg),
            DriverError::RuntimeUnavailable(msg) => fleetd_core::Error::RuntimeUnavailable(msg),
            DriverError::InvalidSpec(msg) => fleetd_core::Error::Invalid(msg),
            DriverError::ExecTimeout(d) => fleetd_core::Error::Internal(format!("exec timed out after {d:?}")),
            DriverError::NotRunning(msg) => fleetd_core::Error::Invalid(msg),
            DriverError::NotFound(msg) => fleetd_core::Error::NotFound(msg),
            DriverError::Internal(msg) => fleetd_core::Error::Internal(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, DriverError>;
