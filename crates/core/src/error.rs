//! The error taxonomy shared by every crate in the workspace.
//!
//! Each kind maps to one row of the failure table in the system design: a
//! client-facing HTTP status at the API layer, a recovery policy at the
//! controller layer. Crate-local error enums (driver, storage, proxy)
//! convert into this one at their public boundary rather than leaking
//! implementation types upward.

use thiserror::Error;

/// The shared error type returned by Store, Driver, and Controller
/// operations.
#[derive(Debug, Error, Clone)]
pub enum Error {
    /// Client input failed validation.
    #[error("invalid request: {0}")]
    Invalid(String),

    /// No such Server/Listener/Config.
    #[error("not found: {0}")]
    NotFound(String),

    /// Port/hostname collision, listener still referenced, etc.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Auth surface; the core never raises this itself but carries it so
    /// the HTTP facade has a uniform place to map external middleware
    /// rejections.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The container runtime (Docker daemon) is unreachable.
    #[error("runtime unavailable: {0}")]
    RuntimeUnavailable(String),

    /// Asynchronous Create failed pulling/starting the image. Persisted as
    /// the Server's `Error` state rather than returned synchronously.
    #[error("image pull failed: {0}")]
    ImagePull(String),

    /// Store or unexpected driver failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// A short machine-readable tag for the kind, used when persisting a
    /// Server's error state (`ServerStatus::Error { code, .. }`).
    pub fn kind_tag(&self) -> &'static str {
        match self {
            Error::Invalid(_) => "invalid",
            Error::NotFound(_) => "not_found",
            Error::Conflict(_) => "conflict",
            Error::Unauthorized(_) => "unauthorized",
            Error::Forbidden(_) => "forbidden",
            Error::RuntimeUnavailable(_) => "runtime_unavailable",
            Error::ImagePull(_) => "image_pull",
            Error::Internal(_) => "internal",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
