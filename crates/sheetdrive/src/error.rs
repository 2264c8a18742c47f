//! Error types for sheetdrive

use crate::host::HostError;
use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while managing host-owned resources
#[derive(Debug, Error)]
pub enum Error {
    /// Could not connect to a running automation host
    #[error("host connection failed: {0}")]
    HostConnection(String),

    /// Registry key already present at this level
    #[error("name already registered: {0}")]
    NameCollision(String),

    /// Operation attempted through an already-released host handle
    #[error("invalid reference: {0} handle already released")]
    InvalidReference(&'static str),

    /// Mutating operation after `dispose()`
    #[error("use after dispose: {0} is disposed")]
    UseAfterDispose(&'static str),

    /// Failure reported by the automation host adapter
    #[error(transparent)]
    Host(#[from] HostError),
}
