//! Error types for the organizer
//!
//! Organize entry points never surface these to callers: every error is
//! folded into the returned [OrganizationResult](crate::db::OrganizationResult).
//! Internally they let the pipeline distinguish domain failures from
//! transient file locks and cancellation.

use std::io;

use thiserror::Error;

/// Message fragment the host reports when a file is held open elsewhere
const IN_USE_MESSAGE: &str = "being used by another process";

#[derive(Error, Debug)]
pub enum OrganizeError {
    /// Domain failure with a human readable explanation (no metadata, bad pattern, TBA title...)
    #[error("{0}")]
    Organization(String),

    /// The file is held open by another process; the caller should retry later
    #[error("{0}")]
    InUse(String),

    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Result store error: {0}")]
    Store(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, OrganizeError>;

impl OrganizeError {
    pub fn organization(message: impl Into<String>) -> Self {
        Self::Organization(message.into())
    }

    /// Classify an I/O error, mapping sharing violations to [OrganizeError::InUse]
    pub fn from_io(err: io::Error) -> Self {
        if is_in_use(&err) {
            Self::InUse(err.to_string())
        } else {
            Self::Io(err)
        }
    }

    /// Whether this error means "try again later" rather than a hard failure
    pub fn is_transient(&self) -> bool {
        match self {
            Self::InUse(_) => true,
            Self::Io(err) => is_in_use(err),
            _ => false,
        }
    }
}

/// Detect "file in use" errors by message or by OS error code
pub fn is_in_use(err: &io::Error) -> bool {
    if err
        .to_string()
        .to_lowercase()
        .contains(IN_USE_MESSAGE)
    {
        return true;
    }

    match err.raw_os_error() {
        // ERROR_SHARING_VIOLATION / ERROR_LOCK_VIOLATION
        #[cfg(windows)]
        Some(32) | Some(33) => true,
        // EBUSY / ETXTBSY
        #[cfg(unix)]
        Some(16) | Some(26) => true,
        _ => false,
    }
}
