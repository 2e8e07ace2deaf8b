//! Error types for the directory database backend
//!
//! This module defines the unified error type returned by every backend
//! operation. We use `thiserror` for automatic `Display`/`std::error::Error`
//! impls, the same way the rest of the workspace derives its errors.
//!
//! ## Error categories
//!
//! - **Operations error** — internal invariant violation or allocation
//!   failure; the caller may retry at its own discretion.
//! - **Protocol error** — malformed request (unknown mod flag, corrupt
//!   record on fetch).
//! - **Busy** — lock contention in the underlying file engine; retryable.
//! - **No such object / entry already exists / no such attribute /
//!   attribute or value exists** — the usual directory-style collisions.
//! - **Invalid attribute syntax** — an `@ATTRIBUTES` value failed its tuple
//!   form.
//! - **Insufficient access** — the underlying file is opened read-only.
//! - **Unsupported critical extension** — an unrecognised critical control.

use thiserror::Error;

/// Result type alias used throughout the backend.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the directory database backend.
#[derive(Debug, Error)]
pub enum Error {
    /// Internal invariant violation, allocation failure, or any other
    /// condition that leaves the caller nothing better to do than retry.
    #[error("operations error: {0}")]
    Operations(String),

    /// Malformed request: an unrecognised modify flag, a corrupt packed
    /// record, or any other structurally invalid input.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The underlying store reported lock contention or a timeout.
    #[error("busy / time limit exceeded: {0}")]
    Busy(String),

    /// The target DN does not exist.
    #[error("no such object: {0}")]
    NoSuchObject(String),

    /// An add collided with an existing entry.
    #[error("entry already exists: {0}")]
    EntryAlreadyExists(String),

    /// A delete (whole-attribute or single-value) targeted something
    /// that isn't present.
    #[error("no such attribute: {0}")]
    NoSuchAttribute(String),

    /// An add collided on a per-value basis.
    #[error("attribute or value exists: {0}")]
    AttributeOrValueExists(String),

    /// An `@ATTRIBUTES` value failed its `attr:flags[:syntax]` tuple form.
    #[error("invalid attribute syntax: {0}")]
    InvalidAttributeSyntax(String),

    /// The underlying file is open read-only.
    #[error("insufficient access: {0}")]
    InsufficientAccess(String),

    /// A request carried an unrecognised critical control.
    #[error("unsupported critical extension: {0}")]
    UnsupportedCriticalExtension(String),

    /// I/O error surfaced from the underlying store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for errors a caller may reasonably retry (lock contention,
    /// transient busy conditions).
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Busy(_))
    }

    /// True for errors that indicate caller-visible directory semantics
    /// rather than an internal fault (existence/collision errors).
    pub fn is_directory_error(&self) -> bool {
        matches!(
            self,
            Error::NoSuchObject(_)
                | Error::EntryAlreadyExists(_)
                | Error::NoSuchAttribute(_)
                | Error::AttributeOrValueExists(_)
        )
    }
}
