//! Host-level error types for Glich
//!
//! Script-visible errors are ordinary `Value::Error` values and never
//! surface here; this enum covers failures of the host environment the
//! runtime is embedded in (file I/O, the input hook). Statement code
//! converts these into script diagnostics at the point of use.

use thiserror::Error;

/// Errors raised by the host environment
#[derive(Debug, Error)]
pub enum GlichError {
    #[error("cannot open file '{path}': {source}")]
    FileOpen {
        path: String,
        source: std::io::Error,
    },

    #[error("cannot write to file '{path}': {source}")]
    FileWrite {
        path: String,
        source: std::io::Error,
    },

    #[error("no input provider attached to this runtime")]
    NoInputHook,
}

/// Result type for host-level runtime operations
pub type Result<T> = std::result::Result<T, GlichError>;
