//! Error types for the bridge.

use crate::types::Handle;
use thiserror::Error;

/// Main error type for bridge operations.
///
/// Nothing here is fatal: every failure is scoped to the single command
/// or event that triggered it, and the registry's invariants (handle
/// uniqueness, at-most-one cancellation per handle) hold afterwards.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Malformed or incomplete command arguments. The command is
    /// aborted with no state mutated.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Stale or unrecognized handle. Recoverable: callers may
    /// legitimately race an unlisten against an in-flight event.
    #[error("Unknown handle: {0}")]
    UnknownHandle(Handle),

    /// The native store client rejected a query or write. Surfaced
    /// verbatim, never retried here.
    #[error("External store error: {0}")]
    ExternalStore(String),

    /// Unrecognized command name; answered with "not implemented",
    /// never silently dropped.
    #[error("Unsupported command: {0}")]
    UnsupportedCommand(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for BridgeError {
    fn from(e: serde_json::Error) -> Self {
        BridgeError::Serialization(e.to_string())
    }
}

/// Result type for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;
