//! Dispensa error types.

use thiserror::Error;

/// Top-level error type shared by all Dispensa crates.
#[derive(Debug, Error)]
pub enum DispensaError {
    /// Configuration could not be read, parsed, or written.
    #[error("Config error: {0}")]
    Config(String),

    /// The dispatch facility is unreachable or failed a transport call.
    #[error("Facility error: {0}")]
    Facility(String),

    /// The dispatch facility rejected a schedule or cancel call.
    #[error("Dispatch error: {0}")]
    Dispatch(String),

    /// The permission flow with the facility failed.
    #[error("Permission error: {0}")]
    Permission(String),

    /// A payload could not be serialized or deserialized.
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result alias.
pub type Result<T> = std::result::Result<T, DispensaError>;
