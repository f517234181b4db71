//! Error type shared by every NTRU operation.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NtruError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Gave up on {what} after {attempts} attempts")]
    GenerationExhausted { what: &'static str, attempts: u32 },

    #[error("Decryption failed: message integrity check did not pass")]
    DecodeIntegrityFailure,

    #[error("Serialization failure: {0}")]
    SerializationFailure(String),
}

/// Result type for NTRU operations.
pub type Result<T> = std::result::Result<T, NtruError>;
