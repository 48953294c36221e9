//! Error types for key resolution.

use thiserror::Error;

/// Errors that can occur while resolving or loading keys.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// No key is registered under this id.
    #[error("key not found: {0}")]
    NotFound(String),

    /// The key exists but cannot be handed out (locked, not permitted, backend down).
    #[error("key {key_id} unavailable: {reason}")]
    Unavailable { key_id: String, reason: String },

    /// A key record is missing required fields or has the wrong shape.
    #[error("invalid key record: {0}")]
    InvalidRecord(String),

    /// Key bytes could not be decoded.
    #[error("invalid key material: {0}")]
    InvalidKey(String),
}

impl From<zkpip_seal_core::CryptoError> for KeyError {
    fn from(e: zkpip_seal_core::CryptoError) -> Self {
        KeyError::InvalidKey(e.to_string())
    }
}

/// Result type for key operations.
pub type Result<T> = std::result::Result<T, KeyError>;
