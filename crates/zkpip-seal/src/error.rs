//! Error types for signing.
//!
//! Verification does not return errors; every failure there is a
//! [`VerifyOutcome::Rejected`](zkpip_seal_core::VerifyOutcome) value.

use thiserror::Error;
use zkpip_seal_core::CanonicalError;
use zkpip_seal_keys::KeyError;

/// Errors that can occur while producing a seal.
#[derive(Debug, Error)]
pub enum SealError {
    /// Private key could not be obtained.
    #[error("key error: {0}")]
    Key(#[from] KeyError),

    /// The body has no canonical form.
    #[error("canonicalization error: {0}")]
    Canonical(#[from] CanonicalError),

    /// The requested kind is neither known nor an allowed extension.
    #[error("invalid kind: {0:?}")]
    InvalidKind(String),

    /// The key id would not pass verification.
    #[error("invalid keyId {key_id:?}: {reason}")]
    InvalidKeyId { key_id: String, reason: String },
}

/// Result type for signing operations.
pub type Result<T> = std::result::Result<T, SealError>;
