//! Error types for the seal core.

use thiserror::Error;

/// Errors raised while producing canonical bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CanonicalError {
    /// A value with no JSON representation was found.
    #[error("unsupported value at {path}: {found}")]
    UnsupportedType { path: String, found: String },

    /// A map emitted the same key twice.
    #[error("duplicate object key at {path}")]
    DuplicateKey { path: String },

    /// Nesting exceeded the limit. Self-referencing values end up here.
    #[error("value nests deeper than {limit} levels at {path} (cyclic reference?)")]
    DepthExceeded { path: String, limit: usize },

    /// Error reported by a `Serialize` implementation.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl serde::ser::Error for CanonicalError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        CanonicalError::Serialization(msg.to_string())
    }
}

/// Errors raised when a URN is parsed or checked against a declared kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrnError {
    #[error("malformed URN {urn:?}: {reason}")]
    Malformed { urn: String, reason: String },

    #[error("URN subject {subject:?} does not match declared kind {declared:?}")]
    KindMismatch { declared: String, subject: String },
}

/// Errors raised while decoding a detached signature.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureDecodeError {
    #[error("signature is empty")]
    Empty,

    #[error("signature is not valid base64: {0}")]
    InvalidBase64(String),

    #[error("signature base64 is not in canonical padded form")]
    NonCanonical,
}

/// Errors raised by key material parsing and signature checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid key encoding: {0}")]
    InvalidKeyEncoding(String),
}
