//! SHA-256 digests and content URNs.
//!
//! A sealed body is addressed as `urn:zkpip:<kind>:sha256:<64 lowercase hex>`,
//! where the digest is taken over its canonical bytes.

use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::canonical::CanonicalBytes;
use crate::error::UrnError;
use crate::kind::{parse_kind, Kind, KnownKind};

/// URN scheme prefix.
pub const URN_SCHEME: &str = "urn";

/// URN namespace for sealed artifacts.
pub const URN_NAMESPACE: &str = "zkpip";

/// Digest algorithm label embedded in URNs.
pub const URN_DIGEST_ALGO: &str = "sha256";

/// A 32-byte SHA-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sha256Digest(pub [u8; 32]);

impl Sha256Digest {
    /// Compute the SHA-256 digest of data.
    pub fn hash(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sha256({}...)", &self.to_hex()[..16])
    }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl AsRef<[u8]> for Sha256Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Sha256Digest {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// SHA-256 of `bytes` as 64 lowercase hex characters.
pub fn digest_hex(bytes: &[u8]) -> String {
    Sha256Digest::hash(bytes).to_hex()
}

/// Format a URN for `hex`.
///
/// A missing kind, or one the registry does not recognise, falls back to `vector`.
pub fn to_urn(kind: Option<&str>, hex: &str) -> String {
    let kind = kind
        .and_then(|k| parse_kind(k, true))
        .unwrap_or(Kind::Known(KnownKind::Vector));
    format!("{URN_SCHEME}:{URN_NAMESPACE}:{kind}:{URN_DIGEST_ALGO}:{hex}")
}

/// A parsed content URN.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Urn {
    /// Subject position. Not validated against the kind registry.
    pub subject: String,
    pub digest: Sha256Digest,
}

impl Urn {
    /// Derive the URN of canonical bytes under `kind`.
    pub fn derive(kind: &Kind, bytes: &CanonicalBytes) -> Self {
        Self {
            subject: kind.as_str().to_string(),
            digest: Sha256Digest::hash(bytes.as_bytes()),
        }
    }

    /// Parse `urn:zkpip:<subject>:sha256:<hex>`.
    ///
    /// The hex digest must be exactly 64 lowercase characters.
    pub fn parse(urn: &str) -> Result<Self, UrnError> {
        let malformed = |reason: &str| UrnError::Malformed {
            urn: urn.to_string(),
            reason: reason.to_string(),
        };

        let parts: Vec<&str> = urn.split(':').collect();
        if parts.len() != 5 {
            return Err(malformed("expected 5 colon-separated parts"));
        }
        if parts[0] != URN_SCHEME || parts[1] != URN_NAMESPACE {
            return Err(malformed("expected urn:zkpip prefix"));
        }
        if parts[2].is_empty() {
            return Err(malformed("empty subject"));
        }
        if parts[3] != URN_DIGEST_ALGO {
            return Err(malformed("digest algorithm must be sha256"));
        }
        let hex = parts[4];
        if hex.len() != 64 || !hex.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(malformed("digest must be 64 lowercase hex characters"));
        }
        let digest = Sha256Digest::from_hex(hex).map_err(|e| malformed(&e.to_string()))?;

        Ok(Self {
            subject: parts[2].to_string(),
            digest,
        })
    }
}

impl fmt::Display for Urn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{URN_SCHEME}:{URN_NAMESPACE}:{}:{URN_DIGEST_ALGO}:{}",
            self.subject,
            self.digest.to_hex()
        )
    }
}

impl FromStr for Urn {
    type Err = UrnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Urn::parse(s)
    }
}
