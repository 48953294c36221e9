//! Artifact kinds: a closed vocabulary plus `x-` vendor extensions.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::digest::Urn;
use crate::error::UrnError;

/// Maximum length of the part after `x-` in a vendor extension kind.
pub const MAX_EXTENSION_LEN: usize = 63;

/// The canonical artifact kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownKind {
    /// Test vector (the default kind).
    Vector,
    /// A single proof.
    Proof,
    /// A proof together with its public inputs and verification key.
    ProofBundle,
    /// A compiled circuit.
    Circuit,
    /// A standalone verification key.
    VerificationKey,
    /// A manifest listing other sealed artifacts.
    Manifest,
    /// A schema document.
    Schema,
}

/// Every known kind, in registry order.
pub const KNOWN_KINDS: [KnownKind; 7] = [
    KnownKind::Vector,
    KnownKind::Proof,
    KnownKind::ProofBundle,
    KnownKind::Circuit,
    KnownKind::VerificationKey,
    KnownKind::Manifest,
    KnownKind::Schema,
];

impl KnownKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vector => "vector",
            Self::Proof => "proof",
            Self::ProofBundle => "proof-bundle",
            Self::Circuit => "circuit",
            Self::VerificationKey => "verification-key",
            Self::Manifest => "manifest",
            Self::Schema => "schema",
        }
    }

    /// Look up a known kind by tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        KNOWN_KINDS.iter().copied().find(|k| k.as_str() == tag)
    }
}

/// A kind tag: known, or a vendor extension such as `x-acme-trace`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Kind {
    Known(KnownKind),
    Extension(String),
}

impl Kind {
    pub fn as_str(&self) -> &str {
        match self {
            Kind::Known(k) => k.as_str(),
            Kind::Extension(s) => s,
        }
    }

    pub fn is_extension(&self) -> bool {
        matches!(self, Kind::Extension(_))
    }
}

impl Default for Kind {
    fn default() -> Self {
        Kind::Known(KnownKind::Vector)
    }
}

impl From<KnownKind> for Kind {
    fn from(k: KnownKind) -> Self {
        Kind::Known(k)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_kind(s, true).ok_or_else(|| format!("unknown kind {s:?}"))
    }
}

impl Serialize for Kind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Kind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Check the vendor extension pattern `x-[a-z0-9-]{1,63}`.
pub fn is_extension_kind(s: &str) -> bool {
    match s.strip_prefix("x-") {
        Some(rest) => {
            !rest.is_empty()
                && rest.len() <= MAX_EXTENSION_LEN
                && rest
                    .bytes()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        }
        None => false,
    }
}

/// Parse a kind tag. Extensions are accepted only when `allow_extensions` is set.
pub fn parse_kind(s: &str, allow_extensions: bool) -> Option<Kind> {
    if let Some(known) = KnownKind::from_tag(s) {
        return Some(Kind::Known(known));
    }
    if allow_extensions && is_extension_kind(s) {
        return Some(Kind::Extension(s.to_string()));
    }
    None
}

/// Require `urn` to be a well-formed content URN whose subject is `kind`.
///
/// Must pass before any trust is placed in a seal's URN.
pub fn ensure_urn_matches_kind(kind: &str, urn: &str) -> Result<(), UrnError> {
    let parsed = Urn::parse(urn)?;
    if parsed.subject != kind {
        return Err(UrnError::KindMismatch {
            declared: kind.to_string(),
            subject: parsed.subject,
        });
    }
    Ok(())
}
