//! Seal: a JSON body bound to its content URN and a detached signature.
//!
//! A seal is built once, by [`SealBuilder::sign`], and never mutated.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::canonical::{canonicalize, CanonicalBytes};
use crate::crypto::{sign_canonical, Keypair};
use crate::digest::Urn;
use crate::error::CanonicalError;
use crate::kind::{parse_kind, Kind};

/// The seal document version.
pub const SEAL_VERSION: &str = "1";

/// Longest accepted `keyId`, in characters.
pub const MAX_KEY_ID_LEN: usize = 256;

/// Signature algorithm. Only Ed25519 exists today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SealAlgo {
    #[serde(rename = "ed25519")]
    Ed25519,
}

impl SealAlgo {
    pub const fn as_str(self) -> &'static str {
        match self {
            SealAlgo::Ed25519 => "ed25519",
        }
    }
}

/// Signature metadata carried next to the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealBlock {
    pub algo: SealAlgo,
    /// Logical key identifier, resolved to key material by the caller.
    pub key_id: String,
    /// Standard padded base64 of the signature over the canonical body.
    pub signature: String,
    /// `urn:zkpip:<kind>:sha256:<hex>` of the canonical body.
    pub urn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signer: Option<String>,
    /// RFC 3339 timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// A sealed artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seal {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Declared kind. A non-string value reads as absent.
    #[serde(
        default,
        deserialize_with = "non_string_as_absent",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<String>,
    pub body: Value,
    pub seal: SealBlock,
}

impl Seal {
    /// The kind the URN is derived under: the declared kind, or `vector`
    /// when it is absent or not recognised.
    pub fn effective_kind(&self, allow_extensions: bool) -> Kind {
        self.kind
            .as_deref()
            .and_then(|k| parse_kind(k, allow_extensions))
            .unwrap_or_default()
    }

    /// Canonical bytes of the body.
    pub fn canonical_body(&self) -> Result<CanonicalBytes, CanonicalError> {
        canonicalize(&self.body)
    }

    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn non_string_as_absent<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

/// Check a `keyId`: non-empty, at most [`MAX_KEY_ID_LEN`] characters, and
/// free of whitespace and control characters.
pub fn validate_key_id(key_id: &str) -> Result<(), &'static str> {
    if key_id.is_empty() {
        return Err("keyId is empty");
    }
    if key_id.chars().count() > MAX_KEY_ID_LEN {
        return Err("keyId is longer than 256 characters");
    }
    if key_id.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err("keyId contains whitespace or control characters");
    }
    Ok(())
}

/// Format a timestamp the way `createdAt` is stored: `2024-01-02T03:04:05.678Z`.
pub fn format_created_at(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Builder for seals.
///
/// Composes canonicalize → digest → URN → sign. Every seal in the system is
/// produced here.
#[derive(Debug, Clone)]
pub struct SealBuilder {
    body: Value,
    kind: Kind,
    key_id: String,
    signer: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

impl SealBuilder {
    /// Start a seal over `body`, kind `vector`.
    pub fn new(body: Value) -> Self {
        Self {
            body,
            kind: Kind::default(),
            key_id: String::new(),
            signer: None,
            created_at: None,
        }
    }

    pub fn kind(mut self, kind: impl Into<Kind>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn key_id(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = key_id.into();
        self
    }

    pub fn signer(mut self, signer: impl Into<String>) -> Self {
        self.signer = Some(signer.into());
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    /// Canonicalize the body, derive its URN, and sign.
    pub fn sign(self, keypair: &Keypair) -> Result<Seal, CanonicalError> {
        let canonical = canonicalize(&self.body)?;
        let urn = Urn::derive(&self.kind, &canonical);
        let signature = sign_canonical(&canonical, keypair);

        Ok(Seal {
            version: Some(SEAL_VERSION.to_string()),
            kind: Some(self.kind.as_str().to_string()),
            body: self.body,
            seal: SealBlock {
                algo: SealAlgo::Ed25519,
                key_id: self.key_id,
                signature,
                urn: urn.to_string(),
                signer: self.signer,
                created_at: self.created_at.map(format_created_at),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{decode_signature_strict, Ed25519Signature};
    use crate::kind::{ensure_urn_matches_kind, KnownKind};
    use chrono::TimeZone;
    use serde_json::json;

    fn keypair() -> Keypair {
        Keypair::from_seed(&[0x42; 32])
    }

    #[test]
    fn test_build_and_check_signature() {
        let kp = keypair();
        let seal = SealBuilder::new(json!({"b": 1, "a": 2}))
            .key_id("k1")
            .sign(&kp)
            .unwrap();

        assert_eq!(seal.version.as_deref(), Some("1"));
        assert_eq!(seal.kind.as_deref(), Some("vector"));
        assert_eq!(
            seal.seal.urn,
            "urn:zkpip:vector:sha256:d3626ac30a87e6f7a6428233b3c68299976865fa5508e4267c5415c76af7a772"
        );

        let sig = decode_signature_strict(&seal.seal.signature).unwrap();
        let sig = Ed25519Signature::from_slice(&sig).unwrap();
        kp.public_key()
            .verify(seal.canonical_body().unwrap().as_bytes(), &sig)
            .unwrap();
    }

    #[test]
    fn test_kind_flows_into_urn() {
        let seal = SealBuilder::new(json!([1, 2, 3]))
            .kind(KnownKind::Circuit)
            .key_id("k1")
            .sign(&keypair())
            .unwrap();
        assert!(ensure_urn_matches_kind("circuit", &seal.seal.urn).is_ok());
        assert_eq!(seal.effective_kind(false), Kind::Known(KnownKind::Circuit));
    }

    #[test]
    fn test_effective_kind_defaults() {
        let mut seal = SealBuilder::new(json!(1)).key_id("k").sign(&keypair()).unwrap();
        seal.kind = None;
        assert_eq!(seal.effective_kind(true), Kind::Known(KnownKind::Vector));
        seal.kind = Some("nonsense".into());
        assert_eq!(seal.effective_kind(true), Kind::Known(KnownKind::Vector));
        seal.kind = Some("x-lab".into());
        assert_eq!(seal.effective_kind(false), Kind::Known(KnownKind::Vector));
        assert_eq!(seal.effective_kind(true), Kind::Extension("x-lab".into()));
    }

    #[test]
    fn test_document_shape() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let seal = SealBuilder::new(json!({"x": 1}))
            .key_id("team-key")
            .signer("alice")
            .created_at(at)
            .sign(&keypair())
            .unwrap();

        let doc = seal.to_value().unwrap();
        assert_eq!(doc["version"], "1");
        assert_eq!(doc["seal"]["algo"], "ed25519");
        assert_eq!(doc["seal"]["keyId"], "team-key");
        assert_eq!(doc["seal"]["signer"], "alice");
        assert_eq!(doc["seal"]["createdAt"], "2024-05-01T12:00:00.000Z");

        let back = Seal::from_json_str(&seal.to_json_pretty().unwrap()).unwrap();
        assert_eq!(back, seal);
    }

    #[test]
    fn test_optional_fields_omitted() {
        let seal = SealBuilder::new(json!(null)).key_id("k").sign(&keypair()).unwrap();
        let doc = seal.to_value().unwrap();
        assert!(doc["seal"].get("signer").is_none());
        assert!(doc["seal"].get("createdAt").is_none());
    }

    #[test]
    fn test_key_id_rules() {
        assert!(validate_key_id("team-key:2024").is_ok());
        assert!(validate_key_id(&"k".repeat(MAX_KEY_ID_LEN)).is_ok());
        assert!(validate_key_id("").is_err());
        assert!(validate_key_id("two words").is_err());
        assert!(validate_key_id("tab\there").is_err());
        assert!(validate_key_id("nul\u{0}").is_err());
        assert!(validate_key_id(&"k".repeat(MAX_KEY_ID_LEN + 1)).is_err());
    }

    #[test]
    fn test_non_string_kind_reads_as_absent() {
        let seal = SealBuilder::new(json!({"x": 1})).key_id("k").sign(&keypair()).unwrap();
        for kind in [json!(5), json!(null), json!(["proof"]), json!({"kind": "proof"})] {
            let mut doc = seal.to_value().unwrap();
            doc["kind"] = kind;
            let back = Seal::from_value(doc).unwrap();
            assert_eq!(back.kind, None);
            assert_eq!(back.effective_kind(true), Kind::Known(KnownKind::Vector));
        }
    }

    #[test]
    fn test_unknown_algo_rejected_on_decode() {
        let doc = json!({
            "body": {},
            "seal": {"algo": "rsa", "keyId": "k", "signature": "AA==", "urn": "u"}
        });
        assert!(Seal::from_value(doc).is_err());
    }
}
