//! Cryptographic primitives for sealing.
//!
//! Wraps Ed25519 signing with strong types, plus the strict base64 codec used
//! for detached signatures.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::canonical::CanonicalBytes;
use crate::error::{CryptoError, SignatureDecodeError};

/// Length of an Ed25519 signature in bytes.
pub const SIGNATURE_LEN: usize = 64;

/// A 32-byte Ed25519 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ed25519PublicKey(pub [u8; 32]);

impl Ed25519PublicKey {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Parse from key text: 64 hex characters or base64 of 32 bytes.
    pub fn from_text(s: &str) -> Result<Self, CryptoError> {
        decode_key_text(s).map(Self)
    }

    /// Verify a signature over a message.
    pub fn verify(&self, message: &[u8], signature: &Ed25519Signature) -> Result<(), CryptoError> {
        let verifying_key =
            VerifyingKey::from_bytes(&self.0).map_err(|_| CryptoError::InvalidPublicKey)?;
        let sig = Signature::from_bytes(&signature.0);
        verifying_key
            .verify(message, &sig)
            .map_err(|_| CryptoError::InvalidSignature)
    }
}

impl fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Pub({})", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for Ed25519PublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Ed25519PublicKey {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// A 64-byte Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Ed25519Signature(pub [u8; 64]);

impl Ed25519Signature {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Create from a slice; `None` unless it is exactly 64 bytes.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let arr: [u8; 64] = bytes.try_into().ok()?;
        Some(Self(arr))
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Standard padded base64, the form stored in a seal.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }
}

impl fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Sig({}...)", &hex::encode(self.0)[..16])
    }
}

impl AsRef<[u8]> for Ed25519Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 64]> for Ed25519Signature {
    fn from(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }
}

/// A keypair for signing seals.
///
/// This wraps ed25519-dalek's SigningKey.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let signing_key = SigningKey::generate(&mut rng);
        Self { signing_key }
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Create from seed text: 64 hex characters or base64 of 32 bytes.
    pub fn from_text(s: &str) -> Result<Self, CryptoError> {
        decode_key_text(s).map(|seed| Self::from_seed(&seed))
    }

    /// Get the public key.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        let sig = self.signing_key.sign(message);
        Ed25519Signature(sig.to_bytes())
    }

    /// Get the raw seed bytes (secret key material).
    pub fn seed(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({:?})", self.public_key())
    }
}

/// Sign canonical bytes and return the signature as padded base64.
///
/// The message is the canonical bytes themselves; Ed25519 hashes internally.
/// Identical (bytes, key) pairs always give identical output.
pub fn sign_canonical(bytes: &CanonicalBytes, keypair: &Keypair) -> String {
    keypair.sign(bytes.as_bytes()).to_base64()
}

/// Decode a base64 signature, accepting only canonical padded encodings.
///
/// ASCII whitespace is ignored. The decoded bytes must re-encode to exactly
/// the input, so alternate encodings of the same bytes are refused.
pub fn decode_signature_strict(text: &str) -> Result<Vec<u8>, SignatureDecodeError> {
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if compact.is_empty() {
        return Err(SignatureDecodeError::Empty);
    }
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| SignatureDecodeError::InvalidBase64(e.to_string()))?;
    if STANDARD.encode(&bytes) != compact {
        return Err(SignatureDecodeError::NonCanonical);
    }
    Ok(bytes)
}

fn decode_key_text(s: &str) -> Result<[u8; 32], CryptoError> {
    let s = s.trim();
    let bytes = if s.len() == 64 && s.bytes().all(|b| b.is_ascii_hexdigit()) {
        hex::decode(s).map_err(|e| CryptoError::InvalidKeyEncoding(e.to_string()))?
    } else {
        STANDARD
            .decode(s)
            .map_err(|e| CryptoError::InvalidKeyEncoding(e.to_string()))?
    };
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| CryptoError::InvalidKeyEncoding(format!("expected 32 bytes, got {}", bytes.len())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::canonicalize;

    #[test]
    fn test_keypair_sign_verify() {
        let keypair = Keypair::generate();
        let message = b"hello world";
        let signature = keypair.sign(message);

        keypair
            .public_key()
            .verify(message, &signature)
            .expect("valid signature should verify");

        let tampered = b"hello worlD";
        assert!(keypair.public_key().verify(tampered, &signature).is_err());
    }

    #[test]
    fn test_keypair_deterministic_from_seed() {
        let seed = [0x42u8; 32];
        let kp1 = Keypair::from_seed(&seed);
        let kp2 = Keypair::from_seed(&seed);
        assert_eq!(kp1.public_key(), kp2.public_key());
    }

    #[test]
    fn test_signatures_are_deterministic() {
        let kp = Keypair::from_seed(&[0x07; 32]);
        let bytes = canonicalize(&serde_json::json!({"b": 1, "a": [1, 2]})).unwrap();
        let s1 = sign_canonical(&bytes, &kp);
        let s2 = sign_canonical(&bytes, &Keypair::from_seed(&[0x07; 32]));
        assert_eq!(s1, s2);
        assert_eq!(decode_signature_strict(&s1).unwrap().len(), SIGNATURE_LEN);
    }

    #[test]
    fn test_public_key_hex_roundtrip() {
        let keypair = Keypair::generate();
        let pk = keypair.public_key();
        let recovered = Ed25519PublicKey::from_hex(&pk.to_hex()).unwrap();
        assert_eq!(pk, recovered);
    }

    #[test]
    fn test_key_text_hex_or_base64() {
        let kp = Keypair::from_seed(&[0x11; 32]);
        let pk = kp.public_key();
        assert_eq!(Ed25519PublicKey::from_text(&pk.to_hex()).unwrap(), pk);
        assert_eq!(Ed25519PublicKey::from_text(&STANDARD.encode(pk.0)).unwrap(), pk);
        assert_eq!(Keypair::from_text(&hex::encode(kp.seed())).unwrap().public_key(), pk);
        assert!(Ed25519PublicKey::from_text("abcd").is_err());
    }

    #[test]
    fn test_strict_base64() {
        assert_eq!(decode_signature_strict("aGVsbG8=").unwrap(), b"hello");
        assert_eq!(decode_signature_strict(" aGVs\nbG8= ").unwrap(), b"hello");
        assert_eq!(decode_signature_strict(""), Err(SignatureDecodeError::Empty));
        assert!(matches!(
            decode_signature_strict("not base64!"),
            Err(SignatureDecodeError::InvalidBase64(_))
        ));
        // missing padding
        assert!(decode_signature_strict("aGVsbG8").is_err());
        // non-zero trailing bits
        assert!(decode_signature_strict("aGVsbG9=").is_err());
    }
}
