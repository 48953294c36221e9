//! # ZKPIP Seal Core
//!
//! Pure primitives for content-addressed sealing: canonical JSON, SHA-256
//! URNs, the kind registry, and Ed25519 seals.
//!
//! This crate contains no I/O, no async, no key storage. It is pure
//! computation over JSON values and key material handed to it.
//!
//! ## Key Types
//!
//! - [`CanonicalBytes`] - The unique deterministic encoding of a JSON value
//! - [`Urn`] - `urn:zkpip:<kind>:sha256:<hex>` content identifier
//! - [`Kind`] - Artifact kind, known or `x-` extension
//! - [`Seal`] - A body bound to its URN and a detached signature
//! - [`VerifyOutcome`] - Staged ok/fail result of verification
//!
//! ## Canonicalization
//!
//! Bodies are encoded as sorted-key, whitespace-free JSON with
//! `JSON.stringify`-compatible numbers and strings. See [`canonical`].

pub mod alias;
pub mod canonical;
mod capture;
pub mod crypto;
pub mod digest;
pub mod error;
pub mod kind;
pub mod outcome;
pub mod seal;

pub use alias::{first_defined_of, AliasTable, FieldAliases};
pub use canonical::{canonicalize, canonicalize_serializable, CanonicalBytes, MAX_DEPTH};
pub use crypto::{
    decode_signature_strict, sign_canonical, Ed25519PublicKey, Ed25519Signature, Keypair,
    SIGNATURE_LEN,
};
pub use digest::{digest_hex, to_urn, Sha256Digest, Urn, URN_DIGEST_ALGO, URN_NAMESPACE};
pub use error::{CanonicalError, CryptoError, SignatureDecodeError, UrnError};
pub use kind::{ensure_urn_matches_kind, is_extension_kind, parse_kind, Kind, KnownKind, KNOWN_KINDS};
pub use outcome::{ReasonCode, Stage, VerifyOutcome};
pub use seal::{
    format_created_at, validate_key_id, Seal, SealAlgo, SealBlock, SealBuilder, MAX_KEY_ID_LEN,
    SEAL_VERSION,
};
