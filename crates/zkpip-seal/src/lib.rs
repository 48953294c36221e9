//! # ZKPIP Seal
//!
//! Sign and verify seals: JSON bodies addressed by the SHA-256 of their
//! canonical form and bound to a detached Ed25519 signature.
//!
//! ## Overview
//!
//! - **Sealing**: canonicalize the body, derive its URN, sign the canonical bytes
//! - **Verification**: a staged pipeline whose first failure is reported with
//!   a stage (`schema`, `io`, `verify`) and a reason code
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use zkpip_seal::{SealRequest, SealSigner, SignerConfig, Verifier, VerifierConfig};
//! use zkpip_seal::keys::MemoryKeyStore;
//! use zkpip_seal::core::Keypair;
//!
//! # async fn example() {
//! let keys = Arc::new(MemoryKeyStore::new());
//! keys.insert_keypair("team-key", Keypair::generate());
//!
//! let signer = SealSigner::new(keys.clone(), SignerConfig::default());
//! let seal = signer
//!     .seal(SealRequest::new(serde_json::json!({"answer": 42}), "team-key"))
//!     .await
//!     .unwrap();
//!
//! let verifier = Verifier::with_seal_schema(keys, VerifierConfig::default()).unwrap();
//! let outcome = verifier.verify_seal(&seal).await;
//! assert!(outcome.is_ok());
//! # }
//! ```
//!
//! ## Re-exports
//!
//! - `zkpip_seal::core` - Canonicalization, URNs, kinds, seal structure
//! - `zkpip_seal::keys` - Key resolution traits and the in-memory keystore
//! - `zkpip_seal::schema` - Structural validation and the tolerance policy

pub mod config;
pub mod error;
pub mod signer;
pub mod verifier;

// Re-export component crates
pub use zkpip_seal_core as core;
pub use zkpip_seal_keys as keys;
pub use zkpip_seal_schema as schema;

// Re-export main types for convenience
pub use config::{SignerConfig, VerifierConfig};
pub use error::{Result, SealError};
pub use signer::{SealRequest, SealSigner};
pub use verifier::Verifier;

// Re-export commonly used core types
pub use zkpip_seal_core::{
    canonicalize, digest_hex, ensure_urn_matches_kind, to_urn, CanonicalBytes, Ed25519PublicKey,
    Keypair, Kind, KnownKind, ReasonCode, Seal, SealBlock, SealBuilder, Stage, Urn, VerifyOutcome,
};
pub use zkpip_seal_keys::{KeyError, KeyProvider, KeyResolver, MemoryKeyStore};
pub use zkpip_seal_schema::{JsonSchemaValidator, SchemaValidator, TolerancePolicy};
