//! # ZKPIP Seal Testkit
//!
//! Testing utilities for ZKPIP seals.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Fixed bodies with expected canonical bytes, digests and signatures
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: A keypair wired into a keystore, with signer and verifier helpers
//!
//! ## Golden Vectors
//!
//! Golden vectors pin canonicalization and signing across implementations:
//!
//! ```rust
//! use zkpip_seal_testkit::vectors::all_vectors;
//!
//! for vector in all_vectors() {
//!     let seal = vector.sealed();
//!     assert_eq!(seal.seal.signature, vector.signature);
//!     println!("{}: {}", vector.name, seal.seal.urn);
//! }
//! ```
//!
//! ## Property Testing
//!
//! Use the generators with proptest:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use zkpip_seal_testkit::generators::{SealParams, seal_from_params};
//!
//! proptest! {
//!     #[test]
//!     fn urn_is_deterministic(params: SealParams) {
//!         let s1 = seal_from_params(&params);
//!         let s2 = seal_from_params(&params);
//!         prop_assert_eq!(s1.seal.urn, s2.seal.urn);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! Quickly set up test scenarios:
//!
//! ```rust
//! use zkpip_seal_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::with_seed([1u8; 32]);
//! let seal = fixture.seal(serde_json::json!({"hello": "world"}));
//! assert!(seal.seal.urn.starts_with("urn:zkpip:vector:sha256:"));
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{flip_signature_bit, multi_party_fixtures, tamper_body, TestFixture};
pub use generators::{seal_from_params, SealParams};
pub use vectors::{all_vectors, verify_all_vectors, GoldenVector, GOLDEN_KEY_ID};
