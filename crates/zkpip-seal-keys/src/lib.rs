//! # ZKPIP Seal Keys
//!
//! Key resolution for sealing and verification. Defines the collaborator
//! traits the signer and verifier call, plus an in-memory keystore.
//!
//! ## Key Types
//!
//! - [`KeyResolver`] - Public key lookup for verification
//! - [`KeyProvider`] - Keypair access for signing
//! - [`MemoryKeyStore`] - In-memory implementation of both
//! - [`KeyRecord`] - Normalized JSON key record
//!
//! ## Usage
//!
//! ```rust
//! use zkpip_seal_keys::{KeyResolver, MemoryKeyStore};
//! use zkpip_seal_core::Keypair;
//!
//! # async fn example() {
//! let store = MemoryKeyStore::new();
//! store.insert_keypair("team-key", Keypair::generate());
//! assert!(store.public_key("team-key").await.unwrap().is_some());
//! # }
//! ```
//!
//! ## Design Notes
//!
//! - **No retries here**: resolvers own their retry and caching policy
//! - **Unknown vs failed**: `Ok(None)` is an unknown id, `Err` a failed lookup

pub mod error;
pub mod memory;
pub mod record;
pub mod traits;

pub use error::{KeyError, Result};
pub use memory::MemoryKeyStore;
pub use record::{KeyRecord, KEY_RECORD_ALIASES};
pub use traits::{KeyProvider, KeyResolver};
