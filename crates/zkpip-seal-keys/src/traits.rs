//! Key resolution traits: the interface between sealing and key custody.
//!
//! Sealing and verification never touch a keystore directly. They ask one of
//! these traits, so the backing store (memory, files, HSM, remote service)
//! stays swappable.

use std::sync::Arc;

use async_trait::async_trait;
use zkpip_seal_core::{Ed25519PublicKey, Keypair};

use crate::error::Result;

/// Verification-side lookup of public keys.
///
/// # Design Notes
///
/// - `Ok(None)` means the key id is unknown. `Err` means the lookup itself
///   failed. Verifiers treat both as "no key".
/// - Implementations own any retry, caching or backoff. Callers call once.
#[async_trait]
pub trait KeyResolver: Send + Sync {
    /// Resolve the public key registered under `key_id`.
    async fn public_key(&self, key_id: &str) -> Result<Option<Ed25519PublicKey>>;
}

/// Signing-side access to private keys.
#[async_trait]
pub trait KeyProvider: Send + Sync {
    /// Fetch the keypair for `key_id`.
    ///
    /// Fails with `NotFound` for unknown ids and `Unavailable` when the key
    /// exists but may not be used.
    async fn private_key(&self, key_id: &str) -> Result<Keypair>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Blanket impls
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl<T: KeyResolver + ?Sized> KeyResolver for Arc<T> {
    async fn public_key(&self, key_id: &str) -> Result<Option<Ed25519PublicKey>> {
        (**self).public_key(key_id).await
    }
}

#[async_trait]
impl<T: KeyProvider + ?Sized> KeyProvider for Arc<T> {
    async fn private_key(&self, key_id: &str) -> Result<Keypair> {
        (**self).private_key(key_id).await
    }
}
