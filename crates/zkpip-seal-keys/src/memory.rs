//! In-memory keystore.
//!
//! Implements both [`KeyResolver`] and [`KeyProvider`]. Useful for tests and
//! for callers that load keys once at startup.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use zkpip_seal_core::{Ed25519PublicKey, Keypair};

use crate::error::{KeyError, Result};
use crate::record::KeyRecord;
use crate::traits::{KeyProvider, KeyResolver};

/// In-memory keystore. Thread-safe via RwLock.
pub struct MemoryKeyStore {
    inner: RwLock<HashMap<String, StoredKey>>,
}

enum StoredKey {
    Pair(Keypair),
    Public(Ed25519PublicKey),
}

impl StoredKey {
    fn public_key(&self) -> Ed25519PublicKey {
        match self {
            StoredKey::Pair(kp) => kp.public_key(),
            StoredKey::Public(pk) => *pk,
        }
    }
}

impl MemoryKeyStore {
    /// Create a new empty keystore.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Load from a JSON array of key records. See [`KeyRecord::from_value`].
    pub fn from_records(value: &Value) -> Result<Self> {
        let store = Self::new();
        for record in KeyRecord::from_values(value)? {
            store.insert_record(record);
        }
        Ok(store)
    }

    /// Register a signing keypair. Replaces any key under the same id.
    pub fn insert_keypair(&self, key_id: impl Into<String>, keypair: Keypair) {
        self.write().insert(key_id.into(), StoredKey::Pair(keypair));
    }

    /// Register a verification-only key. Replaces any key under the same id.
    pub fn insert_public_key(&self, key_id: impl Into<String>, public_key: Ed25519PublicKey) {
        self.write()
            .insert(key_id.into(), StoredKey::Public(public_key));
    }

    pub fn insert_record(&self, record: KeyRecord) {
        match record.keypair {
            Some(kp) => self.insert_keypair(record.key_id, kp),
            None => self.insert_public_key(record.key_id, record.public_key),
        }
    }

    /// Remove a key. Returns whether it was present.
    pub fn remove(&self, key_id: &str) -> bool {
        self.write().remove(key_id).is_some()
    }

    pub fn contains(&self, key_id: &str) -> bool {
        self.read().contains_key(key_id)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Registered key ids, sorted.
    pub fn key_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    // A panic while holding the lock cannot leave the map half-written, so a
    // poisoned lock is still usable.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, StoredKey>> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, StoredKey>> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MemoryKeyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryKeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryKeyStore")
            .field("key_ids", &self.key_ids())
            .finish()
    }
}

#[async_trait]
impl KeyResolver for MemoryKeyStore {
    async fn public_key(&self, key_id: &str) -> Result<Option<Ed25519PublicKey>> {
        let found = self.read().get(key_id).map(StoredKey::public_key);
        debug!(key_id, found = found.is_some(), "public key lookup");
        Ok(found)
    }
}

#[async_trait]
impl KeyProvider for MemoryKeyStore {
    async fn private_key(&self, key_id: &str) -> Result<Keypair> {
        let inner = self.read();
        match inner.get(key_id) {
            Some(StoredKey::Pair(kp)) => {
                debug!(key_id, "private key lookup");
                Ok(kp.clone())
            }
            Some(StoredKey::Public(_)) => Err(KeyError::Unavailable {
                key_id: key_id.to_string(),
                reason: "only public key material is held".into(),
            }),
            None => Err(KeyError::NotFound(key_id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_keypair_resolves_both_ways() {
        let store = MemoryKeyStore::new();
        let kp = Keypair::from_seed(&[9; 32]);
        store.insert_keypair("k1", kp.clone());

        assert_eq!(store.public_key("k1").await.unwrap(), Some(kp.public_key()));
        assert_eq!(
            store.private_key("k1").await.unwrap().public_key(),
            kp.public_key()
        );
    }

    #[tokio::test]
    async fn test_unknown_key() {
        let store = MemoryKeyStore::new();
        assert_eq!(store.public_key("nope").await.unwrap(), None);
        assert_eq!(
            store.private_key("nope").await.unwrap_err(),
            KeyError::NotFound("nope".into())
        );
    }

    #[tokio::test]
    async fn test_public_only_cannot_sign() {
        let store = MemoryKeyStore::new();
        let kp = Keypair::generate();
        store.insert_public_key("verify-only", kp.public_key());

        assert!(store.public_key("verify-only").await.unwrap().is_some());
        assert!(matches!(
            store.private_key("verify-only").await,
            Err(KeyError::Unavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_bookkeeping() {
        let store = MemoryKeyStore::default();
        assert!(store.is_empty());
        store.insert_keypair("b", Keypair::generate());
        store.insert_keypair("a", Keypair::generate());
        assert_eq!(store.len(), 2);
        assert_eq!(store.key_ids(), vec!["a".to_string(), "b".to_string()]);
        assert!(store.remove("a"));
        assert!(!store.remove("a"));
        assert!(!store.contains("a"));
        assert!(store.contains("b"));
    }

    #[tokio::test]
    async fn test_from_records() {
        let signer = Keypair::from_seed(&[7; 32]);
        let other = Keypair::from_seed(&[8; 32]);
        let seed_hex: String = signer.seed().iter().map(|b| format!("{b:02x}")).collect();
        let store = MemoryKeyStore::from_records(&json!([
            {"kid": "signer", "seed": seed_hex},
            {"id": "other", "publicKeyHex": other.public_key().to_hex()},
        ]))
        .unwrap();

        assert_eq!(store.key_ids(), vec!["other".to_string(), "signer".to_string()]);
        assert!(store.private_key("signer").await.is_ok());
        assert!(store.private_key("other").await.is_err());
        assert_eq!(
            store.public_key("other").await.unwrap(),
            Some(other.public_key())
        );
    }

    #[tokio::test]
    async fn test_shared_through_arc() {
        let store = Arc::new(MemoryKeyStore::new());
        let kp = Keypair::generate();
        store.insert_keypair("k", kp.clone());

        let resolver: Arc<dyn KeyResolver> = store.clone();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let r = resolver.clone();
                tokio::spawn(async move { r.public_key("k").await })
            })
            .collect();
        for h in handles {
            assert_eq!(h.await.unwrap().unwrap(), Some(kp.public_key()));
        }
    }
}
