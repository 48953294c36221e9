//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;
use zkpip_seal::{SealSigner, SignerConfig, Verifier, VerifierConfig};
use zkpip_seal_core::{Ed25519PublicKey, Keypair, Kind, Seal, SealBuilder};
use zkpip_seal_keys::MemoryKeyStore;

/// A test fixture with a keypair registered in a shared keystore.
pub struct TestFixture {
    pub keypair: Keypair,
    pub key_id: String,
    pub keys: Arc<MemoryKeyStore>,
}

impl TestFixture {
    /// Create a new test fixture with a random keypair.
    pub fn new() -> Self {
        Self::from_keypair("fixture", Keypair::generate())
    }

    /// Create with a deterministic keypair from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self::from_keypair("fixture", Keypair::from_seed(&seed))
    }

    /// Register `keypair` under `key_id` in a fresh keystore.
    pub fn from_keypair(key_id: impl Into<String>, keypair: Keypair) -> Self {
        let key_id = key_id.into();
        let keys = Arc::new(MemoryKeyStore::new());
        keys.insert_keypair(key_id.clone(), keypair.clone());
        Self {
            keypair,
            key_id,
            keys,
        }
    }

    /// Get the keypair's public key.
    pub fn public_key(&self) -> Ed25519PublicKey {
        self.keypair.public_key()
    }

    /// Seal `body` as a `vector`.
    pub fn seal(&self, body: Value) -> Seal {
        self.seal_kind(body, Kind::default())
    }

    /// Seal `body` under `kind`, without signer or timestamp.
    pub fn seal_kind(&self, body: Value, kind: impl Into<Kind>) -> Seal {
        SealBuilder::new(body)
            .kind(kind)
            .key_id(self.key_id.clone())
            .sign(&self.keypair)
            .expect("fixture body should canonicalize")
    }

    /// Seal `body` and return the wire document.
    pub fn sealed_document(&self, body: Value) -> Value {
        self.seal(body)
            .to_value()
            .expect("seal should serialize")
    }

    /// A signer backed by this fixture's keystore.
    pub fn signer(&self) -> SealSigner<Arc<MemoryKeyStore>> {
        SealSigner::new(self.keys.clone(), SignerConfig::default())
    }

    /// A verifier backed by this fixture's keystore, using the bundled schema.
    pub fn verifier(&self) -> Verifier<Arc<MemoryKeyStore>> {
        self.verifier_with(VerifierConfig::default())
    }

    pub fn verifier_with(&self, config: VerifierConfig) -> Verifier<Arc<MemoryKeyStore>> {
        Verifier::with_seal_schema(self.keys.clone(), config)
            .expect("bundled seal schema should compile")
    }

    /// Make another party's public key resolvable from this fixture's keystore.
    pub fn trust(&self, other: &TestFixture) {
        self.keys
            .insert_public_key(other.key_id.clone(), other.public_key());
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple test fixtures for multi-party tests.
///
/// Party `i` uses key id `party-i` and a seed whose first byte is `i`.
pub fn multi_party_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            TestFixture::from_keypair(format!("party-{i}"), Keypair::from_seed(&seed))
        })
        .collect()
}

/// Flip the lowest bit of the first signature byte, keeping the encoding canonical.
pub fn flip_signature_bit(seal: &mut Seal) {
    if let Ok(mut bytes) = STANDARD.decode(seal.seal.signature.as_bytes()) {
        if let Some(first) = bytes.first_mut() {
            *first ^= 0x01;
        }
        seal.seal.signature = STANDARD.encode(bytes);
    }
}

/// Overwrite (or add) a top-level body field. Non-object bodies are replaced.
pub fn tamper_body(seal: &mut Seal, field: &str, value: Value) {
    match &mut seal.body {
        Value::Object(map) => {
            map.insert(field.to_string(), value);
        }
        other => *other = value,
    }
}
