//! End-to-end tests of the signing operation and the verification pipeline.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};
use zkpip_seal::keys::Result as KeyResult;
use zkpip_seal::{
    ensure_urn_matches_kind, Ed25519PublicKey, KeyError, KeyResolver, Keypair, MemoryKeyStore,
    ReasonCode, SealRequest, SealSigner, SignerConfig, Stage, TolerancePolicy, Verifier,
    VerifierConfig, VerifyOutcome,
};

const HEX: &str = "d3626ac30a87e6f7a6428233b3c68299976865fa5508e4267c5415c76af7a772";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

struct Fixture {
    keys: Arc<MemoryKeyStore>,
    signer: SealSigner<Arc<MemoryKeyStore>>,
    verifier: Verifier<Arc<MemoryKeyStore>>,
}

impl Fixture {
    fn new() -> Self {
        Self::with_config(VerifierConfig::default())
    }

    fn with_config(config: VerifierConfig) -> Self {
        init_tracing();
        let keys = Arc::new(MemoryKeyStore::new());
        keys.insert_keypair("k1", Keypair::from_seed(&[0x42; 32]));
        Self {
            signer: SealSigner::new(keys.clone(), SignerConfig::default()),
            verifier: Verifier::with_seal_schema(keys.clone(), config).unwrap(),
            keys,
        }
    }

    async fn sealed(&self, body: Value) -> Value {
        self.signer
            .seal(SealRequest::new(body, "k1"))
            .await
            .unwrap()
            .to_value()
            .unwrap()
    }
}

fn body() -> Value {
    json!({
        "zeta": 3,
        "alpha": "x",
        "nested": {"b": [3, 2, 1], "a": {"y": null, "x": true}},
        "list": [{"k": "v"}, {"k": "w"}]
    })
}

fn assert_rejected(outcome: &VerifyOutcome, stage: Stage, reason: ReasonCode) {
    assert_eq!(
        (outcome.stage(), outcome.reason()),
        (stage, Some(reason)),
        "unexpected outcome: {outcome}"
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Round trip
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_sign_verify_round_trip() {
    let fx = Fixture::new();
    let doc = fx.sealed(body()).await;

    let outcome = fx.verifier.verify(&doc).await;
    assert!(outcome.is_ok(), "{outcome}");
    assert_eq!(outcome.stage(), Stage::Verify);
    assert_eq!(outcome.urn(), doc["seal"]["urn"].as_str());
}

#[tokio::test]
async fn test_outcome_wire_form() {
    let fx = Fixture::new();
    let doc = fx.sealed(body()).await;
    let outcome = fx.verifier.verify(&doc).await;
    assert_eq!(
        serde_json::to_value(&outcome).unwrap(),
        json!({"ok": true, "stage": "verify", "urn": doc["seal"]["urn"]})
    );
}

#[tokio::test]
async fn test_verify_typed_and_text() {
    let fx = Fixture::new();
    let seal = fx
        .signer
        .seal(SealRequest::new(body(), "k1").kind("proof"))
        .await
        .unwrap();

    assert!(fx.verifier.verify_seal(&seal).await.is_ok());
    assert!(fx
        .verifier
        .verify_json_str(&seal.to_json_pretty().unwrap())
        .await
        .is_ok());
    assert_rejected(
        &fx.verifier.verify_json_str("{not json").await,
        Stage::Schema,
        ReasonCode::SchemaInvalid,
    );
}

#[tokio::test]
async fn test_float_body_survives_text_round_trip() {
    let fx = Fixture::new();
    for f in [1.0715660391465826e-75, -1.81996730402717e-179, -1.603964615428183e+143, 0.1] {
        let seal = fx
            .signer
            .seal(SealRequest::new(json!({"f": f, "nested": [f, {"g": -f}]}), "k1"))
            .await
            .unwrap();

        let text = seal.to_json_pretty().unwrap();
        let outcome = fx.verifier.verify_json_str(&text).await;
        assert!(outcome.is_ok(), "{f}: {outcome}");
        assert_eq!(outcome.urn(), Some(seal.seal.urn.as_str()));

        let compact = serde_json::to_string(&seal).unwrap();
        assert!(fx.verifier.verify_json_str(&compact).await.is_ok());
    }
}

#[tokio::test]
async fn test_body_key_order_does_not_matter() {
    let fx = Fixture::new();
    let mut doc = fx.sealed(json!({"a": 1, "b": {"c": 2, "d": 3}})).await;
    doc["body"] = serde_json::from_str(r#"{"b":{"d":3,"c":2},"a":1}"#).unwrap();
    assert!(fx.verifier.verify(&doc).await.is_ok());
}

// ─────────────────────────────────────────────────────────────────────────────
// Tampering
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_body_tamper_is_urn_mismatch() {
    let fx = Fixture::new();
    let doc = fx.sealed(body()).await;

    let edits: Vec<(&str, Value)> = vec![
        ("/zeta", json!(4)),
        ("/alpha", json!("y")),
        ("/nested/b/0", json!(0)),
        ("/nested/a/y", json!(false)),
        ("/list/1/k", json!("v")),
    ];
    for (pointer, value) in edits {
        let mut tampered = doc.clone();
        *tampered["body"].pointer_mut(pointer).unwrap() = value;
        let outcome = fx.verifier.verify(&tampered).await;
        assert_rejected(&outcome, Stage::Verify, ReasonCode::UrnMismatch);
    }
}

#[tokio::test]
async fn test_signature_bit_flip_is_signature_invalid() {
    let fx = Fixture::new();
    let doc = fx.sealed(body()).await;

    let mut raw = STANDARD
        .decode(doc["seal"]["signature"].as_str().unwrap())
        .unwrap();
    raw[10] ^= 0x01;
    let mut tampered = doc.clone();
    tampered["seal"]["signature"] = json!(STANDARD.encode(&raw));

    assert_rejected(
        &fx.verifier.verify(&tampered).await,
        Stage::Verify,
        ReasonCode::SignatureInvalid,
    );
}

#[tokio::test]
async fn test_short_signature_is_signature_invalid() {
    let fx = Fixture::new();
    let mut doc = fx.sealed(body()).await;
    doc["seal"]["signature"] = json!(STANDARD.encode([7u8; 32]));
    assert_rejected(
        &fx.verifier.verify(&doc).await,
        Stage::Verify,
        ReasonCode::SignatureInvalid,
    );
}

#[tokio::test]
async fn test_non_base64_signature() {
    let fx = Fixture::new();
    let doc = fx.sealed(body()).await;

    let mut bad = doc.clone();
    bad["seal"]["signature"] = json!("not base64!");
    assert_rejected(
        &fx.verifier.verify(&bad).await,
        Stage::Schema,
        ReasonCode::SignatureBase64Error,
    );

    // Reported even when the body no longer matches the URN.
    bad["body"]["zeta"] = json!(99);
    assert_rejected(
        &fx.verifier.verify(&bad).await,
        Stage::Schema,
        ReasonCode::SignatureBase64Error,
    );
}

#[tokio::test]
async fn test_unpadded_signature_fails_strict_decode() {
    let fx = Fixture::new();
    let mut doc = fx.sealed(body()).await;
    let sig = doc["seal"]["signature"].as_str().unwrap().trim_end_matches('=').to_string();
    doc["seal"]["signature"] = json!(sig);
    assert_rejected(
        &fx.verifier.verify(&doc).await,
        Stage::Schema,
        ReasonCode::SignatureBase64Error,
    );
}

#[tokio::test]
async fn test_signature_whitespace_is_ignored() {
    let fx = Fixture::new();
    let mut doc = fx.sealed(body()).await;
    let sig = doc["seal"]["signature"].as_str().unwrap().to_string();
    doc["seal"]["signature"] = json!(format!("{}\n{}", &sig[..40], &sig[40..]));
    assert!(fx.verifier.verify(&doc).await.is_ok());
}

// ─────────────────────────────────────────────────────────────────────────────
// Keys
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_unknown_key_id() {
    let fx = Fixture::new();
    let other = Keypair::from_seed(&[0x43; 32]);
    fx.keys.insert_keypair("other", other);

    // Signature is valid for "k1" but the document names a key nobody has.
    let mut doc = fx.sealed(body()).await;
    doc["seal"]["keyId"] = json!("ghost");
    assert_rejected(
        &fx.verifier.verify(&doc).await,
        Stage::Io,
        ReasonCode::PublicKeyNotFound,
    );
}

#[tokio::test]
async fn test_wrong_key_is_signature_invalid() {
    let fx = Fixture::new();
    fx.keys.insert_keypair("other", Keypair::from_seed(&[0x43; 32]));
    let mut doc = fx.sealed(body()).await;
    doc["seal"]["keyId"] = json!("other");
    assert_rejected(
        &fx.verifier.verify(&doc).await,
        Stage::Verify,
        ReasonCode::SignatureInvalid,
    );
}

#[tokio::test]
async fn test_digest_checked_before_key_resolution() {
    let fx = Fixture::new();
    let mut doc = fx.sealed(body()).await;
    doc["seal"]["keyId"] = json!("ghost");
    doc["body"]["alpha"] = json!("changed");
    assert_rejected(
        &fx.verifier.verify(&doc).await,
        Stage::Verify,
        ReasonCode::UrnMismatch,
    );
}

struct FailingResolver;

#[async_trait]
impl KeyResolver for FailingResolver {
    async fn public_key(&self, key_id: &str) -> KeyResult<Option<Ed25519PublicKey>> {
        Err(KeyError::Unavailable {
            key_id: key_id.to_string(),
            reason: "backend offline".into(),
        })
    }
}

struct SlowResolver(Ed25519PublicKey);

#[async_trait]
impl KeyResolver for SlowResolver {
    async fn public_key(&self, _key_id: &str) -> KeyResult<Option<Ed25519PublicKey>> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(Some(self.0))
    }
}

#[tokio::test]
async fn test_resolver_error_is_io_failure() {
    let fx = Fixture::new();
    let doc = fx.sealed(body()).await;
    let verifier = Verifier::with_seal_schema(FailingResolver, VerifierConfig::default()).unwrap();
    let outcome = verifier.verify(&doc).await;
    assert_rejected(&outcome, Stage::Io, ReasonCode::PublicKeyNotFound);
    assert!(outcome.message().unwrap().contains("backend offline"));
}

#[tokio::test]
async fn test_resolver_timeout_is_io_failure() {
    let fx = Fixture::new();
    let doc = fx.sealed(body()).await;
    let config = VerifierConfig {
        key_resolution_timeout: Some(Duration::from_millis(20)),
        ..Default::default()
    };
    let pk = Keypair::from_seed(&[0x42; 32]).public_key();
    let verifier = Verifier::with_seal_schema(SlowResolver(pk), config).unwrap();
    assert_rejected(
        &verifier.verify(&doc).await,
        Stage::Io,
        ReasonCode::PublicKeyNotFound,
    );
}

#[tokio::test]
async fn test_timeout_does_not_reorder_stages() {
    let fx = Fixture::new();
    let mut doc = fx.sealed(body()).await;
    doc["body"]["zeta"] = json!(0);
    let config = VerifierConfig {
        key_resolution_timeout: Some(Duration::from_millis(20)),
        ..Default::default()
    };
    let pk = Keypair::from_seed(&[0x42; 32]).public_key();
    let verifier = Verifier::with_seal_schema(SlowResolver(pk), config).unwrap();
    assert_rejected(
        &verifier.verify(&doc).await,
        Stage::Verify,
        ReasonCode::UrnMismatch,
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Structure
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_missing_parts() {
    let fx = Fixture::new();
    let doc = fx.sealed(body()).await;

    let mut no_body = doc.clone();
    no_body.as_object_mut().unwrap().remove("body");
    assert_rejected(&fx.verifier.verify(&no_body).await, Stage::Schema, ReasonCode::BodyMissing);

    let mut no_seal = doc.clone();
    no_seal.as_object_mut().unwrap().remove("seal");
    assert_rejected(&fx.verifier.verify(&no_seal).await, Stage::Schema, ReasonCode::SealMissing);

    let mut no_sig = doc.clone();
    no_sig["seal"].as_object_mut().unwrap().remove("signature");
    assert_rejected(
        &fx.verifier.verify(&no_sig).await,
        Stage::Schema,
        ReasonCode::SignatureBase64Error,
    );

    assert_rejected(&fx.verifier.verify(&json!("seal")).await, Stage::Schema, ReasonCode::SchemaInvalid);
}

#[tokio::test]
async fn test_unsupported_algo() {
    let fx = Fixture::new();
    let mut doc = fx.sealed(body()).await;
    doc["seal"]["algo"] = json!("secp256k1");
    assert_rejected(&fx.verifier.verify(&doc).await, Stage::Schema, ReasonCode::AlgoUnsupported);
}

#[tokio::test]
async fn test_generic_schema_failure() {
    let fx = Fixture::new();
    let mut doc = fx.sealed(body()).await;
    doc["version"] = json!("2");
    assert_rejected(&fx.verifier.verify(&doc).await, Stage::Schema, ReasonCode::SchemaInvalid);

    let mut doc = fx.sealed(body()).await;
    doc["seal"]["keyId"] = json!(17);
    assert_rejected(&fx.verifier.verify(&doc).await, Stage::Schema, ReasonCode::SchemaInvalid);
}

#[tokio::test]
async fn test_key_id_checked_precisely() {
    let fx = Fixture::new();
    for key_id in ["", "has space", "line\nbreak"] {
        let mut doc = fx.sealed(body()).await;
        doc["seal"]["keyId"] = json!(key_id);
        assert_rejected(&fx.verifier.verify(&doc).await, Stage::Schema, ReasonCode::KeyidInvalid);
    }
}

#[tokio::test]
async fn test_malformed_urn_checked_precisely() {
    let fx = Fixture::new();
    for urn in [
        "urn:zkpip:vector:sha256:".to_string(),
        format!("urn:zkpip:vector:sha256:{}", HEX.to_uppercase()),
        format!("urn:zkpip:vector:md5:{HEX}"),
        "not a urn".to_string(),
    ] {
        let mut doc = fx.sealed(body()).await;
        doc["seal"]["urn"] = json!(urn);
        assert_rejected(&fx.verifier.verify(&doc).await, Stage::Schema, ReasonCode::UrnInvalid);
    }
}

#[tokio::test]
async fn test_strict_policy_reports_schema_invalid() {
    let fx = Fixture::with_config(VerifierConfig {
        tolerance: TolerancePolicy::Strict,
        ..Default::default()
    });
    let mut doc = fx.sealed(body()).await;
    doc["seal"]["urn"] = json!("not a urn");
    assert_rejected(&fx.verifier.verify(&doc).await, Stage::Schema, ReasonCode::SchemaInvalid);

    let mut doc = fx.sealed(body()).await;
    doc["seal"]["keyId"] = json!("");
    assert_rejected(&fx.verifier.verify(&doc).await, Stage::Schema, ReasonCode::SchemaInvalid);
}

// ─────────────────────────────────────────────────────────────────────────────
// Kinds
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_kind_urn_consistency() {
    assert!(ensure_urn_matches_kind("vector", &format!("urn:zkpip:circuit:sha256:{HEX}")).is_err());
    assert!(ensure_urn_matches_kind("circuit", &format!("urn:zkpip:circuit:sha256:{HEX}")).is_ok());
}

#[tokio::test]
async fn test_relabelled_kind_is_urn_mismatch() {
    let fx = Fixture::new();
    let mut doc = fx.sealed(body()).await;
    doc["kind"] = json!("circuit");
    assert_rejected(&fx.verifier.verify(&doc).await, Stage::Verify, ReasonCode::UrnMismatch);
}

#[tokio::test]
async fn test_missing_or_unknown_kind_means_vector() {
    let fx = Fixture::new();
    let doc = fx.sealed(body()).await;

    let mut no_kind = doc.clone();
    no_kind.as_object_mut().unwrap().remove("kind");
    assert!(fx.verifier.verify(&no_kind).await.is_ok());

    let mut odd_kind = doc.clone();
    odd_kind["kind"] = json!("Not-A-Kind");
    assert!(fx.verifier.verify(&odd_kind).await.is_ok());

    for kind in [json!(5), json!(null), json!(true), json!({"tag": "proof"})] {
        let mut doc = doc.clone();
        doc["kind"] = kind;
        let outcome = fx.verifier.verify(&doc).await;
        assert!(outcome.is_ok(), "{outcome}");
    }
}

#[tokio::test]
async fn test_extension_kind() {
    let fx = Fixture::new();
    let seal = fx
        .signer
        .seal(SealRequest::new(body(), "k1").kind("x-acme-trace"))
        .await
        .unwrap();
    assert!(seal.seal.urn.starts_with("urn:zkpip:x-acme-trace:sha256:"));
    assert!(fx.verifier.verify_seal(&seal).await.is_ok());

    // Without extensions the kind reads as `vector`, which the URN contradicts.
    let closed = Fixture::with_config(VerifierConfig {
        allow_kind_extensions: false,
        ..Default::default()
    });
    assert_rejected(
        &closed.verifier.verify_seal(&seal).await,
        Stage::Verify,
        ReasonCode::UrnMismatch,
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Concurrency
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_verification() {
    let fx = Fixture::new();
    let verifier = Arc::new(fx.verifier);
    let mut handles = Vec::new();
    for i in 0..16 {
        let doc = fx
            .signer
            .seal(SealRequest::new(json!({"i": i}), "k1"))
            .await
            .unwrap()
            .to_value()
            .unwrap();
        let v = verifier.clone();
        handles.push(tokio::spawn(async move { v.verify(&doc).await }));
    }
    for h in handles {
        assert!(h.await.unwrap().is_ok());
    }
}
