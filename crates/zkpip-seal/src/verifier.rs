//! The Verifier: staged checking of a candidate seal.
//!
//! Stages run in a fixed order and the first failure wins:
//!
//! 1. structure (schema collaborator, presence, decode, keyId/URN shape)
//! 2. digest (recompute the URN from the canonical body)
//! 3. key resolution (the only stage that may do I/O)
//! 4. signature decode
//! 5. signature check
//!
//! The digest stage runs before key resolution. A URN mismatch means the
//! body is not the document that was signed, and that must be reported as
//! such even when the key is also missing.

use serde_json::Value;
use tracing::{debug, instrument, warn};
use zkpip_seal_core::{
    decode_signature_strict, ensure_urn_matches_kind, validate_key_id, CanonicalBytes,
    Ed25519PublicKey, Ed25519Signature, ReasonCode, Seal, SealAlgo, Stage, Urn, UrnError,
    VerifyOutcome, SIGNATURE_LEN,
};
use zkpip_seal_keys::KeyResolver;
use zkpip_seal_schema::{classify, JsonSchemaValidator, SchemaError, SchemaValidator};

use crate::config::VerifierConfig;

/// Early exit from a stage.
type Staged<T> = std::result::Result<T, VerifyOutcome>;

fn reject<T>(stage: Stage, reason: ReasonCode, message: impl Into<String>) -> Staged<T> {
    Err(VerifyOutcome::rejected(stage, reason, message))
}

/// Verifies seals against keys from a [`KeyResolver`] and structure from a
/// [`SchemaValidator`].
///
/// Holds no per-call state; one verifier may serve concurrent calls.
pub struct Verifier<R: KeyResolver, V: SchemaValidator = JsonSchemaValidator> {
    resolver: R,
    validator: V,
    config: VerifierConfig,
}

impl<R: KeyResolver> Verifier<R, JsonSchemaValidator> {
    /// Create a verifier using the embedded seal document schema.
    pub fn with_seal_schema(resolver: R, config: VerifierConfig) -> Result<Self, SchemaError> {
        Ok(Self::new(resolver, JsonSchemaValidator::seal()?, config))
    }
}

impl<R: KeyResolver, V: SchemaValidator> Verifier<R, V> {
    pub fn new(resolver: R, validator: V, config: VerifierConfig) -> Self {
        Self {
            resolver,
            validator,
            config,
        }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Verify a candidate seal document.
    #[instrument(level = "debug", skip_all)]
    pub async fn verify(&self, candidate: &Value) -> VerifyOutcome {
        let outcome = match self.run(candidate).await {
            Ok(urn) => VerifyOutcome::Verified { urn },
            Err(rejected) => rejected,
        };
        debug!(ok = outcome.is_ok(), stage = %outcome.stage(), reason = ?outcome.reason(), "verification finished");
        outcome
    }

    /// Verify an already-decoded seal. Runs the full pipeline, schema included.
    pub async fn verify_seal(&self, seal: &Seal) -> VerifyOutcome {
        match seal.to_value() {
            Ok(value) => self.verify(&value).await,
            Err(e) => VerifyOutcome::rejected(Stage::Schema, ReasonCode::SchemaInvalid, e.to_string()),
        }
    }

    /// Verify a seal document given as JSON text.
    pub async fn verify_json_str(&self, text: &str) -> VerifyOutcome {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => self.verify(&value).await,
            Err(e) => VerifyOutcome::rejected(
                Stage::Schema,
                ReasonCode::SchemaInvalid,
                format!("not valid JSON: {e}"),
            ),
        }
    }

    async fn run(&self, candidate: &Value) -> Staged<String> {
        let seal = self.structural_check(candidate)?;
        debug!(key_id = %seal.seal.key_id, "structure ok");

        let (canonical, urn) = self.digest_check(&seal)?;
        debug!(%urn, "digest ok");

        let public_key = self.resolve_key(&seal.seal.key_id).await?;
        debug!(key = ?public_key, "key resolved");

        let signature = decode_signature(&seal.seal.signature)?;
        check_signature(&public_key, &canonical, &signature)?;
        debug!("signature ok");

        Ok(urn)
    }

    fn structural_check(&self, candidate: &Value) -> Staged<Seal> {
        let Some(document) = candidate.as_object() else {
            return reject(Stage::Schema, ReasonCode::SchemaInvalid, "seal document must be an object");
        };

        if let Err(violations) = self.validator.validate(candidate) {
            let fatal = self.config.tolerance.fatal(violations.issues());
            let tolerated = violations.len() - fatal.len();
            if tolerated > 0 {
                debug!(tolerated, "deferring schema issues to semantic checks");
            }
            if !fatal.is_empty() {
                let reason = classify(fatal.iter().copied());
                let message = fatal
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ");
                debug!(%reason, issues = fatal.len(), "schema check failed");
                return reject(Stage::Schema, reason, message);
            }
        }

        // The checks below hold even under a permissive validator.
        if !document.contains_key("body") {
            return reject(Stage::Schema, ReasonCode::BodyMissing, "body is missing");
        }
        let Some(block) = document.get("seal") else {
            return reject(Stage::Schema, ReasonCode::SealMissing, "seal is missing");
        };
        if let Some(algo) = block.get("algo") {
            if algo.as_str() != Some(SealAlgo::Ed25519.as_str()) {
                return reject(
                    Stage::Schema,
                    ReasonCode::AlgoUnsupported,
                    format!("unsupported algo {algo}"),
                );
            }
        }

        let seal = match Seal::from_value(candidate.clone()) {
            Ok(seal) => seal,
            Err(e) => return reject(Stage::Schema, ReasonCode::SchemaInvalid, e.to_string()),
        };

        if let Err(problem) = validate_key_id(&seal.seal.key_id) {
            return reject(Stage::Schema, ReasonCode::KeyidInvalid, problem);
        }
        if let Err(e) = Urn::parse(&seal.seal.urn) {
            return reject(Stage::Schema, ReasonCode::UrnInvalid, e.to_string());
        }

        Ok(seal)
    }

    fn digest_check(&self, seal: &Seal) -> Staged<(CanonicalBytes, String)> {
        let kind = seal.effective_kind(self.config.allow_kind_extensions);

        match ensure_urn_matches_kind(kind.as_str(), &seal.seal.urn) {
            Ok(()) => {}
            Err(e @ UrnError::KindMismatch { .. }) => {
                return reject(Stage::Verify, ReasonCode::UrnMismatch, e.to_string());
            }
            Err(e) => return reject(Stage::Schema, ReasonCode::UrnInvalid, e.to_string()),
        }

        let canonical = match seal.canonical_body() {
            Ok(bytes) => bytes,
            Err(e) => return reject(Stage::Schema, ReasonCode::SchemaInvalid, e.to_string()),
        };

        let expected = Urn::derive(&kind, &canonical).to_string();
        if expected != seal.seal.urn {
            return reject(
                Stage::Verify,
                ReasonCode::UrnMismatch,
                format!("body digests to {expected}, seal declares {}", seal.seal.urn),
            );
        }

        Ok((canonical, expected))
    }

    async fn resolve_key(&self, key_id: &str) -> Staged<Ed25519PublicKey> {
        let lookup = self.resolver.public_key(key_id);
        let result = match self.config.key_resolution_timeout {
            Some(limit) => match tokio::time::timeout(limit, lookup).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(key_id, ?limit, "key resolution timed out");
                    return reject(
                        Stage::Io,
                        ReasonCode::PublicKeyNotFound,
                        format!("key resolution for {key_id:?} timed out after {limit:?}"),
                    );
                }
            },
            None => lookup.await,
        };

        match result {
            Ok(Some(key)) => Ok(key),
            Ok(None) => reject(
                Stage::Io,
                ReasonCode::PublicKeyNotFound,
                format!("no public key for keyId {key_id:?}"),
            ),
            Err(e) => {
                warn!(key_id, error = %e, "key resolution failed");
                reject(
                    Stage::Io,
                    ReasonCode::PublicKeyNotFound,
                    format!("key resolution for {key_id:?} failed: {e}"),
                )
            }
        }
    }
}

fn decode_signature(text: &str) -> Staged<Vec<u8>> {
    decode_signature_strict(text).or_else(|e| {
        reject(
            Stage::Schema,
            ReasonCode::SignatureBase64Error,
            format!("signature: {e}"),
        )
    })
}

fn check_signature(
    public_key: &Ed25519PublicKey,
    canonical: &CanonicalBytes,
    signature: &[u8],
) -> Staged<()> {
    let Some(signature) = Ed25519Signature::from_slice(signature) else {
        return reject(
            Stage::Verify,
            ReasonCode::SignatureInvalid,
            format!("signature is {} bytes, expected {SIGNATURE_LEN}", signature.len()),
        );
    };
    public_key
        .verify(canonical.as_bytes(), &signature)
        .or_else(|e| reject(Stage::Verify, ReasonCode::SignatureInvalid, e.to_string()))
}
