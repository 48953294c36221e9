//! The signing operation: resolve a key, check the request, seal.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};
use zkpip_seal_core::{parse_kind, validate_key_id, Kind, Seal, SealBuilder};
use zkpip_seal_keys::KeyProvider;

use crate::config::SignerConfig;
use crate::error::{Result, SealError};

/// What to seal and with which key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealRequest {
    pub body: Value,
    /// Kind tag. `None` seals as `vector`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub key_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signer: Option<String>,
}

impl SealRequest {
    pub fn new(body: Value, key_id: impl Into<String>) -> Self {
        Self {
            body,
            kind: None,
            key_id: key_id.into(),
            signer: None,
        }
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn signer(mut self, signer: impl Into<String>) -> Self {
        self.signer = Some(signer.into());
        self
    }
}

/// Produces seals with keys fetched from a [`KeyProvider`].
pub struct SealSigner<P: KeyProvider> {
    provider: P,
    config: SignerConfig,
}

impl<P: KeyProvider> SealSigner<P> {
    pub fn new(provider: P, config: SignerConfig) -> Self {
        Self { provider, config }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn config(&self) -> &SignerConfig {
        &self.config
    }

    /// Seal a request.
    ///
    /// The request is checked before the key is fetched, so a bad kind or
    /// key id never costs a key lookup.
    #[instrument(level = "debug", skip_all, fields(key_id = %request.key_id))]
    pub async fn seal(&self, request: SealRequest) -> Result<Seal> {
        let kind = self.resolve_kind(request.kind.as_deref())?;
        validate_key_id(&request.key_id).map_err(|reason| SealError::InvalidKeyId {
            key_id: request.key_id.clone(),
            reason: reason.to_string(),
        })?;

        let keypair = self.provider.private_key(&request.key_id).await?;
        debug!(kind = %kind, "private key resolved");

        let mut builder = SealBuilder::new(request.body)
            .kind(kind)
            .key_id(request.key_id);
        if let Some(signer) = request.signer.or_else(|| self.config.default_signer.clone()) {
            builder = builder.signer(signer);
        }
        if self.config.stamp_created_at {
            builder = builder.created_at(Utc::now());
        }

        let seal = builder.sign(&keypair)?;
        debug!(urn = %seal.seal.urn, "sealed");
        Ok(seal)
    }

    fn resolve_kind(&self, kind: Option<&str>) -> Result<Kind> {
        match kind {
            None => Ok(Kind::default()),
            Some(k) => parse_kind(k, self.config.allow_kind_extensions)
                .ok_or_else(|| SealError::InvalidKind(k.to_string())),
        }
    }
}
