//! Configuration for signing and verification.

use std::time::Duration;

use zkpip_seal_schema::TolerancePolicy;

/// Configuration for the [`Verifier`](crate::Verifier).
#[derive(Debug, Clone)]
pub struct VerifierConfig {
    /// Which schema issues are fatal at the structural stage.
    pub tolerance: TolerancePolicy,
    /// Whether `x-` vendor kinds are honoured when deriving the expected URN.
    /// When off, such kinds fall back to `vector`.
    pub allow_kind_extensions: bool,
    /// Upper bound on one key lookup. `None` leaves timing to the resolver.
    pub key_resolution_timeout: Option<Duration>,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            tolerance: TolerancePolicy::default(),
            allow_kind_extensions: true,
            key_resolution_timeout: None,
        }
    }
}

/// Configuration for the [`SealSigner`](crate::SealSigner).
#[derive(Debug, Clone)]
pub struct SignerConfig {
    /// Stamp `createdAt` with the current time.
    pub stamp_created_at: bool,
    /// Whether `x-` vendor kinds may be sealed.
    pub allow_kind_extensions: bool,
    /// `signer` recorded when a request does not name one.
    pub default_signer: Option<String>,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            stamp_created_at: true,
            allow_kind_extensions: true,
            default_signer: None,
        }
    }
}
