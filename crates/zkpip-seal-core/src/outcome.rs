//! Verification outcomes.
//!
//! Failures are values: a stage plus a reason code plus a human message.
//! Callers branch on the stage (retry only on `io`) and the reason code.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Phase of the verification pipeline at which an outcome was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Malformed input.
    Schema,
    /// Key material could not be obtained.
    Io,
    /// Content or signature did not check out.
    Verify,
}

impl Stage {
    pub const fn as_str(self) -> &'static str {
        match self {
            Stage::Schema => "schema",
            Stage::Io => "io",
            Stage::Verify => "verify",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Machine-checkable failure reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    AlgoUnsupported,
    KeyidInvalid,
    SignatureBase64Error,
    UrnInvalid,
    UrnMismatch,
    PublicKeyNotFound,
    SignatureInvalid,
    SchemaInvalid,
    BodyMissing,
    SealMissing,
}

impl ReasonCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            ReasonCode::AlgoUnsupported => "ALGO_UNSUPPORTED",
            ReasonCode::KeyidInvalid => "KEYID_INVALID",
            ReasonCode::SignatureBase64Error => "SIGNATURE_BASE64_ERROR",
            ReasonCode::UrnInvalid => "URN_INVALID",
            ReasonCode::UrnMismatch => "URN_MISMATCH",
            ReasonCode::PublicKeyNotFound => "PUBLIC_KEY_NOT_FOUND",
            ReasonCode::SignatureInvalid => "SIGNATURE_INVALID",
            ReasonCode::SchemaInvalid => "SCHEMA_INVALID",
            ReasonCode::BodyMissing => "BODY_MISSING",
            ReasonCode::SealMissing => "SEAL_MISSING",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal result of one verification call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    Verified {
        urn: String,
    },
    Rejected {
        stage: Stage,
        reason: ReasonCode,
        message: String,
    },
}

impl VerifyOutcome {
    pub fn rejected(stage: Stage, reason: ReasonCode, message: impl Into<String>) -> Self {
        VerifyOutcome::Rejected {
            stage,
            reason,
            message: message.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, VerifyOutcome::Verified { .. })
    }

    /// Stage reached. Success always ends at `verify`.
    pub fn stage(&self) -> Stage {
        match self {
            VerifyOutcome::Verified { .. } => Stage::Verify,
            VerifyOutcome::Rejected { stage, .. } => *stage,
        }
    }

    pub fn reason(&self) -> Option<ReasonCode> {
        match self {
            VerifyOutcome::Verified { .. } => None,
            VerifyOutcome::Rejected { reason, .. } => Some(*reason),
        }
    }

    pub fn urn(&self) -> Option<&str> {
        match self {
            VerifyOutcome::Verified { urn } => Some(urn),
            VerifyOutcome::Rejected { .. } => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            VerifyOutcome::Verified { .. } => None,
            VerifyOutcome::Rejected { message, .. } => Some(message),
        }
    }
}

impl fmt::Display for VerifyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyOutcome::Verified { urn } => write!(f, "verified {urn}"),
            VerifyOutcome::Rejected {
                stage,
                reason,
                message,
            } => write!(f, "{stage}: {reason}: {message}"),
        }
    }
}

// Wire form: {"ok":true,"stage":"verify","urn":..} | {"ok":false,"stage":..,"error":..,"message":..}
impl Serialize for VerifyOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            VerifyOutcome::Verified { urn } => {
                let mut s = serializer.serialize_struct("VerifyOutcome", 3)?;
                s.serialize_field("ok", &true)?;
                s.serialize_field("stage", &Stage::Verify)?;
                s.serialize_field("urn", urn)?;
                s.end()
            }
            VerifyOutcome::Rejected {
                stage,
                reason,
                message,
            } => {
                let mut s = serializer.serialize_struct("VerifyOutcome", 4)?;
                s.serialize_field("ok", &false)?;
                s.serialize_field("stage", stage)?;
                s.serialize_field("error", reason)?;
                s.serialize_field("message", message)?;
                s.end()
            }
        }
    }
}
