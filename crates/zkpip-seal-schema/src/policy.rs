//! Which schema issues stop verification, and what they are reported as.
//!
//! The schema checks `seal.urn` and `seal.keyId` only loosely (a regex). The
//! verifier re-checks both fields precisely and reports `URN_INVALID`,
//! `KEYID_INVALID` or `URN_MISMATCH`. Under the default policy the loose
//! schema findings on those two fields are dropped so the precise reason
//! code is what the caller sees, not a generic `SCHEMA_INVALID`.

use serde::{Deserialize, Serialize};
use zkpip_seal_core::ReasonCode;

use crate::validate::SchemaIssue;

/// Fields whose format-level issues may be deferred to semantic checks.
pub const DEFERRED_PATHS: [&str; 2] = ["/seal/urn", "/seal/keyId"];

/// Keywords considered format-level looseness.
pub const DEFERRED_KEYWORDS: [&str; 3] = ["pattern", "format", "minLength"];

/// How schema issues are treated by the verifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TolerancePolicy {
    /// Drop `pattern`/`format`/`minLength` issues on `/seal/urn` and
    /// `/seal/keyId`; every other issue is fatal.
    #[default]
    DeferToSemanticChecks,
    /// Every issue is fatal.
    Strict,
}

impl TolerancePolicy {
    /// Whether `issue` may be ignored at the structural stage.
    pub fn tolerates(&self, issue: &SchemaIssue) -> bool {
        match self {
            TolerancePolicy::Strict => false,
            TolerancePolicy::DeferToSemanticChecks => {
                DEFERRED_PATHS.contains(&issue.path.as_str())
                    && DEFERRED_KEYWORDS.contains(&issue.keyword.as_str())
            }
        }
    }

    /// Issues that remain fatal under this policy.
    pub fn fatal<'a>(&self, issues: &'a [SchemaIssue]) -> Vec<&'a SchemaIssue> {
        issues.iter().filter(|i| !self.tolerates(i)).collect()
    }
}

/// Map fatal schema issues to a single reason code.
///
/// First match wins:
/// 1. `enum` on `/seal/algo` → `ALGO_UNSUPPORTED`
/// 2. anything on `/seal/signature` → `SIGNATURE_BASE64_ERROR`
/// 3. `required` on `/body` → `BODY_MISSING`
/// 4. `required` on `/seal` → `SEAL_MISSING`
/// 5. otherwise `SCHEMA_INVALID`
pub fn classify<'a, I>(issues: I) -> ReasonCode
where
    I: IntoIterator<Item = &'a SchemaIssue>,
    I::IntoIter: Clone,
{
    let issues = issues.into_iter();
    let any = |pred: &dyn Fn(&SchemaIssue) -> bool| issues.clone().any(pred);

    if any(&|i| i.path == "/seal/algo" && i.keyword == "enum") {
        ReasonCode::AlgoUnsupported
    } else if any(&|i| i.path == "/seal/signature") {
        ReasonCode::SignatureBase64Error
    } else if any(&|i| i.path == "/body" && i.keyword == "required") {
        ReasonCode::BodyMissing
    } else if any(&|i| i.path == "/seal" && i.keyword == "required") {
        ReasonCode::SealMissing
    } else {
        ReasonCode::SchemaInvalid
    }
}
