//! Schema validation of seal documents.
//!
//! The seal document schema (Draft 2020-12) is embedded at compile time and
//! compiled once into a `jsonschema::Validator`. Validation produces a flat
//! list of [`SchemaIssue`]s which the verifier then filters and classifies.

use std::fmt;

use jsonschema::error::ValidationErrorKind;
use jsonschema::{Draft, Validator};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SchemaError;

/// The seal document schema, as shipped.
pub const SEAL_SCHEMA_JSON: &str = include_str!("../schemas/seal.schema.json");

/// A single structural defect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaIssue {
    /// JSON Pointer to the offending value. For `required`, the pointer of
    /// the missing property itself.
    pub path: String,
    /// The schema keyword that failed (`required`, `enum`, `pattern`, ...).
    pub keyword: String,
    pub message: String,
}

impl SchemaIssue {
    pub fn new(path: impl Into<String>, keyword: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            keyword: keyword.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "(root) [{}]: {}", self.keyword, self.message)
        } else {
            write!(f, "{} [{}]: {}", self.path, self.keyword, self.message)
        }
    }
}

/// Non-empty collection of issues from one validation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolations {
    issues: Vec<SchemaIssue>,
}

impl SchemaViolations {
    pub fn new(issues: Vec<SchemaIssue>) -> Self {
        Self { issues }
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn issues(&self) -> &[SchemaIssue] {
        &self.issues
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SchemaIssue> {
        self.issues.iter()
    }

    pub fn into_inner(self) -> Vec<SchemaIssue> {
        self.issues
    }
}

impl fmt::Display for SchemaViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a SchemaViolations {
    type Item = &'a SchemaIssue;
    type IntoIter = std::slice::Iter<'a, SchemaIssue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.iter()
    }
}

/// Structural validation of a candidate seal document.
///
/// Implementations only report; deciding which issues are fatal is left to
/// the caller's [`TolerancePolicy`](crate::TolerancePolicy).
pub trait SchemaValidator: Send + Sync {
    fn validate(&self, candidate: &Value) -> Result<(), SchemaViolations>;
}

/// Validator that accepts every document.
///
/// For callers that validate structure elsewhere. The verifier still applies
/// its own presence and decode checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissiveValidator;

impl SchemaValidator for PermissiveValidator {
    fn validate(&self, _candidate: &Value) -> Result<(), SchemaViolations> {
        Ok(())
    }
}

/// A [`SchemaValidator`] backed by the `jsonschema` crate.
pub struct JsonSchemaValidator {
    validator: Validator,
}

impl JsonSchemaValidator {
    /// Compile the embedded seal document schema.
    pub fn seal() -> Result<Self, SchemaError> {
        let schema: Value = serde_json::from_str(SEAL_SCHEMA_JSON)
            .map_err(|e| SchemaError::InvalidSchema(e.to_string()))?;
        Self::new(&schema)
    }

    /// Compile an arbitrary Draft 2020-12 schema.
    pub fn new(schema: &Value) -> Result<Self, SchemaError> {
        let validator = jsonschema::options()
            .with_draft(Draft::Draft202012)
            .build(schema)
            .map_err(|e| SchemaError::Build(e.to_string()))?;
        Ok(Self { validator })
    }

    /// Quick pass/fail without collecting issues.
    pub fn is_valid(&self, candidate: &Value) -> bool {
        self.validator.is_valid(candidate)
    }
}

impl fmt::Debug for JsonSchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSchemaValidator").finish_non_exhaustive()
    }
}

impl SchemaValidator for JsonSchemaValidator {
    fn validate(&self, candidate: &Value) -> Result<(), SchemaViolations> {
        let issues: Vec<SchemaIssue> = self
            .validator
            .iter_errors(candidate)
            .map(|e| {
                let instance_path = e.instance_path.to_string();
                let schema_path = e.schema_path.to_string();
                let keyword = schema_path
                    .rsplit('/')
                    .next()
                    .unwrap_or_default()
                    .to_string();
                let path = match &e.kind {
                    ValidationErrorKind::Required { property } => {
                        let name = property
                            .as_str()
                            .map(str::to_string)
                            .unwrap_or_else(|| property.to_string());
                        format!("{instance_path}/{}", escape_pointer(&name))
                    }
                    _ => instance_path,
                };
                SchemaIssue::new(path, keyword, e.to_string())
            })
            .collect();

        if issues.is_empty() {
            Ok(())
        } else {
            Err(SchemaViolations::new(issues))
        }
    }
}

// RFC 6901 token escaping.
fn escape_pointer(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}
