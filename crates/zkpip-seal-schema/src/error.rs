//! Error types for schema loading.

use thiserror::Error;

/// Errors raised while preparing a validator. Validation failures are not
/// errors; they are reported as [`SchemaViolations`](crate::SchemaViolations).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The schema text is not valid JSON.
    #[error("invalid schema document: {0}")]
    InvalidSchema(String),

    /// The schema could not be compiled.
    #[error("schema compilation failed: {0}")]
    Build(String),
}
