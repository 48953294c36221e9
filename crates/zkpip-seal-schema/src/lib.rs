//! # ZKPIP Seal Schema
//!
//! Structural validation of seal documents, the first stage of verification.
//!
//! ## Key Types
//!
//! - [`SchemaValidator`] - The validation collaborator interface
//! - [`JsonSchemaValidator`] - Validator for the embedded seal schema
//! - [`SchemaIssue`] - One `{ path, keyword, message }` defect
//! - [`TolerancePolicy`] - Which issues are fatal
//!
//! ## Usage
//!
//! ```rust
//! use zkpip_seal_schema::{classify, JsonSchemaValidator, SchemaValidator, TolerancePolicy};
//! use zkpip_seal_core::ReasonCode;
//!
//! let validator = JsonSchemaValidator::seal().unwrap();
//! let doc = serde_json::json!({ "body": {} });
//! let violations = validator.validate(&doc).unwrap_err();
//! let fatal = TolerancePolicy::default().fatal(violations.issues());
//! assert_eq!(classify(fatal.iter().copied()), ReasonCode::SealMissing);
//! ```

pub mod error;
pub mod policy;
pub mod validate;

pub use error::SchemaError;
pub use policy::{classify, TolerancePolicy, DEFERRED_KEYWORDS, DEFERRED_PATHS};
pub use validate::{
    JsonSchemaValidator, PermissiveValidator, SchemaIssue, SchemaValidator, SchemaViolations,
    SEAL_SCHEMA_JSON,
};
