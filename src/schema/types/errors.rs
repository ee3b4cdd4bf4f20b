//! Error types for document-model construction.
//!
//! Every failure in this crate is a construction-time configuration error:
//! the compilation unit either builds completely or is rejected as a whole.
//! Nothing here is retried or downgraded internally.

use thiserror::Error;

/// Unified error type for document-model construction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    // ========== Name Collisions ==========
    /// A top-level document type name was declared twice
    #[error("document type '{name}' is already declared")]
    DuplicateType { name: String },

    /// A field name collides with another field on the same type
    /// (field names are compared case-insensitively)
    #[error("field '{field}' collides with an existing field on '{doc_type}'")]
    DuplicateField { doc_type: String, field: String },

    /// A nested struct type name collides with its owner or with a name
    /// already reachable from the owner
    #[error("struct '{name}' cannot be declared inside '{owner}': the name is already in use")]
    OwnedTypeNameCollision { owner: String, name: String },

    // ========== Type Incompatibility ==========
    /// A subtype redeclared an inherited field with a different value type
    #[error(
        "field '{field}' on '{doc_type}' is declared as {declared} but inherited as {inherited}"
    )]
    FieldTypeMismatch {
        doc_type: String,
        field: String,
        declared: String,
        inherited: String,
    },

    // ========== Unresolved References ==========
    /// A field names a struct type that was never declared in scope
    #[error("field '{field}' uses struct type '{name}', which is not declared in scope")]
    UnknownStructType { field: String, name: String },

    /// A reference names a document type that was never declared
    #[error("document type '{name}' is not declared")]
    UnknownDocumentType { name: String },

    /// An inheritance edge could not be resolved to a declared type
    #[error("'{child}' inherits '{parent}', which is not declared")]
    UnresolvedInheritance { child: String, parent: String },

    /// Inheritance edges form a cycle
    #[error("'{name}' participates in an inheritance cycle")]
    InheritanceCycle { name: String },

    /// An imported-field binding could not be resolved to a concrete field
    #[error("imported field '{local_name}' on '{doc_type}' cannot be resolved: {reason}")]
    UnresolvedImport {
        doc_type: String,
        local_name: String,
        reason: String,
    },

    /// An imported-field binding goes through a field that is not a reference
    #[error("field '{field}' on '{doc_type}' is not a reference field")]
    NotAReferenceField { doc_type: String, field: String },

    // ========== Imported-Field Alias Limits ==========
    /// A query that is only meaningful for concretely declared fields was
    /// made against an imported (alias) field
    #[error("{operation} is not available on imported field '{local_name}'")]
    UnsupportedImportedOperation {
        local_name: String,
        operation: String,
    },

    // ========== Attribute Derivation ==========
    /// The value type has no search-time attribute representation
    #[error("field '{field}' of type {value_type} has no attribute representation")]
    UnsupportedAttributeType { field: String, value_type: String },

    // ========== Structural Limits ==========
    /// Struct/map decomposition exceeded the maximum nesting depth
    #[error("field '{field}' exceeds the maximum nesting depth of {limit}")]
    NestingTooDeep { field: String, limit: usize },

    // ========== Ordering ==========
    /// Type ordering could not make progress because the remaining types
    /// depend on each other
    #[error("dependency cycle among document types: {names:?}")]
    OrderingCycle { names: Vec<String> },

    // ========== Declarations ==========
    /// A raw declaration failed validation before interpretation
    #[error("invalid declaration: {0}")]
    InvalidDeclaration(String),

    /// A value-type text could not be parsed
    #[error("invalid value type '{text}': {reason}")]
    InvalidValueType { text: String, reason: String },
}
