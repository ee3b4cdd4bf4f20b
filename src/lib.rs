//! # DocFold
//!
//! DocFold builds the semantic document model for a schema definition
//! language used by a search/serving engine. Given parsed declarations
//! (document types, fields, inheritance lists, nested struct/map types,
//! cross-document references) it constructs the fully resolved, typed
//! document-type graph consumed by later pipeline stages such as index
//! derivation and storage layout.
//!
//! ## Core Components
//!
//! * `schema` - The document-type graph: value types, fields, attributes,
//!   match settings, the registry with inheritance resolution, struct/map
//!   decomposition, and type ordering
//! * `interpreter` - Turns raw declarations (in-process or JSON) into a
//!   resolved [`DocumentModel`]
//!
//! ## Architecture
//!
//! Construction is two-phase: declarations are first registered into an
//! arena with inheritance edges recorded by name, then every edge is
//! resolved to a concrete node, failing fast on anything unresolved. Fields
//! are populated supertypes-first; struct and map shapes decompose into
//! synthetic child fields with match settings propagated through the
//! nesting; imported fields bind last, once the whole graph exists. The
//! finished model is read-only.

pub mod interpreter;
pub mod schema;

// Re-export main types for convenience
pub use interpreter::{
    BuildReport, DocumentDeclaration, DocumentModel, FieldDeclaration, ImportDeclaration,
    MatchDeclaration, ModelInterpreter, StructDeclaration,
};
pub use schema::types::{
    Attribute, AttributeType, CollectionType, DocTypeId, DocumentType, ExpressionKind, FieldNode,
    ImportedField, IndexingStatement, MatchAlgorithm, MatchCasing, MatchType, Matching,
    ResolvedImportedField, SchemaError, TypeKind, ValueType,
};
pub use schema::DocumentGraph;
