pub mod decompose;
pub mod ordering;
pub mod registry;
pub mod types;

pub use registry::{DocumentGraph, BASE_DOCUMENT_NAME};

// Re-export all types at the schema module level
pub use types::{
    Attribute,
    AttributeType,
    CollectionType,
    DocTypeId,
    DocumentType,
    ExpressionKind,
    FieldNode,
    ImportedField,
    IndexingStatement,
    MatchAlgorithm,
    MatchCasing,
    MatchType,
    Matching,
    ResolvedImportedField,
    SchemaError,
    TypeKind,
    ValueType,
};
