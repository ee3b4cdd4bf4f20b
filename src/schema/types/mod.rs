pub mod attribute;
pub mod document_type;
pub mod errors;
pub mod field;
pub mod imported;
pub mod indexing;
pub mod matching;
pub mod value_type;

pub use attribute::{Attribute, AttributeType, CollectionType};
pub use document_type::{DocTypeId, DocumentType, TypeKind};
pub use errors::SchemaError;
pub use field::FieldNode;
pub use imported::{ImportedField, ResolvedImportedField};
pub use indexing::{ExpressionKind, IndexingStatement};
pub use matching::{MatchAlgorithm, MatchCasing, MatchType, Matching};
pub use value_type::{TensorCellType, TensorDimension, TensorSpec, ValueType};
