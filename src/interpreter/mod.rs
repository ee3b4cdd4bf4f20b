//! Interpreter module for turning raw schema declarations into a resolved
//! document model.

mod interpreter;
mod types;
mod validator;

pub use interpreter::{BuildReport, DocumentModel, ModelInterpreter};
pub use types::{
    DocumentDeclaration, FieldDeclaration, ImportDeclaration, MatchDeclaration,
    StructDeclaration,
};
pub use validator::DeclarationValidator;

use crate::schema::types::SchemaError;

/// Result type for interpretation operations
pub type Result<T> = std::result::Result<T, SchemaError>;
