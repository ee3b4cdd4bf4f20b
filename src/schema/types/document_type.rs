//! Document type nodes.
//!
//! Document types live in an index-addressed arena owned by the
//! [`DocumentGraph`](crate::schema::registry::DocumentGraph); all graph
//! edges (inheritance, nested struct ownership) are [`DocTypeId`] indices
//! into that arena. Inheritance edges are recorded by name while
//! declarations are read and resolved to ids in a separate pass.

use serde::{Deserialize, Serialize};

use super::field::FieldNode;
use super::imported::{ImportedField, ResolvedImportedField};

/// Index of a document type within its graph arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocTypeId(pub usize);

/// Whether a node is a root document type or a nested struct type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Document,
    Struct,
}

/// One document or struct type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentType {
    pub name: String,
    pub kind: TypeKind,
    /// Resolved supertypes, stable insertion order; diamonds are allowed
    pub inherited: Vec<DocTypeId>,
    /// Supertype names recorded while reading declarations, drained by the
    /// resolution pass
    pub unresolved_inherits: Vec<String>,
    /// Nested struct types declared inside this type
    pub owned_types: Vec<DocTypeId>,
    /// The type this struct is declared inside, if any
    pub owner: Option<DocTypeId>,
    /// Own fields in declaration order
    pub fields: Vec<FieldNode>,
    /// Imported-field declarations, unresolved until the binding pass
    pub imported_fields: Vec<ImportedField>,
    /// Bindings produced by the resolution pass
    pub resolved_imports: Vec<ResolvedImportedField>,
}

impl DocumentType {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            inherited: Vec::new(),
            unresolved_inherits: Vec::new(),
            owned_types: Vec::new(),
            owner: None,
            fields: Vec::new(),
            imported_fields: Vec::new(),
            resolved_imports: Vec::new(),
        }
    }

    pub fn is_document(&self) -> bool {
        self.kind == TypeKind::Document
    }

    pub fn is_struct(&self) -> bool {
        self.kind == TypeKind::Struct
    }

    /// Looks up an own (non-inherited) field by exact name.
    pub fn field(&self, name: &str) -> Option<&FieldNode> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut FieldNode> {
        self.fields.iter_mut().find(|field| field.name == name)
    }

    /// Looks up a resolved imported field by its local alias.
    pub fn resolved_import(&self, local_name: &str) -> Option<&ResolvedImportedField> {
        self.resolved_imports
            .iter()
            .find(|import| import.local_name == local_name)
    }
}
