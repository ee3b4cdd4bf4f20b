//! Imported fields: local aliases for fields reachable through a reference
//! field on another document type.
//!
//! An [`ImportedField`] is the unresolved name triple recorded while
//! declarations are read. Binding happens in a dedicated pass once the whole
//! graph exists and yields a [`ResolvedImportedField`]; a failed lookup is a
//! hard error and never produces a partially bound object.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::attribute::Attribute;
use super::document_type::DocTypeId;
use super::errors::SchemaError;
use super::field::FieldNode;
use super::matching::Matching;
use super::value_type::ValueType;
use crate::schema::registry::DocumentGraph;

/// Unresolved imported-field declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedField {
    /// Alias the field is visible under on the importing type
    pub local_name: String,
    /// Name of the reference field on the importing type
    pub reference_field: String,
    /// Name of the field within the referenced document type
    pub target_field: String,
}

impl ImportedField {
    #[must_use]
    pub fn new(
        local_name: impl Into<String>,
        reference_field: impl Into<String>,
        target_field: impl Into<String>,
    ) -> Self {
        Self {
            local_name: local_name.into(),
            reference_field: reference_field.into(),
            target_field: target_field.into(),
        }
    }
}

/// Imported field bound to a concrete target.
///
/// Field-level queries forward to the target field, except that identity
/// queries answer with the local alias and queries only meaningful for
/// concretely declared fields fail loudly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedImportedField {
    pub local_name: String,
    pub reference_field: String,
    pub target_type: DocTypeId,
    pub target_field: String,
}

impl ResolvedImportedField {
    /// The name this field is visible under: the local alias, not the
    /// target field's name.
    pub fn name(&self) -> &str {
        &self.local_name
    }

    /// The concrete field this alias is bound to.
    ///
    /// # Errors
    /// Returns `SchemaError::UnresolvedImport` if the graph no longer
    /// contains the target field.
    pub fn target<'a>(&self, graph: &'a DocumentGraph) -> Result<&'a FieldNode, SchemaError> {
        graph
            .lookup_field(self.target_type, &self.target_field)
            .ok_or_else(|| SchemaError::UnresolvedImport {
                doc_type: graph.get(self.target_type).name.clone(),
                local_name: self.local_name.clone(),
                reason: format!("target field '{}' is gone", self.target_field),
            })
    }

    pub fn value_type<'a>(&self, graph: &'a DocumentGraph) -> Result<&'a ValueType, SchemaError> {
        Ok(&self.target(graph)?.value_type)
    }

    pub fn attributes<'a>(
        &self,
        graph: &'a DocumentGraph,
    ) -> Result<&'a HashMap<String, Attribute>, SchemaError> {
        Ok(&self.target(graph)?.attributes)
    }

    pub fn matching<'a>(&self, graph: &'a DocumentGraph) -> Result<&'a Matching, SchemaError> {
        Ok(&self.target(graph)?.matching)
    }

    /// Imported fields have no indexing statement of their own; asking for
    /// one is an error rather than a defaulted answer.
    pub fn indexing(&self) -> Result<(), SchemaError> {
        Err(self.unsupported("the indexing statement"))
    }

    /// Struct-field navigation is only defined on concretely declared
    /// fields.
    pub fn struct_fields(&self) -> Result<(), SchemaError> {
        Err(self.unsupported("struct field navigation"))
    }

    /// Explicit index settings are only defined on concretely declared
    /// fields.
    pub fn index_settings(&self) -> Result<(), SchemaError> {
        Err(self.unsupported("index settings"))
    }

    /// Ranking settings are only defined on concretely declared fields.
    pub fn rank_settings(&self) -> Result<(), SchemaError> {
        Err(self.unsupported("ranking settings"))
    }

    fn unsupported(&self, operation: &str) -> SchemaError {
        SchemaError::UnsupportedImportedOperation {
            local_name: self.local_name.clone(),
            operation: operation.to_string(),
        }
    }
}
