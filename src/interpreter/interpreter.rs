//! Interprets raw declarations into a resolved document model.

use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;
use std::collections::HashMap;

use super::types::{DocumentDeclaration, FieldDeclaration};
use super::validator::DeclarationValidator;
use crate::schema::decompose::{populate_struct_fields, populate_struct_matching};
use crate::schema::ordering::order_types;
use crate::schema::registry::DocumentGraph;
use crate::schema::types::{
    Attribute, DocTypeId, DocumentType, ExpressionKind, FieldNode, ImportedField,
    IndexingStatement, SchemaError, ValueType,
};

/// Summary of one interpretation run.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    /// Top-level document types in processing order
    pub document_types: Vec<String>,
    /// Nested struct types, by owning document
    pub struct_types: Vec<String>,
    /// Declared fields per document type
    pub field_counts: HashMap<String, usize>,
    /// Attributes per document type, synthetic children included
    pub attribute_counts: HashMap<String, usize>,
    pub built_at: DateTime<Utc>,
}

/// The fully resolved output of one compilation unit.
///
/// Read-only once produced; downstream stages may consume it from other
/// threads.
#[derive(Debug, Clone)]
pub struct DocumentModel {
    pub graph: DocumentGraph,
    /// Top-level document types, dependencies first
    pub ordered: Vec<DocTypeId>,
    pub report: BuildReport,
}

impl DocumentModel {
    pub fn ordered_names(&self) -> Vec<&str> {
        self.ordered
            .iter()
            .map(|&id| self.graph.get(id).name.as_str())
            .collect()
    }

    /// Looks up a top-level document type by name.
    pub fn document(&self, name: &str) -> Option<&DocumentType> {
        self.graph.lookup(name).map(|id| self.graph.get(id))
    }
}

/// Interprets raw schema declarations and builds the document-type graph.
#[derive(Default)]
pub struct ModelInterpreter;

impl ModelInterpreter {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Builds the document model for one compilation unit.
    ///
    /// Declarations are validated, every type is registered, inheritance
    /// edges are resolved, fields are populated supertypes-first (with
    /// attribute derivation and struct/map decomposition), imported fields
    /// are bound, and the processing order is computed.
    ///
    /// # Errors
    /// Returns a `SchemaError` if:
    /// - Declaration validation fails
    /// - A name collides or an inheritance edge cannot be resolved
    /// - A field redeclares an inherited field with a different type
    /// - A struct, reference target, or imported field cannot be resolved
    /// - Nesting exceeds the decomposition depth limit
    /// - The type dependencies are cyclic
    pub fn interpret(
        &self,
        declarations: Vec<DocumentDeclaration>,
    ) -> crate::interpreter::Result<DocumentModel> {
        DeclarationValidator::validate(&declarations)?;

        let mut graph = DocumentGraph::new();
        let mut document_ids = Vec::with_capacity(declarations.len());
        let mut field_sources: HashMap<DocTypeId, Vec<FieldDeclaration>> = HashMap::new();

        // Phase 1: register every type, record edges and field sources.
        for declaration in &declarations {
            let document_id = graph.register_document(&declaration.name)?;
            document_ids.push(document_id);
            for parent in &declaration.inherits {
                graph.inherit(document_id, parent);
            }
            field_sources.insert(document_id, declaration.fields.clone());
            for struct_declaration in &declaration.structs {
                let struct_id = graph.create_struct(&struct_declaration.name);
                graph.add_owned_type(document_id, struct_id)?;
                for parent in &struct_declaration.inherits {
                    graph.inherit(struct_id, parent);
                }
                field_sources.insert(struct_id, struct_declaration.fields.clone());
            }
            for import in &declaration.imports {
                graph.get_mut(document_id).imported_fields.push(ImportedField::new(
                    &import.local_name,
                    &import.reference_field,
                    &import.target_field,
                ));
            }
        }

        // Phase 2: resolve inheritance edges to concrete ids.
        graph.resolve_inheritance()?;

        // Field population, supertypes first so redeclarations can be
        // checked against inherited fields.
        for id in graph.inheritance_order() {
            let Some(sources) = field_sources.remove(&id) else {
                continue;
            };
            for source in &sources {
                let field = Self::build_field(&graph, source)?;
                graph.add_field(id, field)?;
            }
        }

        // Decomposition and match propagation over the finished field sets.
        for id in graph.inheritance_order() {
            let mut fields = std::mem::take(&mut graph.get_mut(id).fields);
            for field in &mut fields {
                populate_struct_fields(&graph, id, field, 0)?;
                let parent_matching = field.matching.clone();
                populate_struct_matching(&graph, id, field, Some(&parent_matching))?;
            }
            graph.get_mut(id).fields = fields;
        }

        graph.resolve_imported_fields()?;

        let ordered = order_types(&graph, &document_ids)?;
        let report = Self::build_report(&graph, &ordered);
        info!(
            "built document model with {} document types: {:?}",
            report.document_types.len(),
            report.document_types
        );
        Ok(DocumentModel {
            graph,
            ordered,
            report,
        })
    }

    /// Interprets a compilation unit from JSON text: an array of document
    /// declarations.
    ///
    /// # Errors
    /// Returns a `SchemaError` if the JSON is invalid or interpretation
    /// fails.
    pub fn interpret_str(&self, json: &str) -> crate::interpreter::Result<DocumentModel> {
        let declarations: Vec<DocumentDeclaration> = serde_json::from_str(json)
            .map_err(|e| SchemaError::InvalidDeclaration(format!("invalid JSON input: {e}")))?;
        self.interpret(declarations)
    }

    /// Interprets a compilation unit from a JSON file.
    ///
    /// # Errors
    /// Returns a `SchemaError` if the file cannot be read, the JSON is
    /// invalid, or interpretation fails.
    pub fn interpret_file(&self, path: &str) -> crate::interpreter::Result<DocumentModel> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            SchemaError::InvalidDeclaration(format!("failed to read declaration file: {e}"))
        })?;
        self.interpret_str(&json)
    }

    fn build_field(
        graph: &DocumentGraph,
        declaration: &FieldDeclaration,
    ) -> Result<FieldNode, SchemaError> {
        let mut value_type = ValueType::parse(&declaration.value_type)?;
        if let ValueType::WeightedSet {
            remove_if_zero,
            create_if_nonexistent,
            ..
        } = &mut value_type
        {
            *remove_if_zero = declaration.remove_if_zero;
            *create_if_nonexistent = declaration.create_if_nonexistent;
        }

        let mut reference_targets = Vec::new();
        value_type.collect_references(&mut reference_targets);
        for target in reference_targets {
            if graph.lookup(&target).is_none() {
                return Err(SchemaError::UnknownDocumentType { name: target });
            }
        }

        let mut kinds = Vec::with_capacity(declaration.indexing.len());
        for kind in &declaration.indexing {
            kinds.push(ExpressionKind::parse(kind)?);
        }
        let mut field = FieldNode::new(&declaration.name, value_type)
            .with_indexing(IndexingStatement::from_kinds(kinds));
        if let Some(matching) = &declaration.matching {
            field.matching = matching.clone().into();
        }
        if field.wants_attribute() && field.value_type.attribute_capable() {
            field.add_attribute(Attribute::derive(&field.name, &field.value_type)?);
        }
        Ok(field)
    }

    fn build_report(graph: &DocumentGraph, ordered: &[DocTypeId]) -> BuildReport {
        let mut document_types = Vec::with_capacity(ordered.len());
        let mut struct_types = Vec::new();
        let mut field_counts = HashMap::new();
        let mut attribute_counts = HashMap::new();
        for &id in ordered {
            let node = graph.get(id);
            document_types.push(node.name.clone());
            for &owned in &node.owned_types {
                struct_types.push(format!("{}.{}", node.name, graph.get(owned).name));
            }
            field_counts.insert(node.name.clone(), node.fields.len());
            let attributes: usize = node.fields.iter().map(count_attributes).sum();
            attribute_counts.insert(node.name.clone(), attributes);
        }
        BuildReport {
            document_types,
            struct_types,
            field_counts,
            attribute_counts,
            built_at: Utc::now(),
        }
    }
}

fn count_attributes(field: &FieldNode) -> usize {
    field.attributes.len()
        + field
            .struct_fields
            .iter()
            .map(count_attributes)
            .sum::<usize>()
}
