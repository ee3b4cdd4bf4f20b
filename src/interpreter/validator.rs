//! Declaration validation.
//!
//! Checks raw declarations for formatting problems before interpretation
//! starts, so the graph-building passes only ever see well-formed names.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use super::types::{DocumentDeclaration, FieldDeclaration, MatchDeclaration};
use crate::schema::registry::BASE_DOCUMENT_NAME;
use crate::schema::types::{ExpressionKind, MatchType, SchemaError};

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid")
});

pub(crate) fn is_identifier(text: &str) -> bool {
    IDENTIFIER.is_match(text)
}

pub struct DeclarationValidator;

impl DeclarationValidator {
    /// Validates a compilation unit's declarations.
    ///
    /// # Errors
    /// Returns `SchemaError::InvalidDeclaration` if:
    /// - Any document, struct, field, or import name is empty or not an
    ///   identifier
    /// - A document type name is declared twice, or shadows the implicit
    ///   base document
    /// - A struct name is declared twice within one document
    /// - An indexing expression kind is unknown
    /// - A gram size is declared without gram matching
    pub fn validate(declarations: &[DocumentDeclaration]) -> Result<(), SchemaError> {
        let mut seen_documents = HashSet::new();
        for document in declarations {
            Self::check_identifier(&document.name, "document type")?;
            if document.name == BASE_DOCUMENT_NAME {
                return Err(SchemaError::InvalidDeclaration(format!(
                    "document type may not use the reserved name '{BASE_DOCUMENT_NAME}'"
                )));
            }
            if !seen_documents.insert(document.name.to_ascii_lowercase()) {
                return Err(SchemaError::InvalidDeclaration(format!(
                    "document type '{}' is declared more than once",
                    document.name
                )));
            }
            for parent in &document.inherits {
                Self::check_identifier(parent, "inherited type")?;
            }

            let mut seen_structs = HashSet::new();
            for declared_struct in &document.structs {
                Self::check_identifier(&declared_struct.name, "struct type")?;
                if !seen_structs.insert(declared_struct.name.clone()) {
                    return Err(SchemaError::InvalidDeclaration(format!(
                        "struct '{}' is declared more than once in '{}'",
                        declared_struct.name, document.name
                    )));
                }
                for parent in &declared_struct.inherits {
                    Self::check_identifier(parent, "inherited type")?;
                }
                for field in &declared_struct.fields {
                    Self::validate_field(field)?;
                }
            }

            for field in &document.fields {
                Self::validate_field(field)?;
            }

            for import in &document.imports {
                Self::check_identifier(&import.local_name, "imported field")?;
                Self::check_identifier(&import.reference_field, "reference field")?;
                Self::check_identifier(&import.target_field, "imported target field")?;
            }
        }
        Ok(())
    }

    fn validate_field(field: &FieldDeclaration) -> Result<(), SchemaError> {
        Self::check_identifier(&field.name, "field")?;
        if field.value_type.trim().is_empty() {
            return Err(SchemaError::InvalidDeclaration(format!(
                "field '{}' has no value type",
                field.name
            )));
        }
        for kind in &field.indexing {
            ExpressionKind::parse(kind)?;
        }
        if let Some(matching) = &field.matching {
            Self::validate_matching(&field.name, matching)?;
        }
        Ok(())
    }

    fn validate_matching(
        field_name: &str,
        matching: &MatchDeclaration,
    ) -> Result<(), SchemaError> {
        if matching.gram_size.is_some() && matching.match_type != Some(MatchType::Gram) {
            return Err(SchemaError::InvalidDeclaration(format!(
                "field '{field_name}' sets a gram size without gram matching"
            )));
        }
        Ok(())
    }

    fn check_identifier(name: &str, what: &str) -> Result<(), SchemaError> {
        if name.is_empty() {
            return Err(SchemaError::InvalidDeclaration(format!(
                "{what} name cannot be empty"
            )));
        }
        if !is_identifier(name) {
            return Err(SchemaError::InvalidDeclaration(format!(
                "{what} name '{name}' is not a valid identifier"
            )));
        }
        Ok(())
    }
}
