//! Raw declaration types consumed from the parser.
//!
//! These mirror what the schema language parser emits for one compilation
//! unit; they can also be read from JSON. Value types arrive in their
//! compact textual form and are parsed during interpretation.

use serde::{Deserialize, Serialize};

use crate::schema::types::{MatchAlgorithm, MatchCasing, MatchType, Matching};

/// One declared document type with everything nested inside it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentDeclaration {
    pub name: String,
    #[serde(default)]
    pub inherits: Vec<String>,
    #[serde(default)]
    pub structs: Vec<StructDeclaration>,
    #[serde(default)]
    pub fields: Vec<FieldDeclaration>,
    #[serde(default)]
    pub imports: Vec<ImportDeclaration>,
}

/// A struct type declared inside a document type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructDeclaration {
    pub name: String,
    #[serde(default)]
    pub inherits: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldDeclaration>,
}

/// One declared field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDeclaration {
    pub name: String,
    /// Compact textual value type, e.g. `"array<string>"`
    #[serde(rename = "type")]
    pub value_type: String,
    /// Expression kinds of the field's indexing statement
    #[serde(default)]
    pub indexing: Vec<String>,
    #[serde(default)]
    pub matching: Option<MatchDeclaration>,
    /// Weighted-set update flags; only meaningful on weighted-set fields
    #[serde(default)]
    pub remove_if_zero: bool,
    #[serde(default)]
    pub create_if_nonexistent: bool,
}

/// Declared match settings of a field. Absent knobs stay defaulted.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MatchDeclaration {
    #[serde(default)]
    pub match_type: Option<MatchType>,
    #[serde(default)]
    pub algorithm: Option<MatchAlgorithm>,
    #[serde(default)]
    pub casing: Option<MatchCasing>,
    #[serde(default)]
    pub gram_size: Option<usize>,
    #[serde(default)]
    pub exact_terminator: Option<String>,
}

impl From<MatchDeclaration> for Matching {
    fn from(declaration: MatchDeclaration) -> Self {
        Self {
            match_type: declaration.match_type,
            algorithm: declaration.algorithm,
            casing: declaration.casing,
            gram_size: declaration.gram_size,
            exact_terminator: declaration.exact_terminator,
        }
    }
}

/// An imported-field declaration: `local_name` aliases the field named
/// `target_field` on the document type reached through `reference_field`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportDeclaration {
    pub local_name: String,
    pub reference_field: String,
    pub target_field: String,
}

impl FieldDeclaration {
    /// A bare field with just a name and a type text.
    #[must_use]
    pub fn new(name: impl Into<String>, value_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value_type: value_type.into(),
            indexing: Vec::new(),
            matching: None,
            remove_if_zero: false,
            create_if_nonexistent: false,
        }
    }

    pub fn with_indexing(mut self, kinds: &[&str]) -> Self {
        self.indexing = kinds.iter().map(|kind| (*kind).to_string()).collect();
        self
    }

    pub fn with_matching(mut self, matching: MatchDeclaration) -> Self {
        self.matching = Some(matching);
        self
    }
}

impl DocumentDeclaration {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inherits: Vec::new(),
            structs: Vec::new(),
            fields: Vec::new(),
            imports: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_json_round_trip() {
        let json = r#"{
            "name": "music",
            "inherits": ["media"],
            "structs": [
                {"name": "artist", "fields": [{"name": "stage_name", "type": "string"}]}
            ],
            "fields": [
                {"name": "title", "type": "string", "indexing": ["index", "summary"]},
                {"name": "artists", "type": "array<artist>"}
            ],
            "imports": [
                {"local_name": "label_name", "reference_field": "label_ref", "target_field": "name"}
            ]
        }"#;
        let declaration: DocumentDeclaration = serde_json::from_str(json).unwrap();
        assert_eq!(declaration.name, "music");
        assert_eq!(declaration.inherits, vec!["media"]);
        assert_eq!(declaration.structs.len(), 1);
        assert_eq!(declaration.fields.len(), 2);
        assert_eq!(declaration.imports.len(), 1);

        let text = serde_json::to_string(&declaration).unwrap();
        let back: DocumentDeclaration = serde_json::from_str(&text).unwrap();
        assert_eq!(back.fields[0].indexing, vec!["index", "summary"]);
    }

    #[test]
    fn test_match_declaration_converts_to_matching() {
        let declaration = MatchDeclaration {
            match_type: Some(MatchType::Gram),
            gram_size: Some(3),
            ..MatchDeclaration::default()
        };
        let matching: Matching = declaration.into();
        assert_eq!(matching.match_type, Some(MatchType::Gram));
        assert_eq!(matching.gram_size, Some(3));
        assert!(matching.algorithm.is_none());
    }
}
