//! Field nodes.
//!
//! A field node is a named, typed unit of data within a document or struct
//! type. Fields whose value type decomposes (struct, map, or collections of
//! them) carry synthetic child field nodes produced by the decomposition
//! pass; children are addressed by dotted path (`parent.key`, `parent.member`).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::attribute::Attribute;
use super::indexing::{ExpressionKind, IndexingStatement};
use super::matching::Matching;
use super::value_type::ValueType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldNode {
    /// Dotted path name; declared fields are a single segment, synthetic
    /// children extend their parent's path
    pub name: String,
    pub value_type: ValueType,
    /// Attributes keyed by attribute name
    pub attributes: HashMap<String, Attribute>,
    pub matching: Matching,
    /// Synthetic children in stable declaration order; empty unless the
    /// value type decomposes
    pub struct_fields: Vec<FieldNode>,
    pub indexing: IndexingStatement,
}

impl FieldNode {
    #[must_use]
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            attributes: HashMap::new(),
            matching: Matching::new(),
            struct_fields: Vec::new(),
            indexing: IndexingStatement::new(),
        }
    }

    pub fn with_matching(mut self, matching: Matching) -> Self {
        self.matching = matching;
        self
    }

    pub fn with_indexing(mut self, indexing: IndexingStatement) -> Self {
        self.indexing = indexing;
        self
    }

    /// The last segment of the dotted path.
    pub fn base_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    pub fn add_attribute(&mut self, attribute: Attribute) {
        self.attributes.insert(attribute.name.clone(), attribute);
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Looks up a synthetic child by its base name (`"key"`, `"value"`, or
    /// a struct member name).
    pub fn struct_field(&self, base_name: &str) -> Option<&FieldNode> {
        self.struct_fields
            .iter()
            .find(|child| child.base_name() == base_name)
    }

    /// Whether the indexing statement writes this field into an attribute.
    pub fn wants_attribute(&self) -> bool {
        self.indexing.contains(ExpressionKind::WritesAttribute)
    }
}
