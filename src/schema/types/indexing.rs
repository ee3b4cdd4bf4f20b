//! Opaque indexing-statement handles.
//!
//! The model does not evaluate indexing statements; it only needs to know
//! whether a statement contains a given expression kind.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::errors::SchemaError;

/// Expression kinds the model can ask about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpressionKind {
    /// The statement writes the field into an attribute
    #[serde(rename = "attribute")]
    WritesAttribute,
    /// The statement writes the field into an index
    #[serde(rename = "index")]
    WritesIndex,
    /// The statement lower-cases the field content
    #[serde(rename = "lowercase")]
    LowerCases,
    /// The statement writes the field into the document summary
    #[serde(rename = "summary")]
    WritesSummary,
}

impl ExpressionKind {
    /// Parses the textual kind used by raw declarations.
    ///
    /// # Errors
    /// Returns `SchemaError::InvalidDeclaration` on an unknown kind.
    pub fn parse(text: &str) -> Result<Self, SchemaError> {
        match text {
            "attribute" => Ok(Self::WritesAttribute),
            "index" => Ok(Self::WritesIndex),
            "lowercase" => Ok(Self::LowerCases),
            "summary" => Ok(Self::WritesSummary),
            other => Err(SchemaError::InvalidDeclaration(format!(
                "unknown indexing expression kind '{other}'"
            ))),
        }
    }
}

/// The part of a field's indexing statement the model can see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct IndexingStatement {
    kinds: HashSet<ExpressionKind>,
}

impl IndexingStatement {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_kinds(kinds: impl IntoIterator<Item = ExpressionKind>) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
        }
    }

    pub fn insert(&mut self, kind: ExpressionKind) {
        self.kinds.insert(kind);
    }

    pub fn contains(&self, kind: ExpressionKind) -> bool {
        self.kinds.contains(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}
