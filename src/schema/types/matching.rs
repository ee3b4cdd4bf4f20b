//! Per-field match settings.
//!
//! Settings are tracked as `Option`s so that a defaulted value can be told
//! apart from an explicitly set one; [`Matching::merge`] only copies values
//! the source explicitly set.

use serde::{Deserialize, Serialize};

/// How query terms are tokenized against the field content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    #[default]
    Text,
    Word,
    Exact,
    Gram,
}

/// How a query term is positioned within the field content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchAlgorithm {
    #[default]
    Normal,
    Prefix,
    Substring,
    Suffix,
}

/// Whether matching is case sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchCasing {
    Cased,
    #[default]
    Uncased,
}

/// Match configuration of one field.
///
/// `None` means the setting was never set and the default applies; the
/// `effective_*` accessors fold the default in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Matching {
    pub match_type: Option<MatchType>,
    pub algorithm: Option<MatchAlgorithm>,
    pub casing: Option<MatchCasing>,
    /// Only meaningful together with [`MatchType::Gram`]
    pub gram_size: Option<usize>,
    pub exact_terminator: Option<String>,
}

impl Matching {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_match_type(mut self, match_type: MatchType) -> Self {
        self.match_type = Some(match_type);
        self
    }

    pub fn with_algorithm(mut self, algorithm: MatchAlgorithm) -> Self {
        self.algorithm = Some(algorithm);
        self
    }

    pub fn with_casing(mut self, casing: MatchCasing) -> Self {
        self.casing = Some(casing);
        self
    }

    pub fn with_gram_size(mut self, gram_size: usize) -> Self {
        self.gram_size = Some(gram_size);
        self
    }

    pub fn with_exact_terminator(mut self, terminator: impl Into<String>) -> Self {
        self.exact_terminator = Some(terminator.into());
        self
    }

    pub fn effective_type(&self) -> MatchType {
        self.match_type.unwrap_or_default()
    }

    pub fn effective_algorithm(&self) -> MatchAlgorithm {
        self.algorithm.unwrap_or_default()
    }

    pub fn effective_casing(&self) -> MatchCasing {
        self.casing.unwrap_or_default()
    }

    /// Merges `source` into `self`.
    ///
    /// Only values `source` explicitly set are copied: the algorithm, the
    /// match type (bringing the gram size along when the type is gram), and
    /// the exact terminator. Not commutative; callers merge an ancestor's
    /// settings into a descendant's, so a later merge wins.
    pub fn merge(&mut self, source: &Matching) {
        if let Some(algorithm) = source.algorithm {
            self.algorithm = Some(algorithm);
        }
        if let Some(match_type) = source.match_type {
            self.match_type = Some(match_type);
            if match_type == MatchType::Gram {
                self.gram_size = source.gram_size;
            }
        }
        if let Some(terminator) = &source.exact_terminator {
            self.exact_terminator = Some(terminator.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let matching = Matching::new();
        assert_eq!(matching.effective_type(), MatchType::Text);
        assert_eq!(matching.effective_algorithm(), MatchAlgorithm::Normal);
        assert_eq!(matching.effective_casing(), MatchCasing::Uncased);
        assert!(matching.gram_size.is_none());
    }

    #[test]
    fn test_merge_copies_explicit_algorithm() {
        let mut accumulator = Matching::new();
        let source = Matching::new().with_algorithm(MatchAlgorithm::Prefix);
        accumulator.merge(&source);
        assert_eq!(accumulator.effective_algorithm(), MatchAlgorithm::Prefix);
    }

    #[test]
    fn test_merge_ignores_defaulted_source() {
        let mut accumulator = Matching::new()
            .with_match_type(MatchType::Gram)
            .with_gram_size(3);
        let defaulted = Matching::new();
        accumulator.merge(&defaulted);
        assert_eq!(accumulator.effective_type(), MatchType::Gram);
        assert_eq!(accumulator.gram_size, Some(3));
    }

    #[test]
    fn test_merge_gram_size_travels_with_type() {
        let mut accumulator = Matching::new();
        let source = Matching::new()
            .with_match_type(MatchType::Gram)
            .with_gram_size(2);
        accumulator.merge(&source);
        assert_eq!(accumulator.effective_type(), MatchType::Gram);
        assert_eq!(accumulator.gram_size, Some(2));
    }

    #[test]
    fn test_merge_last_explicit_type_wins() {
        let mut accumulator = Matching::new().with_match_type(MatchType::Word);
        let source = Matching::new().with_match_type(MatchType::Exact);
        accumulator.merge(&source);
        assert_eq!(accumulator.effective_type(), MatchType::Exact);
    }

    #[test]
    fn test_merge_copies_terminator() {
        let mut accumulator = Matching::new();
        let source = Matching::new().with_exact_terminator("@@");
        accumulator.merge(&source);
        assert_eq!(accumulator.exact_terminator.as_deref(), Some("@@"));
    }

    #[test]
    fn test_merge_does_not_touch_casing() {
        let mut accumulator = Matching::new().with_casing(MatchCasing::Cased);
        let source = Matching::new().with_casing(MatchCasing::Uncased);
        accumulator.merge(&source);
        assert_eq!(accumulator.effective_casing(), MatchCasing::Cased);
    }
}
