//! Struct/map decomposition and match propagation.
//!
//! Fields whose value type is a struct, a map, or a collection of either
//! are flattened into synthetic child fields (`point.x`, `prices.key`,
//! `prices.value`) so that later stages can address nested members
//! independently. Structure and matching are two separate passes over the
//! same tree: [`populate_struct_fields`] builds the children and
//! [`populate_struct_matching`] assigns their match settings, so matching
//! can be recomputed after a supertype change without rebuilding structure.

use log::debug;

use super::registry::DocumentGraph;
use super::types::{DocTypeId, FieldNode, Matching, SchemaError, ValueType};

/// Maximum struct/map nesting depth a field may decompose through.
pub const MAX_NESTING_DEPTH: usize = 10;

/// Builds the synthetic children of `field`. Re-running replaces the
/// children wholesale, so the pass is idempotent.
///
/// `scope` is the type the field is declared on; struct names resolve from
/// there. `depth` is the field's own nesting depth, zero for declared
/// fields.
///
/// # Errors
/// `SchemaError::UnknownStructType` if a struct name does not resolve,
/// `SchemaError::NestingTooDeep` past [`MAX_NESTING_DEPTH`] levels.
pub fn populate_struct_fields(
    graph: &DocumentGraph,
    scope: DocTypeId,
    field: &mut FieldNode,
    depth: usize,
) -> Result<(), SchemaError> {
    match field.value_type.strip_collections().clone() {
        ValueType::Map { key, value } => {
            if depth >= MAX_NESTING_DEPTH {
                return Err(nesting_error(field));
            }
            field.struct_fields.clear();
            for (suffix, value_type) in [("key", *key), ("value", *value)] {
                let mut child = FieldNode::new(format!("{}.{}", field.name, suffix), value_type);
                // key/value entries are produced by the same statement that
                // writes the map itself
                child.indexing = field.indexing.clone();
                attach_attribute(&mut child)?;
                populate_struct_fields(graph, scope, &mut child, depth + 1)?;
                field.struct_fields.push(child);
            }
            debug!("decomposed map field '{}'", field.name);
            Ok(())
        }
        ValueType::Struct(struct_name) => {
            if depth >= MAX_NESTING_DEPTH {
                return Err(nesting_error(field));
            }
            let struct_id = resolve_struct_type(graph, scope, &struct_name).ok_or_else(|| {
                SchemaError::UnknownStructType {
                    field: field.name.clone(),
                    name: struct_name.clone(),
                }
            })?;
            field.struct_fields.clear();
            let members: Vec<FieldNode> = graph
                .field_set(struct_id)
                .into_iter()
                .cloned()
                .collect();
            for member in members {
                let mut child = FieldNode::new(
                    format!("{}.{}", field.name, member.name),
                    member.value_type.clone(),
                );
                child.indexing = member.indexing.clone();
                attach_attribute(&mut child)?;
                populate_struct_fields(graph, struct_id, &mut child, depth + 1)?;
                field.struct_fields.push(child);
            }
            debug!(
                "decomposed struct field '{}' into {} members",
                field.name,
                field.struct_fields.len()
            );
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Assigns match settings to every synthetic child of `field`.
///
/// Each child gets a fresh [`Matching`] into which `parent_matching` is
/// merged first (when present), then the corresponding source field's own
/// matching; struct members contribute their declared matching, map
/// key/value children have no source of their own. The child's result
/// becomes the parent matching of its own children.
///
/// # Errors
/// `SchemaError::UnknownStructType` if a struct name no longer resolves.
pub fn populate_struct_matching(
    graph: &DocumentGraph,
    scope: DocTypeId,
    field: &mut FieldNode,
    parent_matching: Option<&Matching>,
) -> Result<(), SchemaError> {
    match field.value_type.strip_collections().clone() {
        ValueType::Map { .. } => {
            for child in &mut field.struct_fields {
                let mut merged = Matching::new();
                if let Some(parent) = parent_matching {
                    merged.merge(parent);
                }
                child.matching = merged.clone();
                populate_struct_matching(graph, scope, child, Some(&merged))?;
            }
            Ok(())
        }
        ValueType::Struct(struct_name) => {
            let struct_id = resolve_struct_type(graph, scope, &struct_name).ok_or_else(|| {
                SchemaError::UnknownStructType {
                    field: field.name.clone(),
                    name: struct_name.clone(),
                }
            })?;
            for child in &mut field.struct_fields {
                let mut merged = Matching::new();
                if let Some(parent) = parent_matching {
                    merged.merge(parent);
                }
                if let Some(member) = graph.lookup_field(struct_id, child.base_name()) {
                    merged.merge(&member.matching);
                }
                child.matching = merged.clone();
                populate_struct_matching(graph, struct_id, child, Some(&merged))?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Resolves a struct name from `scope`, walking up the owner chain so a
/// member of one struct can use a sibling struct of the owning document.
fn resolve_struct_type(
    graph: &DocumentGraph,
    mut scope: DocTypeId,
    name: &str,
) -> Option<DocTypeId> {
    loop {
        if let Some(found) = graph.get_type(scope, name) {
            return Some(found);
        }
        scope = graph.get(scope).owner?;
    }
}

fn nesting_error(field: &FieldNode) -> SchemaError {
    SchemaError::NestingTooDeep {
        field: field.name.clone(),
        limit: MAX_NESTING_DEPTH,
    }
}

fn attach_attribute(field: &mut FieldNode) -> Result<(), SchemaError> {
    if field.wants_attribute() && field.value_type.attribute_capable() {
        let attribute =
            super::types::Attribute::derive(&field.name, &field.value_type)?;
        field.add_attribute(attribute);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::{
        ExpressionKind, IndexingStatement, MatchAlgorithm, MatchType,
    };

    /// One document owning `struct point { a: int, b: string }`.
    fn graph_with_point_struct() -> (DocumentGraph, DocTypeId) {
        let mut graph = DocumentGraph::new();
        let doc = graph.register_document("music").unwrap();
        let point = graph.create_struct("point");
        graph.add_owned_type(doc, point).unwrap();
        graph.resolve_inheritance().unwrap();
        graph
            .add_field(point, FieldNode::new("a", ValueType::Int))
            .unwrap();
        graph
            .add_field(point, FieldNode::new("b", ValueType::String))
            .unwrap();
        (graph, doc)
    }

    #[test]
    fn test_array_of_struct_decomposes_into_members() {
        let (graph, doc) = graph_with_point_struct();
        let mut field = FieldNode::new(
            "points",
            ValueType::Array(Box::new(ValueType::Struct("point".to_string()))),
        );
        populate_struct_fields(&graph, doc, &mut field, 0).unwrap();

        assert_eq!(field.struct_fields.len(), 2);
        assert_eq!(field.struct_fields[0].name, "points.a");
        assert_eq!(field.struct_fields[0].value_type, ValueType::Int);
        assert_eq!(field.struct_fields[1].name, "points.b");
        assert_eq!(field.struct_fields[1].value_type, ValueType::String);
    }

    #[test]
    fn test_repopulation_is_idempotent() {
        let (graph, doc) = graph_with_point_struct();
        let mut field = FieldNode::new("points", ValueType::Struct("point".to_string()));
        populate_struct_fields(&graph, doc, &mut field, 0).unwrap();
        let first = field.struct_fields.clone();
        populate_struct_fields(&graph, doc, &mut field, 0).unwrap();
        assert_eq!(field.struct_fields, first);
    }

    #[test]
    fn test_map_decomposes_into_key_and_value() {
        let graph = DocumentGraph::new();
        let mut field = FieldNode::new(
            "prices",
            ValueType::Map {
                key: Box::new(ValueType::String),
                value: Box::new(ValueType::Long),
            },
        );
        field.indexing = IndexingStatement::from_kinds([ExpressionKind::WritesAttribute]);
        populate_struct_fields(&graph, graph.base(), &mut field, 0).unwrap();

        assert_eq!(field.struct_fields.len(), 2);
        let key = field.struct_field("key").unwrap();
        let value = field.struct_field("value").unwrap();
        assert_eq!(key.name, "prices.key");
        assert_eq!(key.value_type, ValueType::String);
        assert_eq!(value.value_type, ValueType::Long);
        // the map's indexing carries into its entries
        assert!(key.attribute("prices.key").is_some());
        assert!(value.attribute("prices.value").is_some());
    }

    #[test]
    fn test_struct_member_can_use_sibling_struct() {
        let mut graph = DocumentGraph::new();
        let doc = graph.register_document("music").unwrap();
        let credit = graph.create_struct("credit");
        let person = graph.create_struct("person");
        graph.add_owned_type(doc, credit).unwrap();
        graph.add_owned_type(doc, person).unwrap();
        graph.resolve_inheritance().unwrap();
        graph
            .add_field(person, FieldNode::new("name", ValueType::String))
            .unwrap();
        graph
            .add_field(
                credit,
                FieldNode::new("who", ValueType::Struct("person".to_string())),
            )
            .unwrap();

        let mut field = FieldNode::new(
            "credits",
            ValueType::Array(Box::new(ValueType::Struct("credit".to_string()))),
        );
        populate_struct_fields(&graph, doc, &mut field, 0).unwrap();
        let who = field.struct_field("who").unwrap();
        assert_eq!(who.struct_field("name").unwrap().name, "credits.who.name");
    }

    #[test]
    fn test_missing_struct_type_is_an_error() {
        let graph = DocumentGraph::new();
        let mut field = FieldNode::new("position", ValueType::Struct("nowhere".to_string()));
        let result = populate_struct_fields(&graph, graph.base(), &mut field, 0);
        assert!(matches!(result, Err(SchemaError::UnknownStructType { .. })));
    }

    #[test]
    fn test_nesting_past_limit_is_rejected() {
        // eleven levels of map nesting; the innermost levels are past the
        // bound
        let mut value_type = ValueType::Map {
            key: Box::new(ValueType::String),
            value: Box::new(ValueType::Int),
        };
        for _ in 0..10 {
            value_type = ValueType::Map {
                key: Box::new(ValueType::String),
                value: Box::new(value_type),
            };
        }
        let graph = DocumentGraph::new();
        let mut field = FieldNode::new("deep", value_type);
        let result = populate_struct_fields(&graph, graph.base(), &mut field, 0);
        assert!(matches!(result, Err(SchemaError::NestingTooDeep { .. })));
    }

    #[test]
    fn test_nesting_at_limit_is_accepted() {
        let mut value_type = ValueType::Map {
            key: Box::new(ValueType::String),
            value: Box::new(ValueType::Int),
        };
        for _ in 0..9 {
            value_type = ValueType::Map {
                key: Box::new(ValueType::String),
                value: Box::new(value_type),
            };
        }
        let graph = DocumentGraph::new();
        let mut field = FieldNode::new("deep", value_type);
        populate_struct_fields(&graph, graph.base(), &mut field, 0).unwrap();
    }

    #[test]
    fn test_matching_propagates_from_parent_field() {
        let (graph, doc) = graph_with_point_struct();
        let mut field = FieldNode::new("points", ValueType::Struct("point".to_string()))
            .with_matching(Matching::new().with_match_type(MatchType::Exact));
        populate_struct_fields(&graph, doc, &mut field, 0).unwrap();
        let parent = field.matching.clone();
        populate_struct_matching(&graph, doc, &mut field, Some(&parent)).unwrap();

        for child in &field.struct_fields {
            assert_eq!(child.matching.effective_type(), MatchType::Exact);
        }
    }

    #[test]
    fn test_member_matching_overrides_parent() {
        let mut graph = DocumentGraph::new();
        let doc = graph.register_document("music").unwrap();
        let point = graph.create_struct("point");
        graph.add_owned_type(doc, point).unwrap();
        graph.resolve_inheritance().unwrap();
        graph
            .add_field(
                point,
                FieldNode::new("a", ValueType::String).with_matching(
                    Matching::new().with_algorithm(MatchAlgorithm::Prefix),
                ),
            )
            .unwrap();

        let mut field = FieldNode::new("points", ValueType::Struct("point".to_string()))
            .with_matching(Matching::new().with_match_type(MatchType::Word));
        populate_struct_fields(&graph, doc, &mut field, 0).unwrap();
        let parent = field.matching.clone();
        populate_struct_matching(&graph, doc, &mut field, Some(&parent)).unwrap();

        let child = field.struct_field("a").unwrap();
        // parent contributed the type, the member its algorithm
        assert_eq!(child.matching.effective_type(), MatchType::Word);
        assert_eq!(child.matching.effective_algorithm(), MatchAlgorithm::Prefix);
    }

    #[test]
    fn test_matching_recompute_overwrites_children() {
        let (graph, doc) = graph_with_point_struct();
        let mut field = FieldNode::new("points", ValueType::Struct("point".to_string()));
        populate_struct_fields(&graph, doc, &mut field, 0).unwrap();
        populate_struct_matching(
            &graph,
            doc,
            &mut field,
            Some(&Matching::new().with_match_type(MatchType::Word)),
        )
        .unwrap();
        assert_eq!(
            field.struct_fields[0].matching.effective_type(),
            MatchType::Word
        );

        // recompute with different parent settings, structure untouched
        let before: Vec<String> = field.struct_fields.iter().map(|f| f.name.clone()).collect();
        populate_struct_matching(
            &graph,
            doc,
            &mut field,
            Some(&Matching::new().with_match_type(MatchType::Exact)),
        )
        .unwrap();
        let after: Vec<String> = field.struct_fields.iter().map(|f| f.name.clone()).collect();
        assert_eq!(before, after);
        assert_eq!(
            field.struct_fields[0].matching.effective_type(),
            MatchType::Exact
        );
    }
}
