//! Deterministic processing order for document types.
//!
//! Dependencies come from two independent sources: inheritance edges and
//! reference fields (collected recursively through collection, map, and
//! nested struct shapes). The sort is a stable variant of Kahn's algorithm:
//! at each step the ready type earliest in the original input is emitted,
//! so an already-valid input comes back unchanged and only violating types
//! move.

use log::debug;
use std::collections::HashSet;

use super::registry::DocumentGraph;
use super::types::{DocTypeId, SchemaError};

/// Orders `input` so every dependency precedes its dependents.
///
/// Dependencies outside the input sequence are ignored.
///
/// # Errors
/// Returns `SchemaError::OrderingCycle` naming the stuck types when no
/// progress can be made.
pub fn order_types(
    graph: &DocumentGraph,
    input: &[DocTypeId],
) -> Result<Vec<DocTypeId>, SchemaError> {
    let input_set: HashSet<DocTypeId> = input.iter().copied().collect();
    let dependencies: Vec<Vec<DocTypeId>> = input
        .iter()
        .map(|&id| collect_dependencies(graph, id, &input_set))
        .collect();

    let mut remaining: Vec<(DocTypeId, Vec<DocTypeId>)> =
        input.iter().copied().zip(dependencies).collect();
    let mut emitted: HashSet<DocTypeId> = HashSet::new();
    let mut result = Vec::with_capacity(input.len());

    while !remaining.is_empty() {
        let ready = remaining
            .iter()
            .position(|(_, deps)| deps.iter().all(|dep| emitted.contains(dep)));
        match ready {
            Some(index) => {
                let (id, _) = remaining.remove(index);
                emitted.insert(id);
                result.push(id);
            }
            None => {
                let names = remaining
                    .iter()
                    .map(|(id, _)| graph.get(*id).name.clone())
                    .collect();
                return Err(SchemaError::OrderingCycle { names });
            }
        }
    }

    debug!(
        "ordered {} document types: {:?}",
        result.len(),
        result
            .iter()
            .map(|&id| graph.get(id).name.as_str())
            .collect::<Vec<_>>()
    );
    Ok(result)
}

/// Inheritance edges plus reference targets, restricted to the input set.
fn collect_dependencies(
    graph: &DocumentGraph,
    id: DocTypeId,
    input_set: &HashSet<DocTypeId>,
) -> Vec<DocTypeId> {
    let mut deps = Vec::new();
    for &parent in &graph.get(id).inherited {
        push_dependency(&mut deps, parent, id, input_set);
    }
    let mut reference_names = Vec::new();
    collect_reference_names(graph, id, &mut reference_names, &mut HashSet::new());
    for name in reference_names {
        if let Some(target) = graph.lookup(&name) {
            push_dependency(&mut deps, target, id, input_set);
        }
    }
    deps
}

fn push_dependency(
    deps: &mut Vec<DocTypeId>,
    dep: DocTypeId,
    dependent: DocTypeId,
    input_set: &HashSet<DocTypeId>,
) {
    if dep != dependent && input_set.contains(&dep) && !deps.contains(&dep) {
        deps.push(dep);
    }
}

/// Reference targets from a type's own fields and, recursively, the fields
/// of its nested struct types.
fn collect_reference_names(
    graph: &DocumentGraph,
    id: DocTypeId,
    out: &mut Vec<String>,
    visited: &mut HashSet<DocTypeId>,
) {
    if !visited.insert(id) {
        return;
    }
    let node = graph.get(id);
    for field in &node.fields {
        field.value_type.collect_references(out);
    }
    for &owned in &node.owned_types {
        collect_reference_names(graph, owned, out, visited);
    }
}
