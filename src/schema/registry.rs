//! The document type registry.
//!
//! [`DocumentGraph`] owns every document and struct type of one compilation
//! unit in an index-addressed arena. Construction is two-phase: while
//! declarations are read, inheritance edges are recorded by name
//! ([`DocumentGraph::inherit`]); [`DocumentGraph::resolve_inheritance`]
//! later resolves every edge to a concrete [`DocTypeId`], failing fast on
//! anything unresolved. A registry belongs to a single compilation unit and
//! a single thread; independent units use independent registries.

use log::{debug, info};
use std::collections::HashMap;
use std::collections::HashSet;

use super::types::{
    DocTypeId, DocumentType, FieldNode, ImportedField, ResolvedImportedField, SchemaError,
    TypeKind, ValueType,
};

/// Name of the well-known root every document type ultimately inherits.
pub const BASE_DOCUMENT_NAME: &str = "document";

#[derive(Debug, Clone)]
pub struct DocumentGraph {
    types: Vec<DocumentType>,
    /// Top-level document types by name; nested structs are reachable only
    /// through their owner
    by_name: HashMap<String, DocTypeId>,
    base: DocTypeId,
}

impl DocumentGraph {
    /// Creates an empty registry holding only the base document root.
    ///
    /// The root is per-registry, never shared between registries.
    #[must_use]
    pub fn new() -> Self {
        let mut graph = Self {
            types: Vec::new(),
            by_name: HashMap::new(),
            base: DocTypeId(0),
        };
        let base = graph.push(DocumentType::new(BASE_DOCUMENT_NAME, TypeKind::Document));
        graph.by_name.insert(BASE_DOCUMENT_NAME.to_string(), base);
        graph.base = base;
        graph
    }

    /// The base document root of this registry.
    pub fn base(&self) -> DocTypeId {
        self.base
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn get(&self, id: DocTypeId) -> &DocumentType {
        &self.types[id.0]
    }

    pub fn get_mut(&mut self, id: DocTypeId) -> &mut DocumentType {
        &mut self.types[id.0]
    }

    /// Looks up a top-level document type by name.
    pub fn lookup(&self, name: &str) -> Option<DocTypeId> {
        self.by_name.get(name).copied()
    }

    pub fn ids(&self) -> impl Iterator<Item = DocTypeId> {
        (0..self.types.len()).map(DocTypeId)
    }

    /// Registers a top-level document type.
    ///
    /// # Errors
    /// Returns `SchemaError::DuplicateType` if the name is taken.
    pub fn register_document(&mut self, name: &str) -> Result<DocTypeId, SchemaError> {
        if self.by_name.contains_key(name) {
            return Err(SchemaError::DuplicateType {
                name: name.to_string(),
            });
        }
        let id = self.push(DocumentType::new(name, TypeKind::Document));
        self.by_name.insert(name.to_string(), id);
        debug!("registered document type '{}'", name);
        Ok(id)
    }

    /// Creates a struct type in the arena. The struct is not reachable by
    /// name until attached to an owner with [`DocumentGraph::add_owned_type`].
    pub fn create_struct(&mut self, name: &str) -> DocTypeId {
        self.push(DocumentType::new(name, TypeKind::Struct))
    }

    /// Attaches `child` as a nested type of `parent`.
    ///
    /// # Errors
    /// Returns `SchemaError::OwnedTypeNameCollision` if the child's name
    /// equals the parent's own name or is already reachable from the parent.
    pub fn add_owned_type(
        &mut self,
        parent: DocTypeId,
        child: DocTypeId,
    ) -> Result<(), SchemaError> {
        let child_name = self.get(child).name.clone();
        let parent_name = self.get(parent).name.clone();
        if child_name == parent_name || self.get_type(parent, &child_name).is_some() {
            return Err(SchemaError::OwnedTypeNameCollision {
                owner: parent_name,
                name: child_name,
            });
        }
        self.types[parent.0].owned_types.push(child);
        self.types[child.0].owner = Some(parent);
        Ok(())
    }

    /// Records an inheritance edge from `child` to the type named `parent`.
    /// Idempotent; the edge is resolved by
    /// [`DocumentGraph::resolve_inheritance`].
    pub fn inherit(&mut self, child: DocTypeId, parent: &str) {
        let node = &mut self.types[child.0];
        if !node.unresolved_inherits.iter().any(|name| name == parent) {
            node.unresolved_inherits.push(parent.to_string());
        }
    }

    /// Resolves every recorded inheritance edge to a concrete id and
    /// attaches the base root to document types with no supertype.
    ///
    /// Documents resolve before structs so that a struct inheriting a
    /// struct from a supertype document finds it through the owner's
    /// already-resolved scope.
    ///
    /// # Errors
    /// `SchemaError::UnresolvedInheritance` if a named supertype does not
    /// exist, `SchemaError::InheritanceCycle` if the resolved edges are
    /// cyclic.
    pub fn resolve_inheritance(&mut self) -> Result<(), SchemaError> {
        self.resolve_edges_for_kind(TypeKind::Document)?;
        self.check_acyclic()?;
        self.resolve_edges_for_kind(TypeKind::Struct)?;
        self.check_acyclic()?;

        for idx in 0..self.types.len() {
            let id = DocTypeId(idx);
            if id != self.base
                && self.types[idx].kind == TypeKind::Document
                && self.types[idx].inherited.is_empty()
            {
                let base = self.base;
                self.types[idx].inherited.push(base);
            }
        }
        info!(
            "resolved inheritance for {} types in registry",
            self.types.len()
        );
        Ok(())
    }

    fn resolve_edges_for_kind(&mut self, kind: TypeKind) -> Result<(), SchemaError> {
        for idx in 0..self.types.len() {
            if self.types[idx].kind != kind {
                continue;
            }
            let child = DocTypeId(idx);
            let pending = std::mem::take(&mut self.types[idx].unresolved_inherits);
            for parent_name in pending {
                let parent = self.resolve_parent(child, &parent_name).ok_or_else(|| {
                    SchemaError::UnresolvedInheritance {
                        child: self.types[idx].name.clone(),
                        parent: parent_name.clone(),
                    }
                })?;
                if parent == child {
                    return Err(SchemaError::InheritanceCycle {
                        name: self.types[idx].name.clone(),
                    });
                }
                let node = &mut self.types[idx];
                if !node.inherited.contains(&parent) {
                    node.inherited.push(parent);
                }
            }
        }
        Ok(())
    }

    /// A struct's supertype is searched in its owner's scope first; both
    /// kinds fall back to the top-level names.
    fn resolve_parent(&self, child: DocTypeId, name: &str) -> Option<DocTypeId> {
        if let Some(owner) = self.get(child).owner {
            if let Some(found) = self.get_type(owner, name) {
                return Some(found);
            }
        }
        self.lookup(name)
    }

    fn check_acyclic(&self) -> Result<(), SchemaError> {
        // 0 = unvisited, 1 = on the current path, 2 = done
        let mut state = vec![0u8; self.types.len()];
        for idx in 0..self.types.len() {
            self.visit_acyclic(DocTypeId(idx), &mut state)?;
        }
        Ok(())
    }

    fn visit_acyclic(&self, id: DocTypeId, state: &mut [u8]) -> Result<(), SchemaError> {
        match state[id.0] {
            1 => {
                return Err(SchemaError::InheritanceCycle {
                    name: self.get(id).name.clone(),
                })
            }
            2 => return Ok(()),
            _ => {}
        }
        state[id.0] = 1;
        for &parent in &self.get(id).inherited {
            self.visit_acyclic(parent, state)?;
        }
        state[id.0] = 2;
        Ok(())
    }

    /// Resolves a type name from the given scope: the scope's own nested
    /// types first, then each inherited type recursively in insertion
    /// order. First match wins.
    pub fn get_type(&self, scope: DocTypeId, name: &str) -> Option<DocTypeId> {
        let node = self.get(scope);
        for &owned in &node.owned_types {
            if self.get(owned).name == name {
                return Some(owned);
            }
        }
        for &parent in &node.inherited {
            if let Some(found) = self.get_type(parent, name) {
                return Some(found);
            }
        }
        None
    }

    /// Adds a declared field to a type.
    ///
    /// # Errors
    /// `SchemaError::DuplicateField` on a case-insensitive collision with a
    /// field on this type or an inherited one; `SchemaError::FieldTypeMismatch`
    /// if a supertype declares the same name with a different value type
    /// (an identically typed redeclaration is a legal shadow).
    pub fn add_field(&mut self, id: DocTypeId, field: FieldNode) -> Result<(), SchemaError> {
        self.check_new_field(id, &field)?;
        self.types[id.0].fields.push(field);
        Ok(())
    }

    fn check_new_field(&self, id: DocTypeId, field: &FieldNode) -> Result<(), SchemaError> {
        let node = self.get(id);
        for existing in &node.fields {
            if existing.name.eq_ignore_ascii_case(&field.name) {
                return Err(SchemaError::DuplicateField {
                    doc_type: node.name.clone(),
                    field: field.name.clone(),
                });
            }
        }
        for &parent in &node.inherited {
            for existing in self.field_set(parent) {
                if existing.name == field.name {
                    if existing.value_type != field.value_type {
                        return Err(SchemaError::FieldTypeMismatch {
                            doc_type: node.name.clone(),
                            field: field.name.clone(),
                            declared: field.value_type.to_string(),
                            inherited: existing.value_type.to_string(),
                        });
                    }
                } else if existing.name.eq_ignore_ascii_case(&field.name) {
                    return Err(SchemaError::DuplicateField {
                        doc_type: node.name.clone(),
                        field: field.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// The merged field set of a type: own fields first in declaration
    /// order, then inherited contributions in `inherited` insertion order,
    /// with own declarations winning on name collision. Diamond-inherited
    /// fields appear once.
    pub fn field_set(&self, id: DocTypeId) -> Vec<&FieldNode> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        self.collect_field_set(id, &mut out, &mut seen);
        out
    }

    fn collect_field_set<'a>(
        &'a self,
        id: DocTypeId,
        out: &mut Vec<&'a FieldNode>,
        seen: &mut HashSet<&'a str>,
    ) {
        let node = self.get(id);
        for field in &node.fields {
            if seen.insert(field.name.as_str()) {
                out.push(field);
            }
        }
        for &parent in &node.inherited {
            self.collect_field_set(parent, out, seen);
        }
    }

    /// Looks up a field by exact name on a type or, failing that, its
    /// supertypes in insertion order.
    pub fn lookup_field(&self, id: DocTypeId, name: &str) -> Option<&FieldNode> {
        let node = self.get(id);
        if let Some(field) = node.field(name) {
            return Some(field);
        }
        for &parent in &node.inherited {
            if let Some(field) = self.lookup_field(parent, name) {
                return Some(field);
            }
        }
        None
    }

    /// The type itself plus every transitively inherited type, each exactly
    /// once even when inheritance paths converge.
    pub fn all_types(&self, id: DocTypeId) -> Vec<DocTypeId> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        self.collect_all_types(id, &mut out, &mut seen);
        out
    }

    fn collect_all_types(
        &self,
        id: DocTypeId,
        out: &mut Vec<DocTypeId>,
        seen: &mut HashSet<DocTypeId>,
    ) {
        if !seen.insert(id) {
            return;
        }
        out.push(id);
        for &parent in &self.get(id).inherited {
            self.collect_all_types(parent, out, seen);
        }
    }

    /// Every type ordered so that supertypes precede their subtypes.
    pub fn inheritance_order(&self) -> Vec<DocTypeId> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        for idx in 0..self.types.len() {
            self.collect_inheritance_order(DocTypeId(idx), &mut out, &mut seen);
        }
        out
    }

    fn collect_inheritance_order(
        &self,
        id: DocTypeId,
        out: &mut Vec<DocTypeId>,
        seen: &mut HashSet<DocTypeId>,
    ) {
        if !seen.insert(id) {
            return;
        }
        for &parent in &self.get(id).inherited {
            self.collect_inheritance_order(parent, out, seen);
        }
        out.push(id);
    }

    /// Resolves every recorded imported-field declaration against the
    /// completed graph.
    ///
    /// # Errors
    /// `SchemaError::UnresolvedImport` when the reference field, the target
    /// document type, or the target field does not exist;
    /// `SchemaError::NotAReferenceField` when the named reference field has
    /// a non-reference value type. On any error no binding is stored.
    pub fn resolve_imported_fields(&mut self) -> Result<(), SchemaError> {
        let mut resolved_per_type = Vec::new();
        let mut total = 0usize;
        for idx in 0..self.types.len() {
            if self.types[idx].imported_fields.is_empty() {
                continue;
            }
            let owner = DocTypeId(idx);
            let mut resolved = Vec::new();
            for import in &self.types[idx].imported_fields {
                resolved.push(self.resolve_import(owner, import)?);
            }
            total += resolved.len();
            resolved_per_type.push((idx, resolved));
        }
        for (idx, resolved) in resolved_per_type {
            self.types[idx].resolved_imports = resolved;
        }
        if total > 0 {
            info!("resolved {} imported fields", total);
        }
        Ok(())
    }

    fn resolve_import(
        &self,
        owner: DocTypeId,
        import: &ImportedField,
    ) -> Result<ResolvedImportedField, SchemaError> {
        let owner_name = &self.get(owner).name;
        let unresolved = |reason: String| SchemaError::UnresolvedImport {
            doc_type: owner_name.clone(),
            local_name: import.local_name.clone(),
            reason,
        };

        let reference_field = self
            .lookup_field(owner, &import.reference_field)
            .ok_or_else(|| {
                unresolved(format!(
                    "reference field '{}' does not exist",
                    import.reference_field
                ))
            })?;
        let target_name = match &reference_field.value_type {
            ValueType::Reference(target) => target.clone(),
            _ => {
                return Err(SchemaError::NotAReferenceField {
                    doc_type: owner_name.clone(),
                    field: import.reference_field.clone(),
                })
            }
        };
        let target_type = self
            .lookup(&target_name)
            .ok_or_else(|| unresolved(format!("document type '{target_name}' does not exist")))?;
        if self.lookup_field(target_type, &import.target_field).is_none() {
            return Err(unresolved(format!(
                "field '{}' does not exist on '{}'",
                import.target_field, target_name
            )));
        }
        Ok(ResolvedImportedField {
            local_name: import.local_name.clone(),
            reference_field: import.reference_field.clone(),
            target_type,
            target_field: import.target_field.clone(),
        })
    }

    fn push(&mut self, node: DocumentType) -> DocTypeId {
        let id = DocTypeId(self.types.len());
        self.types.push(node);
        id
    }
}

impl Default for DocumentGraph {
    fn default() -> Self {
        Self::new()
    }
}
