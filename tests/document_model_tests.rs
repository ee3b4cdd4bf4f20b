//! End-to-end tests for document-model construction.
//!
//! These drive the public API the way a schema pipeline would: declarations
//! arrive as JSON, the interpreter builds the graph, and the resolved model
//! is inspected through the registry.

use docfold::schema::decompose::{populate_struct_fields, populate_struct_matching};
use docfold::{
    AttributeType, CollectionType, MatchType, ModelInterpreter, SchemaError, ValueType,
};
use std::io::Write;

/// A three-generation family of document types, a referenced shop pair,
/// and one standalone type.
fn family_and_shop_json() -> &'static str {
    r#"[
        {"name": "grand_parent",
         "fields": [{"name": "family_name", "type": "string", "indexing": ["attribute", "summary"]}]},
        {"name": "mother", "inherits": ["grand_parent"],
         "fields": [{"name": "mother_name", "type": "string"}]},
        {"name": "father", "inherits": ["grand_parent"],
         "fields": [{"name": "father_name", "type": "string"}]},
        {"name": "daughter", "inherits": ["mother", "father"],
         "fields": [{"name": "nickname", "type": "string"}]},
        {"name": "son", "inherits": ["mother", "father"]},
        {"name": "product",
         "fields": [{"name": "price", "type": "long", "indexing": ["attribute"]}]},
        {"name": "pc",
         "fields": [{"name": "product_ref", "type": "reference<product>"}],
         "imports": [{"local_name": "product_price",
                      "reference_field": "product_ref",
                      "target_field": "price"}]},
        {"name": "alone"}
    ]"#
}

#[test]
fn test_family_model_builds_and_orders() {
    let _ = env_logger::builder().is_test(true).try_init();
    let model = ModelInterpreter::new()
        .interpret_str(family_and_shop_json())
        .unwrap();

    // already-valid declaration order comes back unchanged
    assert_eq!(
        model.ordered_names(),
        vec![
            "grand_parent",
            "mother",
            "father",
            "daughter",
            "son",
            "product",
            "pc",
            "alone"
        ]
    );
}

#[test]
fn test_inherited_fields_are_visible_on_subtypes() {
    let model = ModelInterpreter::new()
        .interpret_str(family_and_shop_json())
        .unwrap();
    let graph = &model.graph;

    let daughter = graph.lookup("daughter").unwrap();
    let names: Vec<_> = graph
        .field_set(daughter)
        .iter()
        .map(|field| field.name.clone())
        .collect();
    // own field first, then inherited ones, the diamond root exactly once
    assert_eq!(
        names,
        vec!["nickname", "mother_name", "family_name", "father_name"]
    );
}

#[test]
fn test_diamond_ancestors_appear_once() {
    let model = ModelInterpreter::new()
        .interpret_str(family_and_shop_json())
        .unwrap();
    let graph = &model.graph;

    let son = graph.lookup("son").unwrap();
    let grand_parent = graph.lookup("grand_parent").unwrap();
    let all = graph.all_types(son);
    assert_eq!(all.iter().filter(|&&id| id == grand_parent).count(), 1);
}

#[test]
fn test_imported_field_forwards_to_target() {
    let model = ModelInterpreter::new()
        .interpret_str(family_and_shop_json())
        .unwrap();

    let pc = model.document("pc").unwrap();
    let import = pc.resolved_import("product_price").unwrap();
    assert_eq!(import.name(), "product_price");
    assert_eq!(import.value_type(&model.graph).unwrap(), &ValueType::Long);
    let attributes = import.attributes(&model.graph).unwrap();
    assert_eq!(
        attributes["price"].attribute_type,
        AttributeType::Long
    );
    assert!(matches!(
        import.indexing(),
        Err(SchemaError::UnsupportedImportedOperation { .. })
    ));
}

#[test]
fn test_struct_and_map_fields_decompose() {
    let json = r#"[
        {"name": "music",
         "structs": [
             {"name": "artist",
              "fields": [
                  {"name": "stage_name", "type": "string",
                   "matching": {"algorithm": "prefix"}},
                  {"name": "royalty_share", "type": "float"}
              ]}
         ],
         "fields": [
             {"name": "artists", "type": "array<artist>",
              "matching": {"match_type": "exact"}},
             {"name": "sales_by_country", "type": "map<string,long>",
              "indexing": ["attribute"]}
         ]}
    ]"#;
    let model = ModelInterpreter::new().interpret_str(json).unwrap();
    let music = model.document("music").unwrap();

    let artists = music.field("artists").unwrap();
    assert_eq!(artists.struct_fields.len(), 2);
    let stage_name = artists.struct_field("stage_name").unwrap();
    assert_eq!(stage_name.name, "artists.stage_name");
    // the field's matching propagated in, the member kept its algorithm
    assert_eq!(stage_name.matching.effective_type(), MatchType::Exact);
    assert_eq!(
        stage_name.matching.effective_algorithm(),
        docfold::MatchAlgorithm::Prefix
    );

    let sales = music.field("sales_by_country").unwrap();
    let key = sales.struct_field("key").unwrap();
    let value = sales.struct_field("value").unwrap();
    assert_eq!(key.value_type, ValueType::String);
    assert_eq!(value.value_type, ValueType::Long);
    let value_attribute = value.attribute("sales_by_country.value").unwrap();
    assert_eq!(value_attribute.attribute_type, AttributeType::Long);
    assert_eq!(value_attribute.collection, CollectionType::Single);
}

#[test]
fn test_matching_recompute_without_structure_rebuild() {
    let json = r#"[
        {"name": "music",
         "structs": [
             {"name": "artist",
              "fields": [{"name": "stage_name", "type": "string"}]}
         ],
         "fields": [{"name": "artists", "type": "array<artist>"}]}
    ]"#;
    let model = ModelInterpreter::new().interpret_str(json).unwrap();
    let mut graph = model.graph;
    let music = graph.lookup("music").unwrap();

    // simulate a supertype change by recomputing matching with new parent
    // settings; the structure pass is not re-run
    let mut fields = std::mem::take(&mut graph.get_mut(music).fields);
    let parent = docfold::Matching::new().with_match_type(MatchType::Word);
    for field in &mut fields {
        populate_struct_matching(&graph, music, field, Some(&parent)).unwrap();
    }
    graph.get_mut(music).fields = fields;

    let artists = graph.get(music).field("artists").unwrap();
    assert_eq!(
        artists.struct_field("stage_name").unwrap().matching.effective_type(),
        MatchType::Word
    );
}

#[test]
fn test_repopulating_structure_is_idempotent() {
    let json = r#"[
        {"name": "music",
         "structs": [
             {"name": "artist",
              "fields": [{"name": "stage_name", "type": "string"}]}
         ],
         "fields": [{"name": "artists", "type": "array<artist>"}]}
    ]"#;
    let model = ModelInterpreter::new().interpret_str(json).unwrap();
    let mut graph = model.graph;
    let music = graph.lookup("music").unwrap();

    let mut fields = std::mem::take(&mut graph.get_mut(music).fields);
    let before = fields.clone();
    for field in &mut fields {
        populate_struct_fields(&graph, music, field, 0).unwrap();
    }
    assert_eq!(fields, before);
}

#[test]
fn test_conflicting_redeclaration_rejects_whole_unit() {
    let json = r#"[
        {"name": "parent",
         "fields": [{"name": "year", "type": "int"}]},
        {"name": "child", "inherits": ["parent"],
         "fields": [{"name": "year", "type": "string"}]}
    ]"#;
    let result = ModelInterpreter::new().interpret_str(json);
    assert!(matches!(
        result,
        Err(SchemaError::FieldTypeMismatch { .. })
    ));
}

#[test]
fn test_missing_import_target_rejects_whole_unit() {
    let json = r#"[
        {"name": "product",
         "fields": [{"name": "price", "type": "long"}]},
        {"name": "pc",
         "fields": [{"name": "product_ref", "type": "reference<product>"}],
         "imports": [{"local_name": "product_weight",
                      "reference_field": "product_ref",
                      "target_field": "weight"}]}
    ]"#;
    let result = ModelInterpreter::new().interpret_str(json);
    assert!(matches!(result, Err(SchemaError::UnresolvedImport { .. })));
}

#[test]
fn test_interpret_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(family_and_shop_json().as_bytes()).unwrap();

    let model = ModelInterpreter::new()
        .interpret_file(file.path().to_str().unwrap())
        .unwrap();
    assert_eq!(model.report.document_types.len(), 8);
}

#[test]
fn test_registries_are_independent() {
    let interpreter = ModelInterpreter::new();
    let first = interpreter.interpret_str(family_and_shop_json()).unwrap();
    let second = interpreter
        .interpret_str(r#"[{"name": "alone"}]"#)
        .unwrap();

    // each unit gets its own base document root
    assert!(first.graph.lookup("grand_parent").is_some());
    assert!(second.graph.lookup("grand_parent").is_none());
    assert_eq!(second.graph.len(), 2);
}
