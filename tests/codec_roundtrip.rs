//! Codec Round-Trip Tests
//!
//! End-to-end serialize/parse/validate behavior:
//! - Emitted key order equals field declaration order
//! - Parse is fail-fast and never yields a partial instance
//! - A valueless optional is omitted, unless a Default supplies a value
//! - A passthrough map splices its entries as sibling keys
//! - Nested and self-referential records round-trip at any depth

use std::collections::BTreeMap;

use serde_json::json;
use treeform::{is_valid, parse, register, serialize, Constraint, Describe, SchemaConfig};

// =============================================================================
// Record Types Under Test
// =============================================================================

treeform::record! {
    #[derive(Debug, Clone, PartialEq)]
    struct Plain {
        field1: i64,
        field2: i64,
    }
}

impl Describe for Plain {
    fn config() -> SchemaConfig<Self> {
        SchemaConfig::new()
    }
}

treeform::record! {
    #[derive(Debug, Clone, PartialEq)]
    struct Session {
        field1: Option<i64>,
        field2: Option<i64>,
        field3: Option<i64>,
    }
}

impl Describe for Session {
    fn config() -> SchemaConfig<Self> {
        SchemaConfig::new().with("field1", [Constraint::default_value(114)])
    }
}

treeform::record! {
    #[derive(Debug, Clone, PartialEq)]
    struct Extras {
        data: BTreeMap<String, i64>,
    }
}

impl Describe for Extras {
    fn config() -> SchemaConfig<Self> {
        SchemaConfig::from_layout([vec![Constraint::Additional]])
    }
}

treeform::record! {
    #[derive(Debug, Clone, PartialEq)]
    struct Labeled {
        name: String,
        rest: BTreeMap<String, i64>,
    }
}

impl Describe for Labeled {
    fn config() -> SchemaConfig<Self> {
        SchemaConfig::new().with("rest", [Constraint::Additional])
    }
}

treeform::record! {
    #[derive(Debug, Clone, PartialEq)]
    struct Node {
        value: i64,
        children: Vec<Node>,
    }
}

impl Describe for Node {
    fn config() -> SchemaConfig<Self> {
        SchemaConfig::new()
    }
}

// =============================================================================
// Basic Records
// =============================================================================

#[test]
fn test_serialize_keeps_declaration_order() {
    register::<Plain>().unwrap();
    let tree = serialize(&Plain {
        field1: 10,
        field2: 100,
    })
    .unwrap();
    assert_eq!(tree.to_string(), r#"{"field1":10,"field2":100}"#);
}

#[test]
fn test_parse_basic() {
    let parsed: Plain = parse(&json!({"field1": 10, "field2": 100})).unwrap();
    assert_eq!(
        parsed,
        Plain {
            field1: 10,
            field2: 100
        }
    );
}

#[test]
fn test_parse_missing_required_field_fails() {
    let result: Result<Plain, _> = parse(&json!({"field1": 10, "field3": 100}));
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("field2"));
}

#[test]
fn test_parse_mismatched_required_field_fails() {
    let result: Result<Plain, _> = parse(&json!({"field1": 10, "field2": "100"}));
    assert!(result.is_err());
}

#[test]
fn test_parse_rejects_non_objects() {
    assert!(parse::<Plain>(&json!(null)).is_err());
    assert!(parse::<Plain>(&json!([10, 100])).is_err());
    assert!(!is_valid::<Plain>(&json!(null)));
}

#[test]
fn test_roundtrip_basic() {
    let original = Plain {
        field1: -3,
        field2: 7,
    };
    let parsed: Plain = parse(&serialize(&original).unwrap()).unwrap();
    assert_eq!(parsed, original);
}

// =============================================================================
// Optionals and Defaults
// =============================================================================

#[test]
fn test_valueless_optional_with_default_emits_default() {
    register::<Session>().unwrap();
    let tree = serialize(&Session {
        field1: None,
        field2: Some(100),
        field3: None,
    })
    .unwrap();
    assert_eq!(tree, json!({"field1": 114, "field2": 100}));
}

#[test]
fn test_parse_empty_object_applies_default() {
    let parsed: Session = parse(&json!({})).unwrap();
    assert_eq!(
        parsed,
        Session {
            field1: Some(114),
            field2: None,
            field3: None,
        }
    );
}

#[test]
fn test_omitted_optional_roundtrips_to_no_value() {
    let original = Session {
        field1: Some(1),
        field2: None,
        field3: None,
    };
    let tree = serialize(&original).unwrap();
    assert_eq!(tree, json!({"field1": 1}));
    let parsed: Session = parse(&tree).unwrap();
    assert_eq!(parsed, original);
}

#[test]
fn test_optional_tolerates_mismatch_and_null() {
    // A mismatched optional reads as "no value", so the default fires.
    let parsed: Session = parse(&json!({"field1": "not a number"})).unwrap();
    assert_eq!(parsed.field1, Some(114));

    let parsed: Session = parse(&json!({"field1": null, "field2": null})).unwrap();
    assert_eq!(parsed.field1, Some(114));
    assert_eq!(parsed.field2, None);
}

// =============================================================================
// Passthrough Maps
// =============================================================================

#[test]
fn test_passthrough_splices_entries_without_wrapper_key() {
    register::<Extras>().unwrap();
    let mut data = BTreeMap::new();
    data.insert("data1".to_owned(), 1);
    data.insert("data2".to_owned(), 2);
    let tree = serialize(&Extras { data: data.clone() }).unwrap();
    assert_eq!(tree, json!({"data1": 1, "data2": 2}));

    let parsed: Extras = parse(&tree).unwrap();
    assert_eq!(parsed, Extras { data });
}

#[test]
fn test_passthrough_collects_only_unclaimed_keys() {
    register::<Labeled>().unwrap();
    let parsed: Labeled = parse(&json!({"name": "x", "a": 1, "b": 2})).unwrap();
    assert_eq!(parsed.name, "x");
    assert_eq!(parsed.rest.len(), 2);
    assert_eq!(parsed.rest["a"], 1);
    assert!(!parsed.rest.contains_key("name"));
}

#[test]
fn test_passthrough_splice_sits_at_field_position() {
    let mut rest = BTreeMap::new();
    rest.insert("a".to_owned(), 1);
    let tree = serialize(&Labeled {
        name: "x".to_owned(),
        rest,
    })
    .unwrap();
    assert_eq!(tree.to_string(), r#"{"name":"x","a":1}"#);
}

#[test]
fn test_passthrough_entry_conversion_failure_aborts_parse() {
    let result: Result<Labeled, _> = parse(&json!({"name": "x", "a": "nope"}));
    assert!(result.is_err());
    assert!(!is_valid::<Labeled>(&json!({"name": "x", "a": "nope"})));
}

// =============================================================================
// Nested and Recursive Records
// =============================================================================

#[test]
fn test_recursive_record_roundtrip() {
    register::<Node>().unwrap();
    let original = Node {
        value: 1,
        children: vec![Node {
            value: 2,
            children: vec![],
        }],
    };
    let tree = serialize(&original).unwrap();
    assert_eq!(
        tree,
        json!({"value": 1, "children": [{"value": 2, "children": []}]})
    );
    let parsed: Node = parse(&tree).unwrap();
    assert_eq!(parsed, original);
}

#[test]
fn test_nested_violation_aborts_top_level_parse() {
    // A mismatch two levels down fails the whole parse.
    let tree = json!({"value": 1, "children": [{"value": "two", "children": []}]});
    assert!(parse::<Node>(&tree).is_err());
    assert!(!is_valid::<Node>(&tree));
}
