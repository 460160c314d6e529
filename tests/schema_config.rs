//! Schema Configuration Tests
//!
//! The static configuration channel: every malformed configuration is
//! rejected at registration, before any instance flows through an engine,
//! and the engines fail closed for a type whose configuration is rejected.

use std::collections::BTreeMap;

use serde_json::json;
use treeform::{
    is_valid, parse, register, serialize, Constraint, Describe, EncodeError, ParseError,
    SchemaConfig, SchemaError,
};

// =============================================================================
// Record Types Under Test
// =============================================================================

treeform::record! {
    #[derive(Debug, Clone, PartialEq)]
    struct WellFormed {
        name: String,
        count: i64,
    }
}

impl Describe for WellFormed {
    fn config() -> SchemaConfig<Self> {
        SchemaConfig::new().with("count", [Constraint::min(0)])
    }
}

treeform::record! {
    #[derive(Debug, Clone, PartialEq)]
    struct MisnamedField {
        count: i64,
    }
}

impl Describe for MisnamedField {
    fn config() -> SchemaConfig<Self> {
        // "cuont" does not exist; this must never alias to another field.
        SchemaConfig::new().with("cuont", [Constraint::min(0)])
    }
}

treeform::record! {
    #[derive(Debug, Clone, PartialEq)]
    struct BadIndex {
        count: i64,
    }
}

impl Describe for BadIndex {
    fn config() -> SchemaConfig<Self> {
        SchemaConfig::new().with_index(3, [Constraint::min(0)])
    }
}

treeform::record! {
    #[derive(Debug, Clone, PartialEq)]
    struct ShortLayout {
        a: i64,
        b: i64,
    }
}

impl Describe for ShortLayout {
    fn config() -> SchemaConfig<Self> {
        SchemaConfig::from_layout([vec![Constraint::min(0)]])
    }
}

treeform::record! {
    #[derive(Debug, Clone, PartialEq)]
    struct BadPattern {
        text: String,
    }
}

impl Describe for BadPattern {
    fn config() -> SchemaConfig<Self> {
        SchemaConfig::new().with("text", [Constraint::pattern("(")])
    }
}

treeform::record! {
    #[derive(Debug, Clone, PartialEq)]
    struct PatternOnInt {
        count: i64,
    }
}

impl Describe for PatternOnInt {
    fn config() -> SchemaConfig<Self> {
        SchemaConfig::new().with("count", [Constraint::pattern("[0-9]+")])
    }
}

treeform::record! {
    #[derive(Debug, Clone, PartialEq)]
    struct DefaultOnRequired {
        count: i64,
    }
}

impl Describe for DefaultOnRequired {
    fn config() -> SchemaConfig<Self> {
        SchemaConfig::new().with("count", [Constraint::default_value(7)])
    }
}

treeform::record! {
    #[derive(Debug, Clone, PartialEq)]
    struct AdditionalOnScalar {
        count: i64,
    }
}

impl Describe for AdditionalOnScalar {
    fn config() -> SchemaConfig<Self> {
        SchemaConfig::new().with("count", [Constraint::Additional])
    }
}

treeform::record! {
    #[derive(Debug, Clone, PartialEq)]
    struct TwoPassthroughs {
        first: BTreeMap<String, i64>,
        second: BTreeMap<String, i64>,
    }
}

impl Describe for TwoPassthroughs {
    fn config() -> SchemaConfig<Self> {
        SchemaConfig::from_layout([vec![Constraint::Additional], vec![Constraint::Additional]])
    }
}

treeform::record! {
    #[derive(Debug, Clone, PartialEq)]
    struct MistypedDefault {
        count: Option<i64>,
    }
}

impl Describe for MistypedDefault {
    fn config() -> SchemaConfig<Self> {
        SchemaConfig::new().with("count", [Constraint::default_value("seven")])
    }
}

treeform::record! {
    #[derive(Debug, Clone, PartialEq)]
    struct BoundOnString {
        text: String,
    }
}

impl Describe for BoundOnString {
    fn config() -> SchemaConfig<Self> {
        SchemaConfig::new().with("text", [Constraint::min(1)])
    }
}

treeform::record! {
    #[derive(Debug, Clone, PartialEq)]
    struct ItemsOnScalar {
        count: i64,
    }
}

impl Describe for ItemsOnScalar {
    fn config() -> SchemaConfig<Self> {
        SchemaConfig::new().with("count", [Constraint::items([Constraint::min(1)])])
    }
}

// =============================================================================
// Registration
// =============================================================================

#[test]
fn test_well_formed_config_registers_and_is_idempotent() {
    assert!(register::<WellFormed>().is_ok());
    assert!(register::<WellFormed>().is_ok());
}

#[test]
fn test_unknown_field_name_is_a_hard_error() {
    match register::<MisnamedField>() {
        Err(SchemaError::UnknownField { record, name }) => {
            assert_eq!(record, "MisnamedField");
            assert_eq!(name, "cuont");
        }
        other => panic!("expected UnknownField, got {other:?}"),
    }
}

#[test]
fn test_index_out_of_range() {
    match register::<BadIndex>() {
        Err(SchemaError::IndexOutOfRange { index, count, .. }) => {
            assert_eq!(index, 3);
            assert_eq!(count, 1);
        }
        other => panic!("expected IndexOutOfRange, got {other:?}"),
    }
}

#[test]
fn test_layout_length_mismatch() {
    match register::<ShortLayout>() {
        Err(SchemaError::FieldCountMismatch {
            count, supplied, ..
        }) => {
            assert_eq!(count, 2);
            assert_eq!(supplied, 1);
        }
        other => panic!("expected FieldCountMismatch, got {other:?}"),
    }
}

#[test]
fn test_invalid_pattern_text() {
    match register::<BadPattern>() {
        Err(SchemaError::InvalidPattern { pattern, .. }) => assert_eq!(pattern, "("),
        other => panic!("expected InvalidPattern, got {other:?}"),
    }
}

#[test]
fn test_misapplied_constraints() {
    assert!(matches!(
        register::<PatternOnInt>(),
        Err(SchemaError::NotApplicable {
            constraint: "Pattern",
            ..
        })
    ));
    assert!(matches!(
        register::<DefaultOnRequired>(),
        Err(SchemaError::NotApplicable {
            constraint: "Default",
            ..
        })
    ));
    assert!(matches!(
        register::<AdditionalOnScalar>(),
        Err(SchemaError::NotApplicable {
            constraint: "Additional",
            ..
        })
    ));
    assert!(matches!(
        register::<BoundOnString>(),
        Err(SchemaError::NotApplicable {
            constraint: "Min",
            ..
        })
    ));
    assert!(matches!(
        register::<ItemsOnScalar>(),
        Err(SchemaError::NotApplicable {
            constraint: "Items",
            ..
        })
    ));
}

#[test]
fn test_duplicate_passthrough_rejected() {
    assert!(matches!(
        register::<TwoPassthroughs>(),
        Err(SchemaError::DuplicatePassthrough { .. })
    ));
}

#[test]
fn test_mistyped_default_rejected() {
    match register::<MistypedDefault>() {
        Err(SchemaError::DefaultMismatch { field, value, .. }) => {
            assert_eq!(field, "count");
            assert_eq!(value, json!("seven"));
        }
        other => panic!("expected DefaultMismatch, got {other:?}"),
    }
}

// =============================================================================
// Engines Fail Closed on Rejected Configurations
// =============================================================================

#[test]
fn test_engines_fail_closed_for_rejected_config() {
    let input = json!({"count": 1});

    let parsed: Result<MisnamedField, _> = parse(&input);
    assert!(matches!(parsed, Err(ParseError::Schema(_))));

    assert!(!is_valid::<MisnamedField>(&input));

    let encoded = serialize(&MisnamedField { count: 1 });
    assert!(matches!(encoded, Err(EncodeError::Schema(_))));
}
