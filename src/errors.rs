//! Error types for schema configuration and the codec engines.
//!
//! Three channels:
//! - `SchemaError`: configuration-time rejection. Raised while a schema is
//!   registered, before any instance flows through an engine.
//! - `EncodeError` / `ParseError`: fail-fast runtime rejection, scoped to the
//!   first offending field. No accumulation of multiple failures.
//! - Validation has no error type at all; [`crate::is_valid`] returns a bare
//!   `bool` and withholds the failure detail.

use serde_json::Value;
use thiserror::Error;

use crate::field::FieldKind;

/// Result type for schema configuration and registration
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Configuration-time errors, surfaced by [`crate::register`]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    /// A `with` call named a field the record does not declare
    #[error("record `{record}` has no field named `{name}`")]
    UnknownField {
        record: &'static str,
        name: String,
    },

    /// A `with_index` call used an index past the record's field count
    #[error("field index {index} out of range for record `{record}` ({count} fields)")]
    IndexOutOfRange {
        record: &'static str,
        index: usize,
        count: usize,
    },

    /// A positional layout supplied the wrong number of constraint lists
    #[error("record `{record}` declares {count} fields but the layout supplies {supplied}")]
    FieldCountMismatch {
        record: &'static str,
        count: usize,
        supplied: usize,
    },

    /// A `Pattern` constraint carried text the regex engine rejects
    #[error("invalid pattern `{pattern}` on field `{field}` of `{record}`: {reason}")]
    InvalidPattern {
        record: &'static str,
        field: &'static str,
        pattern: String,
        reason: String,
    },

    /// A constraint was attached to a field of the wrong shape
    #[error("{constraint} is not applicable to field `{field}` of `{record}` ({kind} field)")]
    NotApplicable {
        record: &'static str,
        field: &'static str,
        constraint: &'static str,
        kind: FieldKind,
    },

    /// A configured default value does not match its field's type
    #[error("default for field `{field}` of `{record}` does not match the field type: {value}")]
    DefaultMismatch {
        record: &'static str,
        field: &'static str,
        value: Value,
    },

    /// More than one field of the record is marked `Additional`
    #[error("record `{record}` declares more than one passthrough field")]
    DuplicatePassthrough {
        record: &'static str,
    },
}

/// Serialization failures, scoped to the first offending field
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    /// A field value failed one of its predicate constraints
    #[error("field `{field}`: value {value} does not satisfy {constraint}")]
    Constraint {
        field: &'static str,
        constraint: String,
        value: Value,
    },

    /// A failure inside a nested record or collection field
    #[error("field `{field}`: {source}")]
    Field {
        field: &'static str,
        #[source]
        source: Box<EncodeError>,
    },

    /// A failure on one element of a sequence
    #[error("element {index}: {source}")]
    Element {
        index: usize,
        #[source]
        source: Box<EncodeError>,
    },

    /// A failure on one entry of a map
    #[error("entry `{key}`: {source}")]
    Entry {
        key: String,
        #[source]
        source: Box<EncodeError>,
    },

    /// The type's schema could not be compiled
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Parse failures, scoped to the first offending field
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// The input tree value is not an object
    #[error("expected an object, found {found}")]
    NotAnObject {
        found: &'static str,
    },

    /// A required field has no key in the input object
    #[error("missing required field `{field}`")]
    Missing {
        field: &'static str,
    },

    /// A present value has the wrong shape
    #[error("expected {expected}, found {found}")]
    Mismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// A read value failed one of its predicate constraints
    #[error("field `{field}`: value {value} does not satisfy {constraint}")]
    Constraint {
        field: &'static str,
        constraint: String,
        value: Value,
    },

    /// A failure inside a nested record or collection field
    #[error("field `{field}`: {source}")]
    Field {
        field: &'static str,
        #[source]
        source: Box<ParseError>,
    },

    /// A failure on one element of a sequence
    #[error("element {index}: {source}")]
    Element {
        index: usize,
        #[source]
        source: Box<ParseError>,
    },

    /// A failure on one entry of a map
    #[error("entry `{key}`: {source}")]
    Entry {
        key: String,
        #[source]
        source: Box<ParseError>,
    },

    /// The type's schema could not be compiled
    #[error(transparent)]
    Schema(#[from] SchemaError),
}
