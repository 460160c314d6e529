//! The three traversal engines.
//!
//! Serialize, parse and validate all walk the same compiled schema in field
//! declaration order. Parse and validate are behaviorally equivalent by
//! construction: `is_valid` mirrors every read-success condition and every
//! predicate that `parse` enforces, and simply withholds the failure detail.

pub(crate) mod parse;
pub(crate) mod serialize;
pub(crate) mod validate;

use serde_json::{Map, Value};

use crate::schema::CompiledSchema;

/// Collects every entry of `input` not claimed by a named field, preserving
/// the input's key order. This is the value a passthrough field reads.
pub(crate) fn unclaimed_entries(input: &Map<String, Value>, schema: &CompiledSchema) -> Value {
    let mut entries = Map::new();
    for (key, value) in input {
        if !schema.claims(key) {
            entries.insert(key.clone(), value.clone());
        }
    }
    Value::Object(entries)
}
