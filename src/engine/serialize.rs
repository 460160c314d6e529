//! Serialization engine: record instance → tree value.
//!
//! Per field, in declaration order: run every predicate against the encoded
//! field value (vacuous when an optional holds nothing), then write. A
//! valueless optional is omitted unless it carries a `Default`, and a
//! passthrough map splices its entries as sibling keys at its position.
//! The first failing predicate aborts the whole serialization.

use serde_json::{Map, Value};

use crate::constraint::check;
use crate::errors::EncodeError;
use crate::field::Field;
use crate::record::Describe;
use crate::registry;
use crate::schema::{CompiledSchema, FieldRole};

/// Serializes `value` into a tree value under its registered schema.
///
/// Emitted key order equals field declaration order, except a passthrough
/// splice, whose entries appear in the map's own iteration order.
///
/// # Errors
///
/// Returns `EncodeError` identifying the first field whose value violates a
/// constraint, at any nesting depth. Nothing partial is ever returned.
pub fn serialize<T: Describe>(value: &T) -> Result<Value, EncodeError> {
    let schema = registry::schema_of::<T>()?;
    let mut out = Map::new();
    value.encode_fields(schema, &mut out)?;
    Ok(Value::Object(out))
}

/// Encodes one field into `out`. Called per field through the generated
/// [`crate::Record::encode_fields`] driver.
#[doc(hidden)]
pub fn encode_field<F: Field>(
    field: &F,
    schema: &CompiledSchema,
    index: usize,
    out: &mut Map<String, Value>,
) -> Result<(), EncodeError> {
    let plan = schema.field(index);
    let encoded = field.encode().map_err(|source| EncodeError::Field {
        field: plan.name,
        source: Box::new(source),
    })?;

    if let Some(value) = &encoded {
        for predicate in &plan.predicates {
            check(value, predicate).map_err(|unsat| EncodeError::Constraint {
                field: plan.name,
                constraint: unsat.constraint,
                value: unsat.value,
            })?;
        }
    }

    match (plan.role, encoded) {
        (FieldRole::Passthrough, Some(Value::Object(entries))) => {
            for (key, value) in entries {
                out.insert(key, value);
            }
        }
        // A valueless optional passthrough splices nothing.
        (FieldRole::Passthrough, _) => {}
        (FieldRole::Named, Some(value)) => {
            out.insert(plan.name.to_owned(), value);
        }
        (FieldRole::Named, None) => {
            if let Some(default) = &plan.default {
                out.insert(plan.name.to_owned(), default.clone());
            }
        }
    }
    Ok(())
}
