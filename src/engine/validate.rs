//! Validation engine: tree value → bool, pure.
//!
//! Mirrors the parse engine condition for condition — a value is valid
//! exactly when parsing it would succeed — but never constructs an
//! instance, never mutates anything and never raises. The combinator is a
//! short-circuiting AND across fields and constraints.

use serde_json::{Map, Value};

use crate::constraint::check;
use crate::field::Field;
use crate::record::Describe;
use crate::registry;
use crate::schema::{CompiledField, CompiledSchema, FieldRole};

use super::unclaimed_entries;

/// Whether `input` would parse as an instance of `T`.
pub fn is_valid<T: Describe>(input: &Value) -> bool {
    let Ok(schema) = registry::schema_of::<T>() else {
        return false;
    };
    let Some(entries) = input.as_object() else {
        return false;
    };
    T::check_fields(entries, schema)
}

/// Validity of one field. Called per field through the generated
/// [`crate::Record::check_fields`] driver.
#[doc(hidden)]
pub fn check_field<F: Field>(input: &Map<String, Value>, schema: &CompiledSchema, index: usize) -> bool {
    let plan = schema.field(index);
    match plan.role {
        FieldRole::Passthrough => {
            let collected = unclaimed_entries(input, schema);
            predicates_hold(&collected, plan) && F::matches(&collected)
        }
        FieldRole::Named => match input.get(plan.name) {
            Some(value) => {
                if F::matches(value) {
                    predicates_hold(value, plan)
                } else {
                    // A mismatch reads as "no value" for an optional field.
                    F::NULLABLE
                }
            }
            None => F::NULLABLE,
        },
    }
}

fn predicates_hold(value: &Value, plan: &CompiledField) -> bool {
    plan.predicates
        .iter()
        .all(|predicate| check(value, predicate).is_ok())
}
