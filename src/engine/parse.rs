//! Parse engine: tree value → record instance, fail-fast.
//!
//! Per field, in declaration order: read the child value by name (a
//! passthrough map instead collects every unclaimed key), then run the
//! predicates against what was read, then apply `Default` if the read
//! produced no value. A violation at any nesting depth aborts the whole
//! parse; no partial instance escapes.

use serde_json::{Map, Value};

use crate::constraint::check;
use crate::errors::ParseError;
use crate::field::{kind_name, Field};
use crate::record::Describe;
use crate::registry;
use crate::schema::{CompiledField, CompiledSchema, FieldRole};

use super::unclaimed_entries;

/// Parses a tree value into an instance of `T` under its registered schema.
///
/// # Errors
///
/// Returns `ParseError` for the first structural problem (missing required
/// key, type mismatch at any depth) or constraint violation. An optional
/// field tolerates a missing key or a mismatched value, yielding "no value"
/// instead.
pub fn parse<T: Describe>(input: &Value) -> Result<T, ParseError> {
    let schema = registry::schema_of::<T>()?;
    let entries = input.as_object().ok_or(ParseError::NotAnObject {
        found: kind_name(input),
    })?;
    T::decode_fields(entries, schema)
}

/// Reads, checks and converts one field. Called per field through the
/// generated [`crate::Record::decode_fields`] driver.
#[doc(hidden)]
pub fn decode_field<F: Field>(
    input: &Map<String, Value>,
    schema: &CompiledSchema,
    index: usize,
) -> Result<F, ParseError> {
    let plan = schema.field(index);
    match plan.role {
        FieldRole::Passthrough => {
            let collected = unclaimed_entries(input, schema);
            run_predicates(&collected, plan)?;
            F::decode(&collected).map_err(|source| ParseError::Field {
                field: plan.name,
                source: Box::new(source),
            })
        }
        FieldRole::Named => match input.get(plan.name) {
            // An explicit null reads as "no value" for an optional field,
            // which is exactly when a Default fires.
            Some(value) if F::NULLABLE && value.is_null() => absent_or_default(plan),
            Some(value) => match F::decode(value) {
                Ok(parsed) => {
                    run_predicates(value, plan)?;
                    Ok(parsed)
                }
                Err(_) if F::NULLABLE => absent_or_default(plan),
                Err(source) => Err(ParseError::Field {
                    field: plan.name,
                    source: Box::new(source),
                }),
            },
            None if F::NULLABLE => absent_or_default(plan),
            None => Err(ParseError::Missing { field: plan.name }),
        },
    }
}

/// The result of a read that produced no value: the configured default if
/// one exists, the field's own empty contents otherwise.
fn absent_or_default<F: Field>(plan: &CompiledField) -> Result<F, ParseError> {
    if let Some(default) = &plan.default {
        return F::decode(default).map_err(|source| ParseError::Field {
            field: plan.name,
            source: Box::new(source),
        });
    }
    match F::absent() {
        Some(empty) => Ok(empty),
        None => Err(ParseError::Missing { field: plan.name }),
    }
}

fn run_predicates(value: &Value, plan: &CompiledField) -> Result<(), ParseError> {
    for predicate in &plan.predicates {
        check(value, predicate).map_err(|unsat| ParseError::Constraint {
            field: plan.name,
            constraint: unsat.constraint,
            value: unsat.value,
        })?;
    }
    Ok(())
}
