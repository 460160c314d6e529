//! Schema configuration and its compiled form.
//!
//! A [`SchemaConfig`] is the persistent, functional builder: every `with`
//! call returns a new independent configuration and never mutates a
//! previously returned one. Registration compiles a configuration into a
//! [`CompiledSchema`], one field plan per record field in declaration order,
//! performing every configuration-time check along the way:
//!
//! - unknown field names and out-of-range indexes are hard errors, never
//!   silently aliased to another field
//! - a positional layout must supply exactly one constraint list per field
//! - `Pattern` text must compile (anchored for whole-string matching)
//! - `Default` requires an optional field and a value of the field's type
//! - `Additional` requires a map field, at most one per record
//! - `Min`/`Max` require a number, sequence or map field; `Items` requires
//!   a sequence field
//!
//! Nothing is checked again at engine runtime; a compiled schema is used
//! as-is for the life of the process.

use std::marker::PhantomData;

use regex::Regex;
use serde_json::Value;

use crate::constraint::{Constraint, Predicate};
use crate::errors::{SchemaError, SchemaResult};
use crate::field::{Field, FieldKind};
use crate::record::Record;

/// Role a field plays in the enclosing object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldRole {
    /// Reads and writes under its own name
    Named,
    /// Captures and emits every key not claimed by a named field
    Passthrough,
}

/// Compiled plan for one field.
#[derive(Debug)]
pub(crate) struct CompiledField {
    pub(crate) name: &'static str,
    pub(crate) role: FieldRole,
    /// Predicates in declared order
    pub(crate) predicates: Vec<Predicate>,
    /// Value supplied when an optional field holds nothing
    pub(crate) default: Option<Value>,
}

/// Compiled schema for one record type: one field plan per field, in
/// declaration order.
#[derive(Debug)]
pub struct CompiledSchema {
    pub(crate) record: &'static str,
    pub(crate) fields: Vec<CompiledField>,
}

impl CompiledSchema {
    /// Record type name this schema describes.
    pub fn record(&self) -> &'static str {
        self.record
    }

    /// Number of field plans; always equals the record's field count.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub(crate) fn field(&self, index: usize) -> &CompiledField {
        &self.fields[index]
    }

    /// Whether a named (non-passthrough) field reads or writes `key`.
    pub(crate) fn claims(&self, key: &str) -> bool {
        self.fields
            .iter()
            .any(|field| field.role == FieldRole::Named && field.name == key)
    }
}

/// Declarative schema configuration for record type `T`.
pub struct SchemaConfig<T: Record> {
    fields: Vec<Vec<Constraint>>,
    /// First configuration error, surfaced at registration
    rejected: Option<SchemaError>,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> Clone for SchemaConfig<T> {
    fn clone(&self) -> Self {
        Self {
            fields: self.fields.clone(),
            rejected: self.rejected.clone(),
            _record: PhantomData,
        }
    }
}

impl<T: Record> Default for SchemaConfig<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> SchemaConfig<T> {
    /// The identity configuration: one empty constraint list per field.
    pub fn new() -> Self {
        Self {
            fields: vec![Vec::new(); T::FIELDS.len()],
            rejected: None,
            _record: PhantomData,
        }
    }

    /// Returns a new configuration with `constraints` appended to the named
    /// field's list.
    ///
    /// An unknown name is a hard configuration error, reported when the
    /// schema is registered.
    pub fn with(&self, field: &str, constraints: impl IntoIterator<Item = Constraint>) -> Self {
        match T::FIELDS.iter().position(|name| *name == field) {
            Some(index) => self.extended(index, constraints),
            None => self.poisoned(SchemaError::UnknownField {
                record: T::NAME,
                name: field.to_owned(),
            }),
        }
    }

    /// Returns a new configuration with `constraints` appended to the field
    /// at `index` (declaration order).
    pub fn with_index(
        &self,
        index: usize,
        constraints: impl IntoIterator<Item = Constraint>,
    ) -> Self {
        if index < T::FIELDS.len() {
            self.extended(index, constraints)
        } else {
            self.poisoned(SchemaError::IndexOutOfRange {
                record: T::NAME,
                index,
                count: T::FIELDS.len(),
            })
        }
    }

    /// Builds a configuration from one constraint list per field, in
    /// declaration order.
    ///
    /// This positional form covers declarations that read poorly as name
    /// chaining, such as a lone `Additional` marker. A length mismatch is a
    /// configuration error.
    pub fn from_layout(layout: impl IntoIterator<Item = Vec<Constraint>>) -> Self {
        let fields: Vec<Vec<Constraint>> = layout.into_iter().collect();
        let rejected = (fields.len() != T::FIELDS.len()).then(|| SchemaError::FieldCountMismatch {
            record: T::NAME,
            count: T::FIELDS.len(),
            supplied: fields.len(),
        });
        Self {
            fields,
            rejected,
            _record: PhantomData,
        }
    }

    fn extended(&self, index: usize, constraints: impl IntoIterator<Item = Constraint>) -> Self {
        let mut next = self.clone();
        next.fields[index].extend(constraints);
        next
    }

    fn poisoned(&self, error: SchemaError) -> Self {
        let mut next = self.clone();
        if next.rejected.is_none() {
            next.rejected = Some(error);
        }
        next
    }

    /// Compiles the configuration, running every configuration-time check.
    pub(crate) fn compile(self) -> SchemaResult<CompiledSchema> {
        if let Some(error) = self.rejected {
            return Err(error);
        }
        let mut fields = Vec::with_capacity(self.fields.len());
        let mut passthrough_seen = false;
        for (index, constraints) in self.fields.into_iter().enumerate() {
            let name = T::FIELDS[index];
            let facts = T::FACTS[index];
            let mut role = FieldRole::Named;
            let mut predicates = Vec::new();
            let mut default = None;
            for constraint in constraints {
                match constraint {
                    Constraint::Additional => {
                        if facts.kind != FieldKind::Map {
                            return Err(not_applicable::<T>(name, "Additional", facts.kind));
                        }
                        if passthrough_seen {
                            return Err(SchemaError::DuplicatePassthrough { record: T::NAME });
                        }
                        passthrough_seen = true;
                        role = FieldRole::Passthrough;
                    }
                    Constraint::Default(value) => {
                        if !facts.nullable {
                            return Err(not_applicable::<T>(name, "Default", facts.kind));
                        }
                        // Last declaration wins.
                        default = Some(value);
                    }
                    predicate => {
                        predicates.push(compile_predicate::<T>(
                            predicate,
                            name,
                            Some(facts.kind),
                        )?);
                    }
                }
            }
            fields.push(CompiledField {
                name,
                role,
                predicates,
                default,
            });
        }
        let schema = CompiledSchema {
            record: T::NAME,
            fields,
        };
        T::check_defaults(&schema)?;
        Ok(schema)
    }
}

/// Compiles one predicate constraint.
///
/// `kind` is the field's shape at the point of application; inside an
/// `Items` list the element shape is unknown and applicability is not
/// checked (a non-matching predicate is then vacuous at runtime).
fn compile_predicate<T: Record>(
    constraint: Constraint,
    field: &'static str,
    kind: Option<FieldKind>,
) -> SchemaResult<Predicate> {
    let name = constraint.name();
    match constraint {
        Constraint::Min(limit) => {
            check_bound_applicable::<T>(field, name, kind)?;
            Ok(Predicate::Min(limit))
        }
        Constraint::Max(limit) => {
            check_bound_applicable::<T>(field, name, kind)?;
            Ok(Predicate::Max(limit))
        }
        Constraint::Pattern(pattern) => {
            if let Some(kind) = kind {
                if kind != FieldKind::Str {
                    return Err(not_applicable::<T>(field, name, kind));
                }
            }
            let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|error| {
                SchemaError::InvalidPattern {
                    record: T::NAME,
                    field,
                    pattern: pattern.clone(),
                    reason: error.to_string(),
                }
            })?;
            Ok(Predicate::Pattern {
                source: pattern,
                regex,
            })
        }
        Constraint::Items(rules) => {
            if let Some(kind) = kind {
                if kind != FieldKind::Seq {
                    return Err(not_applicable::<T>(field, name, kind));
                }
            }
            let compiled = rules
                .into_iter()
                .map(|rule| compile_predicate::<T>(rule, field, None))
                .collect::<SchemaResult<Vec<Predicate>>>()?;
            Ok(Predicate::Items(compiled))
        }
        Constraint::Default(_) | Constraint::Additional => {
            // Directives are not predicates; reaching here means one was
            // nested inside an Items list.
            Err(SchemaError::NotApplicable {
                record: T::NAME,
                field,
                constraint: name,
                kind: kind.unwrap_or(FieldKind::Seq),
            })
        }
    }
}

fn check_bound_applicable<T: Record>(
    field: &'static str,
    constraint: &'static str,
    kind: Option<FieldKind>,
) -> SchemaResult<()> {
    match kind {
        Some(FieldKind::Int | FieldKind::Float | FieldKind::Seq | FieldKind::Map) | None => Ok(()),
        Some(kind) => Err(not_applicable::<T>(field, constraint, kind)),
    }
}

fn not_applicable<T: Record>(
    field: &'static str,
    constraint: &'static str,
    kind: FieldKind,
) -> SchemaError {
    SchemaError::NotApplicable {
        record: T::NAME,
        field,
        constraint,
        kind,
    }
}

/// Registration-time check that a configured default value matches its
/// field's type. Called per field through the generated
/// [`crate::Record::check_defaults`] driver.
#[doc(hidden)]
pub fn check_default<F: Field>(
    schema: &CompiledSchema,
    index: usize,
    record: &'static str,
) -> SchemaResult<()> {
    let plan = schema.field(index);
    if let Some(default) = &plan.default {
        if !F::matches(default) {
            return Err(SchemaError::DefaultMismatch {
                record,
                field: plan.name,
                value: default.clone(),
            });
        }
    }
    Ok(())
}
