//! Constraint primitives attached to record fields.
//!
//! [`Constraint`] is the declarative form users write into a
//! [`crate::SchemaConfig`]. Registration compiles it into [`Predicate`], the
//! form the engines run: `Default` and `Additional` are directives handled
//! by the field plan itself and never appear as predicates, and `Pattern`
//! carries its regex pre-compiled so the runtime check cannot fail to build.
//!
//! Predicate semantics:
//! - `Min`/`Max` compare numbers by value and sequences/maps by element
//!   count. Bounds are inclusive.
//! - `Pattern` is a whole-string match, never a substring search.
//! - `Items` re-applies a nested rule list to every element of a sequence,
//!   recursively.
//! - A predicate applied to a value of a shape it does not speak about is
//!   vacuously true. Predicates never raise.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// A declarative rule attached to one field of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", content = "arg", rename_all = "lowercase")]
pub enum Constraint {
    /// Inclusive lower bound on a number's value or a collection's size
    Min(Number),
    /// Inclusive upper bound on a number's value or a collection's size
    Max(Number),
    /// Value to supply when an optional field holds nothing
    Default(Value),
    /// Whole-string pattern a string field must match
    Pattern(String),
    /// Marks a map field as the capture-everything-else passthrough
    Additional,
    /// Applies a nested rule list to every element of a sequence field
    Items(Vec<Constraint>),
}

impl Constraint {
    /// Inclusive lower bound.
    pub fn min(limit: impl Into<Number>) -> Self {
        Constraint::Min(limit.into())
    }

    /// Inclusive upper bound.
    pub fn max(limit: impl Into<Number>) -> Self {
        Constraint::Max(limit.into())
    }

    /// Whole-string pattern.
    pub fn pattern(pattern: impl Into<String>) -> Self {
        Constraint::Pattern(pattern.into())
    }

    /// Value supplied when an optional field holds nothing.
    pub fn default_value(value: impl Into<Value>) -> Self {
        Constraint::Default(value.into())
    }

    /// Nested rule list applied to every element of a sequence.
    pub fn items(rules: impl IntoIterator<Item = Constraint>) -> Self {
        Constraint::Items(rules.into_iter().collect())
    }

    /// Constraint kind name for configuration error messages.
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Constraint::Min(_) => "Min",
            Constraint::Max(_) => "Max",
            Constraint::Default(_) => "Default",
            Constraint::Pattern(_) => "Pattern",
            Constraint::Additional => "Additional",
            Constraint::Items(_) => "Items",
        }
    }
}

/// Compiled, runnable form of a predicate constraint.
#[derive(Debug)]
pub(crate) enum Predicate {
    Min(Number),
    Max(Number),
    Pattern { source: String, regex: Regex },
    Items(Vec<Predicate>),
}

/// A failed predicate: which rule, and the value it rejected.
///
/// For nested `Items` rules the value is the one at the failing depth, not
/// the whole outer sequence.
#[derive(Debug)]
pub(crate) struct Unsatisfied {
    pub constraint: String,
    pub value: Value,
}

impl Unsatisfied {
    fn new(constraint: String, value: &Value) -> Self {
        Self {
            constraint,
            value: value.clone(),
        }
    }
}

/// Runs one compiled predicate against a tree value.
pub(crate) fn check(value: &Value, predicate: &Predicate) -> Result<(), Unsatisfied> {
    match predicate {
        Predicate::Min(limit) => {
            let holds = match value {
                Value::Number(n) => num_ge(n, limit),
                Value::Array(items) => num_ge(&Number::from(items.len() as u64), limit),
                Value::Object(entries) => num_ge(&Number::from(entries.len() as u64), limit),
                _ => true,
            };
            if holds {
                Ok(())
            } else {
                Err(Unsatisfied::new(format!("Min({limit})"), value))
            }
        }
        Predicate::Max(limit) => {
            let holds = match value {
                Value::Number(n) => num_ge(limit, n),
                Value::Array(items) => num_ge(limit, &Number::from(items.len() as u64)),
                Value::Object(entries) => num_ge(limit, &Number::from(entries.len() as u64)),
                _ => true,
            };
            if holds {
                Ok(())
            } else {
                Err(Unsatisfied::new(format!("Max({limit})"), value))
            }
        }
        Predicate::Pattern { source, regex } => match value.as_str() {
            Some(text) if !regex.is_match(text) => {
                Err(Unsatisfied::new(format!("Pattern({source})"), value))
            }
            _ => Ok(()),
        },
        Predicate::Items(rules) => {
            if let Value::Array(items) = value {
                for item in items {
                    for rule in rules {
                        check(item, rule)?;
                    }
                }
            }
            Ok(())
        }
    }
}

/// Numeric `a >= b` without losing 64-bit integer precision.
fn num_ge(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x >= y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x >= y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x >= y,
        _ => false,
    }
}
