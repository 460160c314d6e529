//! treeform - schema-driven serialization, parsing and validation
//!
//! Given a record type, treeform derives without hand-written conversion
//! code:
//!
//! - `serialize`: instance → generic tree value
//! - `parse`: tree value → instance, fail-fast
//! - `is_valid`: tree value → bool, equivalent to `parse` succeeding
//!
//! governed by a declarative per-field constraint list (`Min`, `Max`,
//! `Default`, `Pattern`, `Additional`, `Items`). Schemas are configured
//! once, compiled at registration and read-only thereafter; a type without
//! a [`Describe`] impl cannot reach the engines at all.

mod constraint;
mod engine;
mod errors;
mod field;
mod record;
mod registry;
mod schema;

pub use constraint::Constraint;
pub use engine::parse::parse;
pub use engine::serialize::serialize;
pub use engine::validate::is_valid;
pub use errors::{EncodeError, ParseError, SchemaError, SchemaResult};
pub use field::{Field, FieldKind};
pub use record::{Describe, FieldFacts, Record};
pub use registry::register;
pub use schema::{CompiledSchema, SchemaConfig};

/// Support items for the code the `record!` macro generates. Not part of
/// the public API.
#[doc(hidden)]
pub mod __private {
    pub use serde_json::{Map, Value};

    pub use crate::engine::parse::decode_field;
    pub use crate::engine::serialize::encode_field;
    pub use crate::engine::validate::check_field;
    pub use crate::schema::check_default;
}
