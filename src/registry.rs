//! Process-wide schema registry.
//!
//! A write-once table from record type to its compiled schema. Entries are
//! leaked into `'static` storage and live for the process lifetime — init,
//! no teardown. After an entry is installed it is only ever read, so any
//! number of concurrent engine calls can share it without coordination.
//!
//! [`register`] is the explicit startup path: it compiles the type's
//! configuration and surfaces every configuration error before any instance
//! flows through an engine. The engines also install an entry lazily on
//! first use, so a nested record type only needs its `Describe` impl.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

use crate::errors::SchemaResult;
use crate::record::Describe;
use crate::schema::CompiledSchema;

static SCHEMAS: OnceLock<RwLock<HashMap<TypeId, &'static CompiledSchema>>> = OnceLock::new();

fn table() -> &'static RwLock<HashMap<TypeId, &'static CompiledSchema>> {
    SCHEMAS.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Compiles and installs the schema for `T`.
///
/// Call once per record type at startup so configuration mistakes surface
/// there. Registration is idempotent; the first installed schema wins.
///
/// # Errors
///
/// Returns the first configuration error in `T::config()` — unknown field
/// name, invalid pattern, misapplied constraint, mistyped default, field
/// count mismatch or duplicate passthrough marker.
pub fn register<T: Describe>() -> SchemaResult<()> {
    schema_of::<T>().map(|_| ())
}

/// Looks up the compiled schema for `T`, installing it on first use.
pub(crate) fn schema_of<T: Describe>() -> SchemaResult<&'static CompiledSchema> {
    let table = table();
    {
        let guard = table.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(schema) = guard.get(&TypeId::of::<T>()).copied() {
            return Ok(schema);
        }
    }
    // Compile outside the lock; a racing caller may get here too, in which
    // case the entry already installed wins and the spare compile is dropped.
    let compiled = T::config().compile()?;
    let mut guard = table
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let entry = guard
        .entry(TypeId::of::<T>())
        .or_insert_with(|| Box::leak(Box::new(compiled)));
    Ok(*entry)
}
