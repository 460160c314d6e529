//! Record introspection and the `record!` macro.
//!
//! [`Record`] is the introspector contract: field names and shape facts in
//! declaration order, plus generated drivers that walk the fields for each
//! engine. [`Describe`] is the capability that gates the engines — a type
//! without a `Describe` impl cannot be serialized, parsed or validated at
//! all, so an undescribed type is rejected at compile time rather than at
//! runtime.
//!
//! Both traits are meant to be produced by [`crate::record!`], never written
//! by hand; only `Describe::config` is user-authored.

use serde_json::{Map, Value};

use crate::errors::{EncodeError, ParseError, SchemaError};
use crate::field::FieldKind;
use crate::schema::{CompiledSchema, SchemaConfig};

/// Per-field shape facts used by configuration-time checks.
#[derive(Debug, Clone, Copy)]
pub struct FieldFacts {
    /// Shape the field occupies in a tree value
    pub kind: FieldKind,
    /// True when the field may hold no value
    pub nullable: bool,
}

/// Introspection contract for a record type: a fixed, ordered set of named
/// fields, and per-engine drivers over them.
pub trait Record: Sized + 'static {
    /// Type name, for configuration error messages.
    const NAME: &'static str;

    /// Field names in declaration order.
    const FIELDS: &'static [&'static str];

    /// Shape facts, parallel to `FIELDS`.
    const FACTS: &'static [FieldFacts];

    /// Encodes every field into `out`, in declaration order.
    fn encode_fields(
        &self,
        schema: &CompiledSchema,
        out: &mut Map<String, Value>,
    ) -> Result<(), EncodeError>;

    /// Decodes every field from `input` and assembles the record.
    fn decode_fields(
        input: &Map<String, Value>,
        schema: &CompiledSchema,
    ) -> Result<Self, ParseError>;

    /// Short-circuiting validity check over every field of `input`.
    fn check_fields(input: &Map<String, Value>, schema: &CompiledSchema) -> bool;

    /// Registration-time check that every configured default matches its
    /// field's type.
    fn check_defaults(schema: &CompiledSchema) -> Result<(), SchemaError>;
}

/// Capability tying a record type to its schema configuration.
///
/// Implementing `Describe` is what "registers" a type: the engines bound on
/// it, and [`crate::register`] compiles `config()` into the process-wide
/// schema table. The identity configuration is `SchemaConfig::new()`.
pub trait Describe: Record {
    /// The declarative schema configuration for this type.
    fn config() -> SchemaConfig<Self>;
}

/// Defines a record struct and derives its [`Record`] and [`Field`]
/// implementations.
///
/// The struct is declared exactly as usual; attributes and visibility pass
/// through. A `Describe` impl must be written separately, which is where the
/// per-field constraints live:
///
/// ```ignore
/// treeform::record! {
///     #[derive(Debug, PartialEq)]
///     pub struct Account {
///         pub owner: String,
///         pub balance: i64,
///     }
/// }
///
/// impl treeform::Describe for Account {
///     fn config() -> treeform::SchemaConfig<Self> {
///         treeform::SchemaConfig::new()
///             .with("balance", [treeform::Constraint::min(0)])
///     }
/// }
/// ```
///
/// [`Field`]: crate::Field
#[macro_export]
macro_rules! record {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident {
            $( $(#[$fattr:meta])* $fvis:vis $fname:ident : $fty:ty ),+ $(,)?
        }
    ) => {
        $(#[$attr])*
        $vis struct $name {
            $( $(#[$fattr])* $fvis $fname: $fty, )+
        }

        impl $crate::Record for $name {
            const NAME: &'static str = stringify!($name);

            const FIELDS: &'static [&'static str] = &[ $( stringify!($fname) ),+ ];

            const FACTS: &'static [$crate::FieldFacts] = &[
                $(
                    $crate::FieldFacts {
                        kind: <$fty as $crate::Field>::KIND,
                        nullable: <$fty as $crate::Field>::NULLABLE,
                    }
                ),+
            ];

            fn encode_fields(
                &self,
                schema: &$crate::CompiledSchema,
                out: &mut $crate::__private::Map<
                    ::std::string::String,
                    $crate::__private::Value,
                >,
            ) -> ::std::result::Result<(), $crate::EncodeError> {
                let mut index = 0usize;
                $(
                    index += 1;
                    $crate::__private::encode_field(&self.$fname, schema, index - 1, out)?;
                )+
                let _ = index;
                ::std::result::Result::Ok(())
            }

            fn decode_fields(
                input: &$crate::__private::Map<
                    ::std::string::String,
                    $crate::__private::Value,
                >,
                schema: &$crate::CompiledSchema,
            ) -> ::std::result::Result<Self, $crate::ParseError> {
                let mut index = 0usize;
                $(
                    index += 1;
                    let $fname: $fty =
                        $crate::__private::decode_field(input, schema, index - 1)?;
                )+
                let _ = index;
                ::std::result::Result::Ok(Self { $( $fname ),+ })
            }

            fn check_fields(
                input: &$crate::__private::Map<
                    ::std::string::String,
                    $crate::__private::Value,
                >,
                schema: &$crate::CompiledSchema,
            ) -> bool {
                let mut index = 0usize;
                $(
                    index += 1;
                    if !$crate::__private::check_field::<$fty>(input, schema, index - 1) {
                        return false;
                    }
                )+
                let _ = index;
                true
            }

            fn check_defaults(
                schema: &$crate::CompiledSchema,
            ) -> ::std::result::Result<(), $crate::SchemaError> {
                let mut index = 0usize;
                $(
                    index += 1;
                    $crate::__private::check_default::<$fty>(
                        schema,
                        index - 1,
                        <Self as $crate::Record>::NAME,
                    )?;
                )+
                let _ = index;
                ::std::result::Result::Ok(())
            }
        }

        impl $crate::Field for $name {
            const KIND: $crate::FieldKind = $crate::FieldKind::Record;

            fn encode(
                &self,
            ) -> ::std::result::Result<
                ::std::option::Option<$crate::__private::Value>,
                $crate::EncodeError,
            > {
                $crate::serialize(self).map(::std::option::Option::Some)
            }

            fn decode(
                value: &$crate::__private::Value,
            ) -> ::std::result::Result<Self, $crate::ParseError> {
                $crate::parse(value)
            }

            fn matches(value: &$crate::__private::Value) -> bool {
                $crate::is_valid::<Self>(value)
            }
        }
    };
}
