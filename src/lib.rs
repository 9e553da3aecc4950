//! # typed_class
//!
//! Schema-typed records and collections that coerce weakly-typed input into
//! their declared field types.
//!
//! ## What does it do?
//!
//! Input arrives as a dynamic [`Value`]: maps, lists, JSON text, scalars of the
//! wrong type, or arbitrary objects. A [`TypedRecord`] walks its [`Schema`] and
//! runs every field through the coercion engine in [`cast`], so after any
//! assignment each field holds exactly its declared type. A
//! [`TypedCollection`] does the same for every element of an ordered map.
//!
//! ## Key Features
//!
//! - **Deterministic coercion**: `"12 apples"` is `12`, `"1.234,56"` is
//!   `1234.56`, an empty map is `false`
//! - **Overwrite and merge**: `assign` resets missing fields, `replace` keeps them
//! - **Nested containers**: records and collections nest and clone deeply
//! - **Self-correcting edits**: values changed through `iter_mut` are
//!   re-coerced before the cursor advances
//! - **Plain exports**: `to_array` produces an ownership-free map for any
//!   external serializer
//!
//! ## Quick Start
//!
//! ```rust
//! use typed_class::{FieldDescriptor, Kind, Schema, TypedRecord, value, Value};
//!
//! let schema = Schema::builder("Order")
//!     .field(FieldDescriptor::int("id"))
//!     .field(FieldDescriptor::float("total"))
//!     .field(FieldDescriptor::bool("paid"))
//!     .field(FieldDescriptor::collection("lines", Kind::String))
//!     .build()
//!     .unwrap();
//!
//! let order = TypedRecord::from_value(
//!     &schema,
//!     &value!({ "id": "0x1F", "total": "1.250,75", "paid": "0", "lines": [1, 2] }),
//! )
//! .unwrap();
//!
//! assert_eq!(order.get_value("id").unwrap(), Value::from(31));
//! assert_eq!(order.get_value("total").unwrap(), Value::from(1250.75));
//! assert_eq!(order.get_value("paid").unwrap(), Value::from(false));
//! assert_eq!(
//!     order.to_json().unwrap(),
//!     r#"{"id":31,"total":1250.75,"paid":false,"lines":["1","2"]}"#
//! );
//! ```
//!
//! ### Building values
//!
//! The [`value!`] macro builds [`Value`] literals, and [`to_value`] converts
//! any `Serialize` type:
//!
//! ```rust
//! use serde::Serialize;
//! use typed_class::{to_value, value};
//!
//! #[derive(Serialize)]
//! struct Point { x: i32, y: i32 }
//!
//! assert_eq!(to_value(&Point { x: 1, y: 2 }).unwrap(), value!({ "x": 1, "y": 2 }));
//! ```
//!
//! ## Errors
//!
//! Coercion never fails on data; it falls back to a native cast. Only
//! structural contracts raise: unknown field names, `combine` length
//! mismatches, and values with no JSON form. Lenient paths (malformed JSON,
//! unabsorbable objects, unknown keys) are logged at debug level through
//! `tracing`.

pub mod cast;
pub mod collection;
pub mod error;
pub mod export;
pub mod json;
pub mod macros;
pub mod map;
pub mod object;
pub mod options;
pub mod record;
pub mod scalar;
pub mod schema;
pub mod slot;
pub mod value;

pub use cast::Kind;
pub use collection::TypedCollection;
pub use error::{Error, Result};
pub use export::is_empty_value;
pub use map::{Key, KeyedMap, ValueMap};
pub use object::{
    DateFormattable, Exportable, Object, ObjectClass, PlainClass, PlainObject, Stringable,
    Timestamp, TimestampClass,
};
pub use options::ExportOptions;
pub use record::TypedRecord;
pub use scalar::ScalarBox;
pub use schema::{FieldDescriptor, FieldType, Schema, SchemaBuilder};
pub use slot::{Absorb, Slot};
pub use value::{Number, Value};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Convert any `T: Serialize` to a [`Value`].
///
/// # Errors
///
/// Returns [`Error::Encoding`] if `T` cannot be represented as JSON data.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_value<T>(value: &T) -> Result<Value>
where
    T: ?Sized + Serialize,
{
    let json = serde_json::to_value(value).map_err(Error::encoding)?;
    Value::deserialize(json).map_err(Error::custom)
}

/// Convert a [`Value`] into any `T: DeserializeOwned`.
///
/// Objects are converted through their capabilities first, so a
/// [`TypedRecord`] deserializes from its exported fields.
///
/// # Examples
///
/// ```rust
/// use serde::Deserialize;
/// use typed_class::{from_value, value};
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_value(&value!({ "x": 1, "y": 2 })).unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if the value has no JSON form or does not match `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_value<T>(value: &Value) -> Result<T>
where
    T: DeserializeOwned,
{
    let json = serde_json::to_value(value).map_err(Error::encoding)?;
    serde_json::from_value(json).map_err(Error::custom)
}
