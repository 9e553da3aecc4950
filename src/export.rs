//! Structural export shared by records and collections.
//!
//! Exports are plain snapshots: maps are rebuilt, and objects that have no
//! data form are deep clones, so nothing in the result refers back into the
//! container it came from.

use crate::object::Object;
use crate::slot::Slot;
use crate::{ExportOptions, Result, TypedCollection, TypedRecord, Value, ValueMap};

/// Exports one slot. `None` means the value is dropped (an omitted resource).
pub(crate) fn export_slot(slot: &Slot, options: ExportOptions) -> Result<Option<Value>> {
    match slot {
        Slot::Null => Ok(Some(Value::Null)),
        Slot::Scalar(scalar) => export_value(scalar.get(), options),
        Slot::Value(value) => export_value(value, options),
        Slot::Record(record) => record.to_array_with(options).map(|m| Some(Value::Array(m))),
        Slot::Collection(collection) => {
            collection.to_array_with(options).map(|m| Some(Value::Array(m)))
        }
        Slot::Object(obj) => export_object(obj.as_ref(), options, false),
    }
}

pub(crate) fn export_value(value: &Value, options: ExportOptions) -> Result<Option<Value>> {
    match value {
        Value::Array(map) => {
            let mut out = ValueMap::with_capacity(map.len());
            for (key, item) in map {
                if let Some(exported) = export_value(item, options)? {
                    out.insert(key.clone(), exported);
                }
            }
            Ok(Some(Value::Array(out)))
        }
        Value::Object(obj) => export_object(obj.as_ref(), options, false),
        other => Ok(Some(other.clone())),
    }
}

/// Exports an object.
///
/// With `flatten`, an object is reduced to its exported map, else its string
/// form, else its members, instead of being cloned.
pub(crate) fn export_object(
    obj: &dyn Object,
    options: ExportOptions,
    flatten: bool,
) -> Result<Option<Value>> {
    let any = obj.as_any();
    if let Some(record) = any.downcast_ref::<TypedRecord>() {
        return Ok(Some(Value::Array(record.to_array_with(options)?)));
    }
    if let Some(collection) = any.downcast_ref::<TypedCollection>() {
        return Ok(Some(Value::Array(collection.to_array_with(options)?)));
    }
    if obj.is_resource() {
        if options.contains(ExportOptions::OMIT_RESOURCE) {
            return Ok(None);
        }
        return Ok(Some(Value::Object(obj.deep_clone())));
    }
    if let Some(inner) = obj.atomic() {
        return export_value(&inner, options);
    }
    if options.contains(ExportOptions::DATE_TO_STRING) {
        if let Some(date) = obj.as_date() {
            return Ok(Some(Value::String(date.format_canonical())));
        }
    }
    if options.contains(ExportOptions::ALL_OBJECTS_TO_STRING) {
        if let Some(s) = obj.as_stringable() {
            return Ok(Some(Value::String(s.stringify())));
        }
    }
    if let Some(exportable) = obj.as_exportable() {
        return export_value(&Value::Array(exportable.to_map()?), options);
    }
    if flatten {
        if let Some(s) = obj.as_stringable() {
            return Ok(Some(Value::String(s.stringify())));
        }
        return export_value(&Value::Array(obj.members()), options);
    }
    Ok(Some(Value::Object(obj.deep_clone())))
}

/// Emptiness as the `OMIT_EMPTY` option understands it.
///
/// # Examples
///
/// ```rust
/// use typed_class::{is_empty_value, value, Value};
///
/// assert!(is_empty_value(&Value::from("0")));
/// assert!(is_empty_value(&value!({})));
/// assert!(!is_empty_value(&Value::from("0.0")));
/// ```
#[must_use]
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.is_zero(),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(map) => map.is_empty(),
        Value::Object(_) => false,
    }
}

/// Wraps a 24-digit hex string as an extended-JSON object id.
pub(crate) fn cast_object_id(value: Value) -> Value {
    match value {
        Value::String(s) if s.len() == 24 && s.bytes().all(|b| b.is_ascii_hexdigit()) => {
            let mut oid = ValueMap::new();
            oid.insert("$oid", Value::String(s));
            Value::Array(oid)
        }
        other => other,
    }
}
