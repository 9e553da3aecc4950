//! Schema-fixed records.
//!
//! A [`TypedRecord`] holds one [`Slot`] per declared field. The set of fields
//! never changes; every write is coerced to the field's declared type.
//!
//! ## Assignment
//!
//! - [`TypedRecord::assign`] resets every field to its default, then fills
//!   the fields present in the input.
//! - [`TypedRecord::replace`] only touches the fields present in the input,
//!   and ignores explicit nulls for non-nullable fields.
//! - [`TypedRecord::merge`] is `replace` on a copy.
//!
//! Input may be a name-keyed map, a list (zipped onto fields in declaration
//! order), JSON text, or an object. Unknown keys are ignored.
//!
//! ## Examples
//!
//! ```rust
//! use typed_class::{FieldDescriptor, Schema, TypedRecord, value, Value};
//!
//! let schema = Schema::builder("Item")
//!     .field(FieldDescriptor::string("name"))
//!     .field(FieldDescriptor::int("qty").default(1))
//!     .build()
//!     .unwrap();
//!
//! let input = value!({ "name": "bolt", "qty": "12" });
//! let mut item = TypedRecord::from_value(&schema, &input).unwrap();
//! assert_eq!(item.get_value("qty").unwrap(), Value::from(12));
//!
//! item.assign(&value!({ "name": "nut" })).unwrap();
//! assert_eq!(item.get_value("qty").unwrap(), Value::from(1));
//! ```

use crate::export;
use crate::object::{object_to_map, Exportable, Object};
use crate::schema::{FieldDescriptor, Schema};
use crate::slot::{Absorb, Slot};
use crate::{json, Error, ExportOptions, Result, TypedCollection, Value, ValueMap};
use std::any::Any;
use std::sync::Arc;
use tracing::debug;

/// Bulk input after shape detection.
#[derive(Debug, PartialEq)]
enum Input {
    Positional(Vec<Value>),
    Named(ValueMap),
}

impl Input {
    fn empty() -> Self {
        Input::Named(ValueMap::new())
    }

    /// A non-empty map keyed exactly `0..len` is positional.
    fn classify(map: ValueMap) -> Self {
        if !map.is_empty() && map.is_list() {
            Input::Positional(map.into_iter().map(|(_, v)| v).collect())
        } else {
            Input::Named(map)
        }
    }

    fn from_value(input: &Value) -> Result<Self> {
        match input {
            Value::Null => Ok(Input::empty()),
            Value::Array(map) => Ok(Input::classify(map.clone())),
            Value::String(text) => match json::decode(text) {
                Some(Value::Array(map)) => Ok(Input::classify(map)),
                Some(other) => {
                    debug!(
                        found = other.type_name(),
                        "JSON input is not a map, treated as empty"
                    );
                    Ok(Input::empty())
                }
                None => Ok(Input::empty()),
            },
            Value::Object(obj) => {
                if let Some(record) = obj.as_any().downcast_ref::<TypedRecord>() {
                    return Ok(Input::Named(record.to_array_with(ExportOptions::empty())?));
                }
                match obj.atomic() {
                    Some(inner) => Input::from_value(&inner),
                    None => Ok(Input::classify(object_to_map(obj.as_ref())?)),
                }
            }
            other => {
                debug!(found = other.type_name(), "scalar record input treated as empty");
                Ok(Input::empty())
            }
        }
    }
}

/// A record whose fields are fixed by a [`Schema`].
#[derive(Debug, Clone)]
pub struct TypedRecord {
    schema: Arc<Schema>,
    slots: Vec<Slot>,
    in_related: bool,
}

impl TypedRecord {
    /// Creates a record with every field at its default.
    ///
    /// # Errors
    ///
    /// Returns an error when a default cannot be coerced, which a built
    /// schema has already ruled out.
    pub fn new(schema: &Arc<Schema>) -> Result<Self> {
        let slots = schema
            .fields()
            .iter()
            .map(|field| field.default_slot())
            .collect::<Result<Vec<_>>>()?;
        Ok(TypedRecord {
            schema: Arc::clone(schema),
            slots,
            in_related: false,
        })
    }

    /// Creates a record and assigns `input` to it.
    pub fn from_value(schema: &Arc<Schema>, input: &Value) -> Result<Self> {
        let mut record = Self::new(schema)?;
        record.assign(input)?;
        Ok(record)
    }

    #[must_use]
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Overwrites the record with `input`: fields missing from the input
    /// return to their defaults.
    ///
    /// # Errors
    ///
    /// Propagates encoding errors from string coercion and errors raised by
    /// the schema's related hook. The record is left as it was on error.
    pub fn assign(&mut self, input: &Value) -> Result<()> {
        let entries = self.entries(Input::from_value(input)?);
        let defaults = self
            .schema
            .fields()
            .iter()
            .map(FieldDescriptor::default_slot)
            .collect::<Result<Vec<_>>>()?;
        let previous = std::mem::replace(&mut self.slots, defaults);
        let filled = entries
            .into_iter()
            .try_for_each(|(index, value)| self.write_field(index, &value).map(|_| ()))
            .and_then(|()| self.run_related());
        if filled.is_err() {
            self.slots = previous;
        }
        filled
    }

    /// Merges `input` into the record in place.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use typed_class::{FieldDescriptor, Schema, TypedRecord, value, Value};
    ///
    /// let schema = Schema::builder("Point")
    ///     .field(FieldDescriptor::int("x").default(3))
    ///     .field(FieldDescriptor::int("y"))
    ///     .build()
    ///     .unwrap();
    ///
    /// let mut p = TypedRecord::from_value(&schema, &value!([4, 5])).unwrap();
    /// p.replace(&value!({ "x": null, "y": 9 })).unwrap();
    /// assert_eq!(p.get_value("x").unwrap(), Value::from(4));
    /// assert_eq!(p.get_value("y").unwrap(), Value::from(9));
    /// ```
    pub fn replace(&mut self, input: &Value) -> Result<()> {
        let entries = self.entries(Input::from_value(input)?);
        let schema = Arc::clone(&self.schema);
        for (index, value) in entries {
            if value.is_null() && !schema.fields()[index].is_nullable() {
                continue;
            }
            self.write_field(index, &value)?;
        }
        self.run_related()
    }

    /// Returns a copy with `input` merged in, leaving `self` untouched.
    pub fn merge(&self, input: &Value) -> Result<Self> {
        let mut merged = self.clone();
        merged.replace(input)?;
        Ok(merged)
    }

    /// # Errors
    ///
    /// Returns [`Error::FieldNotFound`] for an undeclared name.
    pub fn get(&self, name: &str) -> Result<&Slot> {
        let index = self.index_of(name)?;
        Ok(&self.slots[index])
    }

    /// A detached copy of a field's value.
    pub fn get_value(&self, name: &str) -> Result<Value> {
        self.get(name).map(Slot::to_value)
    }

    /// Writes one field and runs the related hook.
    ///
    /// Object-typed fields report how much of the input they absorbed; every
    /// other field type reports [`Absorb::Applied`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::FieldNotFound`] for an undeclared name.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<Absorb> {
        let index = self.index_of(name)?;
        let outcome = self.write_field(index, &value.into())?;
        self.run_related()?;
        Ok(outcome)
    }

    /// Resets a field: null when nullable, its default otherwise.
    pub fn unset(&mut self, name: &str) -> Result<()> {
        let index = self.index_of(name)?;
        let field = &self.schema.fields()[index];
        match &mut self.slots[index] {
            Slot::Scalar(scalar) => scalar.unset(),
            slot if field.is_nullable() => *slot = Slot::Null,
            slot => *slot = field.default_slot()?,
        }
        self.run_related()
    }

    pub fn is_set(&self, name: &str) -> Result<bool> {
        self.get(name).map(|slot| !slot.is_null())
    }

    /// Whether `name` (or an alias of it) is a declared field.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.schema.resolve(name).is_some()
    }

    /// The nested record held by `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] when the field holds something else or
    /// is null.
    pub fn record(&self, name: &str) -> Result<&TypedRecord> {
        let slot = self.get(name)?;
        slot.as_record()
            .ok_or_else(|| Error::type_mismatch("record", slot_kind(slot)))
    }

    pub fn record_mut(&mut self, name: &str) -> Result<&mut TypedRecord> {
        let index = self.index_of(name)?;
        let slot = &mut self.slots[index];
        let found = slot_kind(slot);
        slot.as_record_mut()
            .ok_or_else(|| Error::type_mismatch("record", found))
    }

    pub fn collection(&self, name: &str) -> Result<&TypedCollection> {
        let slot = self.get(name)?;
        slot.as_collection()
            .ok_or_else(|| Error::type_mismatch("collection", slot_kind(slot)))
    }

    pub fn collection_mut(&mut self, name: &str) -> Result<&mut TypedCollection> {
        let index = self.index_of(name)?;
        let slot = &mut self.slots[index];
        let found = slot_kind(slot);
        slot.as_collection_mut()
            .ok_or_else(|| Error::type_mismatch("collection", found))
    }

    /// Field names and slots in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Slot)> {
        self.schema
            .fields()
            .iter()
            .map(|field| field.name())
            .zip(self.slots.iter())
    }

    /// A cursor handing out each field's value for in-place editing.
    ///
    /// A changed value is written back through the field's coercion before
    /// the cursor moves on.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use typed_class::{FieldDescriptor, Schema, TypedRecord, value, Value};
    ///
    /// let schema = Schema::builder("Pair")
    ///     .field(FieldDescriptor::int("a"))
    ///     .field(FieldDescriptor::int("b"))
    ///     .build()
    ///     .unwrap();
    /// let mut pair = TypedRecord::from_value(&schema, &value!([2, 3])).unwrap();
    ///
    /// let mut cursor = pair.iter_mut();
    /// while let Some((_, value)) = cursor.next_entry().unwrap() {
    ///     *value = Value::from(format!("{}0", value));
    /// }
    /// cursor.finish().unwrap();
    ///
    /// assert_eq!(pair.get_value("a").unwrap(), Value::from(20));
    /// assert_eq!(pair.get_value("b").unwrap(), Value::from(30));
    /// ```
    pub fn iter_mut(&mut self) -> IterMut<'_> {
        IterMut {
            record: self,
            next: 0,
            staged: None,
        }
    }

    /// Number of declared fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schema.fields().iter().map(|field| field.name())
    }

    /// Exports with the schema's configured options.
    pub fn to_array(&self) -> Result<ValueMap> {
        self.to_array_with(self.schema.export_options())
    }

    /// Exports the record as a plain map in declaration order.
    pub fn to_array_with(&self, options: ExportOptions) -> Result<ValueMap> {
        let mut out = ValueMap::with_capacity(self.slots.len());
        for (field, slot) in self.schema.fields().iter().zip(&self.slots) {
            if options.contains(ExportOptions::OMIT_DEFAULTS) {
                if let Slot::Scalar(scalar) = slot {
                    if scalar.is_default() {
                        continue;
                    }
                }
            }
            let Some(mut value) = export::export_slot(slot, options)? else {
                continue;
            };
            if options.contains(ExportOptions::OMIT_EMPTY) && export::is_empty_value(&value) {
                continue;
            }
            if options.contains(ExportOptions::CAST_ID_TO_OBJECTID) && field.name() == "_id" {
                value = export::cast_object_id(value);
            }
            out.insert(field.name(), value);
        }
        Ok(out)
    }

    /// Exports and encodes as JSON text.
    pub fn to_json(&self) -> Result<String> {
        json::encode(&Value::Array(self.to_array()?))
    }

    fn index_of(&self, name: &str) -> Result<usize> {
        self.schema
            .resolve(name)
            .ok_or_else(|| Error::field_not_found(self.schema.name(), name))
    }

    fn entries(&self, input: Input) -> Vec<(usize, Value)> {
        match input {
            Input::Positional(values) => values
                .into_iter()
                .take(self.slots.len())
                .enumerate()
                .collect(),
            Input::Named(map) => map
                .into_iter()
                .filter_map(|(key, value)| {
                    let name = key.to_string();
                    match self.schema.resolve(&name) {
                        Some(index) => Some((index, value)),
                        None => {
                            debug!(
                                record = self.schema.name(),
                                key = %name,
                                "ignoring unknown key"
                            );
                            None
                        }
                    }
                })
                .collect(),
        }
    }

    fn write_field(&mut self, index: usize, value: &Value) -> Result<Absorb> {
        let schema = Arc::clone(&self.schema);
        let field = &schema.fields()[index];
        let slot = &mut self.slots[index];
        if value.is_null() && !field.field_type().is_scalar() {
            *slot = if field.is_nullable() {
                Slot::Null
            } else {
                field.default_slot()?
            };
            return Ok(Absorb::Applied);
        }
        let outcome = slot.write(field.field_type(), value)?;
        if outcome == Absorb::Unchanged {
            debug!(
                record = schema.name(),
                field = field.name(),
                "field kept its previous value"
            );
        }
        Ok(outcome)
    }

    fn run_related(&mut self) -> Result<()> {
        if self.in_related {
            return Ok(());
        }
        let Some(hook) = self.schema.related_hook() else {
            return Ok(());
        };
        self.in_related = true;
        let result = hook(self);
        self.in_related = false;
        result
    }
}

fn slot_kind(slot: &Slot) -> &'static str {
    match slot {
        Slot::Null => "null",
        Slot::Scalar(_) | Slot::Value(_) => "scalar",
        Slot::Record(_) => "record",
        Slot::Collection(_) => "collection",
        Slot::Object(_) => "object",
    }
}

impl PartialEq for TypedRecord {
    fn eq(&self, other: &Self) -> bool {
        self.schema.name() == other.schema.name() && self.slots == other.slots
    }
}

impl Exportable for TypedRecord {
    fn to_map(&self) -> Result<ValueMap> {
        self.to_array()
    }
}

impl Object for TypedRecord {
    fn class_name(&self) -> &str {
        self.schema.name()
    }

    fn deep_clone(&self) -> Box<dyn Object> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn members(&self) -> ValueMap {
        self.to_array_with(ExportOptions::empty())
            .unwrap_or_else(|err| {
                debug!(record = self.schema.name(), error = %err, "export failed, no members");
                ValueMap::new()
            })
    }

    fn set_member(&mut self, name: &str, value: Value) -> bool {
        self.set(name, value).is_ok()
    }

    fn as_exportable(&self) -> Option<&dyn Exportable> {
        Some(self)
    }

    fn equals(&self, other: &dyn Object) -> bool {
        other
            .as_any()
            .downcast_ref::<TypedRecord>()
            .map_or(false, |o| o == self)
    }
}

struct Staged {
    index: usize,
    original: Value,
    current: Value,
}

/// Editing cursor returned by [`TypedRecord::iter_mut`].
///
/// Dropping the cursor commits the last staged value; use
/// [`IterMut::finish`] to observe errors from that final write.
pub struct IterMut<'a> {
    record: &'a mut TypedRecord,
    next: usize,
    staged: Option<Staged>,
}

impl<'a> IterMut<'a> {
    /// Commits the previous entry and stages the next one.
    pub fn next_entry(&mut self) -> Result<Option<(&str, &mut Value)>> {
        self.commit()?;
        if self.next >= self.record.len() {
            return Ok(None);
        }
        let index = self.next;
        self.next += 1;

        let value = self.record.slots[index].to_value();
        let staged = self.staged.insert(Staged {
            index,
            original: value.clone(),
            current: value,
        });
        let name = self.record.schema.fields()[index].name();
        Ok(Some((name, &mut staged.current)))
    }

    /// Commits the last staged entry.
    pub fn finish(mut self) -> Result<()> {
        self.commit()
    }

    fn commit(&mut self) -> Result<()> {
        if let Some(staged) = self.staged.take() {
            if staged.current != staged.original {
                self.record.write_field(staged.index, &staged.current)?;
                self.record.run_related()?;
            }
        }
        Ok(())
    }
}

impl Drop for IterMut<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.commit() {
            debug!(error = %err, "discarding failed write from record cursor");
        }
    }
}
