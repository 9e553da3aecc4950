//! Typed collections: ordered maps whose elements share one declared type.
//!
//! Every write coerces the element, including writes made through the
//! editing cursor, so reading any element always yields the declared type.
//!
//! ## Examples
//!
//! ```rust
//! use typed_class::{Kind, TypedCollection, value, Value};
//!
//! let mut numbers = TypedCollection::from_value(Kind::Int, &value!(["1", 2, "3"])).unwrap();
//! numbers.assign(&value!([10, 20, 30])).unwrap();
//!
//! let pairs: Vec<_> = numbers.iter().map(|(k, v)| (k.clone(), v.to_value())).collect();
//! assert_eq!(pairs[2].1, Value::from(30));
//!
//! numbers.combine(["a", "b", "c"]).unwrap();
//! assert_eq!(numbers.get_value("b"), Some(Value::from(20)));
//! ```

use crate::export;
use crate::map::{Key, KeyedMap};
use crate::object::{Exportable, Object};
use crate::schema::FieldType;
use crate::slot::{Absorb, Slot};
use crate::{cast, json, Error, ExportOptions, Result, TypedRecord, Value, ValueMap};
use std::any::Any;
use tracing::debug;

/// An ordered keyed collection with one element type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedCollection {
    element: FieldType,
    items: KeyedMap<Slot>,
    options: ExportOptions,
}

impl TypedCollection {
    pub const CLASS: &'static str = "TypedCollection";

    pub fn new(element: impl Into<FieldType>) -> Self {
        TypedCollection {
            element: element.into(),
            items: KeyedMap::new(),
            options: ExportOptions::empty(),
        }
    }

    /// Creates a collection and assigns `input` to it.
    pub fn from_value(element: impl Into<FieldType>, input: &Value) -> Result<Self> {
        let mut collection = Self::new(element);
        collection.assign(input)?;
        Ok(collection)
    }

    /// Sets the options [`TypedCollection::to_array`] exports with.
    #[must_use]
    pub fn with_export_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn element_type(&self) -> &FieldType {
        &self.element
    }

    /// Replaces the contents with `input`. Null or malformed JSON clears
    /// the collection.
    ///
    /// # Errors
    ///
    /// Propagates coercion errors; the previous contents are kept when any
    /// element fails.
    pub fn assign(&mut self, input: &Value) -> Result<()> {
        let entries = Self::bulk_entries(input)?;
        let previous = std::mem::take(&mut self.items);
        for (key, value) in entries {
            if let Err(err) = self.write_entry(key, &value) {
                self.items = previous;
                return Err(err);
            }
        }
        Ok(())
    }

    /// Writes every entry of `input` by key, merging into existing elements.
    pub fn replace(&mut self, input: &Value) -> Result<()> {
        for (key, value) in Self::bulk_entries(input)? {
            self.write_entry(key, &value)?;
        }
        Ok(())
    }

    fn bulk_entries(input: &Value) -> Result<ValueMap> {
        Ok(match input {
            Value::Null => ValueMap::new(),
            Value::String(text) if text.trim().eq_ignore_ascii_case("null") => ValueMap::new(),
            Value::String(text) => match json::decode(text) {
                Some(Value::Array(map)) => map,
                Some(Value::Null) | None => ValueMap::new(),
                Some(scalar) => ValueMap::from(vec![scalar]),
            },
            Value::Object(obj) => match obj.as_any().downcast_ref::<TypedCollection>() {
                Some(other) => other
                    .items
                    .iter()
                    .map(|(key, slot)| (key.clone(), slot.to_value()))
                    .collect(),
                None => cast::to_array(input)?.unwrap_or_default(),
            },
            other => cast::to_array(other)?.unwrap_or_default(),
        })
    }

    /// Writes `value` at `key`. An existing nested element absorbs the value
    /// in place.
    pub fn set(&mut self, key: impl Into<Key>, value: impl Into<Value>) -> Result<Absorb> {
        self.write_entry(key.into(), &value.into())
    }

    /// Appends at the next integer position and returns the key used.
    pub fn push(&mut self, value: impl Into<Value>) -> Result<Key> {
        let key = self.items.next_key();
        self.write_entry(key.clone(), &value.into())?;
        Ok(key)
    }

    fn write_entry(&mut self, key: Key, value: &Value) -> Result<Absorb> {
        match self.items.get_mut(&key) {
            Some(slot) => {
                let outcome = slot.write(&self.element, value)?;
                if outcome == Absorb::Unchanged {
                    debug!(key = %key, element = %self.element, "element kept its previous value");
                }
                Ok(outcome)
            }
            None => {
                let slot = Slot::for_element(&self.element, value)?;
                self.items.insert(key, slot);
                Ok(Absorb::Applied)
            }
        }
    }

    #[must_use]
    pub fn get(&self, key: impl Into<Key>) -> Option<&Slot> {
        self.items.get(key)
    }

    #[must_use]
    pub fn get_value(&self, key: impl Into<Key>) -> Option<Value> {
        self.items.get(key).map(Slot::to_value)
    }

    /// The nested record at `key`, for element types that are records.
    pub fn record_mut(&mut self, key: impl Into<Key>) -> Option<&mut TypedRecord> {
        self.items.get_mut(key).and_then(Slot::as_record_mut)
    }

    pub fn collection_mut(&mut self, key: impl Into<Key>) -> Option<&mut TypedCollection> {
        self.items.get_mut(key).and_then(Slot::as_collection_mut)
    }

    #[must_use]
    pub fn has(&self, key: impl Into<Key>) -> bool {
        self.items.contains_key(key)
    }

    /// Removes an element, returning its value.
    pub fn delete(&mut self, key: impl Into<Key>) -> Option<Value> {
        self.items.remove(key).map(|slot| slot.to_value())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.items.keys()
    }

    /// Re-keys the elements positionally with `keys`.
    ///
    /// A key given twice keeps the later element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthMismatch`] unless exactly one key is given per
    /// element.
    pub fn combine<I, K>(&mut self, keys: I) -> Result<()>
    where
        I: IntoIterator<Item = K>,
        K: Into<Key>,
    {
        let keys: Vec<Key> = keys.into_iter().map(Into::into).collect();
        if keys.len() != self.items.len() {
            return Err(Error::length_mismatch(self.items.len(), keys.len()));
        }
        let items = std::mem::take(&mut self.items);
        self.items = keys
            .into_iter()
            .zip(items.into_iter().map(|(_, slot)| slot))
            .collect();
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Slot)> {
        self.items.iter()
    }

    /// A cursor handing out each element's value for in-place editing.
    ///
    /// A changed value is re-coerced to the element type before the cursor
    /// moves on.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use typed_class::{Kind, TypedCollection, value, Value};
    ///
    /// let mut c = TypedCollection::from_value(Kind::Float, &value!([1, 2])).unwrap();
    /// let mut cursor = c.iter_mut();
    /// while let Some((_, value)) = cursor.next_entry().unwrap() {
    ///     *value = Value::from("7,5");
    /// }
    /// cursor.finish().unwrap();
    /// assert_eq!(c.get_value(1), Some(Value::from(7.5)));
    /// ```
    pub fn iter_mut(&mut self) -> IterMut<'_> {
        IterMut {
            collection: self,
            next: 0,
            staged: None,
        }
    }

    /// Exports with the collection's configured options.
    pub fn to_array(&self) -> Result<ValueMap> {
        self.to_array_with(self.options)
    }

    /// Exports the elements as a plain map.
    ///
    /// Elements of a declared object type are flattened to their string form
    /// or members.
    pub fn to_array_with(&self, options: ExportOptions) -> Result<ValueMap> {
        let flatten = matches!(self.element, FieldType::Object(_));
        let mut out = ValueMap::with_capacity(self.items.len());
        for (key, slot) in &self.items {
            let exported = match slot {
                Slot::Object(obj) => export::export_object(obj.as_ref(), options, flatten)?,
                other => export::export_slot(other, options)?,
            };
            let Some(value) = exported else {
                continue;
            };
            if options.contains(ExportOptions::OMIT_EMPTY) && export::is_empty_value(&value) {
                continue;
            }
            out.insert(key.clone(), value);
        }
        Ok(out)
    }

    pub fn to_json(&self) -> Result<String> {
        json::encode(&Value::Array(self.to_array()?))
    }
}

impl Exportable for TypedCollection {
    fn to_map(&self) -> Result<ValueMap> {
        self.to_array()
    }
}

impl Object for TypedCollection {
    fn class_name(&self) -> &str {
        Self::CLASS
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
                debug!(element = %self.element, error = %err, "export failed, no members");
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
            .downcast_ref::<TypedCollection>()
            .map_or(false, |o| o == self)
    }
}

struct Staged {
    key: Key,
    original: Value,
    current: Value,
}

/// Editing cursor returned by [`TypedCollection::iter_mut`].
///
/// Elements added or removed through other handles are not possible while
/// the cursor borrows the collection, so positions stay stable.
pub struct IterMut<'a> {
    collection: &'a mut TypedCollection,
    next: usize,
    staged: Option<Staged>,
}

impl<'a> IterMut<'a> {
    /// Commits the previous element and stages the next one.
    pub fn next_entry(&mut self) -> Result<Option<(&Key, &mut Value)>> {
        self.commit()?;
        let Some((key, slot)) = self.collection.items.get_index(self.next) else {
            return Ok(None);
        };
        self.next += 1;

        let value = slot.to_value();
        let staged = self.staged.insert(Staged {
            key: key.clone(),
            original: value.clone(),
            current: value,
        });
        Ok(Some((&staged.key, &mut staged.current)))
    }

    /// Commits the last staged element.
    pub fn finish(mut self) -> Result<()> {
        self.commit()
    }

    fn commit(&mut self) -> Result<()> {
        if let Some(staged) = self.staged.take() {
            if staged.current != staged.original {
                self.collection.write_entry(staged.key, &staged.current)?;
            }
        }
        Ok(())
    }
}

impl Drop for IterMut<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.commit() {
            debug!(error = %err, "discarding failed write from collection cursor");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{value, Kind};

    #[test]
    fn test_bulk_entries_leniency() {
        assert!(TypedCollection::bulk_entries(&Value::from("{oops")).unwrap().is_empty());
        assert!(TypedCollection::bulk_entries(&Value::from("NULL")).unwrap().is_empty());
        assert_eq!(
            TypedCollection::bulk_entries(&Value::from("5")).unwrap(),
            ValueMap::from(vec![Value::from(5)])
        );
        assert_eq!(
            TypedCollection::bulk_entries(&Value::from(true)).unwrap(),
            ValueMap::from(vec![Value::from(true)])
        );
    }

    #[test]
    fn test_null_key_appends() {
        let mut c = TypedCollection::new(Kind::String);
        c.set(3, 1).unwrap();
        assert_eq!(c.push(2).unwrap(), Key::Index(4));
        assert_eq!(c.get_value(4), Some(Value::from("2")));
    }

    #[test]
    fn test_null_element_is_zero() {
        let c = TypedCollection::from_value(Kind::Bool, &value!([null, 1])).unwrap();
        assert_eq!(c.get_value(0), Some(Value::from(false)));
        assert_eq!(c.get_value(1), Some(Value::from(true)));
    }

    #[test]
    fn test_delete_and_has() {
        let mut c = TypedCollection::from_value(Kind::Int, &value!({ "a": "1", "b": 2 })).unwrap();
        assert!(c.has("a"));
        assert_eq!(c.delete("a"), Some(Value::from(1)));
        assert!(!c.has("a"));
        assert_eq!(c.delete("a"), None);
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn test_combine_duplicate_keys_keep_last() {
        let mut c = TypedCollection::from_value(Kind::Int, &value!([1, 2, 3])).unwrap();
        c.combine(["x", "y", "x"]).unwrap();
        assert_eq!(c.len(), 2);
        assert_eq!(c.get_value("x"), Some(Value::from(3)));
    }

    #[test]
    fn test_omit_empty_export() {
        let c = TypedCollection::from_value(Kind::Int, &value!([0, 5, 0]))
            .unwrap()
            .with_export_options(ExportOptions::OMIT_EMPTY);
        let exported = c.to_array().unwrap();
        assert_eq!(exported.len(), 1);
        assert_eq!(exported.get(1), Some(&Value::from(5)));
    }
}
