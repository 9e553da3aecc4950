//! Field and element storage.
//!
//! A [`Slot`] is what a record field or a collection element holds at rest.
//! Scalars live in a [`ScalarBox`] (record fields) or as an already-coerced
//! [`Value`] (collection elements); nested containers and objects are owned
//! outright so cloning a parent clones them too.

use crate::cast;
use crate::object::{object_to_map, Object, ObjectClass};
use crate::schema::FieldType;
use crate::{Result, ScalarBox, TypedCollection, TypedRecord, Value, ValueMap};
use tracing::debug;

/// The result of writing into an object-typed slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Absorb {
    /// The input was taken as a whole.
    Applied,
    /// Only some of the input's members found a home.
    PartiallyApplied,
    /// Nothing could be absorbed; the previous value is still there.
    Unchanged,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Null,
    Scalar(ScalarBox),
    Value(Value),
    Record(TypedRecord),
    Collection(TypedCollection),
    Object(Box<dyn Object>),
}

impl Slot {
    /// Builds the initial slot for a record field.
    ///
    /// Nullable container and object fields with no default start out null;
    /// all others get a fresh instance with the default absorbed into it.
    pub(crate) fn for_field(
        field_type: &FieldType,
        default: &Value,
        nullable: bool,
    ) -> Result<Slot> {
        match field_type {
            FieldType::Scalar(kind) => Ok(Slot::Scalar(ScalarBox::new(*kind, default, nullable)?)),
            FieldType::Any => Ok(Slot::Value(default.clone())),
            _ if nullable && default.is_null() => Ok(Slot::Null),
            _ => Slot::for_element(field_type, default),
        }
    }

    /// Builds a slot holding `value` coerced to `element`.
    ///
    /// Scalars never end up null here: a null result becomes the kind's zero.
    pub(crate) fn for_element(element: &FieldType, value: &Value) -> Result<Slot> {
        match element {
            FieldType::Scalar(kind) => {
                let coerced = cast::coerce(*kind, value, false)?;
                Ok(Slot::Value(if coerced.is_null() { kind.zero() } else { coerced }))
            }
            FieldType::Any => Ok(Slot::Value(value.clone())),
            FieldType::Record(schema) => match value.downcast_ref::<TypedRecord>() {
                Some(record) if record.schema().name() == schema.name() => {
                    Ok(Slot::Record(record.clone()))
                }
                _ => Ok(Slot::Record(TypedRecord::from_value(schema, value)?)),
            },
            FieldType::Collection(inner) => match value.downcast_ref::<TypedCollection>() {
                Some(collection) if collection.element_type() == inner.as_ref() => {
                    Ok(Slot::Collection(collection.clone()))
                }
                _ => Ok(Slot::Collection(TypedCollection::from_value(
                    inner.as_ref().clone(),
                    value,
                )?)),
            },
            FieldType::Object(class) => {
                let mut slot = Slot::Object(class.instantiate());
                if !value.is_null() {
                    slot.absorb_object(class.as_ref(), value);
                }
                Ok(slot)
            }
        }
    }

    /// Writes `value` into this slot.
    ///
    /// Existing nested records and collections merge the input in place;
    /// a null input replaces them with a fresh default instance.
    pub(crate) fn write(&mut self, field_type: &FieldType, value: &Value) -> Result<Absorb> {
        if let FieldType::Object(class) = field_type {
            if !value.is_null() {
                return Ok(self.absorb_object(class.as_ref(), value));
            }
        }
        match self {
            Slot::Scalar(scalar) if matches!(field_type, FieldType::Scalar(_)) => {
                scalar.set(value)?;
            }
            Slot::Record(record) if !value.is_null() => record.replace(value)?,
            Slot::Collection(collection) if !value.is_null() => collection.replace(value)?,
            _ => *self = Slot::for_element(field_type, value)?,
        }
        Ok(Absorb::Applied)
    }

    /// Moves `value` into an object slot: a clone when the class matches, a
    /// constructed instance when the class accepts the whole value, and a
    /// member-by-member copy otherwise.
    fn absorb_object(&mut self, class: &dyn ObjectClass, value: &Value) -> Absorb {
        if let Value::Object(obj) = value {
            if obj.class_name() == class.name() {
                *self = Slot::Object(obj.deep_clone());
                return Absorb::Applied;
            }
        }

        match class.construct(value) {
            Ok(obj) => {
                *self = Slot::Object(obj);
                return Absorb::Applied;
            }
            Err(err) => {
                debug!(class = class.name(), error = %err, "construction failed, copying members");
            }
        }

        let members = match value {
            Value::Array(map) => map.clone(),
            Value::Object(obj) => match object_to_map(obj.as_ref()) {
                Ok(map) => map,
                Err(err) => {
                    debug!(
                        class = class.name(),
                        error = %err,
                        "source members unavailable, field unchanged"
                    );
                    return Absorb::Unchanged;
                }
            },
            _ => ValueMap::new(),
        };

        let mut target = match self {
            Slot::Object(obj) => obj.deep_clone(),
            _ => class.instantiate(),
        };
        let total = members.len();
        let applied = members
            .into_iter()
            .filter(|(key, member)| target.set_member(&key.to_string(), member.clone()))
            .count();

        if applied == 0 {
            debug!(
                class = class.name(),
                input = value.type_name(),
                "input could not be absorbed, field unchanged"
            );
            return Absorb::Unchanged;
        }
        *self = Slot::Object(target);
        if applied == total {
            Absorb::Applied
        } else {
            Absorb::PartiallyApplied
        }
    }

    /// A detached snapshot of the slot's contents.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Slot::Null => Value::Null,
            Slot::Scalar(scalar) => scalar.get().clone(),
            Slot::Value(value) => value.clone(),
            Slot::Record(record) => Value::object(record.clone()),
            Slot::Collection(collection) => Value::object(collection.clone()),
            Slot::Object(obj) => Value::Object(obj.deep_clone()),
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        match self {
            Slot::Null => true,
            Slot::Scalar(scalar) => !scalar.is_set(),
            Slot::Value(value) => value.is_null(),
            _ => false,
        }
    }

    #[must_use]
    pub fn as_record(&self) -> Option<&TypedRecord> {
        match self {
            Slot::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_record_mut(&mut self) -> Option<&mut TypedRecord> {
        match self {
            Slot::Record(record) => Some(record),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_collection(&self) -> Option<&TypedCollection> {
        match self {
            Slot::Collection(collection) => Some(collection),
            _ => None,
        }
    }

    pub fn as_collection_mut(&mut self) -> Option<&mut TypedCollection> {
        match self {
            Slot::Collection(collection) => Some(collection),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&dyn Object> {
        match self {
            Slot::Object(obj) => Some(obj.as_ref()),
            _ => None,
        }
    }
}
