//! Scalar boxes: one coerced value with nullability and a remembered default.

use crate::cast::{self, Kind};
use crate::object::Object;
use crate::{Result, Value};
use std::any::Any;

/// A single value of a fixed [`Kind`].
///
/// Every write goes through the coercion engine. Writing null stores null
/// when the box is nullable and the default captured at construction
/// otherwise, so clearing a non-nullable box restores its original value
/// rather than the kind's zero.
///
/// # Examples
///
/// ```rust
/// use typed_class::{Kind, ScalarBox, Value};
///
/// let mut qty = ScalarBox::new(Kind::Int, &Value::from("5"), false).unwrap();
/// assert_eq!(qty.get(), &Value::from(5));
///
/// qty.set(&Value::from(9.7)).unwrap();
/// assert_eq!(qty.get(), &Value::from(9));
///
/// qty.unset();
/// assert_eq!(qty.get(), &Value::from(5));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarBox {
    kind: Kind,
    value: Value,
    nullable: bool,
    default: Value,
}

impl ScalarBox {
    /// Creates a box, capturing the coerced `initial` as its default.
    ///
    /// A null `initial` yields null for a nullable box and the kind's zero
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Propagates encoding errors from string coercion.
    pub fn new(kind: Kind, initial: &Value, nullable: bool) -> Result<Self> {
        let mut scalar = ScalarBox {
            kind,
            value: Value::Null,
            nullable,
            default: kind.zero(),
        };
        if nullable && initial.is_null() {
            scalar.default = Value::Null;
            return Ok(scalar);
        }

        if initial.is_null() {
            scalar.set(&kind.zero())?;
        } else {
            scalar.set(initial)?;
        }
        scalar.default = scalar.value.clone();
        Ok(scalar)
    }

    /// Coerces and stores `value`.
    ///
    /// # Errors
    ///
    /// Propagates encoding errors from string coercion.
    pub fn set(&mut self, value: &Value) -> Result<()> {
        let coerced = if value.is_null() {
            Value::Null
        } else {
            cast::coerce(self.kind, value, self.nullable)?
        };
        self.value = match coerced {
            Value::Null if !self.nullable => self.default.clone(),
            other => other,
        };
        Ok(())
    }

    #[must_use]
    pub fn get(&self) -> &Value {
        &self.value
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        self.value
    }

    #[must_use]
    pub fn is_set(&self) -> bool {
        !self.value.is_null()
    }

    /// Same as setting null.
    pub fn unset(&mut self) {
        self.value = if self.nullable {
            Value::Null
        } else {
            self.default.clone()
        };
    }

    #[must_use]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    #[must_use]
    pub fn default_value(&self) -> &Value {
        &self.default
    }

    #[must_use]
    pub fn is_default(&self) -> bool {
        self.value == self.default
    }
}

impl Object for ScalarBox {
    fn class_name(&self) -> &str {
        match self.kind {
            Kind::Bool => "BoolBox",
            Kind::Int => "IntBox",
            Kind::Float => "FloatBox",
            Kind::String => "StringBox",
            Kind::RawArray => "ArrayBox",
        }
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

    fn atomic(&self) -> Option<Value> {
        Some(self.value.clone())
    }

    fn equals(&self, other: &dyn Object) -> bool {
        other
            .as_any()
            .downcast_ref::<ScalarBox>()
            .map_or(false, |o| o == self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value;

    #[test]
    fn test_nullable_box_starts_null() {
        let b = ScalarBox::new(Kind::String, &Value::Null, true).unwrap();
        assert!(!b.is_set());
        assert_eq!(b.default_value(), &Value::Null);
    }

    #[test]
    fn test_non_nullable_box_starts_at_zero() {
        let b = ScalarBox::new(Kind::Float, &Value::Null, false).unwrap();
        assert_eq!(b.get(), &Value::from(0.0));
        let b = ScalarBox::new(Kind::RawArray, &Value::Null, false).unwrap();
        assert_eq!(b.get(), &value!([]));
    }

    #[test]
    fn test_null_token_falls_back_to_default() {
        let mut b = ScalarBox::new(Kind::Float, &Value::from(2.5), true).unwrap();
        b.set(&Value::from("nan")).unwrap();
        assert_eq!(b.get(), &Value::Null);

        let mut b = ScalarBox::new(Kind::Int, &Value::from(7), false).unwrap();
        b.set(&Value::Null).unwrap();
        assert_eq!(b.get(), &Value::from(7));
    }

    #[test]
    fn test_string_box_encodes_maps() {
        let mut b = ScalarBox::new(Kind::String, &Value::Null, false).unwrap();
        b.set(&value!({ "a": 1 })).unwrap();
        assert_eq!(b.get(), &Value::from(r#"{"a":1}"#));
    }

    #[test]
    fn test_box_is_atomic_object() {
        let b = ScalarBox::new(Kind::Bool, &Value::from(1), false).unwrap();
        let wrapped = Value::object(b);
        assert_eq!(crate::cast::to_integer(&wrapped, false), Some(1));
        assert_eq!(crate::cast::to_string(&wrapped).unwrap(), Some("1".to_string()));
    }
}
