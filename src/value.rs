//! Dynamic value representation for weakly-typed input.
//!
//! [`Value`] is what every typed container consumes: the loosely-typed data
//! coming from decoded JSON, request parameters, another record's export or a
//! foreign object. Records and collections coerce it into their declared types.
//!
//! ## Core Types
//!
//! - [`Value`]: null, bool, number, string, ordered map or object
//! - [`Number`]: an integer or floating-point number
//!
//! ### Creating Values
//!
//! ```rust
//! use typed_class::{value, Value};
//!
//! let text = Value::from("hello");
//! let list = value!([1, 2, 3]);
//! let obj = value!({ "name": "Alice", "age": 30 });
//!
//! assert!(text.is_string());
//! assert!(list.as_array().map_or(false, |a| a.is_list()));
//! assert_eq!(obj.as_array().and_then(|m| m.get("age")), Some(&Value::from(30)));
//! ```
//!
//! ### Extracting Values
//!
//! ```rust
//! use typed_class::Value;
//! use std::convert::TryFrom;
//!
//! let num: i64 = i64::try_from(Value::from(42)).unwrap();
//! assert_eq!(num, 42);
//! ```

use crate::object::{capability, Capability, Object};
use crate::{Key, ValueMap};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A dynamically-typed value.
///
/// `Array` is an ordered associative array (see [`ValueMap`]); it represents
/// both lists and string-keyed maps. `Object` carries anything implementing
/// [`Object`], including [`TypedRecord`](crate::TypedRecord) and
/// [`TypedCollection`](crate::TypedCollection). Cloning a `Value` is always
/// deep.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(ValueMap),
    Object(Box<dyn Object>),
}

/// A numeric value.
///
/// # Examples
///
/// ```rust
/// use typed_class::Number;
///
/// assert_eq!(Number::Integer(42).as_f64(), 42.0);
/// assert_eq!(Number::Float(42.9).as_i64(), 42);
/// assert_eq!(Number::Float(f64::NAN).to_string(), "NAN");
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

impl Number {
    #[inline]
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Number::Integer(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, Number::Float(_))
    }

    /// Truncating conversion to `i64`.
    ///
    /// Non-finite floats become 0; out-of-range floats saturate.
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> i64 {
        match self {
            Number::Integer(i) => *i,
            Number::Float(f) if f.is_finite() => *f as i64,
            Number::Float(_) => 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Integer(i) => *i as f64,
            Number::Float(f) => *f,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_zero(&self) -> bool {
        match self {
            Number::Integer(i) => *i == 0,
            Number::Float(f) => *f == 0.0,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{}", i),
            Number::Float(fl) if fl.is_nan() => write!(f, "NAN"),
            Number::Float(fl) if fl.is_infinite() => {
                write!(f, "{}", if *fl > 0.0 { "INF" } else { "-INF" })
            }
            Number::Float(fl) => write!(f, "{}", fl),
        }
    }
}

impl Value {
    /// Wraps an object.
    pub fn object<O: Object>(object: O) -> Self {
        Value::Object(Box::new(object))
    }

    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// If the value is an integer, returns it. Floats are not truncated here.
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(Number::Integer(i)) => Some(*i),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(n.as_f64()),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&ValueMap> {
        match self {
            Value::Array(map) => Some(map),
            _ => None,
        }
    }

    #[inline]
    pub fn as_array_mut(&mut self) -> Option<&mut ValueMap> {
        match self {
            Value::Array(map) => Some(map),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_object(&self) -> Option<&dyn Object> {
        match self {
            Value::Object(obj) => Some(obj.as_ref()),
            _ => None,
        }
    }

    /// Downcasts an object value to a concrete type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use typed_class::{Timestamp, Value};
    ///
    /// let value = Value::object(Timestamp::parse("2024-03-01").unwrap());
    /// assert!(value.downcast_ref::<Timestamp>().is_some());
    /// assert!(Value::from(1).downcast_ref::<Timestamp>().is_none());
    /// ```
    #[must_use]
    pub fn downcast_ref<T: Object>(&self) -> Option<&T> {
        self.as_object()
            .and_then(|obj| obj.as_any().downcast_ref::<T>())
    }

    pub fn downcast_mut<T: Object>(&mut self) -> Option<&mut T> {
        match self {
            Value::Object(obj) => obj.as_any_mut().downcast_mut::<T>(),
            _ => None,
        }
    }

    /// A short name for the value's type, used in diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(Number::Integer(_)) => "int",
            Value::Number(Number::Float(_)) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(obj) => obj.class_name(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Array(map) => match crate::json::encode(self) {
                Ok(json) => write!(f, "{}", json),
                Err(_) => write!(f, "Array[{}]", map.len()),
            },
            Value::Object(obj) => write!(f, "{{{}}}", obj.class_name()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::Error;

        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(Number::Integer(i)) => serializer.serialize_i64(*i),
            Value::Number(Number::Float(f)) if f.is_finite() => serializer.serialize_f64(*f),
            Value::Number(Number::Float(f)) => Err(S::Error::custom(format!(
                "{} is not representable",
                Number::Float(*f)
            ))),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(map) => serialize_map(map, serializer),
            Value::Object(obj) => match capability(obj.as_ref()) {
                Capability::Atomic(value) => value.serialize(serializer),
                Capability::Stringify(s) => serializer.serialize_str(&s.stringify()),
                Capability::Date(d) => serializer.serialize_str(&d.format_canonical()),
                Capability::Map(e) => {
                    let map = e.to_map().map_err(S::Error::custom)?;
                    serialize_map(&map, serializer)
                }
                Capability::Members if obj.is_resource() => Err(S::Error::custom(format!(
                    "resource {} is not representable",
                    obj.class_name()
                ))),
                Capability::Members => serialize_map(&obj.members(), serializer),
            },
        }
    }
}

fn serialize_map<S>(map: &ValueMap, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    use serde::ser::{SerializeMap, SerializeSeq};

    if map.is_list() {
        let mut seq = serializer.serialize_seq(Some(map.len()))?;
        for element in map.values() {
            seq.serialize_element(element)?;
        }
        seq.end()
    } else {
        let mut state = serializer.serialize_map(Some(map.len()))?;
        for (k, v) in map.iter() {
            state.serialize_entry(k, v)?;
        }
        state.end()
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any JSON-compatible value")
            }

            fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E> {
                Ok(Value::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E> {
                Ok(Value::Number(Number::Integer(value)))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E> {
                Ok(Value::from(value))
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E> {
                Ok(Value::Number(Number::Float(value)))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E> {
                Ok(Value::String(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> Result<Self::Value, E> {
                Ok(Value::String(value))
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E> {
                Ok(Value::Null)
            }

            fn visit_none<E>(self) -> Result<Self::Value, E> {
                Ok(Value::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut values = ValueMap::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(elem) = seq.next_element()? {
                    values.push(elem);
                }
                Ok(Value::Array(values))
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut values = ValueMap::new();
                while let Some((key, value)) = map.next_entry::<String, Value>()? {
                    values.insert(Key::from(key), value);
                }
                Ok(Value::Array(values))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

// Strict extraction; use the `cast` module for lenient coercion.
impl TryFrom<Value> for i64 {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Number(Number::Integer(i)) => Ok(i),
            other => Err(crate::Error::type_mismatch("int", other.type_name())),
        }
    }
}

impl TryFrom<Value> for f64 {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Number(n) => Ok(n.as_f64()),
            other => Err(crate::Error::type_mismatch("float", other.type_name())),
        }
    }
}

impl TryFrom<Value> for bool {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(crate::Error::type_mismatch("bool", other.type_name())),
        }
    }
}

impl TryFrom<Value> for String {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(crate::Error::type_mismatch("string", other.type_name())),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i8> for Value {
    fn from(value: i8) -> Self {
        Value::Number(Number::Integer(value as i64))
    }
}

impl From<i16> for Value {
    fn from(value: i16) -> Self {
        Value::Number(Number::Integer(value as i64))
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(Number::Integer(value as i64))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(Number::Integer(value))
    }
}

impl From<u8> for Value {
    fn from(value: u8) -> Self {
        Value::Number(Number::Integer(value as i64))
    }
}

impl From<u16> for Value {
    fn from(value: u16) -> Self {
        Value::Number(Number::Integer(value as i64))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Number(Number::Integer(value as i64))
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(i) => Value::Number(Number::Integer(i)),
            Err(_) => Value::Number(Number::Float(value as f64)),
        }
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::from(value as u64)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Number(Number::Float(value as f64))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(Number::Float(value))
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Value::Number(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(ValueMap::from(value))
    }
}

impl From<ValueMap> for Value {
    fn from(value: ValueMap) -> Self {
        Value::Array(value)
    }
}

impl From<Box<dyn Object>> for Value {
    fn from(value: Box<dyn Object>) -> Self {
        Value::Object(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::TryFrom;

    #[test]
    fn test_tryfrom_is_strict() {
        assert_eq!(i64::try_from(Value::from(42)).unwrap(), 42);
        assert!(i64::try_from(Value::from(42.0)).is_err());
        assert!(i64::try_from(Value::from("42")).is_err());
        assert_eq!(f64::try_from(Value::from(2)).unwrap(), 2.0);
        assert!(bool::try_from(Value::from(1)).is_err());
        assert_eq!(String::try_from(Value::from("hi")).unwrap(), "hi");
    }

    #[test]
    fn test_from_primitives() {
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(42u8), Value::Number(Number::Integer(42)));
        assert_eq!(Value::from(3.5f64), Value::Number(Number::Float(3.5)));
        assert_eq!(Value::from(u64::MAX).type_name(), "float");
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::from("x"));
    }

    #[test]
    fn test_number_truncation() {
        assert_eq!(Number::Float(3.1415).as_i64(), 3);
        assert_eq!(Number::Float(-2.9).as_i64(), -2);
        assert_eq!(Number::Float(f64::NAN).as_i64(), 0);
        assert_eq!(Number::Float(1e300).as_i64(), i64::MAX);
    }

    #[test]
    fn test_number_display() {
        assert_eq!(Number::Float(0.5).to_string(), "0.5");
        assert_eq!(Number::Float(2.0).to_string(), "2");
        assert_eq!(Number::Float(f64::NEG_INFINITY).to_string(), "-INF");
    }

    #[test]
    fn test_deserialize_normalizes_keys() {
        let value: Value = serde_json::from_str(r#"{"0":"a","name":"b"}"#).unwrap();
        let map = value.as_array().unwrap();
        assert_eq!(map.get(0), Some(&Value::from("a")));
        assert!(!map.is_list());
    }

    #[test]
    fn test_serialize_list_and_map() {
        let list = Value::from(vec![Value::from(1), Value::Null]);
        assert_eq!(serde_json::to_string(&list).unwrap(), "[1,null]");

        let mut map = ValueMap::new();
        map.insert(1, Value::from("x"));
        assert_eq!(
            serde_json::to_string(&Value::Array(map)).unwrap(),
            r#"{"1":"x"}"#
        );
    }

    #[test]
    fn test_serialize_rejects_nan() {
        assert!(serde_json::to_string(&Value::from(f64::NAN)).is_err());
    }
}
