//! Object values and their capabilities.
//!
//! Anything that is not a plain scalar or map travels through [`Value::Object`]
//! as a `Box<dyn Object>`. The coercion engine never looks inside an object; it
//! only asks which capabilities it has, and always in the same order:
//!
//! 1. atomic value ([`Object::atomic`])
//! 2. custom string form ([`Stringable`])
//! 3. date formatting ([`DateFormattable`])
//! 4. map export ([`Exportable`])
//! 5. generic member copy ([`Object::members`])
//!
//! A field may also declare a plain object type through an [`ObjectClass`],
//! which knows how to build a default instance and how to construct one from
//! an arbitrary value.

use crate::{Error, Result, Value, ValueMap};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::any::Any;
use std::fmt;

/// A value exposing a map view of itself.
pub trait Exportable {
    fn to_map(&self) -> Result<ValueMap>;
}

/// A value with a custom string form.
pub trait Stringable {
    fn stringify(&self) -> String;
}

/// A date-like value with a canonical ISO-8601 form.
pub trait DateFormattable {
    fn format_canonical(&self) -> String;
}

/// An object carried inside a [`Value`].
///
/// Only `class_name`, `deep_clone` and the `Any` accessors are required;
/// everything else defaults to "capability absent".
pub trait Object: fmt::Debug + Send + Sync + 'static {
    /// Class identity. Two objects are "the exact same type" when their class
    /// names are equal.
    fn class_name(&self) -> &str;

    /// A copy sharing no mutable state with `self`.
    fn deep_clone(&self) -> Box<dyn Object>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Public members, for generic member-by-member copy.
    fn members(&self) -> ValueMap {
        ValueMap::new()
    }

    /// Absorbs one member. Returns `false` when the object has no such member
    /// or cannot take the value.
    fn set_member(&mut self, _name: &str, _value: Value) -> bool {
        false
    }

    /// Non-data handles (files, sockets, ...) that exports may drop.
    fn is_resource(&self) -> bool {
        false
    }

    fn atomic(&self) -> Option<Value> {
        None
    }

    fn as_stringable(&self) -> Option<&dyn Stringable> {
        None
    }

    fn as_date(&self) -> Option<&dyn DateFormattable> {
        None
    }

    fn as_exportable(&self) -> Option<&dyn Exportable> {
        None
    }

    fn equals(&self, other: &dyn Object) -> bool {
        self.class_name() == other.class_name() && self.members() == other.members()
    }
}

impl Clone for Box<dyn Object> {
    fn clone(&self) -> Self {
        self.deep_clone()
    }
}

impl PartialEq for Box<dyn Object> {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other.as_ref())
    }
}

/// The highest-priority capability an object offers.
pub enum Capability<'a> {
    Atomic(Value),
    Stringify(&'a dyn Stringable),
    Date(&'a dyn DateFormattable),
    Map(&'a dyn Exportable),
    Members,
}

/// Resolves an object's capability in the fixed priority order.
pub fn capability(object: &dyn Object) -> Capability<'_> {
    if let Some(value) = object.atomic() {
        Capability::Atomic(value)
    } else if let Some(s) = object.as_stringable() {
        Capability::Stringify(s)
    } else if let Some(d) = object.as_date() {
        Capability::Date(d)
    } else if let Some(e) = object.as_exportable() {
        Capability::Map(e)
    } else {
        Capability::Members
    }
}

/// Flattens an object to a map: its export when it has one, else its members.
pub fn object_to_map(object: &dyn Object) -> Result<ValueMap> {
    match object.as_exportable() {
        Some(e) => e.to_map(),
        None => Ok(object.members()),
    }
}

/// A declared object type for record fields and collection elements.
pub trait ObjectClass: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    /// A fresh default instance.
    fn instantiate(&self) -> Box<dyn Object>;

    /// Builds an instance from a whole value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] when the value cannot be absorbed as a
    /// whole; callers then fall back to member-by-member copy.
    fn construct(&self, value: &Value) -> Result<Box<dyn Object>>;
}

/// A point in time with a fixed UTC offset.
///
/// # Examples
///
/// ```rust
/// use typed_class::{DateFormattable, Timestamp};
///
/// let ts = Timestamp::parse("2024-03-01 12:30:00").unwrap();
/// assert_eq!(ts.format_canonical(), "2024-03-01T12:30:00+00:00");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Timestamp(DateTime<FixedOffset>);

impl Timestamp {
    pub const CLASS: &'static str = "Timestamp";

    #[must_use]
    pub fn new(datetime: DateTime<FixedOffset>) -> Self {
        Timestamp(datetime)
    }

    #[must_use]
    pub fn now() -> Self {
        Timestamp(Utc::now().fixed_offset())
    }

    #[must_use]
    pub fn from_unix(seconds: i64) -> Option<Self> {
        DateTime::from_timestamp(seconds, 0).map(|dt| Timestamp(dt.fixed_offset()))
    }

    /// Parses RFC 3339, `Y-m-d H:i:s` (with optional offset), `Y-m-dTH:i:s`
    /// or `Y-m-d`. Offset-less forms are taken as UTC.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] when no format matches.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Timestamp(dt));
        }
        if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%:z") {
            return Ok(Timestamp(dt));
        }
        for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
                return Ok(Timestamp(Utc.from_utc_datetime(&naive).fixed_offset()));
            }
        }
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            if let Some(naive) = date.and_hms_opt(0, 0, 0) {
                return Ok(Timestamp(Utc.from_utc_datetime(&naive).fixed_offset()));
            }
        }
        Err(Error::type_mismatch("date string", s))
    }

    #[must_use]
    pub fn datetime(&self) -> &DateTime<FixedOffset> {
        &self.0
    }
}

impl DateFormattable for Timestamp {
    fn format_canonical(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
    }
}

impl Object for Timestamp {
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
        let mut map = ValueMap::new();
        map.insert("date", Value::String(self.format_canonical()));
        map
    }

    fn set_member(&mut self, name: &str, value: Value) -> bool {
        match (name, value) {
            ("date", Value::String(s)) => match Timestamp::parse(&s) {
                Ok(ts) => {
                    *self = ts;
                    true
                }
                Err(_) => false,
            },
            _ => false,
        }
    }

    fn as_date(&self) -> Option<&dyn DateFormattable> {
        Some(self)
    }

    fn equals(&self, other: &dyn Object) -> bool {
        other
            .as_any()
            .downcast_ref::<Timestamp>()
            .map_or(false, |o| o == self)
    }
}

/// The [`ObjectClass`] for [`Timestamp`] fields.
///
/// Default instances are the current time. Strings, unix seconds and any
/// date-formattable object construct directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampClass;

impl ObjectClass for TimestampClass {
    fn name(&self) -> &str {
        Timestamp::CLASS
    }

    fn instantiate(&self) -> Box<dyn Object> {
        Box::new(Timestamp::now())
    }

    fn construct(&self, value: &Value) -> Result<Box<dyn Object>> {
        let ts = match value {
            Value::String(s) => Timestamp::parse(s)?,
            Value::Number(n) => Timestamp::from_unix(n.as_i64())
                .ok_or_else(|| Error::type_mismatch("unix timestamp", &n.to_string()))?,
            Value::Object(obj) => match obj.as_date() {
                Some(d) => Timestamp::parse(&d.format_canonical())?,
                None => return Err(Error::type_mismatch(Timestamp::CLASS, obj.class_name())),
            },
            other => return Err(Error::type_mismatch(Timestamp::CLASS, other.type_name())),
        };
        Ok(Box::new(ts))
    }
}

/// A named bag of members with no behavior of its own.
///
/// A closed object only accepts members it was created with; an open one
/// accepts any name.
#[derive(Debug, Clone, PartialEq)]
pub struct PlainObject {
    class: String,
    members: ValueMap,
    open: bool,
}

impl PlainObject {
    /// Creates an open object.
    #[must_use]
    pub fn new(class: &str) -> Self {
        PlainObject {
            class: class.to_string(),
            members: ValueMap::new(),
            open: true,
        }
    }

    /// Creates a closed object whose members start out null.
    #[must_use]
    pub fn closed(class: &str, members: &[&str]) -> Self {
        PlainObject {
            class: class.to_string(),
            members: members.iter().map(|m| ((*m).into(), Value::Null)).collect(),
            open: false,
        }
    }

    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.members.insert(name, value.into());
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.members.get(name)
    }
}

impl Object for PlainObject {
    fn class_name(&self) -> &str {
        &self.class
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
        self.members.clone()
    }

    fn set_member(&mut self, name: &str, value: Value) -> bool {
        if self.open || self.members.contains_key(name) {
            self.members.insert(name, value);
            true
        } else {
            false
        }
    }
}

/// The [`ObjectClass`] for [`PlainObject`]s.
///
/// Plain objects have no constructor taking a value, so every construction
/// attempt fails and callers copy members instead.
#[derive(Debug, Clone)]
pub struct PlainClass {
    name: String,
    members: Vec<String>,
}

impl PlainClass {
    /// A class of open objects.
    #[must_use]
    pub fn open(name: &str) -> Self {
        PlainClass {
            name: name.to_string(),
            members: Vec::new(),
        }
    }

    /// A class of closed objects with the given members.
    #[must_use]
    pub fn closed(name: &str, members: &[&str]) -> Self {
        PlainClass {
            name: name.to_string(),
            members: members.iter().map(|m| m.to_string()).collect(),
        }
    }
}

impl ObjectClass for PlainClass {
    fn name(&self) -> &str {
        &self.name
    }

    fn instantiate(&self) -> Box<dyn Object> {
        if self.members.is_empty() {
            Box::new(PlainObject::new(&self.name))
        } else {
            let members: Vec<&str> = self.members.iter().map(String::as_str).collect();
            Box::new(PlainObject::closed(&self.name, &members))
        }
    }

    fn construct(&self, value: &Value) -> Result<Box<dyn Object>> {
        Err(Error::type_mismatch(&self.name, value.type_name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Labelled;

    impl Stringable for Labelled {
        fn stringify(&self) -> String {
            "label".to_string()
        }
    }

    impl DateFormattable for Labelled {
        fn format_canonical(&self) -> String {
            "1970-01-01T00:00:00+00:00".to_string()
        }
    }

    impl Object for Labelled {
        fn class_name(&self) -> &str {
            "Labelled"
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
        fn as_stringable(&self) -> Option<&dyn Stringable> {
            Some(self)
        }
        fn as_date(&self) -> Option<&dyn DateFormattable> {
            Some(self)
        }
    }

    #[test]
    fn test_stringify_wins_over_date() {
        assert!(matches!(capability(&Labelled), Capability::Stringify(_)));
        assert!(matches!(
            capability(&Timestamp::now()),
            Capability::Date(_)
        ));
        assert!(matches!(
            capability(&PlainObject::new("Bag")),
            Capability::Members
        ));
    }

    #[test]
    fn test_timestamp_parse_formats() {
        let expected = "2021-06-15T08:00:00+00:00";
        for input in [
            "2021-06-15T08:00:00Z",
            "2021-06-15 08:00:00",
            "2021-06-15T08:00:00",
        ] {
            assert_eq!(Timestamp::parse(input).unwrap().format_canonical(), expected);
        }
        assert_eq!(
            Timestamp::parse("2021-06-15").unwrap().format_canonical(),
            "2021-06-15T00:00:00+00:00"
        );
        assert_eq!(
            Timestamp::parse("2021-06-15T08:00:00+02:00")
                .unwrap()
                .format_canonical(),
            "2021-06-15T08:00:00+02:00"
        );
        assert!(Timestamp::parse("yesterday").is_err());
    }

    #[test]
    fn test_timestamp_class_construct() {
        let class = TimestampClass;
        let obj = class.construct(&Value::from(0)).unwrap();
        assert_eq!(
            obj.as_date().unwrap().format_canonical(),
            "1970-01-01T00:00:00+00:00"
        );
        assert!(class.construct(&Value::from(true)).is_err());
    }

    #[test]
    fn test_closed_plain_object_rejects_unknown_members() {
        let mut obj = PlainObject::closed("Point", &["x", "y"]);
        assert!(obj.set_member("x", Value::from(1)));
        assert!(!obj.set_member("z", Value::from(1)));
        assert_eq!(obj.get("x"), Some(&Value::from(1)));
        assert_eq!(obj.members().len(), 2);
    }

    #[test]
    fn test_boxed_clone_is_deep() {
        let original: Box<dyn Object> = Box::new(PlainObject::new("Bag").with("a", 1));
        let mut copy = original.clone();
        copy.set_member("a", Value::from(2));
        assert_eq!(original.members().get("a"), Some(&Value::from(1)));
        assert!(!original.equals(copy.as_ref()));
    }
}
