use std::any::Any;
use typed_class::cast::{self, Kind};
use typed_class::{
    value, DateFormattable, Error, Exportable, Object, PlainObject, ScalarBox, Stringable,
    Timestamp, Value, ValueMap,
};

#[derive(Debug, Clone)]
struct Money {
    cents: i64,
}

impl Exportable for Money {
    fn to_map(&self) -> typed_class::Result<ValueMap> {
        let mut map = ValueMap::new();
        map.insert("cents", Value::from(self.cents));
        Ok(map)
    }
}

impl Object for Money {
    fn class_name(&self) -> &str {
        "Money"
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
    fn as_exportable(&self) -> Option<&dyn Exportable> {
        Some(self)
    }
}

/// Offers every capability so the priority order decides.
#[derive(Debug, Clone)]
struct Everything;

impl Stringable for Everything {
    fn stringify(&self) -> String {
        "stringified".to_string()
    }
}

impl DateFormattable for Everything {
    fn format_canonical(&self) -> String {
        "2000-01-01T00:00:00+00:00".to_string()
    }
}

impl Object for Everything {
    fn class_name(&self) -> &str {
        "Everything"
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
        Some(Value::from(99))
    }
    fn as_stringable(&self) -> Option<&dyn Stringable> {
        Some(self)
    }
    fn as_date(&self) -> Option<&dyn DateFormattable> {
        Some(self)
    }
}

/// Offers a chosen subset of capabilities on top of its members.
#[derive(Debug, Clone, Default)]
struct Layered {
    stringify: bool,
    date: bool,
    map: bool,
}

impl Stringable for Layered {
    fn stringify(&self) -> String {
        "layered".to_string()
    }
}

impl DateFormattable for Layered {
    fn format_canonical(&self) -> String {
        "2001-02-03T04:05:06+00:00".to_string()
    }
}

impl Exportable for Layered {
    fn to_map(&self) -> typed_class::Result<ValueMap> {
        let mut map = ValueMap::new();
        map.insert("source", Value::from("map"));
        Ok(map)
    }
}

impl Object for Layered {
    fn class_name(&self) -> &str {
        "Layered"
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
        map.insert("source", Value::from("members"));
        map
    }
    fn as_stringable(&self) -> Option<&dyn Stringable> {
        self.stringify.then_some(self as &dyn Stringable)
    }
    fn as_date(&self) -> Option<&dyn DateFormattable> {
        self.date.then_some(self as &dyn DateFormattable)
    }
    fn as_exportable(&self) -> Option<&dyn Exportable> {
        self.map.then_some(self as &dyn Exportable)
    }
}

#[derive(Debug, Clone)]
struct Socket;

impl Object for Socket {
    fn class_name(&self) -> &str {
        "Socket"
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
    fn is_resource(&self) -> bool {
        true
    }
}

#[test]
fn test_float_to_integer_truncates() {
    assert_eq!(cast::to_integer(&Value::from(3.1415), false), Some(3));
    assert_eq!(cast::to_integer(&Value::from(-3.99), false), Some(-3));
    assert_eq!(cast::to_integer(&Value::from(f64::NAN), false), Some(0));
}

#[test]
fn test_integer_from_text_prefix() {
    assert_eq!(cast::to_integer(&Value::from("-2.4 marginal words"), false), Some(-2));
    assert_eq!(cast::to_integer(&Value::from("0x1f"), false), Some(31));
    assert_eq!(cast::to_integer(&Value::from("010"), false), Some(8));
    assert_eq!(cast::to_integer(&Value::from("words"), true), None);
    assert_eq!(cast::to_integer(&Value::from("words"), false), Some(0));
}

#[test]
fn test_float_separator_detection() {
    assert_eq!(cast::to_float(&Value::from("1.234,56"), false), Some(1234.56));
    assert_eq!(cast::to_float(&Value::from("1,234.56"), false), Some(1234.56));
    assert_eq!(cast::to_float(&Value::from("0,5"), false), Some(0.5));
    assert_eq!(cast::to_float(&Value::from("'42.5 km'"), false), Some(42.5));
    assert_eq!(cast::to_float(&Value::from("nan"), true), None);
}

#[test]
fn test_containers_by_emptiness() {
    assert_eq!(cast::to_boolean(&value!({})), Some(false));
    assert_eq!(cast::to_boolean(&value!({ "a": 1 })), Some(true));
    assert_eq!(cast::to_integer(&value!([7, 8]), false), Some(1));
    assert_eq!(cast::to_float(&value!([]), false), Some(0.0));
    assert_eq!(cast::to_boolean(&Value::object(PlainObject::new("Bag"))), Some(false));
    assert_eq!(
        cast::to_boolean(&Value::object(PlainObject::new("Bag").with("k", 0))),
        Some(true)
    );
}

#[test]
fn test_string_conventions() {
    assert_eq!(cast::to_string(&Value::from(true)).unwrap(), Some("1".to_string()));
    assert_eq!(cast::to_string(&Value::from(false)).unwrap(), Some(String::new()));
    assert_eq!(cast::to_string(&Value::from(2.0)).unwrap(), Some("2".to_string()));
    assert_eq!(cast::to_string(&Value::Null).unwrap(), None);
    assert_eq!(
        cast::to_string(&value!([1, 2])).unwrap(),
        Some("[1,2]".to_string())
    );
}

#[test]
fn test_string_from_objects() {
    let money = Value::object(Money { cents: 250 });
    assert_eq!(
        cast::to_string(&money).unwrap(),
        Some(r#"{"cents":250}"#.to_string())
    );

    let ts = Value::object(Timestamp::parse("2019-12-31 23:59:59").unwrap());
    assert_eq!(
        cast::to_string(&ts).unwrap(),
        Some("2019-12-31T23:59:59+00:00".to_string())
    );

    let err = cast::to_string(&Value::object(Socket)).unwrap_err();
    assert!(matches!(err, Error::Encoding(_)));
}

#[test]
fn test_capability_priority() {
    let everything = Value::object(Everything);
    assert_eq!(cast::to_string(&everything).unwrap(), Some("99".to_string()));
    assert_eq!(cast::to_integer(&everything, false), Some(99));
    assert_eq!(
        cast::to_array(&everything).unwrap(),
        Some(ValueMap::from(vec![Value::from(99)]))
    );
}

#[test]
fn test_capability_priority_below_atomic() {
    let string_of = |layered: Layered| cast::to_string(&Value::object(layered)).unwrap();

    let stringify_over_date = Layered { stringify: true, date: true, map: true };
    assert_eq!(string_of(stringify_over_date), Some("layered".to_string()));

    let date_over_map = Layered { date: true, map: true, ..Layered::default() };
    assert_eq!(string_of(date_over_map), Some("2001-02-03T04:05:06+00:00".to_string()));

    let map_over_members = Layered { map: true, ..Layered::default() };
    assert_eq!(string_of(map_over_members), Some(r#"{"source":"map"}"#.to_string()));

    assert_eq!(
        string_of(Layered::default()),
        Some(r#"{"source":"members"}"#.to_string())
    );
}

#[test]
fn test_array_coercion() {
    assert_eq!(cast::to_array(&Value::from("NULL")).unwrap(), None);
    assert_eq!(
        cast::to_array(&Value::from(r#"{"a":1}"#)).unwrap(),
        value!({ "a": 1 }).as_array().cloned()
    );
    assert_eq!(
        cast::to_array(&Value::from(5)).unwrap(),
        Some(ValueMap::from(vec![Value::from(5)]))
    );
    assert_eq!(
        cast::to_array(&Value::object(Money { cents: 1 })).unwrap(),
        value!({ "cents": 1 }).as_array().cloned()
    );
}

#[test]
fn test_scalar_box_resets_to_captured_default() {
    let mut name = ScalarBox::new(Kind::String, &Value::from("anon"), false).unwrap();
    name.set(&Value::from(12)).unwrap();
    assert_eq!(name.get(), &Value::from("12"));
    name.unset();
    assert_eq!(name.get(), &Value::from("anon"));

    let mut maybe = ScalarBox::new(Kind::Int, &Value::from(4), true).unwrap();
    maybe.unset();
    assert!(!maybe.is_set());
}

#[test]
fn test_coerce_dispatch() {
    assert_eq!(cast::coerce(Kind::Bool, &Value::from("0"), false).unwrap(), Value::from(false));
    assert_eq!(cast::coerce(Kind::Float, &Value::from(2), false).unwrap(), Value::from(2.0));
    assert_eq!(cast::coerce(Kind::Int, &Value::from("nan"), true).unwrap(), Value::Null);
}
