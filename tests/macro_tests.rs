use typed_class::{value, Key, Number, Value, ValueMap};

#[test]
fn test_value_macro_null() {
    assert_eq!(value!(null), Value::Null);
}

#[test]
fn test_value_macro_booleans() {
    assert_eq!(value!(true), Value::Bool(true));
    assert_eq!(value!(false), Value::Bool(false));
}

#[test]
fn test_value_macro_numbers() {
    assert_eq!(value!(42), Value::Number(Number::Integer(42)));
    assert_eq!(value!(3.5), Value::Number(Number::Float(3.5)));
    assert_eq!(value!(-123), Value::Number(Number::Integer(-123)));
}

#[test]
fn test_value_macro_strings() {
    assert_eq!(value!("hello world"), Value::String("hello world".to_string()));
    assert_eq!(value!(""), Value::String(String::new()));
}

#[test]
fn test_value_macro_lists_are_index_keyed() {
    let list = value!([1, "two", null]);
    let map = list.as_array().unwrap();
    assert!(map.is_list());
    assert_eq!(map.get(0), Some(&Value::from(1)));
    assert_eq!(map.get(1), Some(&Value::from("two")));
    assert_eq!(map.get(2), Some(&Value::Null));
}

#[test]
fn test_value_macro_maps_normalize_keys() {
    let map = value!({ "name": "Alice", "7": true });
    let map = map.as_array().unwrap();
    let keys: Vec<_> = map.keys().cloned().collect();
    assert_eq!(keys, vec![Key::from("name"), Key::Index(7)]);
}

#[test]
fn test_value_macro_nested() {
    let data = value!({
        "user": { "id": 1, "tags": ["a", "b"] },
        "empty": {},
        "none": []
    });
    let root = data.as_array().unwrap();
    let user = root.get("user").and_then(Value::as_array).unwrap();
    assert_eq!(user.get("tags").and_then(Value::as_array).map(ValueMap::len), Some(2));
    assert_eq!(root.get("empty"), Some(&Value::Array(ValueMap::new())));
    assert_eq!(root.get("none"), root.get("empty"));
}

#[test]
fn test_value_macro_expressions() {
    let name = String::from("dynamic");
    let count = 3_u8;
    let data = value!({ "name": name, "count": count });
    let map = data.as_array().unwrap();
    assert_eq!(map.get("name"), Some(&Value::from("dynamic")));
    assert_eq!(map.get("count"), Some(&Value::from(3)));
    assert_eq!(value!(Some(2.5)), Value::from(2.5));
    assert_eq!(value!(None::<i64>), Value::Null);
}
