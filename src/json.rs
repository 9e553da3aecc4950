//! The JSON text boundary.
//!
//! Decoding is lenient: malformed text is reported as `None` and callers treat
//! it as empty input. Encoding is strict: values with no JSON form fail with
//! [`Error::Encoding`].

use crate::object::{capability, Capability};
use crate::{Error, Result, Value, ValueMap};

/// Nesting deeper than this is refused when encoding.
pub const MAX_DEPTH: usize = 512;

/// Decodes JSON text, returning `None` for malformed input.
///
/// # Examples
///
/// ```rust
/// use typed_class::{json, Value};
///
/// assert_eq!(json::decode("[1]").map(|v| v.is_array()), Some(true));
/// assert_eq!(json::decode("{oops"), None);
/// ```
#[must_use]
pub fn decode(text: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::debug!(error = %err, "ignoring malformed JSON input");
            None
        }
    }
}

/// Encodes a value as compact JSON text.
///
/// Index-keyed maps whose keys run `0..len` become JSON arrays; every other map
/// becomes a JSON object.
///
/// # Errors
///
/// Returns [`Error::Encoding`] for non-finite floats, resource objects and
/// nesting deeper than [`MAX_DEPTH`].
pub fn encode(value: &Value) -> Result<String> {
    check_depth(value, 0)?;
    serde_json::to_string(value).map_err(Error::encoding)
}

/// Like [`encode`], with indentation.
///
/// # Errors
///
/// Same as [`encode`].
pub fn encode_pretty(value: &Value) -> Result<String> {
    check_depth(value, 0)?;
    serde_json::to_string_pretty(value).map_err(Error::encoding)
}

fn check_depth(value: &Value, depth: usize) -> Result<()> {
    if depth > MAX_DEPTH {
        return Err(Error::encoding(format!(
            "maximum nesting depth of {} exceeded",
            MAX_DEPTH
        )));
    }
    match value {
        Value::Array(map) => check_map(map, depth),
        Value::Object(obj) => match capability(obj.as_ref()) {
            Capability::Atomic(inner) => check_depth(&inner, depth + 1),
            Capability::Map(e) => check_map(&e.to_map()?, depth),
            Capability::Members => check_map(&obj.members(), depth),
            Capability::Stringify(_) | Capability::Date(_) => Ok(()),
        },
        _ => Ok(()),
    }
}

fn check_map(map: &ValueMap, depth: usize) -> Result<()> {
    map.values().try_for_each(|v| check_depth(v, depth + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value;

    #[test]
    fn test_encode_list_and_object() {
        assert_eq!(encode(&value!([1, "a", null])).unwrap(), r#"[1,"a",null]"#);
        assert_eq!(
            encode(&value!({ "x": 1.5, "ok": true })).unwrap(),
            r#"{"x":1.5,"ok":true}"#
        );
    }

    #[test]
    fn test_encode_rejects_infinity() {
        let err = encode(&Value::from(vec![Value::from(f64::INFINITY)])).unwrap_err();
        assert!(matches!(err, Error::Encoding(_)));
    }

    #[test]
    fn test_encode_rejects_deep_nesting() {
        let mut value = Value::from(1);
        for _ in 0..(MAX_DEPTH + 2) {
            value = Value::from(vec![value]);
        }
        assert!(matches!(encode(&value), Err(Error::Encoding(_))));
    }

    #[test]
    fn test_decode_keeps_key_order() {
        let value = decode(r#"{"b":1,"a":2}"#).unwrap();
        let keys: Vec<String> = value
            .as_array()
            .unwrap()
            .keys()
            .map(|k| k.to_string())
            .collect();
        assert_eq!(keys, vec!["b", "a"]);
    }
}
