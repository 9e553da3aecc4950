//! The coercion engine.
//!
//! One function per target [`Kind`]. Every function is total over well-formed
//! input: unrecognized shapes fall back to a native cast rather than failing.
//! The only failures are [`Error::Encoding`](crate::Error::Encoding) from
//! [`to_string`] and [`to_array`] when a structure has no JSON form.
//!
//! `None` means "null". Whether a null result is acceptable is the caller's
//! concern; [`ScalarBox`](crate::ScalarBox) replaces it with its default when
//! nulls are not allowed.
//!
//! ```rust
//! use typed_class::cast;
//! use typed_class::Value;
//!
//! assert_eq!(cast::to_integer(&Value::from(3.1415), false), Some(3));
//! assert_eq!(cast::to_integer(&Value::from("-2.4 marginal words"), false), Some(-2));
//! assert_eq!(cast::to_float(&Value::from("1.234,56"), false), Some(1234.56));
//! assert_eq!(cast::to_float(&Value::from("1,234.56"), false), Some(1234.56));
//! ```

use crate::object::{capability, object_to_map, Capability, Object};
use crate::{json, Error, Result, Value, ValueMap};
use std::fmt;

/// Scalar target kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    Int,
    Float,
    String,
    /// An untyped ordered map
    RawArray,
}

impl Kind {
    /// The value a non-nullable field of this kind starts from.
    #[must_use]
    pub fn zero(&self) -> Value {
        match self {
            Kind::Bool => Value::Bool(false),
            Kind::Int => Value::from(0),
            Kind::Float => Value::from(0.0),
            Kind::String => Value::String(String::new()),
            Kind::RawArray => Value::Array(ValueMap::new()),
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::String => "string",
            Kind::RawArray => "array",
        }
    }

    /// Whether `value` already has this kind.
    #[must_use]
    pub fn matches(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Kind::Bool, Value::Bool(_))
                | (Kind::Int, Value::Number(crate::Number::Integer(_)))
                | (Kind::Float, Value::Number(crate::Number::Float(_)))
                | (Kind::String, Value::String(_))
                | (Kind::RawArray, Value::Array(_))
        )
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Coerces `value` to `kind`, returning [`Value::Null`] for a null result.
///
/// # Errors
///
/// Propagates [`Error::Encoding`] from [`to_string`] and [`to_array`].
pub fn coerce(kind: Kind, value: &Value, nullable: bool) -> Result<Value> {
    Ok(match kind {
        Kind::Bool => to_boolean(value).into(),
        Kind::Int => to_integer(value, nullable).into(),
        Kind::Float => to_float(value, nullable).into(),
        Kind::String => to_string(value)?.into(),
        Kind::RawArray => to_array(value)?.into(),
    })
}

/// Boolean coercion.
///
/// Objects and maps are true when they have members; strings are false only
/// when empty or `"0"`.
#[must_use]
pub fn to_boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(*b),
        Value::Number(n) => Some(!n.is_zero()),
        Value::String(s) => Some(!(s.is_empty() || s == "0")),
        Value::Array(map) => Some(!map.is_empty()),
        Value::Object(obj) => match obj.atomic() {
            Some(inner) => to_boolean(&inner),
            None => Some(member_count(obj.as_ref()) > 0),
        },
    }
}

/// Integer coercion.
///
/// Strings parse their leading integer literal with `0x`, `0b` and leading-`0`
/// octal prefixes; text with no literal, or the tokens `null`/`nan`, gives
/// `None` when `nullable` and 0 otherwise.
#[must_use]
pub fn to_integer(value: &Value, nullable: bool) -> Option<i64> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Number(n) => Some(n.as_i64()),
        Value::String(s) => match parse_integer(s) {
            Some(i) => Some(i),
            None if nullable => None,
            None => Some(0),
        },
        Value::Array(map) => Some(i64::from(!map.is_empty())),
        Value::Object(obj) => match obj.atomic() {
            Some(inner) => to_integer(&inner, nullable),
            None => Some(i64::from(member_count(obj.as_ref()) > 0)),
        },
    }
}

/// Float coercion with locale-tolerant string parsing.
///
/// Quotes and whitespace are stripped. When both `,` and `.` appear, whichever
/// comes last is the decimal separator and the other is a thousands
/// separator. When only one of them appears, a single occurrence is the
/// decimal separator and repeated occurrences are thousands separators.
#[must_use]
pub fn to_float(value: &Value, nullable: bool) -> Option<f64> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => Some(n.as_f64()),
        Value::String(s) => match parse_float(s) {
            Some(f) => Some(f),
            None if nullable => None,
            None => Some(0.0),
        },
        Value::Array(map) => Some(if map.is_empty() { 0.0 } else { 1.0 }),
        Value::Object(obj) => match obj.atomic() {
            Some(inner) => to_float(&inner, nullable),
            None => Some(if member_count(obj.as_ref()) > 0 { 1.0 } else { 0.0 }),
        },
    }
}

/// String coercion.
///
/// Maps and exportable objects become JSON text. Booleans follow the legacy
/// `"1"`/`""` convention.
///
/// # Errors
///
/// Returns [`Error::Encoding`] when a map or object cannot be encoded.
pub fn to_string(value: &Value) -> Result<Option<String>> {
    Ok(match value {
        Value::Null => None,
        Value::Bool(b) => Some(if *b { "1" } else { "" }.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Array(_) => Some(json::encode(value)?),
        Value::Object(obj) => match capability(obj.as_ref()) {
            Capability::Atomic(inner) => to_string(&inner)?,
            Capability::Stringify(s) => Some(s.stringify()),
            Capability::Date(d) => Some(d.format_canonical()),
            Capability::Map(e) => Some(json::encode(&Value::Array(e.to_map()?))?),
            Capability::Members if obj.is_resource() => {
                return Err(Error::encoding(format!(
                    "resource {} has no string form",
                    obj.class_name()
                )))
            }
            Capability::Members => Some(json::encode(&Value::Array(obj.members()))?),
        },
    })
}

/// Array coercion.
///
/// JSON text decodes to its structure, `"null"` gives `None`, and any other
/// scalar becomes a one-element list.
///
/// # Errors
///
/// Propagates errors from an object's [`Exportable::to_map`](crate::Exportable::to_map).
pub fn to_array(value: &Value) -> Result<Option<ValueMap>> {
    Ok(match value {
        Value::Null => None,
        Value::Array(map) => Some(map.clone()),
        Value::String(s) if s.trim().eq_ignore_ascii_case("null") => None,
        Value::String(s) => match json::decode(s) {
            Some(Value::Array(map)) => Some(map),
            Some(Value::Null) => None,
            Some(scalar) => Some(ValueMap::from(vec![scalar])),
            None => Some(ValueMap::from(vec![value.clone()])),
        },
        Value::Bool(_) | Value::Number(_) => Some(ValueMap::from(vec![value.clone()])),
        Value::Object(obj) => match obj.atomic() {
            Some(inner) => to_array(&inner)?,
            None => Some(object_to_map(obj.as_ref())?),
        },
    })
}

fn member_count(object: &dyn Object) -> usize {
    object_to_map(object).map_or(0, |m| m.len())
}

fn is_null_token(s: &str) -> bool {
    let s = s.trim();
    s.eq_ignore_ascii_case("null") || s.eq_ignore_ascii_case("nan")
}

/// Parses the leading integer literal of `s`, `strtol`-style with base
/// detection. Overflow saturates.
fn parse_integer(s: &str) -> Option<i64> {
    if is_null_token(s) {
        return None;
    }
    let t = s.trim_start();
    let (negative, rest) = match t.as_bytes().first() {
        Some(b'-') => (true, &t[1..]),
        Some(b'+') => (false, &t[1..]),
        _ => (false, t),
    };

    let (radix, digits) = if let Some(r) = rest.strip_prefix("0x").or(rest.strip_prefix("0X")) {
        (16, r)
    } else if let Some(r) = rest.strip_prefix("0b").or(rest.strip_prefix("0B")) {
        (2, r)
    } else if rest.len() > 1 && rest.starts_with('0') && rest.as_bytes()[1].is_ascii_digit() {
        (8, &rest[1..])
    } else {
        (10, rest)
    };

    let mut value: i64 = 0;
    let mut seen = false;
    for c in digits.chars() {
        match c.to_digit(radix) {
            Some(d) => {
                seen = true;
                value = value
                    .saturating_mul(i64::from(radix))
                    .saturating_add(i64::from(d));
            }
            None => break,
        }
    }

    if !seen {
        // the prefix's own leading zero
        return (radix != 10).then_some(0);
    }
    Some(if negative { -value } else { value })
}

fn parse_float(s: &str) -> Option<f64> {
    let cleaned: String = s
        .chars()
        .filter(|c| !matches!(c, '"' | '\'') && !c.is_whitespace())
        .collect();
    if is_null_token(&cleaned) {
        return None;
    }

    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) if cleaned.matches(',').count() == 1 => cleaned.replace(',', "."),
        (Some(_), None) => cleaned.replace(',', ""),
        (None, Some(_)) if cleaned.matches('.').count() > 1 => cleaned.replace('.', ""),
        _ => cleaned,
    };
    leading_float(&normalized)
}

/// Parses the longest float literal at the start of `s`.
fn leading_float(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'-') | Some(b'+')) {
        end = 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }
    if digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'-') | Some(b'+')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value;

    #[test]
    fn test_parse_integer_radix_forms() {
        assert_eq!(parse_integer("0x1A"), Some(26));
        assert_eq!(parse_integer("0b101"), Some(5));
        assert_eq!(parse_integer("017"), Some(15));
        assert_eq!(parse_integer("09"), Some(0));
        assert_eq!(parse_integer("  42abc"), Some(42));
        assert_eq!(parse_integer("-0x10"), Some(-16));
        assert_eq!(parse_integer("0"), Some(0));
        assert_eq!(parse_integer("words"), None);
        assert_eq!(parse_integer(""), None);
        assert_eq!(parse_integer(" NaN "), None);
        assert_eq!(parse_integer("99999999999999999999999"), Some(i64::MAX));
    }

    #[test]
    fn test_leading_float() {
        assert_eq!(leading_float("1.5e3kg"), Some(1500.0));
        assert_eq!(leading_float("2e"), Some(2.0));
        assert_eq!(leading_float(".5"), Some(0.5));
        assert_eq!(leading_float("-."), None);
        assert_eq!(leading_float("abc"), None);
    }

    #[test]
    fn test_parse_float_separators() {
        assert_eq!(parse_float("1.234,56"), Some(1234.56));
        assert_eq!(parse_float("1,234.56"), Some(1234.56));
        assert_eq!(parse_float("3,5"), Some(3.5));
        assert_eq!(parse_float("1,234,567"), Some(1234567.0));
        assert_eq!(parse_float("1.234.567"), Some(1234567.0));
        assert_eq!(parse_float("\"12.5\""), Some(12.5));
        assert_eq!(parse_float("1 234,5 EUR"), Some(1234.5));
        assert_eq!(parse_float("Null"), None);
    }

    #[test]
    fn test_null_tokens_respect_nullable() {
        assert_eq!(to_integer(&Value::from("null"), true), None);
        assert_eq!(to_integer(&Value::from("null"), false), Some(0));
        assert_eq!(to_float(&Value::from(" NAN "), true), None);
        assert_eq!(to_float(&Value::from("nan"), false), Some(0.0));
    }

    #[test]
    fn test_boolean_of_containers() {
        assert_eq!(to_boolean(&value!({})), Some(false));
        assert_eq!(to_boolean(&value!({ "a": 1 })), Some(true));
        assert_eq!(to_boolean(&Value::from("0")), Some(false));
        assert_eq!(to_boolean(&Value::from("false")), Some(true));
        assert_eq!(to_boolean(&Value::Null), None);
    }

    #[test]
    fn test_kind_matches() {
        assert!(Kind::Int.matches(&Value::from(1)));
        assert!(!Kind::Int.matches(&Value::from(1.0)));
        assert!(Kind::RawArray.matches(&value!([])));
    }
}
