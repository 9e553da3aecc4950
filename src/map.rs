//! Ordered associative array used for every map-like value.
//!
//! This module provides [`KeyedMap`], a wrapper around [`IndexMap`] keyed by
//! [`Key`], and its value-holding alias [`ValueMap`]. Keys are either integer
//! positions or names, and string keys that spell a canonical decimal integer
//! are normalized to positions, so `"3"` and `3` address the same entry.
//!
//! ## Why IndexMap?
//!
//! - **Insertion order**: fields and elements come back out in the order they
//!   went in, which positional assignment and export both rely on
//! - **Mixed keys**: the same map can represent a list and a record
//!
//! ## Examples
//!
//! ```rust
//! use typed_class::{Key, ValueMap, Value};
//!
//! let mut map = ValueMap::new();
//! map.push(Value::from("first"));
//! map.insert("name", Value::from("Alice"));
//! map.push(Value::from("second"));
//!
//! let keys: Vec<_> = map.keys().cloned().collect();
//! assert_eq!(keys, vec![Key::Index(0), Key::from("name"), Key::Index(1)]);
//! assert_eq!(map.get("1"), Some(&Value::from("second")));
//! ```

use crate::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A map key: an integer position or a name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Index(i64),
    Name(String),
}

impl Key {
    /// Parses a key, normalizing canonical decimal integers to [`Key::Index`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use typed_class::Key;
    ///
    /// assert_eq!(Key::parse("12"), Key::Index(12));
    /// assert_eq!(Key::parse("-4"), Key::Index(-4));
    /// assert_eq!(Key::parse("012"), Key::Name("012".to_string()));
    /// assert_eq!(Key::parse("id"), Key::Name("id".to_string()));
    /// ```
    #[must_use]
    pub fn parse(s: &str) -> Self {
        if is_canonical_integer(s) {
            if let Ok(i) = s.parse::<i64>() {
                return Key::Index(i);
            }
        }
        Key::Name(s.to_string())
    }

    #[inline]
    #[must_use]
    pub fn as_index(&self) -> Option<i64> {
        match self {
            Key::Index(i) => Some(*i),
            Key::Name(_) => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Key::Name(s) => Some(s),
            Key::Index(_) => None,
        }
    }
}

fn is_canonical_integer(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    match digits.as_bytes() {
        [] => false,
        [b'0'] => digits.len() == s.len(),
        [first, rest @ ..] => {
            (b'1'..=b'9').contains(first) && rest.iter().all(u8::is_ascii_digit)
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Index(i) => write!(f, "{}", i),
            Key::Name(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Index(value)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Key::Index(value as i64)
    }
}

impl From<usize> for Key {
    fn from(value: usize) -> Self {
        Key::Index(value as i64)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::parse(value)
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        if is_canonical_integer(&value) {
            Key::parse(&value)
        } else {
            Key::Name(value)
        }
    }
}

impl From<&Key> for Key {
    fn from(value: &Key) -> Self {
        value.clone()
    }
}

impl Serialize for Key {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Key::from)
    }
}

/// An ordered map keyed by [`Key`] with PHP-style append semantics.
///
/// Appending with [`KeyedMap::push`] uses one past the largest integer key
/// ever inserted, so removing the last element does not make its position
/// reusable.
#[derive(Debug, Clone)]
pub struct KeyedMap<V> {
    entries: IndexMap<Key, V>,
    next_index: i64,
}

/// The map carried by [`Value::Array`].
pub type ValueMap = KeyedMap<Value>;

impl<V> KeyedMap<V> {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        KeyedMap {
            entries: IndexMap::new(),
            next_index: 0,
        }
    }

    /// Creates an empty map with the specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        KeyedMap {
            entries: IndexMap::with_capacity(capacity),
            next_index: 0,
        }
    }

    /// Inserts a key-value pair, returning the previous value for that key.
    ///
    /// Replacing an existing key keeps its original position.
    pub fn insert<K: Into<Key>>(&mut self, key: K, value: V) -> Option<V> {
        let key = key.into();
        if let Key::Index(i) = key {
            if i >= self.next_index {
                self.next_index = i.saturating_add(1);
            }
        }
        self.entries.insert(key, value)
    }

    /// Appends a value at the next free integer position and returns its key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use typed_class::{Key, ValueMap, Value};
    ///
    /// let mut map = ValueMap::new();
    /// map.insert(5, Value::from(1));
    /// assert_eq!(map.push(Value::from(2)), Key::Index(6));
    /// ```
    pub fn push(&mut self, value: V) -> Key {
        let key = self.next_key();
        self.insert(key.clone(), value);
        key
    }

    /// The key [`KeyedMap::push`] would use next.
    #[must_use]
    pub fn next_key(&self) -> Key {
        Key::Index(self.next_index)
    }

    #[must_use]
    pub fn get<K: Into<Key>>(&self, key: K) -> Option<&V> {
        self.entries.get(&key.into())
    }

    pub fn get_mut<K: Into<Key>>(&mut self, key: K) -> Option<&mut V> {
        self.entries.get_mut(&key.into())
    }

    #[must_use]
    pub fn contains_key<K: Into<Key>>(&self, key: K) -> bool {
        self.entries.contains_key(&key.into())
    }

    /// Removes an entry, preserving the order of the remaining ones.
    pub fn remove<K: Into<Key>>(&mut self, key: K) -> Option<V> {
        self.entries.shift_remove(&key.into())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.next_index = 0;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` when the keys are exactly `0..len` in order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use typed_class::{ValueMap, Value};
    ///
    /// let list = ValueMap::from(vec![Value::from(1), Value::from(2)]);
    /// assert!(list.is_list());
    ///
    /// let mut map = ValueMap::new();
    /// map.insert(1, Value::from(1));
    /// assert!(!map.is_list());
    /// ```
    #[must_use]
    pub fn is_list(&self) -> bool {
        self.entries
            .keys()
            .enumerate()
            .all(|(i, k)| *k == Key::Index(i as i64))
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, Key, V> {
        self.entries.keys()
    }

    pub fn values(&self) -> indexmap::map::Values<'_, Key, V> {
        self.entries.values()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, Key, V> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> indexmap::map::IterMut<'_, Key, V> {
        self.entries.iter_mut()
    }

    /// Entry at `index` in insertion order.
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<(&Key, &V)> {
        self.entries.get_index(index)
    }
}

impl<V> Default for KeyedMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: PartialEq> PartialEq for KeyedMap<V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .zip(other.entries.iter())
                .all(|(a, b)| a == b)
    }
}

impl<V> From<Vec<V>> for KeyedMap<V> {
    fn from(values: Vec<V>) -> Self {
        values
            .into_iter()
            .enumerate()
            .map(|(i, v)| (Key::from(i), v))
            .collect()
    }
}

impl<V> IntoIterator for KeyedMap<V> {
    type Item = (Key, V);
    type IntoIter = indexmap::map::IntoIter<Key, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, V> IntoIterator for &'a KeyedMap<V> {
    type Item = (&'a Key, &'a V);
    type IntoIter = indexmap::map::Iter<'a, Key, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<V> FromIterator<(Key, V)> for KeyedMap<V> {
    fn from_iter<T: IntoIterator<Item = (Key, V)>>(iter: T) -> Self {
        let mut map = KeyedMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_normalization() {
        assert_eq!(Key::from("0"), Key::Index(0));
        assert_eq!(Key::from("-0"), Key::Name("-0".to_string()));
        assert_eq!(Key::from("1.5"), Key::Name("1.5".to_string()));
        assert_eq!(Key::from(String::from("42")), Key::Index(42));
        assert_eq!(
            Key::from("99999999999999999999"),
            Key::Name("99999999999999999999".to_string())
        );
    }

    #[test]
    fn test_push_after_remove_does_not_reuse_position() {
        let mut map = ValueMap::new();
        map.push(Value::from(1));
        map.push(Value::from(2));
        map.remove(1);
        assert_eq!(map.push(Value::from(3)), Key::Index(2));
    }

    #[test]
    fn test_equality_is_order_sensitive() {
        let mut a = ValueMap::new();
        a.insert("x", Value::from(1));
        a.insert("y", Value::from(2));
        let mut b = ValueMap::new();
        b.insert("y", Value::from(2));
        b.insert("x", Value::from(1));
        assert_ne!(a, b);
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut map = ValueMap::from(vec![Value::from(1), Value::from(2), Value::from(3)]);
        map.remove(0);
        let keys: Vec<_> = map.keys().cloned().collect();
        assert_eq!(keys, vec![Key::Index(1), Key::Index(2)]);
        assert!(!map.is_list());
    }
}
