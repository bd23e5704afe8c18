//! Parsed values and the result mapping.

use std::fmt;

use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Nested mapping produced by dotted keys (`--redis.port 9999`).
pub type Map = IndexMap<String, Value>;

/// Largest integer an `f64` represents exactly (2^53).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A single parsed value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Number(f64),
    String(String),
    /// Values collected from a flag given more than once.
    List(Vec<Value>),
    /// Values collected under a dotted key prefix.
    Map(Map),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The number as an integer, if it has no fractional part.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) if is_integral(*n) => Some(*n as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Self::Map(_))
    }
}

fn is_integral(n: f64) -> bool {
    n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) if is_integral(*n) => write!(f, "{}", *n as i64),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
            Self::List(items) => {
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Self::Map(map) => {
                f.write_str("{")?;
                for (idx, (key, value)) in map.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Bool(b) => serializer.serialize_bool(*b),
            // `9999` should come out as `9999`, not `9999.0`.
            Self::Number(n) if is_integral(*n) => serializer.serialize_i64(*n as i64),
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::String(s) => serializer.serialize_str(s),
            Self::List(items) => items.serialize(serializer),
            Self::Map(map) => map.serialize(serializer),
        }
    }
}

/// Parsed arguments: flag values keyed by name, plus leftover positionals.
///
/// The positionals are exposed under the reserved `argv` key when serialized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    values: Map,
    argv: Vec<String>,
}

impl Args {
    /// Get the value of a top-level key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Get a nested value by dotted path (`redis.port`).
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.values.get(segments.next()?)?;
        for segment in segments {
            current = current.as_map()?.get(segment)?;
        }
        Some(current)
    }

    /// Boolean value of a flag; `None` if absent or not a boolean.
    pub fn flag(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Positional arguments, in encounter order.
    pub fn positional(&self) -> &[String] {
        self.argv.as_slice()
    }

    /// Number of top-level keys (not counting positionals).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no flags and no positionals were parsed.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.argv.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.values.iter()
    }
}

impl Args {
    /// Overwrite `key` (dotted paths create nested maps).
    pub(crate) fn set(&mut self, key: &str, value: Value) {
        with_leaf(&mut self.values, key, |map, leaf| {
            map.insert(leaf.to_string(), value);
        });
    }

    /// Overwrite a single key without dotted-path splitting.
    pub(crate) fn set_literal(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    /// Assign `value` to `key`, turning repeated assignments into a list.
    pub(crate) fn push_value(&mut self, key: &str, value: Value) {
        with_leaf(&mut self.values, key, |map, leaf| match map.entry(leaf.to_string()) {
            Entry::Vacant(entry) => {
                entry.insert(value);
            }
            Entry::Occupied(mut entry) => {
                let existing = entry.get_mut();
                if let Value::List(items) = existing {
                    items.push(value);
                } else {
                    let first = std::mem::replace(existing, Value::Bool(false));
                    *existing = Value::List(vec![first, value]);
                }
            }
        });
    }

    pub(crate) fn push_positional(&mut self, token: &str) {
        self.argv.push(token.to_string());
    }
}

/// Run `f` on the map holding the last segment of a dotted key, creating
/// (or replacing non-map values with) nested maps for the segments before it.
fn with_leaf<R>(map: &mut Map, key: &str, f: impl FnOnce(&mut Map, &str) -> R) -> R {
    let Some((head, rest)) = key.split_once('.') else {
        return f(map, key);
    };
    let value = map
        .entry(head.to_string())
        .or_insert_with(|| Value::Map(Map::new()));
    if let Value::Map(inner) = value {
        return with_leaf(inner, rest, f);
    }
    let mut inner = Map::new();
    let result = with_leaf(&mut inner, rest, f);
    *value = Value::Map(inner);
    result
}

impl Serialize for Args {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let has_argv = !self.argv.is_empty();
        // Positionals own the `argv` key; a flag literally named `argv` yields to them.
        let shadowed = has_argv && self.values.contains_key("argv");
        let len = self.values.len() + usize::from(has_argv) - usize::from(shadowed);
        let mut map = serializer.serialize_map(Some(len))?;
        for (key, value) in &self.values {
            if shadowed && key == "argv" {
                continue;
            }
            map.serialize_entry(key, value)?;
        }
        if has_argv {
            map.serialize_entry("argv", &self.argv)?;
        }
        map.end()
    }
}
