//! Generic property-list value tree.
//!
//! A pbxproj file, whatever its on-disk encoding, decodes into this tree:
//! strings, integers, arrays, and string-keyed dictionaries. Every object
//! keeps its raw [`Fields`] map verbatim alongside the typed view, so keys
//! the typed model does not know about survive round-trips.
//!
//! OpenStep input only ever produces strings, arrays, and dictionaries;
//! integers appear when loading binary-plist or JSON input, where tools like
//! `plutil` store numeric-looking values as real numbers.

use indexmap::IndexMap;

use crate::error::ProjectFileError;

/// A raw field map: key → value, insertion order preserved.
pub type Fields = IndexMap<String, Value>;

/// A single plist value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    String(String),
    Integer(i64),
    Array(Vec<Value>),
    Dictionary(Fields),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dictionary(&self) -> Option<&Fields> {
        match self {
            Self::Dictionary(fields) => Some(fields),
            _ => None,
        }
    }

    /// Render the scalar the way OpenStep output expects: integers print in
    /// decimal, strings as-is. Arrays and dictionaries have no scalar form.
    pub fn scalar_string(&self) -> Option<String> {
        match self {
            Self::String(s) => Some(s.clone()),
            Self::Integer(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

// ============================================================================
// PLIST CONVERSIONS (binary / XML input and output)
// ============================================================================

/// Convert a decoded `plist::Value` into the crate's value tree.
///
/// Booleans become integers 0/1 (OpenStep pbxproj has no boolean type).
/// Data, dates, reals, and UIDs never occur in a pbxproj and are rejected.
pub fn from_plist(value: plist::Value) -> Result<Value, ProjectFileError> {
    match value {
        plist::Value::String(s) => Ok(Value::String(s)),
        plist::Value::Boolean(b) => Ok(Value::Integer(if b { 1 } else { 0 })),
        plist::Value::Integer(n) => n
            .as_signed()
            .map(Value::Integer)
            .ok_or(ProjectFileError::InvalidData),
        plist::Value::Array(items) => items
            .into_iter()
            .map(from_plist)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        plist::Value::Dictionary(dict) => {
            let mut fields = Fields::new();
            for (key, val) in dict {
                fields.insert(key, from_plist(val)?);
            }
            Ok(Value::Dictionary(fields))
        }
        _ => Err(ProjectFileError::InvalidData),
    }
}

/// Convert back into a `plist::Value` for binary/XML output.
pub fn to_plist(value: &Value) -> plist::Value {
    match value {
        Value::String(s) => plist::Value::String(s.clone()),
        Value::Integer(n) => plist::Value::Integer((*n).into()),
        Value::Array(items) => plist::Value::Array(items.iter().map(to_plist).collect()),
        Value::Dictionary(fields) => {
            let mut dict = plist::Dictionary::new();
            for (key, val) in fields {
                dict.insert(key.clone(), to_plist(val));
            }
            plist::Value::Dictionary(dict)
        }
    }
}

// ============================================================================
// JSON CONVERSIONS
// ============================================================================

/// Convert decoded JSON into the crate's value tree.
pub fn from_json(value: serde_json::Value) -> Result<Value, ProjectFileError> {
    match value {
        serde_json::Value::String(s) => Ok(Value::String(s)),
        serde_json::Value::Bool(b) => Ok(Value::Integer(if b { 1 } else { 0 })),
        serde_json::Value::Number(n) => n
            .as_i64()
            .map(Value::Integer)
            .ok_or(ProjectFileError::InvalidData),
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(from_json)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        serde_json::Value::Object(map) => {
            let mut fields = Fields::new();
            for (key, val) in map {
                fields.insert(key, from_json(val)?);
            }
            Ok(Value::Dictionary(fields))
        }
        serde_json::Value::Null => Err(ProjectFileError::InvalidData),
    }
}

/// Convert into JSON for output. `serde_json::Map` sorts keys, matching the
/// sorted-keys JSON the original tooling emits.
pub fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Integer(n) => serde_json::Value::Number((*n).into()),
        Value::Array(items) => serde_json::Value::Array(items.iter().map(to_json).collect()),
        Value::Dictionary(fields) => {
            let map = fields
                .iter()
                .map(|(key, val)| (key.clone(), to_json(val)))
                .collect();
            serde_json::Value::Object(map)
        }
    }
}
