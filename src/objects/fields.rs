//! Typed extraction from raw field maps.
//!
//! Every pbxproj object is decoded from a generic [`Fields`] dictionary; the
//! helpers here pull out required and optional values with errors that name
//! the offending key. Booleans are encoded as the strings "1"/"0" in the
//! OpenStep dialect; any other string is a wrong-type error. Binary-plist and
//! JSON inputs store the same flags as real integers, so 1/0 integers are
//! accepted too.

use crate::base::Guid;
use crate::error::ObjectError;
use crate::value::{Fields, Value};

/// Typed accessors over a raw field map.
pub trait FieldsExt {
    fn string(&self, key: &str) -> Result<&str, ObjectError>;
    fn optional_string(&self, key: &str) -> Result<Option<&str>, ObjectError>;
    fn strings(&self, key: &str) -> Result<Vec<String>, ObjectError>;
    fn optional_strings(&self, key: &str) -> Result<Option<Vec<String>>, ObjectError>;
    fn guid(&self, key: &str) -> Result<Guid, ObjectError>;
    fn optional_guid(&self, key: &str) -> Result<Option<Guid>, ObjectError>;
    fn guids(&self, key: &str) -> Result<Vec<Guid>, ObjectError>;
    fn optional_guids(&self, key: &str) -> Result<Option<Vec<Guid>>, ObjectError>;
    fn boolean(&self, key: &str) -> Result<bool, ObjectError>;
    fn optional_boolean(&self, key: &str) -> Result<Option<bool>, ObjectError>;
    fn dictionary(&self, key: &str) -> Result<&Fields, ObjectError>;
    fn optional_dictionary(&self, key: &str) -> Result<Option<&Fields>, ObjectError>;
    fn dictionaries(&self, key: &str) -> Result<Vec<&Fields>, ObjectError>;
    fn optional_dictionaries(&self, key: &str) -> Result<Option<Vec<&Fields>>, ObjectError>;
}

impl FieldsExt for Fields {
    fn string(&self, key: &str) -> Result<&str, ObjectError> {
        match self.get(key) {
            None => Err(ObjectError::field_missing(key)),
            Some(value) => value.as_str().ok_or_else(|| ObjectError::wrong_type(key)),
        }
    }

    fn optional_string(&self, key: &str) -> Result<Option<&str>, ObjectError> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_str()
                .map(Some)
                .ok_or_else(|| ObjectError::wrong_type(key)),
        }
    }

    fn strings(&self, key: &str) -> Result<Vec<String>, ObjectError> {
        match self.get(key) {
            None => Err(ObjectError::field_missing(key)),
            Some(value) => string_items(key, value),
        }
    }

    fn optional_strings(&self, key: &str) -> Result<Option<Vec<String>>, ObjectError> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => string_items(key, value).map(Some),
        }
    }

    fn guid(&self, key: &str) -> Result<Guid, ObjectError> {
        self.string(key).map(Guid::from)
    }

    fn optional_guid(&self, key: &str) -> Result<Option<Guid>, ObjectError> {
        Ok(self.optional_string(key)?.map(Guid::from))
    }

    fn guids(&self, key: &str) -> Result<Vec<Guid>, ObjectError> {
        Ok(self.strings(key)?.into_iter().map(Guid::from).collect())
    }

    fn optional_guids(&self, key: &str) -> Result<Option<Vec<Guid>>, ObjectError> {
        Ok(self
            .optional_strings(key)?
            .map(|items| items.into_iter().map(Guid::from).collect()))
    }

    fn boolean(&self, key: &str) -> Result<bool, ObjectError> {
        match self.get(key) {
            None => Err(ObjectError::field_missing(key)),
            Some(Value::String(s)) => match s.as_str() {
                "0" => Ok(false),
                "1" => Ok(true),
                _ => Err(ObjectError::wrong_type(key)),
            },
            Some(Value::Integer(0)) => Ok(false),
            Some(Value::Integer(1)) => Ok(true),
            Some(_) => Err(ObjectError::wrong_type(key)),
        }
    }

    fn optional_boolean(&self, key: &str) -> Result<Option<bool>, ObjectError> {
        if self.get(key).is_none() {
            return Ok(None);
        }
        self.boolean(key).map(Some)
    }

    fn dictionary(&self, key: &str) -> Result<&Fields, ObjectError> {
        match self.get(key) {
            None => Err(ObjectError::field_missing(key)),
            Some(value) => value
                .as_dictionary()
                .ok_or_else(|| ObjectError::wrong_type(key)),
        }
    }

    fn optional_dictionary(&self, key: &str) -> Result<Option<&Fields>, ObjectError> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_dictionary()
                .map(Some)
                .ok_or_else(|| ObjectError::wrong_type(key)),
        }
    }

    fn dictionaries(&self, key: &str) -> Result<Vec<&Fields>, ObjectError> {
        match self.get(key) {
            None => Err(ObjectError::field_missing(key)),
            Some(value) => dictionary_items(key, value),
        }
    }

    fn optional_dictionaries(&self, key: &str) -> Result<Option<Vec<&Fields>>, ObjectError> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => dictionary_items(key, value).map(Some),
        }
    }
}

fn string_items(key: &str, value: &Value) -> Result<Vec<String>, ObjectError> {
    let items = value.as_array().ok_or_else(|| ObjectError::wrong_type(key))?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_owned)
                .ok_or_else(|| ObjectError::wrong_type(key))
        })
        .collect()
}

fn dictionary_items<'a>(key: &str, value: &'a Value) -> Result<Vec<&'a Fields>, ObjectError> {
    let items = value.as_array().ok_or_else(|| ObjectError::wrong_type(key))?;
    items
        .iter()
        .map(|item| item.as_dictionary().ok_or_else(|| ObjectError::wrong_type(key)))
        .collect()
}
