//! Object identifiers.

use std::fmt;
use std::sync::Arc;

/// Unique identifier for an object within one project file.
///
/// Used both as the key in the flat `objects` table and as the value of every
/// inter-object reference. Equality, hashing, and ordering are by underlying
/// string value; ordering matters for deterministic serialization.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Guid(Arc<str>);

impl Guid {
    /// Create a new Guid from any string value.
    pub fn new(value: impl Into<Arc<str>>) -> Self {
        Self(value.into())
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Guid {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Guid {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_by_string_value() {
        let a = Guid::new("AAAA00000000000000000001");
        let b = Guid::new("AAAA00000000000000000002");
        assert!(a < b);
        assert_eq!(a, Guid::new("AAAA00000000000000000001"));
    }

    #[test]
    fn displays_raw_value() {
        assert_eq!(Guid::new("DEADBEEF").to_string(), "DEADBEEF");
    }
}
