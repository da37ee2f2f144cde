//! Error types for decoding, validation, and project-file loading.

use thiserror::Error;

use crate::base::Guid;

/// Errors raised while decoding a single object from its raw field map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjectError {
    /// A required field is absent.
    #[error("missing field '{key}'")]
    FieldMissing { key: String },

    /// A field is present but holds the wrong value type.
    #[error("field '{key}' has wrong type")]
    WrongType { key: String },

    /// A field holds a value outside its enumerated domain.
    #[error("field '{key}' has invalid value '{value}'")]
    InvalidValue { key: String, value: String },

    /// A referenced object is not present in the registry.
    #[error("object {id} missing")]
    ObjectMissing { id: Guid },
}

impl ObjectError {
    pub fn field_missing(key: impl Into<String>) -> Self {
        Self::FieldMissing { key: key.into() }
    }

    pub fn wrong_type(key: impl Into<String>) -> Self {
        Self::WrongType { key: key.into() }
    }

    pub fn invalid_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A referential-integrity violation found by [`crate::AllObjects::validate_references`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    /// An object holds a reference to an identifier with no stored object.
    DeadReference {
        isa: String,
        id: Guid,
        key_path: String,
        target: Guid,
    },

    /// A stored object that nothing references.
    OrphanObject { isa: String, id: Guid },
}

/// Error from the OpenStep plist parser, positioned by byte offset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("OpenStep parse error at byte {offset}: {message}")]
pub struct ParseError {
    pub offset: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}

/// Top-level errors surfaced when loading or writing a project file.
#[derive(Debug, Error)]
pub enum ProjectFileError {
    /// Data in the .pbxproj file is not in an expected format.
    #[error("Data in .pbxproj file not in expected format")]
    InvalidData,

    /// The given path is not a `.xcodeproj` package.
    #[error("Path is not a .xcodeproj package")]
    NotXcodeproj,

    /// The `.xcodeproj` package has no `project.pbxproj` file.
    #[error("project.pbxproj file missing")]
    MissingPbxproj,

    /// The object graph has dead references or orphan objects.
    #[error("{}", render_inconsistency(.0))]
    InternalInconsistency(Vec<ReferenceError>),

    /// A single object failed to decode.
    #[error(transparent)]
    Decode(#[from] ObjectError),

    /// The OpenStep text failed to parse.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Binary or XML property-list decode/encode failure.
    #[error("property list error: {0}")]
    Plist(#[from] plist::Error),

    /// JSON decode/encode failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn render_inconsistency(errors: &[ReferenceError]) -> String {
    let mut str = String::from("project.pbxproj is internally inconsistent.\n\n");

    for error in errors {
        match error {
            ReferenceError::DeadReference {
                isa,
                id,
                key_path,
                target,
            } => {
                str.push_str(&format!(
                    " - {isa} ({}) references missing {key_path} {}\n",
                    id.as_str(),
                    target.as_str()
                ));
            }
            ReferenceError::OrphanObject { isa, id } => {
                str.push_str(&format!(" - {isa} ({}) is not used\n", id.as_str()));
            }
        }
    }

    str.push_str("\nPerhaps a merge conflict?\n");
    str
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inconsistency_lists_every_error_with_hint() {
        let errors = vec![
            ReferenceError::DeadReference {
                isa: "PBXGroup".into(),
                id: Guid::new("AAAA"),
                key_path: "children[0]".into(),
                target: Guid::new("BBBB"),
            },
            ReferenceError::OrphanObject {
                isa: "PBXFileReference".into(),
                id: Guid::new("CCCC"),
            },
        ];

        let msg = ProjectFileError::InternalInconsistency(errors).to_string();
        assert!(msg.starts_with("project.pbxproj is internally inconsistent."));
        assert!(msg.contains(" - PBXGroup (AAAA) references missing children[0] BBBB"));
        assert!(msg.contains(" - PBXFileReference (CCCC) is not used"));
        assert!(msg.ends_with("Perhaps a merge conflict?\n"));
    }

    #[test]
    fn object_error_names_the_key() {
        assert_eq!(
            ObjectError::field_missing("fileRef").to_string(),
            "missing field 'fileRef'"
        );
        assert_eq!(
            ObjectError::wrong_type("buildSettings").to_string(),
            "field 'buildSettings' has wrong type"
        );
    }
}
