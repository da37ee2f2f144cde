//! File-like entities: file references, groups, reference proxies and the
//! filesystem-synchronized group family.

use crate::base::SourceTree;
use crate::error::ObjectError;
use crate::objects::fields::FieldsExt;
use crate::objects::{Object, ObjectKind};
use crate::registry::{AllObjects, Reference};
use crate::value::Fields;

// ============================================================================
// SHARED TIER
// ============================================================================

/// Payload shared by every file-like entity: a position in the group tree.
///
/// `name` is the display name when it differs from the last path component;
/// `path` is relative to whatever `source_tree` anchors it to.
#[derive(Debug, Clone)]
pub struct ReferenceInfo {
    pub name: Option<String>,
    pub path: Option<String>,
    pub source_tree: SourceTree,
}

impl ReferenceInfo {
    pub fn decode(fields: &Fields) -> Result<Self, ObjectError> {
        let raw = fields.string("sourceTree")?;
        let source_tree = SourceTree::parse(raw)
            .ok_or_else(|| ObjectError::invalid_value("sourceTree", raw))?;
        Ok(Self {
            name: fields.optional_string("name")?.map(str::to_owned),
            path: fields.optional_string("path")?.map(str::to_owned),
            source_tree,
        })
    }

    /// Display name for comments and UI: `name` wins over the last path
    /// component.
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or_else(|| self.path.as_deref().map(|p| p.rsplit('/').next().unwrap_or(p)))
    }
}

// ============================================================================
// FILE REFERENCES
// ============================================================================

#[derive(Debug, Clone)]
pub struct FileReference {
    pub info: ReferenceInfo,
    pub last_known_file_type: Option<String>,
}

impl FileReference {
    pub fn decode(fields: &Fields) -> Result<Self, ObjectError> {
        Ok(Self {
            info: ReferenceInfo::decode(fields)?,
            last_known_file_type: fields.optional_string("lastKnownFileType")?.map(str::to_owned),
        })
    }
}

/// A file in another project, exposed through a [`super::ObjectKind::ContainerItemProxy`].
#[derive(Debug, Clone)]
pub struct ReferenceProxy {
    pub info: ReferenceInfo,
    pub remote_ref: Reference<Object>,
}

impl ReferenceProxy {
    pub fn decode(fields: &Fields, objects: &mut AllObjects) -> Result<Self, ObjectError> {
        Ok(Self {
            info: ReferenceInfo::decode(fields)?,
            remote_ref: objects.create_reference(fields.guid("remoteRef")?),
        })
    }
}

// ============================================================================
// GROUPS
// ============================================================================

/// Payload shared by `PBXGroup`, `PBXVariantGroup` and `XCVersionGroup`:
/// ordered children.
#[derive(Debug, Clone)]
pub struct Group {
    pub info: ReferenceInfo,
    pub children: Vec<Reference<Object>>,
}

impl Group {
    pub fn decode(fields: &Fields, objects: &mut AllObjects) -> Result<Self, ObjectError> {
        Ok(Self {
            info: ReferenceInfo::decode(fields)?,
            children: objects.create_references(fields.guids("children")?),
        })
    }

    /// Child groups (any group flavor), in declaration order.
    pub fn sub_groups<'a>(&'a self, objects: &'a AllObjects) -> impl Iterator<Item = &'a Object> {
        self.children
            .iter()
            .filter_map(|child| objects.object(child.id()))
            .filter(|object| object.as_group().is_some())
    }

    /// Child file references, in declaration order.
    pub fn file_refs<'a>(&'a self, objects: &'a AllObjects) -> impl Iterator<Item = &'a Object> {
        self.children
            .iter()
            .filter_map(|child| objects.object(child.id()))
            .filter(|object| matches!(object.kind, ObjectKind::FileReference(_)))
    }

    /// Child filesystem-synchronized root groups, in declaration order.
    pub fn sync_roots<'a>(&'a self, objects: &'a AllObjects) -> impl Iterator<Item = &'a Object> {
        self.children
            .iter()
            .filter_map(|child| objects.object(child.id()))
            .filter(|object| matches!(object.kind, ObjectKind::SynchronizedRootGroup(_)))
    }
}

/// A folder kept in sync with the filesystem instead of listing children
/// explicitly (Xcode 16 "buildable folders").
#[derive(Debug, Clone)]
pub struct SynchronizedRootGroup {
    pub info: ReferenceInfo,
    pub exceptions: Option<Vec<Reference<Object>>>,
}

impl SynchronizedRootGroup {
    pub fn decode(fields: &Fields, objects: &mut AllObjects) -> Result<Self, ObjectError> {
        Ok(Self {
            info: ReferenceInfo::decode(fields)?,
            exceptions: objects.create_optional_references(fields.optional_guids("exceptions")?),
        })
    }
}

/// Per-target membership exceptions inside one synchronized root group.
#[derive(Debug, Clone)]
pub struct BuildFileExceptionSet {
    pub membership_exceptions: Vec<String>,
    pub target: Reference<Object>,
}

impl BuildFileExceptionSet {
    pub fn decode(fields: &Fields, objects: &mut AllObjects) -> Result<Self, ObjectError> {
        Ok(Self {
            membership_exceptions: fields
                .optional_strings("membershipExceptions")?
                .unwrap_or_default(),
            target: objects.create_reference(fields.guid("target")?),
        })
    }
}

/// Exceptions that move synchronized files into a different build phase.
#[derive(Debug, Clone)]
pub struct GroupBuildPhaseMembershipExceptionSet {
    pub membership_exceptions: Vec<String>,
    pub build_phase: Option<Reference<Object>>,
}

impl GroupBuildPhaseMembershipExceptionSet {
    pub fn decode(fields: &Fields, objects: &mut AllObjects) -> Result<Self, ObjectError> {
        Ok(Self {
            membership_exceptions: fields
                .optional_strings("membershipExceptions")?
                .unwrap_or_default(),
            build_phase: objects.create_optional_reference(fields.optional_guid("buildPhase")?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openstep;

    fn fields_of(source: &str) -> Fields {
        match openstep::parse(source).expect("should parse") {
            crate::value::Value::Dictionary(fields) => fields,
            other => panic!("expected dictionary, got {other:?}"),
        }
    }

    #[test]
    fn file_reference_decodes_name_path_and_tree() {
        let fields = fields_of(
            r#"{ isa = PBXFileReference; lastKnownFileType = sourcecode.swift;
                 name = "AppDelegate.swift"; path = "Sources/AppDelegate.swift";
                 sourceTree = "<group>"; }"#,
        );
        let file = FileReference::decode(&fields).expect("should decode");
        assert_eq!(file.info.name.as_deref(), Some("AppDelegate.swift"));
        assert_eq!(file.info.source_tree, SourceTree::Group);
        assert_eq!(file.last_known_file_type.as_deref(), Some("sourcecode.swift"));
    }

    #[test]
    fn file_reference_rejects_unknown_source_tree() {
        let fields = fields_of(r#"{ isa = PBXFileReference; sourceTree = NONSENSE; }"#);
        let error = FileReference::decode(&fields).expect_err("should fail");
        assert!(matches!(error, ObjectError::InvalidValue { .. }), "{error}");
    }

    #[test]
    fn display_name_prefers_name_over_path_tail() {
        let fields = fields_of(
            r#"{ sourceTree = "<group>"; name = Shown; path = "Deep/Nested/Real.swift"; }"#,
        );
        let info = ReferenceInfo::decode(&fields).expect("should decode");
        assert_eq!(info.display_name(), Some("Shown"));

        let fields = fields_of(r#"{ sourceTree = "<group>"; path = "Deep/Nested/Real.swift"; }"#);
        let info = ReferenceInfo::decode(&fields).expect("should decode");
        assert_eq!(info.display_name(), Some("Real.swift"));
    }

    #[test]
    fn group_children_are_counted_references() {
        let mut objects = AllObjects::new();
        let fields = fields_of(
            r#"{ isa = PBXGroup; sourceTree = "<group>";
                 children = ( AAAA00000000000000000001, AAAA00000000000000000002 ); }"#,
        );
        let group = Group::decode(&fields, &mut objects).expect("should decode");
        assert_eq!(group.children.len(), 2);
        assert_eq!(objects.ref_count(group.children[0].id()), 1);
    }
}
