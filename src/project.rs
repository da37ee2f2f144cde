//! Loading, navigating, mutating, and writing whole project files.
//!
//! [`XCProjectFile`] is the top-level handle: it owns the object registry,
//! remembers the on-disk encoding it was loaded from, and keeps the
//! non-object top-level entries (`archiveVersion`, `objectVersion`,
//! `classes`, `rootObject`) verbatim for round-tripping.

use std::io::Cursor;
use std::path::Path;

use rustc_hash::FxHashMap;

use crate::base::{Guid, ResolvedPath, SourceTree, SourceTreeFolder};
use crate::error::{ObjectError, ProjectFileError};
use crate::objects::{
    decode_object, FieldsExt, FileReference, Group, Object, ObjectKind, Project, ReferenceInfo,
};
use crate::openstep;
use crate::registry::{AllObjects, Reference};
use crate::serializer::Serializer;
use crate::value::{self, Fields, Value};

/// On-disk encoding of a project file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// The classic commented ASCII plist Xcode writes.
    OpenStep,
    /// Binary property list.
    Binary,
    /// XML property list.
    Xml,
    /// JSON, as produced by `plutil -convert json`.
    Json,
}

/// A parsed `project.pbxproj`.
#[derive(Debug)]
pub struct XCProjectFile {
    /// Top-level entries as parsed. The `objects` entry is regenerated from
    /// the registry on output, so edits go through [`Self::objects_mut`].
    fields: Fields,
    objects: AllObjects,
    root: Reference<Project>,
    format: Format,
}

impl XCProjectFile {
    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Load from an `.xcodeproj` directory.
    pub fn load(xcodeproj: impl AsRef<Path>) -> Result<Self, ProjectFileError> {
        Self::load_inner(xcodeproj.as_ref(), false)
    }

    /// Like [`Self::load`], but keeps undecodable entities as raw fields and
    /// skips referential-integrity validation. For reading files damaged by
    /// merge conflicts or written by newer Xcode versions.
    pub fn load_lenient(xcodeproj: impl AsRef<Path>) -> Result<Self, ProjectFileError> {
        Self::load_inner(xcodeproj.as_ref(), true)
    }

    fn load_inner(xcodeproj: &Path, lenient: bool) -> Result<Self, ProjectFileError> {
        let path = xcodeproj.join("project.pbxproj");
        let data = std::fs::read(&path).map_err(|error| {
            if error.kind() == std::io::ErrorKind::NotFound {
                ProjectFileError::MissingPbxproj
            } else {
                ProjectFileError::Io(error)
            }
        })?;
        Self::parse_bytes(&data, lenient)
    }

    /// Parse in-memory pbxproj data. The encoding is sniffed: binary plist
    /// by magic, XML by prologue, then OpenStep with a JSON fallback (both
    /// open with a brace).
    pub fn from_bytes(data: &[u8]) -> Result<Self, ProjectFileError> {
        Self::parse_bytes(data, false)
    }

    /// Lenient variant of [`Self::from_bytes`], see [`Self::load_lenient`].
    pub fn from_bytes_lenient(data: &[u8]) -> Result<Self, ProjectFileError> {
        Self::parse_bytes(data, true)
    }

    fn parse_bytes(data: &[u8], lenient: bool) -> Result<Self, ProjectFileError> {
        if data.starts_with(b"bplist") {
            let value = value::from_plist(plist::Value::from_reader(Cursor::new(data))?)?;
            return Self::from_value(value, Format::Binary, lenient);
        }

        let text = std::str::from_utf8(data).map_err(|_| ProjectFileError::InvalidData)?;
        let trimmed = text.trim_start();
        if trimmed.starts_with("<?xml") || trimmed.starts_with("<plist") {
            let value = value::from_plist(plist::Value::from_reader_xml(Cursor::new(data))?)?;
            return Self::from_value(value, Format::Xml, lenient);
        }

        match openstep::parse(text) {
            Ok(value) => Self::from_value(value, Format::OpenStep, lenient),
            Err(parse_error) => match serde_json::from_str::<serde_json::Value>(text) {
                Ok(json) => Self::from_value(value::from_json(json)?, Format::Json, lenient),
                Err(_) => Err(parse_error.into()),
            },
        }
    }

    fn from_value(value: Value, format: Format, lenient: bool) -> Result<Self, ProjectFileError> {
        let Value::Dictionary(fields) = value else {
            return Err(ProjectFileError::InvalidData);
        };
        Self::from_fields(fields, format, lenient)
    }

    fn from_fields(fields: Fields, format: Format, lenient: bool) -> Result<Self, ProjectFileError> {
        let Some(Value::Dictionary(entries)) = fields.get("objects") else {
            return Err(ObjectError::wrong_type("objects").into());
        };

        let mut objects = AllObjects::new();
        for (key, entry) in entries {
            let Some(object_fields) = entry.as_dictionary() else {
                return Err(ObjectError::wrong_type(key.as_str()).into());
            };
            let id = Guid::new(key.as_str());
            match decode_object(id.clone(), object_fields.clone(), &mut objects) {
                Ok(object) => objects.insert(object),
                Err(error) if lenient => {
                    tracing::warn!(id = %id, %error, "keeping undecodable entity as raw fields");
                    let isa = object_fields
                        .get("isa")
                        .and_then(Value::as_str)
                        .unwrap_or("(unknown)")
                        .to_owned();
                    objects.insert(Object {
                        id,
                        isa,
                        fields: object_fields.clone(),
                        kind: ObjectKind::Unknown,
                    });
                }
                Err(error) => return Err(error.into()),
            }
        }

        // The root must be a decoded project with a live main group, lenient
        // or not; without it there is nothing to navigate.
        let root_id = Guid::new(fields.string("rootObject")?);
        let root: Reference<Project> = objects.create_reference(root_id.clone());
        let Some(root_object) = objects.object(&root_id) else {
            return Err(ObjectError::ObjectMissing { id: root_id }.into());
        };
        let ObjectKind::Project(project) = &root_object.kind else {
            return Err(ObjectError::invalid_value("rootObject", root_object.isa.clone()).into());
        };
        let main_group_id = project.main_group.id().clone();
        if objects.object(&main_group_id).is_none() {
            return Err(ObjectError::ObjectMissing { id: main_group_id }.into());
        }

        if !lenient {
            objects
                .validate_references()
                .map_err(ProjectFileError::InternalInconsistency)?;
        }

        tracing::debug!(objects = objects.len(), ?format, "loaded project file");

        let mut file = Self {
            fields,
            objects,
            root,
            format,
        };
        file.recompute_full_paths();
        Ok(file)
    }

    /// Project name from an `.xcodeproj` path: the last component up to the
    /// `.xcodeproj` suffix.
    pub fn project_name(xcodeproj: &Path) -> Result<String, ProjectFileError> {
        let last = xcodeproj
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or(ProjectFileError::NotXcodeproj)?;
        match last.find(".xcodeproj") {
            Some(position) => Ok(last[..position].to_owned()),
            None => Err(ProjectFileError::NotXcodeproj),
        }
    }

    // ------------------------------------------------------------------
    // Access
    // ------------------------------------------------------------------

    pub fn objects(&self) -> &AllObjects {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut AllObjects {
        &mut self.objects
    }

    /// Identifier of the root project object.
    pub fn root_id(&self) -> &Guid {
        self.root.id()
    }

    /// The root project. Always present; load-time checks reject files
    /// without one and the registry never evicts a counted root.
    pub fn project(&self) -> &Project {
        match self.objects.get(&self.root) {
            Some(project) => project,
            None => unreachable!("root project is validated at load time"),
        }
    }

    /// Format the file was loaded from.
    pub fn format(&self) -> Format {
        self.format
    }

    /// Top-level entries other than the live object table.
    pub(crate) fn top_fields(&self) -> &Fields {
        &self.fields
    }

    // ------------------------------------------------------------------
    // Paths
    // ------------------------------------------------------------------

    /// Rebuild the resolved-path cache for file references and synchronized
    /// root groups by walking the group tree from the main group. Call after
    /// moving files between groups.
    pub fn recompute_full_paths(&mut self) {
        let mut paths = FxHashMap::default();
        let main_group_id = self.project().main_group.id().clone();
        if let Some(group) = self.objects.object(&main_group_id).and_then(Object::as_group) {
            collect_paths(&self.objects, group, "", &mut paths);
        }
        self.objects.set_full_paths(paths);
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Store a newly created object, returning a counted handle.
    pub fn add_reference<T>(&mut self, object: Object) -> Reference<T> {
        self.objects.insert_reference(object)
    }

    /// Build a new file reference with a fresh identifier. The object is
    /// returned unstored; pass it to [`Self::add_reference`] and insert the
    /// handle into a group.
    pub fn create_file_reference(
        &mut self,
        path: &str,
        name: &str,
        source_tree: SourceTree,
        last_known_file_type: &str,
    ) -> Result<Object, ObjectError> {
        let mut fields = Fields::new();
        fields.insert("isa".to_owned(), "PBXFileReference".into());
        fields.insert("lastKnownFileType".to_owned(), last_known_file_type.into());
        fields.insert("path".to_owned(), path.into());
        fields.insert("sourceTree".to_owned(), source_tree.as_str().into());
        if name != path {
            fields.insert("name".to_owned(), name.into());
        }

        let guid = self.objects.create_fresh_guid(self.root.id());
        decode_object(guid, fields, &mut self.objects)
    }

    /// Build a new run-script phase with a fresh identifier, unstored.
    pub fn create_shell_script(
        &mut self,
        name: &str,
        shell_script: &str,
    ) -> Result<Object, ObjectError> {
        let mut fields = Fields::new();
        fields.insert("isa".to_owned(), "PBXShellScriptBuildPhase".into());
        fields.insert("buildActionMask".to_owned(), "2147483647".into());
        fields.insert("files".to_owned(), Value::Array(Vec::new()));
        fields.insert("inputPaths".to_owned(), Value::Array(Vec::new()));
        fields.insert("name".to_owned(), name.into());
        fields.insert("outputPaths".to_owned(), Value::Array(Vec::new()));
        fields.insert("runOnlyForDeploymentPostprocessing".to_owned(), "0".into());
        fields.insert("shellPath".to_owned(), "/bin/sh".into());
        fields.insert("shellScript".to_owned(), shell_script.into());

        let guid = self.objects.create_fresh_guid(self.root.id());
        decode_object(guid, fields, &mut self.objects)
    }

    /// Build a new build file wrapping `file_reference`, unstored. The file
    /// reference gains a count for the new `fileRef` field.
    pub fn create_build_file(
        &mut self,
        file_reference: &Reference<FileReference>,
    ) -> Result<Object, ObjectError> {
        let mut fields = Fields::new();
        fields.insert("isa".to_owned(), "PBXBuildFile".into());
        fields.insert("fileRef".to_owned(), file_reference.id().as_str().into());

        let guid = self.objects.create_fresh_guid(self.root.id());
        decode_object(guid, fields, &mut self.objects)
    }

    /// Remove a Swift package reference: detach it from the project's
    /// package list and from every product dependency that points at it,
    /// releasing the counts so the package object is evicted.
    pub fn remove_package(&mut self, package_id: &Guid) {
        let root_id = self.root.id().clone();
        let removed = self
            .objects
            .object_mut(&root_id)
            .and_then(|root| root.remove_package_reference(package_id));
        if let Some(removed) = removed {
            self.objects.remove_reference(removed);
        }

        let dependents: Vec<Guid> = self
            .objects
            .iter()
            .filter(|object| match &object.kind {
                ObjectKind::SwiftPackageProductDependency(dependency) => dependency
                    .package
                    .as_ref()
                    .is_some_and(|package| package.id() == package_id),
                _ => false,
            })
            .map(|object| object.id.clone())
            .collect();

        for id in dependents {
            let removed = self
                .objects
                .object_mut(&id)
                .and_then(Object::clear_package);
            if let Some(removed) = removed {
                self.objects.remove_reference(removed);
            }
        }
    }

    // ------------------------------------------------------------------
    // Writing
    // ------------------------------------------------------------------

    /// Write into an `.xcodeproj` directory, creating it as needed. `format`
    /// defaults to the format the file was loaded from.
    pub fn write_to(
        &self,
        xcodeproj: impl AsRef<Path>,
        format: Option<Format>,
    ) -> Result<(), ProjectFileError> {
        let xcodeproj = xcodeproj.as_ref();
        std::fs::create_dir_all(xcodeproj)?;
        let name = Self::project_name(xcodeproj)?;
        let data = self.serialized(&name, format)?;
        std::fs::write(xcodeproj.join("project.pbxproj"), data)?;
        Ok(())
    }

    /// Serialize to bytes. The project name only affects synthesized
    /// comments in OpenStep output.
    pub fn serialized(
        &self,
        project_name: &str,
        format: Option<Format>,
    ) -> Result<Vec<u8>, ProjectFileError> {
        match format.unwrap_or(self.format) {
            Format::OpenStep => Ok(Serializer::new(project_name, self).open_step().into_bytes()),
            Format::Binary => {
                let value = value::to_plist(&Value::Dictionary(self.merged_fields()));
                let mut out = Vec::new();
                value.to_writer_binary(&mut out)?;
                Ok(out)
            }
            Format::Xml => {
                let value = value::to_plist(&Value::Dictionary(self.merged_fields()));
                let mut out = Vec::new();
                value.to_writer_xml(&mut out)?;
                Ok(out)
            }
            Format::Json => {
                let value = value::to_json(&Value::Dictionary(self.merged_fields()));
                Ok(serde_json::to_vec_pretty(&value)?)
            }
        }
    }

    /// Top-level fields with the `objects` table regenerated from the live
    /// registry, in identifier order.
    fn merged_fields(&self) -> Fields {
        let mut sorted: Vec<&Object> = self.objects.iter().collect();
        sorted.sort_by(|a, b| a.id.cmp(&b.id));

        let mut table = Fields::new();
        for object in sorted {
            table.insert(
                object.id.as_str().to_owned(),
                Value::Dictionary(object.fields.clone()),
            );
        }

        let mut fields = self.fields.clone();
        fields.insert("objects".to_owned(), Value::Dictionary(table));
        fields
    }
}

// ============================================================================
// PATH RESOLUTION
// ============================================================================

/// Resolve a file-like entry's path against its own source tree, falling
/// back to the containing group's tree for group-relative entries.
fn resolve_entry(
    info: &ReferenceInfo,
    parent_tree: SourceTree,
    prefix: &str,
) -> Option<ResolvedPath> {
    let path = info.path.as_deref()?;
    Some(match info.source_tree {
        SourceTree::Group => match parent_tree {
            SourceTree::Absolute => ResolvedPath::Absolute(format!("{prefix}{path}")),
            SourceTree::Group => {
                ResolvedPath::RelativeTo(SourceTreeFolder::SourceRoot, format!("{prefix}{path}"))
            }
            SourceTree::RelativeTo(folder) => {
                ResolvedPath::RelativeTo(folder, format!("{prefix}{path}"))
            }
        },
        SourceTree::Absolute => ResolvedPath::Absolute(path.to_owned()),
        SourceTree::RelativeTo(folder) => ResolvedPath::RelativeTo(folder, path.to_owned()),
    })
}

fn collect_paths(
    objects: &AllObjects,
    group: &Group,
    prefix: &str,
    out: &mut FxHashMap<Guid, ResolvedPath>,
) {
    for object in group.file_refs(objects).chain(group.sync_roots(objects)) {
        let Some(info) = object.as_reference_info() else {
            continue;
        };
        if let Some(resolved) = resolve_entry(info, group.info.source_tree, prefix) {
            out.insert(object.id.clone(), resolved);
        }
    }

    for object in group.sub_groups(objects) {
        let Some(sub) = object.as_group() else {
            continue;
        };
        match &sub.info.path {
            Some(path) => {
                // Only group-relative sub-groups extend the prefix; anchored
                // ones restart from their own path.
                let base = match sub.info.source_tree {
                    SourceTree::Group => format!("{prefix}{path}"),
                    _ => path.clone(),
                };
                collect_paths(objects, sub, &format!("{base}/"), out);
            }
            None => collect_paths(objects, sub, prefix, out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/tmp/App.xcodeproj", Ok("App"))]
    #[case("Deep/Nested/My Tool.xcodeproj", Ok("My Tool"))]
    #[case("/tmp/App.xcodeproj/", Ok("App"))]
    #[case("/tmp/NotAProject", Err(()))]
    fn project_names(#[case] path: &str, #[case] expected: Result<&str, ()>) {
        let result = XCProjectFile::project_name(Path::new(path));
        match expected {
            Ok(name) => assert_eq!(result.ok().as_deref(), Some(name)),
            Err(()) => assert!(matches!(result, Err(ProjectFileError::NotXcodeproj))),
        }
    }

    #[test]
    fn json_input_is_detected_after_openstep_fails() {
        let json = br#"{
            "archiveVersion": "1",
            "classes": {},
            "objectVersion": "46",
            "objects": {
                "CAFE00000000000000000001": {
                    "isa": "PBXProject",
                    "buildConfigurationList": "CAFE00000000000000000002",
                    "mainGroup": "CAFE00000000000000000003",
                    "targets": []
                },
                "CAFE00000000000000000002": {
                    "isa": "XCConfigurationList",
                    "buildConfigurations": []
                },
                "CAFE00000000000000000003": {
                    "isa": "PBXGroup",
                    "children": [],
                    "sourceTree": "<group>"
                }
            },
            "rootObject": "CAFE00000000000000000001"
        }"#;

        let file = XCProjectFile::from_bytes(json).expect("should load");
        assert_eq!(file.format(), Format::Json);
        assert_eq!(file.root_id().as_str(), "CAFE00000000000000000001");
    }

    #[test]
    fn garbage_input_reports_invalid_data_or_parse_error() {
        assert!(XCProjectFile::from_bytes(&[0xFF, 0xFE, 0x00]).is_err());
        assert!(XCProjectFile::from_bytes(b"not a project at all").is_err());
    }
}
