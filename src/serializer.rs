//! The OpenStep writer.
//!
//! Reproduces Xcode's own pbxproj layout byte-for-byte: objects grouped into
//! `/* Begin <isa> section */` blocks sorted by isa then identifier, keys
//! sorted with `isa` first, tab indentation, and the synthesized `/* ... */`
//! comments Xcode writes next to every identifier. Build-file and
//! configuration-list comments need graph context (which phase owns a file,
//! which target owns a list), so the writer precomputes those maps.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use crate::base::Guid;
use crate::objects::{BuildFile, Object, ObjectKind};
use crate::project::XCProjectFile;
use crate::value::{Fields, Value};

pub(crate) struct Serializer<'a> {
    project_name: &'a str,
    file: &'a XCProjectFile,
    /// Configuration-list id to owning target id.
    targets_by_config_id: FxHashMap<Guid, Guid>,
    /// Build-file id to owning build-phase id.
    build_phase_by_file_id: FxHashMap<Guid, Guid>,
}

impl<'a> Serializer<'a> {
    pub(crate) fn new(project_name: &'a str, file: &'a XCProjectFile) -> Self {
        let objects = file.objects();

        let mut targets_by_config_id = FxHashMap::default();
        for reference in &file.project().targets {
            if let Some(target) = objects.object(reference.id()).and_then(Object::as_target) {
                targets_by_config_id
                    .insert(target.build_configuration_list.id().clone(), reference.id().clone());
            }
        }

        let mut build_phase_by_file_id = FxHashMap::default();
        for object in objects.iter() {
            if let Some(phase) = object.as_build_phase() {
                for file_reference in &phase.files {
                    build_phase_by_file_id.insert(file_reference.id().clone(), object.id.clone());
                }
            }
        }

        Self {
            project_name,
            file,
            targets_by_config_id,
            build_phase_by_file_id,
        }
    }

    // ------------------------------------------------------------------
    // Top level
    // ------------------------------------------------------------------

    /// Render the whole file, ending in a single newline.
    pub(crate) fn open_step(&self) -> String {
        let mut lines: Vec<String> = vec!["// !$*UTF8*$!".to_owned(), "{".to_owned()];

        let mut keys: Vec<&String> = self.file.top_fields().keys().collect();
        keys.sort();

        for key in keys {
            if key == "objects" {
                lines.push("\tobjects = {".to_owned());
                self.object_sections(&mut lines);
                lines.push("\t};".to_owned());
                continue;
            }

            // Other top-level entries are scalars plus the (normally empty)
            // classes dictionary.
            let value = &self.file.top_fields()[key.as_str()];
            for part in self.entry(key, value, true) {
                lines.push(format!("\t{part}"));
            }
        }

        lines.push("}\n".to_owned());
        lines.join("\n")
    }

    fn object_sections(&self, lines: &mut Vec<String>) {
        let mut sections: BTreeMap<&str, Vec<&Object>> = BTreeMap::new();
        for object in self.file.objects().iter() {
            sections.entry(&object.isa).or_default().push(object);
        }

        for (isa, mut objects) in sections {
            objects.sort_by(|a, b| a.id.cmp(&b.id));

            lines.push(String::new());
            lines.push(format!("/* Begin {isa} section */"));

            for object in objects {
                // Build files and file references are dense one-liners, plus
                // synchronized roots that carry exactly one exception.
                let single_line_root = matches!(
                    &object.kind,
                    ObjectKind::SynchronizedRootGroup(root)
                        if root.exceptions.as_ref().is_some_and(|e| e.len() == 1)
                );
                let multiline =
                    isa != "PBXBuildFile" && isa != "PBXFileReference" && !single_line_root;

                let parts = self.rows(object, multiline);
                if multiline {
                    for part in parts {
                        lines.push(format!("\t\t{part}"));
                    }
                } else {
                    lines.push(format!("\t\t{}", parts.concat()));
                }
            }

            lines.push(format!("/* End {isa} section */"));
        }
    }

    // ------------------------------------------------------------------
    // Objects
    // ------------------------------------------------------------------

    /// Render one object. Multiline output is one line per element; single
    /// line output is parts to concatenate, each carrying its own trailing
    /// space.
    fn rows(&self, object: &Object, multiline: bool) -> Vec<String> {
        let mut parts: Vec<String> = Vec::new();
        if multiline {
            parts.push(format!("isa = {};", object.isa));
        } else {
            parts.push(format!("isa = {}; ", object.isa));
        }

        let mut keys: Vec<&String> = object.fields.keys().collect();
        keys.sort();
        for key in keys {
            if key == "isa" {
                continue;
            }
            parts.extend(self.entry(key, &object.fields[key.as_str()], multiline));
        }

        let key_str = val_str(object.id.as_str());
        let object_comment = match self.comment(&object.id) {
            Some(text) => format!(" /* {text} */"),
            None => String::new(),
        };

        let opening = format!("{key_str}{object_comment} = {{");
        if multiline {
            let mut lines = vec![opening];
            for part in parts {
                lines.push(format!("\t{part}"));
            }
            lines.push("};".to_owned());
            lines
        } else {
            vec![format!("{opening}{}}};", parts.concat())]
        }
    }

    /// Render one `key = value` entry as lines (multiline) or space-suffixed
    /// fragments (single line).
    fn entry(&self, key: &str, value: &Value, multiline: bool) -> Vec<String> {
        let key_str = val_str(key);
        let mut parts: Vec<String> = Vec::new();

        match value {
            Value::Array(items) if items.iter().any(|item| item.as_dictionary().is_some()) => {
                // Arrays of dictionaries: projectReferences and friends.
                parts.push(format!("{key_str} = ("));
                for item in items {
                    let Some(fields) = item.as_dictionary() else {
                        continue;
                    };
                    if multiline {
                        parts.push("\t{".to_owned());
                        for part in self.dictionary_body(fields, multiline) {
                            parts.push(format!("\t\t{part}"));
                        }
                        parts.push("\t},".to_owned());
                    } else {
                        parts.push("{".to_owned());
                        parts.extend(self.dictionary_body(fields, multiline));
                        parts.push("}, ".to_owned());
                    }
                }
                if multiline {
                    parts.push(");".to_owned());
                } else {
                    parts.push("); ".to_owned());
                }
            }
            Value::Array(items) => {
                parts.push(format!("{key_str} = ("));
                let mut rendered: Vec<String> = Vec::new();
                for item in items {
                    let Some(text) = item.scalar_string() else {
                        continue;
                    };
                    let mut comment = String::new();
                    if let Some(c) = self.comment(&Guid::new(text.as_str())) {
                        comment = format!(" /* {c} */");
                    }
                    rendered.push(format!("{}{comment},", val_str(&text)));
                }
                if multiline {
                    for item in rendered {
                        parts.push(format!("\t{item}"));
                    }
                    parts.push(");".to_owned());
                } else {
                    let joined: String =
                        rendered.into_iter().map(|item| item + " ").collect();
                    parts.push(format!("{joined}); "));
                }
            }
            Value::Dictionary(fields) => {
                parts.push(format!("{key_str} = {{"));
                if multiline {
                    for part in self.dictionary_body(fields, multiline) {
                        parts.push(format!("\t{part}"));
                    }
                    parts.push("};".to_owned());
                } else {
                    parts.extend(self.dictionary_body(fields, multiline));
                    parts.push("}; ".to_owned());
                }
            }
            scalar => {
                // Arrays and dictionaries matched above; only scalars remain.
                let text = scalar.scalar_string().unwrap_or_default();
                let rendered = val_str(&text);

                // Test-target back references carry raw identifiers that
                // Xcode never annotates.
                let mut comment = String::new();
                if key != "remoteGlobalIDString" && key != "TestTargetID" {
                    if let Some(c) = self.comment(&Guid::new(text.as_str())) {
                        comment = format!(" /* {c} */");
                    }
                }

                if multiline {
                    parts.push(format!("{key_str} = {rendered}{comment};"));
                } else {
                    parts.push(format!("{key_str} = {rendered}{comment}; "));
                }
            }
        }

        parts
    }

    fn dictionary_body(&self, fields: &Fields, multiline: bool) -> Vec<String> {
        let mut keys: Vec<&String> = fields.keys().collect();
        keys.sort();

        let mut parts = Vec::new();
        for key in keys {
            parts.extend(self.entry(key, &fields[key.as_str()], multiline));
        }
        parts
    }

    // ------------------------------------------------------------------
    // Comment synthesis
    // ------------------------------------------------------------------

    /// The `/* ... */` annotation for an identifier, when one applies.
    fn comment(&self, id: &Guid) -> Option<String> {
        if id == self.file.root_id() {
            return Some("Project object".to_owned());
        }

        let object = self.file.objects().object(id)?;

        if let Some(info) = object.as_reference_info() {
            return info.name.clone().or_else(|| info.path.clone());
        }
        if let Some(target) = object.as_target() {
            return Some(target.name.clone());
        }

        match &object.kind {
            ObjectKind::BuildConfiguration(config) => return Some(config.name.clone()),
            ObjectKind::SwiftPackageProductDependency(dependency) => {
                return dependency
                    .product_name
                    .as_deref()
                    .map(|name| name.strip_prefix("plugin:").unwrap_or(name).to_owned());
            }
            ObjectKind::RemoteSwiftPackageReference(remote) => {
                return Some(match remote.display_name() {
                    Some(name) => format!("XCRemoteSwiftPackageReference \"{name}\""),
                    None => "XCRemoteSwiftPackageReference".to_owned(),
                });
            }
            ObjectKind::LocalSwiftPackageReference(local) => {
                return Some(format!(
                    "XCLocalSwiftPackageReference \"{}\"",
                    local.relative_path
                ));
            }
            ObjectKind::BuildFile(build_file) => {
                if let Some(comment) = self.build_file_comment(id, build_file) {
                    return Some(comment);
                }
            }
            ObjectKind::ConfigurationList(_) => {
                if let Some(target_id) = self.targets_by_config_id.get(id) {
                    if let Some(owner) = self.file.objects().object(target_id) {
                        if let Some(target) = owner.as_target() {
                            return Some(format!(
                                "Build configuration list for {} \"{}\"",
                                owner.isa, target.name
                            ));
                        }
                    }
                }
                return Some(format!(
                    "Build configuration list for PBXProject \"{}\"",
                    self.project_name
                ));
            }
            _ => {}
        }

        if let Some(name) = object.build_phase_display_name() {
            return Some(name.to_owned());
        }

        Some(object.isa.clone())
    }

    /// `<file> in <phase>`, or `(null) in <phase>` for a build file that
    /// lost its file reference. Falls back to the bare isa when the owning
    /// phase is unknown or the referenced file yields no comment.
    fn build_file_comment(
        &self,
        id: &Guid,
        build_file: &BuildFile,
    ) -> Option<String> {
        let phase_id = self.build_phase_by_file_id.get(id)?;
        let group = self.comment(phase_id)?;

        if let Some(file_ref) = &build_file.file_ref {
            let name = self.comment(file_ref.id())?;
            return Some(format!("{name} in {group}"));
        }
        if let Some(product_ref) = &build_file.product_ref {
            let name = self.comment(product_ref.id())?;
            return Some(format!("{name} in {group}"));
        }
        Some(format!("(null) in {group}"))
    }
}

/// Escape a value and quote it unless it consists entirely of characters
/// Xcode writes bare.
fn val_str(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\t' => escaped.push_str("\\t"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '"' => escaped.push_str("\\\""),
            other => escaped.push(other),
        }
    }

    let bare = !escaped.is_empty()
        && escaped
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'$' | b'.' | b'/'));
    if bare {
        escaped
    } else {
        format!("\"{escaped}\"")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("AppDelegate.swift", "AppDelegate.swift")]
    #[case("$(SRCROOT)/scripts", "\"$(SRCROOT)/scripts\"")]
    #[case("Run Lint", "\"Run Lint\"")]
    #[case("", "\"\"")]
    #[case("com.apple.product-type.application", "\"com.apple.product-type.application\"")]
    fn bare_versus_quoted(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(val_str(input), expected);
    }

    #[test]
    fn escapes_are_applied_before_the_bare_check() {
        assert_eq!(val_str("a\"b"), "\"a\\\"b\"");
        assert_eq!(val_str("line1\nline2"), "\"line1\\nline2\"");
        assert_eq!(val_str("back\\slash"), "\"back\\\\slash\"");
    }

}
