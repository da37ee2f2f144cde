//! The typed entity model.
//!
//! Every entry in the project's object table becomes one [`Object`]: its
//! identifier, its `isa` discriminator, the raw field dictionary exactly as
//! parsed, and a decoded [`ObjectKind`] view of the fields the crate
//! understands. Raw fields are the source of truth for serialization, so an
//! unrecognized `isa` or an unmodeled key survives a load/save cycle
//! untouched; the typed view exists for navigation and mutation.
//!
//! Mutation goes through [`Object`] methods that update the typed view and
//! the raw fields in lockstep. Editing `fields` directly desynchronizes the
//! two and is only correct for keys the typed view does not model.

mod configs;
mod factory;
mod fields;
mod packages;
mod phases;
mod project;
mod references;
mod targets;

pub use configs::{BuildConfiguration, ConfigurationList};
pub use factory::decode_object;
pub use fields::FieldsExt;
pub use packages::{
    LocalSwiftPackageReference, RemoteSwiftPackageReference, SwiftPackageProductDependency,
};
pub use phases::{BuildFile, BuildPhase, CopyFilesBuildPhase, ShellScriptBuildPhase};
pub use project::{Project, ProjectReference};
pub use references::{
    BuildFileExceptionSet, FileReference, Group, GroupBuildPhaseMembershipExceptionSet,
    ReferenceInfo, ReferenceProxy, SynchronizedRootGroup,
};
pub use targets::{NativeTarget, Target, TargetDependency};

use crate::base::Guid;
use crate::registry::{Reference, Resolve};
use crate::value::{Fields, Value};

// ============================================================================
// OBJECT
// ============================================================================

/// One entry of the object table.
#[derive(Debug, Clone)]
pub struct Object {
    pub id: Guid,
    pub isa: String,
    /// All fields as parsed, in file order. Never loses unmodeled keys.
    pub fields: Fields,
    /// Typed view of the fields, keyed on `isa`.
    pub kind: ObjectKind,
}

/// Decoded payload per `isa`. Variants with identical field shapes share a
/// payload struct; `Unknown` keeps entities this crate does not model
/// round-trippable through their raw fields.
#[derive(Debug, Clone)]
pub enum ObjectKind {
    BuildFile(BuildFile),
    ContainerItemProxy,
    BuildRule,
    BuildStyle,
    CopyFilesBuildPhase(CopyFilesBuildPhase),
    FrameworksBuildPhase(BuildPhase),
    HeadersBuildPhase(BuildPhase),
    ResourcesBuildPhase(BuildPhase),
    SourcesBuildPhase(BuildPhase),
    ShellScriptBuildPhase(ShellScriptBuildPhase),
    FileReference(FileReference),
    ReferenceProxy(ReferenceProxy),
    Group(Group),
    VariantGroup(Group),
    VersionGroup(Group),
    SynchronizedRootGroup(SynchronizedRootGroup),
    BuildFileExceptionSet(BuildFileExceptionSet),
    GroupBuildPhaseMembershipExceptionSet(GroupBuildPhaseMembershipExceptionSet),
    NativeTarget(NativeTarget),
    AggregateTarget(Target),
    LegacyTarget(Target),
    TargetDependency(TargetDependency),
    SwiftPackageProductDependency(SwiftPackageProductDependency),
    RemoteSwiftPackageReference(RemoteSwiftPackageReference),
    LocalSwiftPackageReference(LocalSwiftPackageReference),
    BuildConfiguration(BuildConfiguration),
    ConfigurationList(ConfigurationList),
    Project(Project),
    Unknown,
}

// ============================================================================
// TIER ACCESSORS
// ============================================================================

impl Object {
    /// Target payload, across all three target flavors.
    pub fn as_target(&self) -> Option<&Target> {
        match &self.kind {
            ObjectKind::NativeTarget(native) => Some(&native.target),
            ObjectKind::AggregateTarget(target) | ObjectKind::LegacyTarget(target) => Some(target),
            _ => None,
        }
    }

    fn as_target_mut(&mut self) -> Option<&mut Target> {
        match &mut self.kind {
            ObjectKind::NativeTarget(native) => Some(&mut native.target),
            ObjectKind::AggregateTarget(target) | ObjectKind::LegacyTarget(target) => Some(target),
            _ => None,
        }
    }

    /// Build phase payload, across all six phase flavors.
    pub fn as_build_phase(&self) -> Option<&BuildPhase> {
        match &self.kind {
            ObjectKind::CopyFilesBuildPhase(copy) => Some(&copy.phase),
            ObjectKind::ShellScriptBuildPhase(script) => Some(&script.phase),
            ObjectKind::FrameworksBuildPhase(phase)
            | ObjectKind::HeadersBuildPhase(phase)
            | ObjectKind::ResourcesBuildPhase(phase)
            | ObjectKind::SourcesBuildPhase(phase) => Some(phase),
            _ => None,
        }
    }

    fn as_build_phase_mut(&mut self) -> Option<&mut BuildPhase> {
        match &mut self.kind {
            ObjectKind::CopyFilesBuildPhase(copy) => Some(&mut copy.phase),
            ObjectKind::ShellScriptBuildPhase(script) => Some(&mut script.phase),
            ObjectKind::FrameworksBuildPhase(phase)
            | ObjectKind::HeadersBuildPhase(phase)
            | ObjectKind::ResourcesBuildPhase(phase)
            | ObjectKind::SourcesBuildPhase(phase) => Some(phase),
            _ => None,
        }
    }

    /// File-tree position, across every file-like entity.
    pub fn as_reference_info(&self) -> Option<&ReferenceInfo> {
        match &self.kind {
            ObjectKind::FileReference(file) => Some(&file.info),
            ObjectKind::ReferenceProxy(proxy) => Some(&proxy.info),
            ObjectKind::Group(group)
            | ObjectKind::VariantGroup(group)
            | ObjectKind::VersionGroup(group) => Some(&group.info),
            ObjectKind::SynchronizedRootGroup(root) => Some(&root.info),
            _ => None,
        }
    }

    /// Group payload, across plain, variant and version groups.
    pub fn as_group(&self) -> Option<&Group> {
        match &self.kind {
            ObjectKind::Group(group)
            | ObjectKind::VariantGroup(group)
            | ObjectKind::VersionGroup(group) => Some(group),
            _ => None,
        }
    }

    fn as_group_mut(&mut self) -> Option<&mut Group> {
        match &mut self.kind {
            ObjectKind::Group(group)
            | ObjectKind::VariantGroup(group)
            | ObjectKind::VersionGroup(group) => Some(group),
            _ => None,
        }
    }

    /// Phase name as Xcode shows it: the explicit `name` for copy-files and
    /// run-script phases, a fixed name for the rest.
    pub fn build_phase_display_name(&self) -> Option<&str> {
        match &self.kind {
            ObjectKind::CopyFilesBuildPhase(copy) => {
                Some(copy.name.as_deref().unwrap_or("CopyFiles"))
            }
            ObjectKind::ShellScriptBuildPhase(script) => {
                Some(script.name.as_deref().unwrap_or("ShellScript"))
            }
            ObjectKind::FrameworksBuildPhase(_) => Some("Frameworks"),
            ObjectKind::HeadersBuildPhase(_) => Some("Headers"),
            ObjectKind::ResourcesBuildPhase(_) => Some("Resources"),
            ObjectKind::SourcesBuildPhase(_) => Some("Sources"),
            _ => None,
        }
    }
}

// ============================================================================
// REFERENCE VISITOR
// ============================================================================

impl Object {
    /// Every outgoing reference of the typed view, as `(key path, target)`
    /// pairs. Key paths are field names with indices for array entries
    /// (`children[2]`), matching how validation reports problems.
    pub fn references(&self) -> Vec<(String, Guid)> {
        let mut out = Vec::new();
        fn one(out: &mut Vec<(String, Guid)>, key: &str, reference: &Reference<Object>) {
            out.push((key.to_owned(), reference.id().clone()));
        }
        fn many(out: &mut Vec<(String, Guid)>, key: &str, references: &[Reference<Object>]) {
            for (index, reference) in references.iter().enumerate() {
                out.push((format!("{key}[{index}]"), reference.id().clone()));
            }
        }

        match &self.kind {
            ObjectKind::BuildFile(build_file) => {
                if let Some(file_ref) = &build_file.file_ref {
                    one(&mut out, "fileRef", file_ref);
                }
                if let Some(product_ref) = &build_file.product_ref {
                    one(&mut out, "productRef", product_ref);
                }
            }
            ObjectKind::CopyFilesBuildPhase(copy) => many(&mut out, "files", &copy.phase.files),
            ObjectKind::ShellScriptBuildPhase(script) => {
                many(&mut out, "files", &script.phase.files);
            }
            ObjectKind::FrameworksBuildPhase(phase)
            | ObjectKind::HeadersBuildPhase(phase)
            | ObjectKind::ResourcesBuildPhase(phase)
            | ObjectKind::SourcesBuildPhase(phase) => many(&mut out, "files", &phase.files),
            ObjectKind::ReferenceProxy(proxy) => one(&mut out, "remoteRef", &proxy.remote_ref),
            ObjectKind::Group(group)
            | ObjectKind::VariantGroup(group)
            | ObjectKind::VersionGroup(group) => many(&mut out, "children", &group.children),
            ObjectKind::SynchronizedRootGroup(root) => {
                if let Some(exceptions) = &root.exceptions {
                    many(&mut out, "exceptions", exceptions);
                }
            }
            ObjectKind::BuildFileExceptionSet(set) => one(&mut out, "target", &set.target),
            ObjectKind::GroupBuildPhaseMembershipExceptionSet(set) => {
                if let Some(build_phase) = &set.build_phase {
                    one(&mut out, "buildPhase", build_phase);
                }
            }
            ObjectKind::NativeTarget(native) => {
                target_references(&mut out, &native.target);
                if let Some(product) = &native.product_reference {
                    one(&mut out, "productReference", product);
                }
                many(&mut out, "buildRules", &native.build_rules);
                if let Some(dependencies) = &native.package_product_dependencies {
                    many(&mut out, "packageProductDependencies", dependencies);
                }
                if let Some(groups) = &native.file_system_synchronized_groups {
                    many(&mut out, "fileSystemSynchronizedGroups", groups);
                }
            }
            ObjectKind::AggregateTarget(target) | ObjectKind::LegacyTarget(target) => {
                target_references(&mut out, target);
            }
            ObjectKind::TargetDependency(dependency) => {
                if let Some(target) = &dependency.target {
                    one(&mut out, "target", target);
                }
                if let Some(proxy) = &dependency.target_proxy {
                    one(&mut out, "targetProxy", proxy);
                }
                if let Some(product) = &dependency.product_ref {
                    one(&mut out, "productRef", product);
                }
            }
            ObjectKind::SwiftPackageProductDependency(dependency) => {
                if let Some(package) = &dependency.package {
                    one(&mut out, "package", package);
                }
            }
            ObjectKind::ConfigurationList(list) => {
                many(&mut out, "buildConfigurations", &list.build_configurations);
            }
            ObjectKind::Project(project) => {
                one(&mut out, "mainGroup", &project.main_group);
                if let Some(group) = &project.product_ref_group {
                    one(&mut out, "productRefGroup", group);
                }
                one(&mut out, "buildConfigurationList", &project.build_configuration_list);
                many(&mut out, "targets", &project.targets);
                if let Some(packages) = &project.package_references {
                    many(&mut out, "packageReferences", packages);
                }
                for (index, reference) in project.project_references.iter().enumerate() {
                    if let Some(product_group) = &reference.product_group {
                        out.push((
                            format!("projectReferences[{index}].ProductGroup"),
                            product_group.id().clone(),
                        ));
                    }
                    out.push((
                        format!("projectReferences[{index}].ProjectRef"),
                        reference.project_ref.id().clone(),
                    ));
                }
            }
            ObjectKind::FileReference(_)
            | ObjectKind::BuildConfiguration(_)
            | ObjectKind::RemoteSwiftPackageReference(_)
            | ObjectKind::LocalSwiftPackageReference(_)
            | ObjectKind::ContainerItemProxy
            | ObjectKind::BuildRule
            | ObjectKind::BuildStyle
            | ObjectKind::Unknown => {}
        }

        out
    }
}

fn target_references(out: &mut Vec<(String, Guid)>, target: &Target) {
    out.push((
        "buildConfigurationList".to_owned(),
        target.build_configuration_list.id().clone(),
    ));
    for (index, phase) in target.build_phases.iter().enumerate() {
        out.push((format!("buildPhases[{index}]"), phase.id().clone()));
    }
    for (index, dependency) in target.dependencies.iter().enumerate() {
        out.push((format!("dependencies[{index}]"), dependency.id().clone()));
    }
}

// ============================================================================
// MUTATION
// ============================================================================

/// Insert an identifier into a raw array field, creating the array when the
/// key is absent.
fn raw_array_insert(fields: &mut Fields, key: &str, index: usize, id: &Guid) {
    let entry = fields
        .entry(key.to_owned())
        .or_insert_with(|| Value::Array(Vec::new()));
    if let Value::Array(items) = entry {
        let index = index.min(items.len());
        items.insert(index, Value::String(id.as_str().to_owned()));
    }
}

fn raw_array_remove(fields: &mut Fields, key: &str, id: &Guid) {
    if let Some(Value::Array(items)) = fields.get_mut(key) {
        items.retain(|item| item.as_str() != Some(id.as_str()));
    }
}

impl Object {
    /// Insert a build file at `index` in this build phase. A file already in
    /// the phase stays where it is.
    pub fn insert_build_file(&mut self, index: usize, reference: Reference<Object>) {
        let Some(phase) = self.as_build_phase() else {
            debug_assert!(false, "insert_build_file on non-phase {}", self.isa);
            return;
        };
        if phase.files.contains(&reference) {
            return;
        }
        raw_array_insert(&mut self.fields, "files", index, reference.id());
        if let Some(phase) = self.as_build_phase_mut() {
            let index = index.min(phase.files.len());
            phase.files.insert(index, reference);
        }
    }

    /// Append a build file to this build phase.
    pub fn add_build_file(&mut self, reference: Reference<Object>) {
        self.insert_build_file(usize::MAX, reference);
    }

    /// Insert a build phase at `index` in this target's phase list. A phase
    /// already present stays where it is.
    pub fn insert_build_phase(&mut self, index: usize, reference: Reference<Object>) {
        let Some(target) = self.as_target() else {
            debug_assert!(false, "insert_build_phase on non-target {}", self.isa);
            return;
        };
        if target.build_phases.contains(&reference) {
            return;
        }
        raw_array_insert(&mut self.fields, "buildPhases", index, reference.id());
        if let Some(target) = self.as_target_mut() {
            let index = index.min(target.build_phases.len());
            target.build_phases.insert(index, reference);
        }
    }

    /// Insert a child at `index` in this group's children. A child already
    /// present stays where it is.
    pub fn insert_child(&mut self, index: usize, reference: Reference<Object>) {
        let Some(group) = self.as_group() else {
            debug_assert!(false, "insert_child on non-group {}", self.isa);
            return;
        };
        if group.children.contains(&reference) {
            return;
        }
        raw_array_insert(&mut self.fields, "children", index, reference.id());
        if let Some(group) = self.as_group_mut() {
            let index = index.min(group.children.len());
            group.children.insert(index, reference);
        }
    }

    /// Detach the package link from this package product dependency,
    /// returning the removed handle so the caller can release its count.
    pub fn clear_package(&mut self) -> Option<Reference<Object>> {
        let ObjectKind::SwiftPackageProductDependency(dependency) = &mut self.kind else {
            debug_assert!(false, "clear_package on non-dependency {}", self.isa);
            return None;
        };
        let removed = dependency.package.take()?;
        self.fields.shift_remove("package");
        Some(removed)
    }

    /// Detach a package reference from this project, returning the removed
    /// handle so the caller can release its count. `None` when the project
    /// does not reference the package.
    pub fn remove_package_reference(&mut self, id: &Guid) -> Option<Reference<Object>> {
        let ObjectKind::Project(project) = &mut self.kind else {
            debug_assert!(false, "remove_package_reference on non-project {}", self.isa);
            return None;
        };
        let packages = project.package_references.as_mut()?;
        let position = packages.iter().position(|reference| reference.id() == id)?;
        raw_array_remove(&mut self.fields, "packageReferences", id);
        Some(packages.remove(position))
    }
}

// ============================================================================
// TYPED PROJECTIONS
// ============================================================================

macro_rules! resolve_via {
    ($type:ty, $pattern:pat => $value:expr) => {
        impl Resolve for $type {
            fn resolve(object: &Object) -> Option<&Self> {
                match &object.kind {
                    $pattern => Some($value),
                    _ => None,
                }
            }
        }
    };
}

resolve_via!(BuildFile, ObjectKind::BuildFile(v) => v);
resolve_via!(CopyFilesBuildPhase, ObjectKind::CopyFilesBuildPhase(v) => v);
resolve_via!(ShellScriptBuildPhase, ObjectKind::ShellScriptBuildPhase(v) => v);
resolve_via!(FileReference, ObjectKind::FileReference(v) => v);
resolve_via!(ReferenceProxy, ObjectKind::ReferenceProxy(v) => v);
resolve_via!(SynchronizedRootGroup, ObjectKind::SynchronizedRootGroup(v) => v);
resolve_via!(BuildFileExceptionSet, ObjectKind::BuildFileExceptionSet(v) => v);
resolve_via!(
    GroupBuildPhaseMembershipExceptionSet,
    ObjectKind::GroupBuildPhaseMembershipExceptionSet(v) => v
);
resolve_via!(NativeTarget, ObjectKind::NativeTarget(v) => v);
resolve_via!(TargetDependency, ObjectKind::TargetDependency(v) => v);
resolve_via!(
    SwiftPackageProductDependency,
    ObjectKind::SwiftPackageProductDependency(v) => v
);
resolve_via!(
    RemoteSwiftPackageReference,
    ObjectKind::RemoteSwiftPackageReference(v) => v
);
resolve_via!(
    LocalSwiftPackageReference,
    ObjectKind::LocalSwiftPackageReference(v) => v
);
resolve_via!(BuildConfiguration, ObjectKind::BuildConfiguration(v) => v);
resolve_via!(ConfigurationList, ObjectKind::ConfigurationList(v) => v);
resolve_via!(Project, ObjectKind::Project(v) => v);

// Tier projections span several variants, so they go through the accessors.
impl Resolve for Target {
    fn resolve(object: &Object) -> Option<&Self> {
        object.as_target()
    }
}

impl Resolve for BuildPhase {
    fn resolve(object: &Object) -> Option<&Self> {
        object.as_build_phase()
    }
}

impl Resolve for ReferenceInfo {
    fn resolve(object: &Object) -> Option<&Self> {
        object.as_reference_info()
    }
}

impl Resolve for Group {
    fn resolve(object: &Object) -> Option<&Self> {
        object.as_group()
    }
}
