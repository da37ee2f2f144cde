//! The `isa` dispatch table: raw fields in, typed [`Object`] out.

use crate::base::Guid;
use crate::error::ObjectError;
use crate::objects::fields::FieldsExt;
use crate::objects::{
    BuildConfiguration, BuildFile, BuildFileExceptionSet, BuildPhase, ConfigurationList,
    CopyFilesBuildPhase, FileReference, Group, GroupBuildPhaseMembershipExceptionSet,
    LocalSwiftPackageReference, NativeTarget, Object, ObjectKind, Project, ReferenceProxy,
    RemoteSwiftPackageReference, ShellScriptBuildPhase, SwiftPackageProductDependency,
    SynchronizedRootGroup, Target, TargetDependency,
};
use crate::registry::AllObjects;
use crate::value::Fields;

/// Decode one object-table entry. Reference fields register their targets in
/// the registry as a side effect, so counts are accurate once every entry has
/// been decoded. An unrecognized `isa` is not an error; the entity is kept as
/// [`ObjectKind::Unknown`] with raw fields only.
pub fn decode_object(
    id: Guid,
    fields: Fields,
    objects: &mut AllObjects,
) -> Result<Object, ObjectError> {
    let isa = fields.string("isa")?.to_owned();
    let kind = decode_kind(&isa, &fields, objects)?;
    Ok(Object {
        id,
        isa,
        fields,
        kind,
    })
}

fn decode_kind(
    isa: &str,
    fields: &Fields,
    objects: &mut AllObjects,
) -> Result<ObjectKind, ObjectError> {
    Ok(match isa {
        "PBXBuildFile" => ObjectKind::BuildFile(BuildFile::decode(fields, objects)?),
        "PBXContainerItemProxy" => ObjectKind::ContainerItemProxy,
        "PBXBuildRule" => ObjectKind::BuildRule,
        "PBXBuildStyle" => ObjectKind::BuildStyle,
        "PBXCopyFilesBuildPhase" => {
            ObjectKind::CopyFilesBuildPhase(CopyFilesBuildPhase::decode(fields, objects)?)
        }
        "PBXFrameworksBuildPhase" => {
            ObjectKind::FrameworksBuildPhase(BuildPhase::decode(fields, objects)?)
        }
        "PBXHeadersBuildPhase" => {
            ObjectKind::HeadersBuildPhase(BuildPhase::decode(fields, objects)?)
        }
        "PBXResourcesBuildPhase" => {
            ObjectKind::ResourcesBuildPhase(BuildPhase::decode(fields, objects)?)
        }
        "PBXSourcesBuildPhase" => {
            ObjectKind::SourcesBuildPhase(BuildPhase::decode(fields, objects)?)
        }
        "PBXShellScriptBuildPhase" => {
            ObjectKind::ShellScriptBuildPhase(ShellScriptBuildPhase::decode(fields, objects)?)
        }
        // Plain PBXReference entries are rare legacy leftovers; they carry
        // the same fields a file reference does.
        "PBXFileReference" | "PBXReference" => {
            ObjectKind::FileReference(FileReference::decode(fields)?)
        }
        "PBXReferenceProxy" => ObjectKind::ReferenceProxy(ReferenceProxy::decode(fields, objects)?),
        "PBXGroup" => ObjectKind::Group(Group::decode(fields, objects)?),
        "PBXVariantGroup" => ObjectKind::VariantGroup(Group::decode(fields, objects)?),
        "XCVersionGroup" => ObjectKind::VersionGroup(Group::decode(fields, objects)?),
        "PBXFileSystemSynchronizedRootGroup" => {
            ObjectKind::SynchronizedRootGroup(SynchronizedRootGroup::decode(fields, objects)?)
        }
        "PBXFileSystemSynchronizedBuildFileExceptionSet" => {
            ObjectKind::BuildFileExceptionSet(BuildFileExceptionSet::decode(fields, objects)?)
        }
        "PBXFileSystemSynchronizedGroupBuildPhaseMembershipExceptionSet" => {
            ObjectKind::GroupBuildPhaseMembershipExceptionSet(
                GroupBuildPhaseMembershipExceptionSet::decode(fields, objects)?,
            )
        }
        "PBXNativeTarget" => ObjectKind::NativeTarget(NativeTarget::decode(fields, objects)?),
        "PBXAggregateTarget" => ObjectKind::AggregateTarget(Target::decode(fields, objects)?),
        "PBXLegacyTarget" => ObjectKind::LegacyTarget(Target::decode(fields, objects)?),
        "PBXTargetDependency" => {
            ObjectKind::TargetDependency(TargetDependency::decode(fields, objects)?)
        }
        "XCSwiftPackageProductDependency" => ObjectKind::SwiftPackageProductDependency(
            SwiftPackageProductDependency::decode(fields, objects)?,
        ),
        "XCRemoteSwiftPackageReference" => {
            ObjectKind::RemoteSwiftPackageReference(RemoteSwiftPackageReference::decode(fields)?)
        }
        "XCLocalSwiftPackageReference" => {
            ObjectKind::LocalSwiftPackageReference(LocalSwiftPackageReference::decode(fields)?)
        }
        "XCBuildConfiguration" => {
            ObjectKind::BuildConfiguration(BuildConfiguration::decode(fields)?)
        }
        "XCConfigurationList" => {
            ObjectKind::ConfigurationList(ConfigurationList::decode(fields, objects)?)
        }
        "PBXProject" => ObjectKind::Project(Project::decode(fields, objects)?),
        other => {
            tracing::warn!(isa = other, "unrecognized entity type, keeping raw fields only");
            ObjectKind::Unknown
        }
    })
}
