//! Target entities: the three target flavors and their dependency edges.

use crate::error::ObjectError;
use crate::objects::fields::FieldsExt;
use crate::objects::Object;
use crate::registry::{AllObjects, Reference};
use crate::value::Fields;

/// Payload shared by native, aggregate and legacy targets.
#[derive(Debug, Clone)]
pub struct Target {
    pub name: String,
    pub product_name: Option<String>,
    pub build_configuration_list: Reference<Object>,
    pub build_phases: Vec<Reference<Object>>,
    pub dependencies: Vec<Reference<Object>>,
}

impl Target {
    pub fn decode(fields: &Fields, objects: &mut AllObjects) -> Result<Self, ObjectError> {
        Ok(Self {
            name: fields.string("name")?.to_owned(),
            product_name: fields.optional_string("productName")?.map(str::to_owned),
            build_configuration_list: objects
                .create_reference(fields.guid("buildConfigurationList")?),
            build_phases: objects.create_references(fields.guids("buildPhases")?),
            dependencies: objects.create_references(fields.guids("dependencies")?),
        })
    }
}

/// A target that compiles and links a product.
#[derive(Debug, Clone)]
pub struct NativeTarget {
    pub target: Target,
    pub product_type: Option<String>,
    pub product_reference: Option<Reference<Object>>,
    pub build_rules: Vec<Reference<Object>>,
    pub package_product_dependencies: Option<Vec<Reference<Object>>>,
    pub file_system_synchronized_groups: Option<Vec<Reference<Object>>>,
}

impl NativeTarget {
    pub fn decode(fields: &Fields, objects: &mut AllObjects) -> Result<Self, ObjectError> {
        Ok(Self {
            target: Target::decode(fields, objects)?,
            product_type: fields.optional_string("productType")?.map(str::to_owned),
            product_reference: objects
                .create_optional_reference(fields.optional_guid("productReference")?),
            build_rules: objects
                .create_references(fields.optional_guids("buildRules")?.unwrap_or_default()),
            package_product_dependencies: objects.create_optional_references(
                fields.optional_guids("packageProductDependencies")?,
            ),
            file_system_synchronized_groups: objects.create_optional_references(
                fields.optional_guids("fileSystemSynchronizedGroups")?,
            ),
        })
    }
}

/// An edge in the target dependency graph. Cross-project dependencies carry a
/// container item proxy instead of a direct target reference; package
/// products carry `product_ref`.
#[derive(Debug, Clone)]
pub struct TargetDependency {
    pub target: Option<Reference<Object>>,
    pub target_proxy: Option<Reference<Object>>,
    pub product_ref: Option<Reference<Object>>,
}

impl TargetDependency {
    pub fn decode(fields: &Fields, objects: &mut AllObjects) -> Result<Self, ObjectError> {
        Ok(Self {
            target: objects.create_optional_reference(fields.optional_guid("target")?),
            target_proxy: objects.create_optional_reference(fields.optional_guid("targetProxy")?),
            product_ref: objects.create_optional_reference(fields.optional_guid("productRef")?),
        })
    }
}
