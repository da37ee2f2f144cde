//! The root `PBXProject` entity.

use crate::error::ObjectError;
use crate::objects::fields::FieldsExt;
use crate::objects::Object;
use crate::registry::{AllObjects, Reference};
use crate::value::{Fields, Value};

/// A `projectReferences` entry: one embedded `.xcodeproj` and, when present,
/// the group its products show under.
#[derive(Debug, Clone)]
pub struct ProjectReference {
    pub product_group: Option<Reference<Object>>,
    pub project_ref: Reference<Object>,
}

impl ProjectReference {
    pub fn decode(fields: &Fields, objects: &mut AllObjects) -> Result<Self, ObjectError> {
        Ok(Self {
            product_group: objects
                .create_optional_reference(fields.optional_guid("ProductGroup")?),
            project_ref: objects.create_reference(fields.guid("ProjectRef")?),
        })
    }
}

/// The single root object of a project file. Everything else is reachable
/// from here.
#[derive(Debug, Clone)]
pub struct Project {
    pub development_region: Option<String>,
    pub known_regions: Vec<String>,
    pub main_group: Reference<Object>,
    pub product_ref_group: Option<Reference<Object>>,
    pub build_configuration_list: Reference<Object>,
    pub targets: Vec<Reference<Object>>,
    pub package_references: Option<Vec<Reference<Object>>>,
    pub project_references: Vec<ProjectReference>,
    pub attributes: Fields,
}

impl Project {
    pub fn decode(fields: &Fields, objects: &mut AllObjects) -> Result<Self, ObjectError> {
        let project_references = fields
            .optional_dictionaries("projectReferences")?
            .unwrap_or_default()
            .into_iter()
            .map(|entry| ProjectReference::decode(entry, objects))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            development_region: fields.optional_string("developmentRegion")?.map(str::to_owned),
            known_regions: fields.optional_strings("knownRegions")?.unwrap_or_default(),
            main_group: objects.create_reference(fields.guid("mainGroup")?),
            product_ref_group: objects
                .create_optional_reference(fields.optional_guid("productRefGroup")?),
            build_configuration_list: objects
                .create_reference(fields.guid("buildConfigurationList")?),
            targets: objects.create_references(fields.guids("targets")?),
            package_references: objects
                .create_optional_references(fields.optional_guids("packageReferences")?),
            project_references,
            attributes: fields.optional_dictionary("attributes")?.cloned().unwrap_or_default(),
        })
    }

    /// Asset tags declared under `attributes.KnownAssetTags`, if any.
    pub fn known_asset_tags(&self) -> Option<Vec<&str>> {
        match self.attributes.get("KnownAssetTags")? {
            Value::Array(items) => Some(items.iter().filter_map(Value::as_str).collect()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openstep;

    fn fields_of(source: &str) -> Fields {
        match openstep::parse(source).expect("should parse") {
            Value::Dictionary(fields) => fields,
            other => panic!("expected dictionary, got {other:?}"),
        }
    }

    #[test]
    fn project_decodes_groups_targets_and_attributes() {
        let mut objects = AllObjects::new();
        let fields = fields_of(
            r#"{
                isa = PBXProject;
                attributes = { KnownAssetTags = ( onboarding, paywall ); LastUpgradeCheck = 1600; };
                buildConfigurationList = AAAA00000000000000000010;
                developmentRegion = en;
                knownRegions = ( en, Base, nl );
                mainGroup = AAAA00000000000000000011;
                productRefGroup = AAAA00000000000000000012;
                targets = ( AAAA00000000000000000013 );
            }"#,
        );
        let project = Project::decode(&fields, &mut objects).expect("should decode");
        assert_eq!(project.known_regions, vec!["en", "Base", "nl"]);
        assert_eq!(project.targets.len(), 1);
        assert_eq!(project.known_asset_tags(), Some(vec!["onboarding", "paywall"]));
        assert_eq!(objects.ref_count(project.main_group.id()), 1);
    }

    #[test]
    fn project_reference_without_product_group_decodes() {
        let mut objects = AllObjects::new();
        let fields = fields_of(
            r#"{
                isa = PBXProject;
                buildConfigurationList = AAAA00000000000000000010;
                mainGroup = AAAA00000000000000000011;
                projectReferences = (
                    { ProjectRef = AAAA00000000000000000014; },
                    { ProductGroup = AAAA00000000000000000015; ProjectRef = AAAA00000000000000000016; },
                );
                targets = ( );
            }"#,
        );
        let project = Project::decode(&fields, &mut objects).expect("should decode");
        assert_eq!(project.project_references.len(), 2);
        assert!(project.project_references[0].product_group.is_none());
        assert!(project.project_references[1].product_group.is_some());
    }

    #[test]
    fn project_requires_main_group() {
        let mut objects = AllObjects::new();
        let fields = fields_of(
            r#"{ isa = PBXProject; buildConfigurationList = AAAA00000000000000000010;
                 targets = ( ); }"#,
        );
        let error = Project::decode(&fields, &mut objects).expect_err("should fail");
        assert!(error.to_string().contains("mainGroup"), "{error}");
    }
}
