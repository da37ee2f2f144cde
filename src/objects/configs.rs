//! Build configurations and configuration lists.

use crate::error::ObjectError;
use crate::objects::fields::FieldsExt;
use crate::objects::{Object, ObjectKind};
use crate::registry::{AllObjects, Reference};
use crate::value::Fields;

/// A named bag of build settings ("Debug", "Release", ...).
#[derive(Debug, Clone)]
pub struct BuildConfiguration {
    pub name: String,
    pub build_settings: Fields,
}

impl BuildConfiguration {
    pub fn decode(fields: &Fields) -> Result<Self, ObjectError> {
        Ok(Self {
            name: fields.string("name")?.to_owned(),
            build_settings: fields.optional_dictionary("buildSettings")?.cloned().unwrap_or_default(),
        })
    }
}

/// Ordered configurations for one project or target, with an optional
/// default pick.
#[derive(Debug, Clone)]
pub struct ConfigurationList {
    pub build_configurations: Vec<Reference<Object>>,
    pub default_configuration_name: Option<String>,
}

impl ConfigurationList {
    pub fn decode(fields: &Fields, objects: &mut AllObjects) -> Result<Self, ObjectError> {
        Ok(Self {
            build_configurations: objects.create_references(fields.guids("buildConfigurations")?),
            default_configuration_name: fields
                .optional_string("defaultConfigurationName")?
                .map(str::to_owned),
        })
    }

    /// Resolve the default configuration by name, if both the name and the
    /// matching configuration exist.
    pub fn default_configuration<'a>(&self, objects: &'a AllObjects) -> Option<&'a Object> {
        let name = self.default_configuration_name.as_deref()?;
        self.build_configurations
            .iter()
            .filter_map(|reference| objects.object(reference.id()))
            .find(|object| match &object.kind {
                ObjectKind::BuildConfiguration(config) => config.name == name,
                _ => false,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::Guid;
    use crate::openstep;
    use crate::value::Value;

    fn fields_of(source: &str) -> Fields {
        match openstep::parse(source).expect("should parse") {
            Value::Dictionary(fields) => fields,
            other => panic!("expected dictionary, got {other:?}"),
        }
    }

    fn config_object(id: &str, name: &str) -> Object {
        let fields = fields_of(&format!(
            r#"{{ isa = XCBuildConfiguration; buildSettings = {{ }}; name = {name}; }}"#
        ));
        let config = BuildConfiguration::decode(&fields).expect("should decode");
        Object {
            id: Guid::new(id),
            isa: "XCBuildConfiguration".to_owned(),
            fields,
            kind: ObjectKind::BuildConfiguration(config),
        }
    }

    #[test]
    fn configuration_keeps_settings_order() {
        let fields = fields_of(
            r#"{
                isa = XCBuildConfiguration;
                buildSettings = { SWIFT_VERSION = 5.0; PRODUCT_NAME = "$(TARGET_NAME)"; };
                name = Release;
            }"#,
        );
        let config = BuildConfiguration::decode(&fields).expect("should decode");
        let keys: Vec<&str> = config.build_settings.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["SWIFT_VERSION", "PRODUCT_NAME"]);
    }

    #[test]
    fn default_configuration_resolves_by_name() {
        let mut objects = AllObjects::new();
        let debug = config_object("AAAA00000000000000000001", "Debug");
        let release = config_object("AAAA00000000000000000002", "Release");
        let _d: Reference<Object> = objects.insert_reference(debug);
        let _r: Reference<Object> = objects.insert_reference(release);

        let fields = fields_of(
            r#"{
                isa = XCConfigurationList;
                buildConfigurations = ( AAAA00000000000000000001, AAAA00000000000000000002 );
                defaultConfigurationName = Release;
            }"#,
        );
        let list = ConfigurationList::decode(&fields, &mut objects).expect("should decode");
        let default = list.default_configuration(&objects).expect("should resolve");
        assert_eq!(default.id.as_str(), "AAAA00000000000000000002");
    }
}
