//! Build phase entities and the build files they carry.

use crate::error::ObjectError;
use crate::objects::fields::FieldsExt;
use crate::objects::Object;
use crate::registry::{AllObjects, Reference};
use crate::value::Fields;

/// One file's membership in one build phase. Either `file_ref` (a file in
/// the group tree) or `product_ref` (a Swift package product) is set;
/// damaged files can have neither.
#[derive(Debug, Clone)]
pub struct BuildFile {
    pub file_ref: Option<Reference<Object>>,
    pub product_ref: Option<Reference<Object>>,
}

impl BuildFile {
    pub fn decode(fields: &Fields, objects: &mut AllObjects) -> Result<Self, ObjectError> {
        Ok(Self {
            file_ref: objects.create_optional_reference(fields.optional_guid("fileRef")?),
            product_ref: objects.create_optional_reference(fields.optional_guid("productRef")?),
        })
    }
}

/// Payload shared by every build phase flavor: the ordered build files.
#[derive(Debug, Clone)]
pub struct BuildPhase {
    pub files: Vec<Reference<Object>>,
}

impl BuildPhase {
    pub fn decode(fields: &Fields, objects: &mut AllObjects) -> Result<Self, ObjectError> {
        Ok(Self {
            files: objects.create_references(fields.guids("files")?),
        })
    }
}

/// Copy-files phases carry an optional display name shown in Xcode.
#[derive(Debug, Clone)]
pub struct CopyFilesBuildPhase {
    pub phase: BuildPhase,
    pub name: Option<String>,
}

impl CopyFilesBuildPhase {
    pub fn decode(fields: &Fields, objects: &mut AllObjects) -> Result<Self, ObjectError> {
        Ok(Self {
            phase: BuildPhase::decode(fields, objects)?,
            name: fields.optional_string("name")?.map(str::to_owned),
        })
    }
}

/// Run-script phase. Input/output path lists drive Xcode's up-to-date check;
/// `always_out_of_date` forces the script every build.
#[derive(Debug, Clone)]
pub struct ShellScriptBuildPhase {
    pub phase: BuildPhase,
    pub name: Option<String>,
    pub shell_script: String,
    pub always_out_of_date: bool,
    pub input_paths: Vec<String>,
    pub output_paths: Vec<String>,
    pub input_file_list_paths: Option<Vec<String>>,
    pub output_file_list_paths: Option<Vec<String>>,
}

impl ShellScriptBuildPhase {
    pub fn decode(fields: &Fields, objects: &mut AllObjects) -> Result<Self, ObjectError> {
        Ok(Self {
            phase: BuildPhase::decode(fields, objects)?,
            name: fields.optional_string("name")?.map(str::to_owned),
            shell_script: fields.string("shellScript")?.to_owned(),
            always_out_of_date: fields.optional_boolean("alwaysOutOfDate")?.unwrap_or(false),
            input_paths: fields.optional_strings("inputPaths")?.unwrap_or_default(),
            output_paths: fields.optional_strings("outputPaths")?.unwrap_or_default(),
            input_file_list_paths: fields.optional_strings("inputFileListPaths")?,
            output_file_list_paths: fields.optional_strings("outputFileListPaths")?,
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
    fn build_file_tolerates_missing_file_ref() {
        let mut objects = AllObjects::new();
        let fields = fields_of(r#"{ isa = PBXBuildFile; }"#);
        let build_file = BuildFile::decode(&fields, &mut objects).expect("should decode");
        assert!(build_file.file_ref.is_none());
    }

    #[test]
    fn shell_script_phase_decodes_paths_and_flag() {
        let mut objects = AllObjects::new();
        let fields = fields_of(
            r#"{
                isa = PBXShellScriptBuildPhase;
                alwaysOutOfDate = 1;
                files = ( );
                inputPaths = ( "$(SRCROOT)/scripts/lint.sh" );
                name = "Run Lint";
                outputPaths = ( );
                shellScript = "scripts/lint.sh\n";
            }"#,
        );
        let phase = ShellScriptBuildPhase::decode(&fields, &mut objects).expect("should decode");
        assert!(phase.always_out_of_date);
        assert_eq!(phase.name.as_deref(), Some("Run Lint"));
        assert_eq!(phase.input_paths, vec!["$(SRCROOT)/scripts/lint.sh"]);
        assert_eq!(phase.shell_script, "scripts/lint.sh\n");
        assert!(phase.input_file_list_paths.is_none());
    }

    #[test]
    fn shell_script_requires_script_body() {
        let mut objects = AllObjects::new();
        let fields = fields_of(r#"{ isa = PBXShellScriptBuildPhase; files = ( ); }"#);
        let error =
            ShellScriptBuildPhase::decode(&fields, &mut objects).expect_err("should fail");
        assert!(error.to_string().contains("shellScript"), "{error}");
    }
}
