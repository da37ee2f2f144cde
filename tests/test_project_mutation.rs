//! Mutation scenarios: adding files and build phases, removing packages,
//! and writing the result back through the filesystem API.

use std::path::PathBuf;

use pbxedit::objects::FileReference;
use pbxedit::{
    Format, Guid, Object, ObjectKind, PBXIdentifier, Reference, ResolvedPath, SourceTree,
    SourceTreeFolder, XCProjectFile,
};

const FIXTURE: &str = r#"// !$*UTF8*$!
{
	archiveVersion = 1;
	classes = {
	};
	objectVersion = 56;
	objects = {
		8B0A20D31D3FD1FF00E67001 = {
			isa = PBXProject;
			buildConfigurationList = 8B0A20D31D3FD1FF00E6700A;
			mainGroup = 8B0A20D31D3FD1FF00E67002;
			packageReferences = (
				8B0A20D31D3FD1FF00E6700C,
			);
			targets = (
				8B0A20D31D3FD1FF00E67007,
			);
		};
		8B0A20D31D3FD1FF00E67002 = {
			isa = PBXGroup;
			children = (
				8B0A20D31D3FD1FF00E67003,
			);
			sourceTree = "<group>";
		};
		8B0A20D31D3FD1FF00E67003 = {
			isa = PBXGroup;
			children = (
				8B0A20D31D3FD1FF00E67004,
			);
			path = App;
			sourceTree = "<group>";
		};
		8B0A20D31D3FD1FF00E67004 = {
			isa = PBXFileReference;
			lastKnownFileType = sourcecode.swift;
			path = main.swift;
			sourceTree = "<group>";
		};
		8B0A20D31D3FD1FF00E67005 = {
			isa = PBXBuildFile;
			fileRef = 8B0A20D31D3FD1FF00E67004;
		};
		8B0A20D31D3FD1FF00E67006 = {
			isa = PBXSourcesBuildPhase;
			buildActionMask = 2147483647;
			files = (
				8B0A20D31D3FD1FF00E67005,
			);
			runOnlyForDeploymentPostprocessing = 0;
		};
		8B0A20D31D3FD1FF00E67007 = {
			isa = PBXNativeTarget;
			buildConfigurationList = 8B0A20D31D3FD1FF00E67008;
			buildPhases = (
				8B0A20D31D3FD1FF00E67006,
			);
			dependencies = (
			);
			name = App;
			packageProductDependencies = (
				8B0A20D31D3FD1FF00E6700D,
			);
			productType = "com.apple.product-type.application";
		};
		8B0A20D31D3FD1FF00E67008 = {
			isa = XCConfigurationList;
			buildConfigurations = (
				8B0A20D31D3FD1FF00E67009,
			);
		};
		8B0A20D31D3FD1FF00E67009 = {
			isa = XCBuildConfiguration;
			buildSettings = {
			};
			name = Debug;
		};
		8B0A20D31D3FD1FF00E6700A = {
			isa = XCConfigurationList;
			buildConfigurations = (
				8B0A20D31D3FD1FF00E6700B,
			);
		};
		8B0A20D31D3FD1FF00E6700B = {
			isa = XCBuildConfiguration;
			buildSettings = {
			};
			name = Debug;
		};
		8B0A20D31D3FD1FF00E6700C = {
			isa = XCRemoteSwiftPackageReference;
			repositoryURL = "https://github.com/apple/swift-collections.git";
			requirement = {
				kind = upToNextMajorVersion;
				minimumVersion = 1.0.0;
			};
		};
		8B0A20D31D3FD1FF00E6700D = {
			isa = XCSwiftPackageProductDependency;
			package = 8B0A20D31D3FD1FF00E6700C;
			productName = Collections;
		};
	};
	rootObject = 8B0A20D31D3FD1FF00E67001;
}
"#;

fn load() -> XCProjectFile {
    XCProjectFile::from_bytes(FIXTURE.as_bytes()).expect("fixture should load")
}

fn serialize(file: &XCProjectFile) -> String {
    let data = file
        .serialized("App", Some(Format::OpenStep))
        .expect("should serialize");
    String::from_utf8(data).expect("output should be UTF-8")
}

#[test]
fn adding_a_source_file_keeps_the_graph_consistent() {
    let mut file = load();
    let app_group = Guid::new("8B0A20D31D3FD1FF00E67003");
    let sources = Guid::new("8B0A20D31D3FD1FF00E67006");

    let file_ref = file
        .create_file_reference("Helper.swift", "Helper.swift", SourceTree::Group, "sourcecode.swift")
        .expect("should create");
    let file_ref_id = file_ref.id.clone();
    let file_ref_handle: Reference<FileReference> = file.add_reference(file_ref);

    // Fresh identifiers decode and are distinct from every existing one.
    assert!(PBXIdentifier::parse(file_ref_id.as_str()).is_some());
    assert_ne!(file_ref_id, app_group);

    let build_file = file.create_build_file(&file_ref_handle).expect("should create");
    let build_file_handle: Reference<Object> = file.add_reference(build_file);

    file.objects_mut()
        .object_mut(&app_group)
        .expect("group exists")
        .insert_child(1, file_ref_handle.retyped());
    file.objects_mut()
        .object_mut(&sources)
        .expect("phase exists")
        .add_build_file(build_file_handle);

    assert!(file.objects().validate_references().is_ok());

    file.recompute_full_paths();
    assert_eq!(
        file.objects().full_path(&file_ref_id),
        Some(&ResolvedPath::RelativeTo(
            SourceTreeFolder::SourceRoot,
            "App/Helper.swift".to_owned()
        ))
    );

    let output = serialize(&file);
    assert!(output.contains("/* Helper.swift in Sources */"), "{output}");
    assert!(output.contains("path = Helper.swift;"), "{output}");
}

#[test]
fn adding_a_shell_script_phase() {
    let mut file = load();
    let target = Guid::new("8B0A20D31D3FD1FF00E67007");

    let phase = file
        .create_shell_script("SwiftLint", "swiftlint --strict\n")
        .expect("should create");
    assert!(matches!(phase.kind, ObjectKind::ShellScriptBuildPhase(_)));

    let handle: Reference<Object> = file.add_reference(phase);
    file.objects_mut()
        .object_mut(&target)
        .expect("target exists")
        .insert_build_phase(0, handle);

    assert!(file.objects().validate_references().is_ok());

    let output = serialize(&file);
    assert!(output.contains("/* Begin PBXShellScriptBuildPhase section */"), "{output}");
    assert!(output.contains("/* SwiftLint */"), "{output}");
    assert!(output.contains("shellScript = \"swiftlint --strict\\n\";"), "{output}");
    assert!(output.contains("shellPath = /bin/sh;"), "{output}");
}

#[test]
fn remove_package_detaches_project_and_dependencies() {
    let mut file = load();
    let package = Guid::new("8B0A20D31D3FD1FF00E6700C");
    let dependency = Guid::new("8B0A20D31D3FD1FF00E6700D");

    assert_eq!(file.objects().ref_count(&package), 2);
    file.remove_package(&package);

    assert!(!file.objects().contains(&package), "package evicted at count zero");
    assert!(file.objects().validate_references().is_ok());

    let dependency_object = file.objects().object(&dependency).expect("dependency survives");
    assert!(!dependency_object.fields.contains_key("package"));

    let output = serialize(&file);
    assert!(!output.contains("8B0A20D31D3FD1FF00E6700C"), "{output}");
    assert!(!output.contains("package = "), "{output}");
}

#[test]
fn inserts_are_idempotent() {
    let mut file = load();
    let sources = Guid::new("8B0A20D31D3FD1FF00E67006");
    let existing = Guid::new("8B0A20D31D3FD1FF00E67005");

    let duplicate: Reference<Object> = file.objects_mut().create_reference(existing.clone());
    let phase = file.objects_mut().object_mut(&sources).expect("phase exists");
    phase.add_build_file(duplicate);

    let phase = file.objects().object(&sources).expect("phase exists");
    assert_eq!(phase.as_build_phase().map(|p| p.files.len()), Some(1));
}

#[test]
fn write_to_creates_the_xcodeproj_package() {
    let file = load();
    let dir = tempfile::tempdir().expect("should create temp dir");
    let xcodeproj: PathBuf = dir.path().join("App.xcodeproj");

    file.write_to(&xcodeproj, Some(Format::OpenStep)).expect("should write");

    let written = std::fs::read(xcodeproj.join("project.pbxproj")).expect("file exists");
    let reloaded = XCProjectFile::load(&xcodeproj).expect("should reload");
    assert_eq!(reloaded.objects().len(), file.objects().len());
    assert!(written.starts_with(b"// !$*UTF8*$!"));
}

#[test]
fn load_reports_missing_pbxproj() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let missing = dir.path().join("Empty.xcodeproj");
    std::fs::create_dir_all(&missing).expect("should create dir");

    let error = XCProjectFile::load(&missing).expect_err("should fail");
    assert_eq!(error.to_string(), "project.pbxproj file missing");
}
