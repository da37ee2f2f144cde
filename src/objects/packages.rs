//! Swift package references and their product dependencies.

use crate::error::ObjectError;
use crate::objects::fields::FieldsExt;
use crate::objects::Object;
use crate::registry::{AllObjects, Reference};
use crate::value::Fields;

/// A package fetched from a git URL. The version requirement stays in the
/// raw fields; it is a nested dictionary Xcode rewrites freely.
#[derive(Debug, Clone)]
pub struct RemoteSwiftPackageReference {
    pub repository_url: Option<String>,
}

impl RemoteSwiftPackageReference {
    pub fn decode(fields: &Fields) -> Result<Self, ObjectError> {
        Ok(Self {
            repository_url: fields.optional_string("repositoryURL")?.map(str::to_owned),
        })
    }

    /// Package name as shown in comments: last URL component with its
    /// extension (typically `.git`) removed.
    pub fn display_name(&self) -> Option<&str> {
        let url = self.repository_url.as_deref()?;
        let tail = url.trim_end_matches('/').rsplit('/').next()?;
        match tail.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => Some(stem),
            _ => Some(tail),
        }
    }
}

/// A package on disk, referenced by path.
#[derive(Debug, Clone)]
pub struct LocalSwiftPackageReference {
    pub relative_path: String,
}

impl LocalSwiftPackageReference {
    pub fn decode(fields: &Fields) -> Result<Self, ObjectError> {
        Ok(Self {
            relative_path: fields.string("relativePath")?.to_owned(),
        })
    }

    pub fn display_name(&self) -> &str {
        let trimmed = self.relative_path.trim_end_matches('/');
        trimmed.rsplit('/').next().unwrap_or(trimmed)
    }
}

/// A product of some package, linked into a target. `package` is absent for
/// products of local packages.
#[derive(Debug, Clone)]
pub struct SwiftPackageProductDependency {
    pub product_name: Option<String>,
    pub package: Option<Reference<Object>>,
}

impl SwiftPackageProductDependency {
    pub fn decode(fields: &Fields, objects: &mut AllObjects) -> Result<Self, ObjectError> {
        Ok(Self {
            product_name: fields.optional_string("productName")?.map(str::to_owned),
            package: objects.create_optional_reference(fields.optional_guid("package")?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://github.com/pointfreeco/swift-snapshot-testing", "swift-snapshot-testing")]
    #[case("https://github.com/apple/swift-collections.git", "swift-collections")]
    #[case("https://example.com/mono/deep/pkg.git/", "pkg")]
    fn remote_display_name_strips_the_extension(#[case] url: &str, #[case] expected: &str) {
        let reference = RemoteSwiftPackageReference {
            repository_url: Some(url.to_owned()),
        };
        assert_eq!(reference.display_name(), Some(expected));
    }

    #[test]
    fn remote_display_name_without_url_is_absent() {
        let reference = RemoteSwiftPackageReference {
            repository_url: None,
        };
        assert_eq!(reference.display_name(), None);
    }

    #[test]
    fn local_display_name_is_the_path_tail() {
        let reference = LocalSwiftPackageReference {
            relative_path: "Packages/Networking".to_owned(),
        };
        assert_eq!(reference.display_name(), "Networking");
    }

    #[test]
    fn local_reference_requires_relative_path() {
        let error =
            LocalSwiftPackageReference::decode(&Fields::new()).expect_err("should fail");
        assert!(error.to_string().contains("relativePath"), "{error}");
    }

    #[test]
    fn product_dependency_tolerates_missing_product_name() {
        let mut objects = AllObjects::new();
        let fields = Fields::from_iter([(
            "isa".to_string(),
            "XCSwiftPackageProductDependency".into(),
        )]);
        let dependency =
            SwiftPackageProductDependency::decode(&fields, &mut objects).expect("should decode");
        assert!(dependency.product_name.is_none());
        assert!(dependency.package.is_none());
    }
}
