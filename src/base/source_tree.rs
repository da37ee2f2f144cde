//! Source-tree anchors and resolved paths.
//!
//! A reference's `path` field is interpreted against its `sourceTree`: an
//! absolute path, a path relative to the enclosing group, or a path relative
//! to one of a fixed set of build-system locations.

use std::path::PathBuf;

/// One of the fixed build-system anchor directories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceTreeFolder {
    SourceRoot,
    BuildProductsDir,
    DeveloperDir,
    SdkRoot,
    PlatformDir,
}

impl SourceTreeFolder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SourceRoot => "SOURCE_ROOT",
            Self::BuildProductsDir => "BUILT_PRODUCTS_DIR",
            Self::DeveloperDir => "DEVELOPER_DIR",
            Self::SdkRoot => "SDKROOT",
            Self::PlatformDir => "PLATFORM_DIR",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "SOURCE_ROOT" => Some(Self::SourceRoot),
            "BUILT_PRODUCTS_DIR" => Some(Self::BuildProductsDir),
            "DEVELOPER_DIR" => Some(Self::DeveloperDir),
            "SDKROOT" => Some(Self::SdkRoot),
            "PLATFORM_DIR" => Some(Self::PlatformDir),
            _ => None,
        }
    }
}

/// The anchor against which a reference's `path` is resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceTree {
    /// `<absolute>`: the path is absolute.
    Absolute,
    /// `<group>`: the path is relative to the enclosing group.
    Group,
    /// Relative to a fixed build-system folder.
    RelativeTo(SourceTreeFolder),
}

impl SourceTree {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "<absolute>" => Some(Self::Absolute),
            "<group>" => Some(Self::Group),
            other => SourceTreeFolder::parse(other).map(Self::RelativeTo),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Absolute => "<absolute>",
            Self::Group => "<group>",
            Self::RelativeTo(folder) => folder.as_str(),
        }
    }
}

/// A fully resolved location for a file-like reference, computed at load time
/// by walking the group tree from the main group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolvedPath {
    Absolute(String),
    RelativeTo(SourceTreeFolder, String),
}

impl ResolvedPath {
    /// Turn the resolved path into a filesystem path, given a way to locate
    /// each source-tree folder on disk.
    pub fn to_path_buf(&self, folder_location: impl Fn(SourceTreeFolder) -> PathBuf) -> PathBuf {
        match self {
            Self::Absolute(path) => PathBuf::from(path),
            Self::RelativeTo(folder, path) => folder_location(*folder).join(path),
        }
    }
}
