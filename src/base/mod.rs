//! Foundation types for the pbxproj object graph.
//!
//! - [`Guid`] - opaque object identifiers, ordered by string value
//! - [`PBXIdentifier`] - codec for Xcode's 24-hex-character identifier scheme
//! - [`SourceTree`], [`SourceTreeFolder`], [`ResolvedPath`] - path anchoring
//!
//! This module has NO dependencies on other pbxedit modules.

mod guid;
mod identifier;
mod source_tree;

pub use guid::Guid;
pub use identifier::PBXIdentifier;
pub use source_tree::{ResolvedPath, SourceTree, SourceTreeFolder};
