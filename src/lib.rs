//! # pbxedit
//!
//! Parse, edit, and re-serialize Xcode `project.pbxproj` files.
//!
//! A pbxproj file is an OpenStep-style property list encoding a flat table of
//! objects keyed by 24-hex-character identifiers, cross-linked by those
//! identifiers into a graph: the project, its targets, build phases, file
//! references, groups, and build configurations. This crate models that graph
//! with referential integrity and regenerates the file in Xcode's own
//! formatting (comment annotations, per-type sections, deterministic key
//! ordering) so that rewritten projects produce minimal diffs.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! project     → XCProjectFile: load, path resolution, mutation, output
//!   ↓
//! serializer  → OpenStep writer with comment synthesis
//!   ↓
//! registry    → AllObjects arena, Reference<T> handles, validation
//!   ↓
//! objects     → typed entities per pbxproj kind, isa-dispatched factory
//!   ↓
//! openstep    → logos lexer + recursive-descent OpenStep parser
//!   ↓
//! value       → generic plist value tree (Fields)
//!   ↓
//! base        → primitives: Guid, identifier codec, source trees
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use pbxedit::{Format, XCProjectFile};
//!
//! let data = std::fs::read("App.xcodeproj/project.pbxproj")?;
//! let project = XCProjectFile::from_bytes(&data)?;
//! let out = project.serialized("App", Some(Format::OpenStep))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Foundation types: Guid, identifier codec, source trees and paths
pub mod base;

/// Generic property-list value tree and format conversions
pub mod value;

/// OpenStep (ASCII plist) lexer and parser
pub mod openstep;

/// Typed pbxproj entities and the isa-dispatched factory
pub mod objects;

/// Object registry: storage, reference counting, validation
pub mod registry;

/// OpenStep serializer with Xcode-style comments and sections
pub(crate) mod serializer;

/// Project file: loading, path resolution, mutation, output formats
pub mod project;

/// Error types
pub mod error;

pub use base::{Guid, PBXIdentifier, ResolvedPath, SourceTree, SourceTreeFolder};
pub use error::{ObjectError, ParseError, ProjectFileError, ReferenceError};
pub use objects::{Object, ObjectKind};
pub use project::{Format, XCProjectFile};
pub use registry::{AllObjects, Reference};
pub use value::{Fields, Value};
