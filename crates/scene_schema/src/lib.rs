//! # scene_schema - Node Type Schema Registry
//!
//! Loads the schema that describes which node types a scene may contain:
//!
//! - A single-rooted type hierarchy (`nodeType` → `LocatorNode` → `MeshNode`)
//! - Typed, defaulted attributes per type
//! - At most one ordered child slot per type
//!
//! The hierarchy is frozen after loading and shared behind an `Arc`. All
//! other crates query it for attribute metadata and type compatibility.
//!
//! ```ignore
//! let schema = scene_schema::builtin();
//! let mesh = schema.find("MeshNode").unwrap();
//! assert!(schema.is_editable(mesh.id()));
//! ```

pub mod error;
pub mod hierarchy;
pub mod loader;
pub mod value;

pub use error::{Result, SchemaLoadError, ValueParseError};
pub use hierarchy::{AttributeDef, ChildSlot, NodeType, NodeTypeId, TypeHierarchy, NAME_ATTRIBUTE};
pub use loader::{builtin, load_schema, load_schema_file, BUILTIN_SCHEMA};
pub use value::{AttributeKind, AttributeValue};
