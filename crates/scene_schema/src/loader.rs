//! Schema loading
//!
//! Parses the TOML schema description, resolves base types and child slot
//! types, and freezes the result into a [`TypeHierarchy`].

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use crate::error::{Result, SchemaLoadError};
use crate::hierarchy::{AttributeDef, ChildSlot, NodeType, NodeTypeId, TypeHierarchy};
use crate::value::AttributeKind;

/// Source text of the built-in schema
pub const BUILTIN_SCHEMA: &str = include_str!("../schemas/scene.toml");

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaSource {
    namespace: String,
    root_element: String,
    root_type: String,
    node_type: String,
    #[serde(default)]
    types: Vec<TypeSource>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TypeSource {
    name: String,
    #[serde(default)]
    base: Option<String>,
    #[serde(default)]
    attributes: Vec<AttributeSource>,
    #[serde(default)]
    child: Option<ChildSource>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AttributeSource {
    name: String,
    kind: AttributeKind,
    #[serde(default)]
    default: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ChildSource {
    name: String,
    #[serde(rename = "type")]
    child_type: String,
}

/// Parse and resolve a schema from TOML source text.
pub fn load_schema(source: &str) -> Result<Arc<TypeHierarchy>> {
    let source: SchemaSource = toml::from_str(source)?;
    let hierarchy = resolve(source)?;
    log::debug!(
        "Loaded schema '{}' with {} types",
        hierarchy.namespace(),
        hierarchy.len()
    );
    Ok(Arc::new(hierarchy))
}

/// Read and load a schema file.
pub fn load_schema_file(path: impl AsRef<Path>) -> Result<Arc<TypeHierarchy>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    log::info!("Loading schema from {:?}", path);
    load_schema(&content)
}

/// The built-in schema, loaded once per process.
pub fn builtin() -> Arc<TypeHierarchy> {
    static BUILTIN: OnceLock<Arc<TypeHierarchy>> = OnceLock::new();
    BUILTIN
        .get_or_init(|| match load_schema(BUILTIN_SCHEMA) {
            Ok(hierarchy) => hierarchy,
            Err(e) => panic!("built-in schema is invalid: {}", e),
        })
        .clone()
}

fn resolve(source: SchemaSource) -> Result<TypeHierarchy> {
    let SchemaSource {
        namespace,
        root_element,
        root_type,
        node_type,
        types: type_sources,
    } = source;

    let mut types: Vec<NodeType> = Vec::with_capacity(type_sources.len());
    let mut ids: HashMap<String, NodeTypeId> = HashMap::new();

    // Pass 1: types and attributes. Bases must already be declared.
    for ts in &type_sources {
        if ids.contains_key(&ts.name) {
            return Err(SchemaLoadError::DuplicateType(ts.name.clone()));
        }

        let base = match &ts.base {
            Some(base_name) => Some(*ids.get(base_name).ok_or_else(|| {
                SchemaLoadError::UnknownBaseType {
                    node_type: ts.name.clone(),
                    base: base_name.clone(),
                }
            })?),
            None => None,
        };

        let mut attributes: Vec<AttributeDef> = base
            .map(|b| types[b.index()].attributes().to_vec())
            .unwrap_or_default();

        for attr in &ts.attributes {
            if attributes.iter().any(|a| a.name() == attr.name) {
                return Err(SchemaLoadError::DuplicateAttribute {
                    node_type: ts.name.clone(),
                    attribute: attr.name.clone(),
                });
            }

            let default = match &attr.default {
                Some(text) => attr.kind.parse(text).map_err(|source| {
                    SchemaLoadError::InvalidDefault {
                        node_type: ts.name.clone(),
                        attribute: attr.name.clone(),
                        source,
                    }
                })?,
                None => attr.kind.zero(),
            };
            attributes.push(AttributeDef::new(attr.name.clone(), attr.kind, default));
        }

        let id = NodeTypeId(types.len() as u32);
        types.push(NodeType::new(id, &namespace, &ts.name, base, attributes));
        ids.insert(ts.name.clone(), id);
    }

    // Pass 2: child slots, which may point forward. Declaration order means
    // a base's slot is settled before its derived types are visited.
    for (index, ts) in type_sources.iter().enumerate() {
        let inherited = types[index]
            .base()
            .and_then(|b| types[b.index()].child_slot().cloned());

        let slot = match (&ts.child, inherited) {
            (Some(_), Some(_)) => {
                return Err(SchemaLoadError::MultipleChildSlots(ts.name.clone()));
            }
            (Some(child), None) => {
                let child_id = *ids.get(&child.child_type).ok_or_else(|| {
                    SchemaLoadError::UnknownChildType {
                        node_type: ts.name.clone(),
                        slot: child.name.clone(),
                        child: child.child_type.clone(),
                    }
                })?;
                Some(ChildSlot::new(child.name.clone(), child_id))
            }
            (None, inherited) => inherited,
        };

        if let Some(slot) = slot {
            types[index].set_child_slot(slot);
        }
    }

    let lookup = |role: &'static str, name: &str| {
        ids.get(name).copied().ok_or_else(|| SchemaLoadError::MissingType {
            role,
            name: name.to_string(),
        })
    };
    let root_id = lookup("root", &root_type)?;
    let editable_id = lookup("node", &node_type)?;

    for (role, id, name) in [("root", root_id, &root_type), ("node", editable_id, &node_type)] {
        if types[id.index()].name_attribute().is_none() {
            return Err(SchemaLoadError::MissingNameAttribute {
                role,
                name: name.clone(),
            });
        }
    }

    Ok(TypeHierarchy::new(
        namespace,
        root_element,
        types,
        root_id,
        editable_id,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::AttributeValue;

    const HEADER: &str = r#"
namespace = "test"
root_element = "scene"
root_type = "root"
node_type = "node"
"#;

    fn schema(types: &str) -> Result<Arc<TypeHierarchy>> {
        load_schema(&format!("{}{}", HEADER, types))
    }

    #[test]
    fn test_builtin_schema() {
        let h = builtin();
        assert_eq!(h.namespace(), "bitBox");
        assert_eq!(h.root_element(), "scene");
        assert_eq!(h[h.root_type()].short_name(), "graphType");
        assert_eq!(h[h.editable_type()].short_name(), "nodeType");

        let mesh = h.find("MeshNode").unwrap();
        assert_eq!(mesh.name(), "bitBox:MeshNode");
        assert_eq!(h.find("bitBox:MeshNode").unwrap().id(), mesh.id());

        // Inherited attributes come first
        let names: Vec<_> = mesh.attributes().iter().map(|a| a.name()).collect();
        assert_eq!(
            names,
            ["name", "pos", "rot", "scale", "material", "mesh", "cast_shadows", "lod"]
        );
        assert_eq!(
            mesh.attribute("scale").unwrap().default_value(),
            &AttributeValue::FloatArray(vec![1.0, 1.0, 1.0])
        );

        // Slot inherited from nodeType
        let slot = mesh.child_slot().unwrap();
        assert_eq!(slot.name(), "node");
        assert_eq!(slot.base(), h.editable_type());
    }

    #[test]
    fn test_builtin_is_cached() {
        assert!(Arc::ptr_eq(&builtin(), &builtin()));
    }

    #[test]
    fn test_types_derived_from() {
        let h = builtin();
        let derived: Vec<_> = h
            .types_derived_from(h.editable_type())
            .map(|t| t.short_name())
            .collect();
        assert_eq!(derived, ["nodeType", "LocatorNode", "MeshNode"]);

        let locator = h.find("LocatorNode").unwrap().id();
        let walk = h.types_derived_from(locator);
        let again = walk.clone();
        assert_eq!(walk.count(), 2);
        assert_eq!(again.count(), 2);
    }

    #[test]
    fn test_is_derived_from() {
        let h = builtin();
        let mesh = h.find("MeshNode").unwrap().id();
        let locator = h.find("LocatorNode").unwrap().id();
        assert!(h.is_derived_from(mesh, locator));
        assert!(h.is_derived_from(mesh, mesh));
        assert!(!h.is_derived_from(locator, mesh));
        assert!(!h.is_editable(h.root_type()));
        assert!(h.is_editable(mesh));
    }

    #[test]
    fn test_forward_child_reference() {
        let h = schema(
            r#"
[[types]]
name = "root"
attributes = [{ name = "name", kind = "string" }]
child = { name = "item", type = "node" }

[[types]]
name = "node"
attributes = [{ name = "name", kind = "string" }]
"#,
        )
        .unwrap();
        let root = &h[h.root_type()];
        assert_eq!(root.child_slot().unwrap().base(), h.editable_type());
        assert!(h[h.editable_type()].child_slot().is_none());
    }

    #[test]
    fn test_malformed_source() {
        assert!(matches!(load_schema("not = [valid"), Err(SchemaLoadError::Parse(_))));
        assert!(matches!(load_schema("namespace = 1"), Err(SchemaLoadError::Parse(_))));
    }

    #[test]
    fn test_unknown_base() {
        let err = schema(
            r#"
[[types]]
name = "derived"
base = "missing"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaLoadError::UnknownBaseType { .. }));
    }

    #[test]
    fn test_duplicate_type() {
        let err = schema(
            r#"
[[types]]
name = "node"
[[types]]
name = "node"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaLoadError::DuplicateType(name) if name == "node"));
    }

    #[test]
    fn test_redeclared_attribute() {
        let err = schema(
            r#"
[[types]]
name = "node"
attributes = [{ name = "name", kind = "string" }]
[[types]]
name = "leaf"
base = "node"
attributes = [{ name = "name", kind = "string" }]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaLoadError::DuplicateAttribute { .. }));
    }

    #[test]
    fn test_second_child_slot() {
        let err = schema(
            r#"
[[types]]
name = "root"
attributes = [{ name = "name", kind = "string" }]
[[types]]
name = "node"
attributes = [{ name = "name", kind = "string" }]
child = { name = "node", type = "node" }
[[types]]
name = "leaf"
base = "node"
child = { name = "extra", type = "node" }
"#,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaLoadError::MultipleChildSlots(name) if name == "leaf"));
    }

    #[test]
    fn test_invalid_default() {
        let err = schema(
            r#"
[[types]]
name = "node"
attributes = [{ name = "count", kind = "int32", default = "many" }]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaLoadError::InvalidDefault { .. }));
    }

    #[test]
    fn test_missing_root_type() {
        let err = schema(
            r#"
[[types]]
name = "node"
attributes = [{ name = "name", kind = "string" }]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaLoadError::MissingType { role: "root", .. }));
    }

    #[test]
    fn test_editable_type_needs_name() {
        let err = schema(
            r#"
[[types]]
name = "root"
attributes = [{ name = "name", kind = "string" }]
[[types]]
name = "node"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaLoadError::MissingNameAttribute { role: "node", .. }));
    }
}
