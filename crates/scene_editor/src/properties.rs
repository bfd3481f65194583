//! Property descriptors for the host's property panel

use scene_graph::{NodeId, SceneGraph};
use scene_schema::{AttributeKind, AttributeValue, NodeType};

/// Category every attribute is listed under
pub const ATTRIBUTES_CATEGORY: &str = "Attributes";

/// How a property panel should edit a value
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyEditor {
    Checkbox,
    BoundedInt { min: i32, max: i32 },
    BoundedFloat { min: f32, max: f32 },
    /// Fixed-length row of floats (`pos`, `rot`, `scale`)
    NumericTuple { names: Vec<&'static str> },
    Text,
}

impl PropertyEditor {
    pub fn for_kind(kind: AttributeKind, default: &AttributeValue) -> Self {
        match kind {
            AttributeKind::Bool => Self::Checkbox,
            AttributeKind::Int32 => Self::BoundedInt {
                min: i32::MIN,
                max: i32::MAX,
            },
            AttributeKind::Float => Self::BoundedFloat {
                min: f32::MIN,
                max: f32::MAX,
            },
            AttributeKind::FloatArray => {
                let len = default.as_floats().map_or(0, <[f32]>::len);
                let names = if len == 3 {
                    vec!["X", "Y", "Z"]
                } else {
                    vec![""; len]
                };
                Self::NumericTuple { names }
            }
            AttributeKind::String => Self::Text,
        }
    }
}

/// One editable attribute of a node type
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyDescriptor {
    pub name: String,
    pub category: &'static str,
    pub kind: AttributeKind,
    pub default_value: AttributeValue,
    pub editor: PropertyEditor,
}

/// Descriptors for every attribute of `node_type`, in declaration order
pub fn descriptors(node_type: &NodeType) -> Vec<PropertyDescriptor> {
    node_type
        .attributes()
        .iter()
        .map(|def| PropertyDescriptor {
            name: def.name().to_string(),
            category: ATTRIBUTES_CATEGORY,
            kind: def.kind(),
            default_value: def.default_value().clone(),
            editor: PropertyEditor::for_kind(def.kind(), def.default_value()),
        })
        .collect()
}

/// Descriptors paired with a node's current values
pub fn node_properties(graph: &SceneGraph, node: NodeId) -> scene_graph::Result<Vec<(PropertyDescriptor, AttributeValue)>> {
    let node_type = graph.node_type(node)?;
    Ok(descriptors(node_type)
        .into_iter()
        .zip(graph.attributes(node)?)
        .map(|(descriptor, (_, value))| (descriptor, value.clone()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_descriptors() {
        let schema = scene_schema::builtin();
        let mesh = schema.find("MeshNode").unwrap();
        let props = descriptors(mesh);

        let names: Vec<_> = props.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["name", "pos", "rot", "scale", "material", "mesh", "cast_shadows", "lod"]);
        assert!(props.iter().all(|p| p.category == ATTRIBUTES_CATEGORY));

        assert_eq!(props[0].editor, PropertyEditor::Text);
        assert_eq!(props[3].editor, PropertyEditor::NumericTuple { names: vec!["X", "Y", "Z"] });
        assert_eq!(props[6].editor, PropertyEditor::Checkbox);
        assert!(matches!(props[7].editor, PropertyEditor::BoundedInt { .. }));
    }

    #[test]
    fn test_node_properties_values() {
        let mut graph = SceneGraph::new(scene_schema::builtin());
        let node = graph.create_node_by_name("LocatorNode").unwrap();
        graph.set_attribute(node, "name", "Pivot").unwrap();

        let props = node_properties(&graph, node).unwrap();
        assert_eq!(props.len(), 4);
        assert_eq!(props[0].1, AttributeValue::from("Pivot"));
        assert_eq!(props[3].1, AttributeValue::from([1.0f32, 1.0, 1.0]));
    }
}
