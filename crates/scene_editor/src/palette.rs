//! Node type palette
//!
//! One item per editable node type. Converting an item produces a payload
//! that can be pasted or dropped like any other.

use std::sync::Arc;

use scene_graph::{NodeFragment, UniqueNamer};
use scene_schema::{NodeTypeId, TypeHierarchy, NAME_ATTRIBUTE};

use crate::payload::Payload;

/// Palette category for every scene node type
pub const CATEGORY: &str = "Nodes";

/// A node type offered on the palette
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaletteItem {
    pub node_type: NodeTypeId,
    /// Default node name, also the item label
    pub name: String,
    pub description: String,
    pub category: &'static str,
}

/// The palette's items and the names it has handed out
#[derive(Debug)]
pub struct NodePalette {
    schema: Arc<TypeHierarchy>,
    items: Vec<PaletteItem>,
    namer: UniqueNamer,
}

impl NodePalette {
    pub fn new(schema: Arc<TypeHierarchy>) -> Self {
        let items = schema
            .types_derived_from(schema.editable_type())
            .map(|ty| {
                let name = ty.short_name().replace("Node", "");
                PaletteItem {
                    node_type: ty.id(),
                    description: format!("Create a {} node", ty.short_name()),
                    name,
                    category: CATEGORY,
                }
            })
            .collect();
        Self {
            schema,
            items,
            namer: UniqueNamer::new(),
        }
    }

    pub fn items(&self) -> &[PaletteItem] {
        &self.items
    }

    pub fn find(&self, node_type: NodeTypeId) -> Option<&PaletteItem> {
        self.items.iter().find(|item| item.node_type == node_type)
    }

    /// A payload holding one fresh node of the item's type.
    ///
    /// Names are unique among everything this palette has produced; the
    /// editing context still resolves clashes with the target scene.
    pub fn convert(&mut self, item: &PaletteItem) -> Payload {
        let node_type = &self.schema[item.node_type];
        let mut fragment = NodeFragment::new(node_type.name());
        if node_type.name_attribute().is_some() {
            fragment = fragment.with_attribute(NAME_ATTRIBUTE, self.namer.reserve(&item.name));
        }
        Payload::from(fragment)
    }
}
