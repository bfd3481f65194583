//! Arena-independent subtree snapshots
//!
//! A [`NodeFragment`] captures a node's type, its non-default attributes and
//! its children by value. Fragments move between graphs (clipboard, drag and
//! drop, palette) and instantiate as fresh detached nodes.

use serde::{Deserialize, Serialize};

use scene_schema::AttributeValue;

use crate::arena::NodeId;
use crate::error::{GraphError, Result};
use crate::graph::SceneGraph;

/// A detached copy of a subtree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeFragment {
    /// Qualified type name
    pub node_type: String,
    /// Attributes that differ from their defaults, in declaration order
    #[serde(default)]
    pub attributes: Vec<(String, AttributeValue)>,
    #[serde(default)]
    pub children: Vec<NodeFragment>,
}

impl NodeFragment {
    /// Fragment of `node_type` with every attribute at its default
    pub fn new(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute override
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name, value)),
        }
        self
    }

    pub fn with_child(mut self, child: NodeFragment) -> Self {
        self.children.push(child);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Total node count, this one included
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(NodeFragment::node_count).sum::<usize>()
    }
}

impl SceneGraph {
    /// Capture `id` and its descendants as a fragment
    pub fn snapshot(&self, id: NodeId) -> Result<NodeFragment> {
        let node_type = self.node_type(id)?;
        let attributes = node_type
            .attributes()
            .iter()
            .zip(self.attributes(id)?)
            .filter(|(def, (_, value))| !def.is_default(value))
            .map(|(def, (_, value))| (def.name().to_string(), value.clone()))
            .collect();

        let children = self
            .children(id)
            .iter()
            .map(|child| self.snapshot(*child))
            .collect::<Result<Vec<_>>>()?;

        Ok(NodeFragment {
            node_type: node_type.name().to_string(),
            attributes,
            children,
        })
    }

    /// Build fresh detached nodes from a fragment.
    ///
    /// The whole fragment is validated first, so a failure creates nothing.
    /// Building raises no events.
    pub fn instantiate(&mut self, fragment: &NodeFragment) -> Result<NodeId> {
        self.validate_fragment(fragment)?;
        self.build_fragment(fragment)
    }

    /// Check a fragment against the schema without building anything
    pub fn validate_fragment(&self, fragment: &NodeFragment) -> Result<()> {
        let schema = self.schema();
        let node_type = schema
            .find(&fragment.node_type)
            .ok_or_else(|| GraphError::UnknownType(fragment.node_type.clone()))?;

        for (name, value) in &fragment.attributes {
            let def = node_type
                .attribute(name)
                .ok_or_else(|| GraphError::UnknownAttribute {
                    node_type: node_type.name().to_string(),
                    attribute: name.clone(),
                })?;
            if def.kind() != value.kind() {
                return Err(GraphError::KindMismatch {
                    attribute: name.clone(),
                    expected: def.kind(),
                    got: value.kind(),
                });
            }
        }

        if fragment.children.is_empty() {
            return Ok(());
        }

        let slot = node_type
            .child_slot()
            .ok_or_else(|| GraphError::NoChildSlot {
                node_type: node_type.name().to_string(),
                slot: String::new(),
            })?;
        for child in &fragment.children {
            let child_type = schema
                .find(&child.node_type)
                .ok_or_else(|| GraphError::UnknownType(child.node_type.clone()))?;
            if !schema.is_derived_from(child_type.id(), slot.base()) {
                return Err(GraphError::InvalidChildType {
                    parent_type: node_type.name().to_string(),
                    slot: slot.name().to_string(),
                    child_type: child_type.name().to_string(),
                });
            }
            self.validate_fragment(child)?;
        }
        Ok(())
    }

    fn build_fragment(&mut self, fragment: &NodeFragment) -> Result<NodeId> {
        let id = self.create_node_by_name(&fragment.node_type)?;
        for (name, value) in &fragment.attributes {
            self.set_detached_value(id, name, value.clone())?;
        }
        for child in &fragment.children {
            let child_id = self.build_fragment(child)?;
            self.adopt_detached(id, child_id)?;
        }
        Ok(id)
    }
}
