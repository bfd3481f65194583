//! The scene graph: typed nodes, ordered children, change notification
//!
//! All structural edits go through [`SceneGraph::insert_child`] and
//! [`SceneGraph::remove_child`], which enforce slot compatibility and
//! acyclicity and notify listeners synchronously.

use std::collections::HashSet;
use std::sync::Arc;

use scene_schema::{AttributeValue, ChildSlot, NodeType, NodeTypeId, TypeHierarchy};

use crate::arena::{NodeArena, NodeData, NodeId};
use crate::error::{GraphError, Result};
use crate::event::{GraphEvent, Listener, SubscriberId};

/// Typed node storage bound to one schema
pub struct SceneGraph {
    schema: Arc<TypeHierarchy>,
    nodes: NodeArena,
    listeners: Vec<(SubscriberId, Listener)>,
    next_subscriber_id: u64,
}

impl SceneGraph {
    /// Create an empty graph
    pub fn new(schema: Arc<TypeHierarchy>) -> Self {
        Self {
            schema,
            nodes: NodeArena::default(),
            listeners: Vec::new(),
            next_subscriber_id: 1,
        }
    }

    pub fn schema(&self) -> &Arc<TypeHierarchy> {
        &self.schema
    }

    /// Number of live nodes, attached or not
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 0
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains(id)
    }

    // ---------------------------------------------------------------------
    // Creation
    // ---------------------------------------------------------------------

    /// Create a detached node with every attribute at its default
    pub fn create_node(&mut self, ty: NodeTypeId) -> Result<NodeId> {
        let node_type = self
            .schema
            .get(ty)
            .ok_or_else(|| GraphError::UnknownType(format!("#{}", ty.index())))?;

        let values = node_type
            .attributes()
            .iter()
            .map(|a| a.default_value().clone())
            .collect();

        Ok(self.nodes.insert(NodeData {
            node_type: ty,
            values,
            children: Vec::new(),
            parent: None,
        }))
    }

    /// Create a detached node by qualified or short type name
    pub fn create_node_by_name(&mut self, type_name: &str) -> Result<NodeId> {
        let ty = self
            .schema
            .find(type_name)
            .map(NodeType::id)
            .ok_or_else(|| GraphError::UnknownType(type_name.to_string()))?;
        self.create_node(ty)
    }

    /// Create a childless instance of the schema's root type named `name`
    pub fn create_root(&mut self, name: &str) -> Result<NodeId> {
        let root = self.create_node(self.schema.root_type())?;
        let node_type = &self.schema[self.schema.root_type()];
        if let Some(index) = node_type
            .name_attribute()
            .and_then(|a| node_type.attribute_index(a.name()))
        {
            if let Some(data) = self.nodes.get_mut(root) {
                data.values[index] = AttributeValue::from(name);
            }
        }
        log::debug!("Created root {} named '{}'", root, name);
        Ok(root)
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    fn data(&self, id: NodeId) -> Result<&NodeData> {
        self.nodes.get(id).ok_or(GraphError::StaleNode(id))
    }

    pub fn type_id(&self, id: NodeId) -> Result<NodeTypeId> {
        Ok(self.data(id)?.node_type)
    }

    pub fn node_type(&self, id: NodeId) -> Result<&NodeType> {
        let ty = self.data(id)?.node_type;
        Ok(&self.schema[ty])
    }

    /// True if the node's type is the editable base or derives from it
    pub fn is_editable(&self, id: NodeId) -> bool {
        self.nodes
            .get(id)
            .is_some_and(|d| self.schema.is_editable(d.node_type))
    }

    /// Current value of an attribute
    pub fn attribute(&self, id: NodeId, attribute: &str) -> Result<&AttributeValue> {
        let data = self.data(id)?;
        let node_type = &self.schema[data.node_type];
        let index = node_type
            .attribute_index(attribute)
            .ok_or_else(|| GraphError::UnknownAttribute {
                node_type: node_type.name().to_string(),
                attribute: attribute.to_string(),
            })?;
        Ok(&data.values[index])
    }

    /// All attribute values in declaration order, paired with their names
    pub fn attributes(&self, id: NodeId) -> Result<impl Iterator<Item = (&str, &AttributeValue)>> {
        let data = self.data(id)?;
        let node_type = &self.schema[data.node_type];
        Ok(node_type
            .attributes()
            .iter()
            .map(|a| a.name())
            .zip(data.values.iter()))
    }

    /// Value of the designated name attribute, if the type has one
    pub fn name(&self, id: NodeId) -> Option<&str> {
        let data = self.nodes.get(id)?;
        let node_type = &self.schema[data.node_type];
        let index = node_type.attribute_index(node_type.name_attribute()?.name())?;
        data.values[index].as_str()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|d| d.parent)
    }

    /// Ordered children; empty for stale handles and slotless types
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id)
            .map(|d| d.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn child_slot(&self, id: NodeId) -> Option<&ChildSlot> {
        self.node_type(id).ok().and_then(NodeType::child_slot)
    }

    pub fn index_of(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.children(parent).iter().position(|c| *c == child)
    }

    /// True if `ancestor` is a strict ancestor of `node`
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.parent(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Topmost ancestor of `id` (itself when detached)
    pub fn root_of(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// Check that a node of type `child_type` fits the parent's slot
    pub fn accepts(&self, parent: NodeId, child_type: NodeTypeId) -> Result<()> {
        let parent_type = self.node_type(parent)?;
        let slot = parent_type
            .child_slot()
            .ok_or_else(|| GraphError::NoChildSlot {
                node_type: parent_type.name().to_string(),
                slot: String::new(),
            })?;
        self.check_slot(parent_type, slot, child_type)
    }

    fn check_slot(&self, parent_type: &NodeType, slot: &ChildSlot, child_type: NodeTypeId) -> Result<()> {
        if self.schema.is_derived_from(child_type, slot.base()) {
            Ok(())
        } else {
            Err(GraphError::InvalidChildType {
                parent_type: parent_type.name().to_string(),
                slot: slot.name().to_string(),
                child_type: self.schema[child_type].name().to_string(),
            })
        }
    }

    /// Pre-order walk of `id` and its descendants
    pub fn subtree(&self, id: NodeId) -> Subtree<'_> {
        let stack = if self.contains(id) { vec![id] } else { Vec::new() };
        Subtree { graph: self, stack }
    }

    // ---------------------------------------------------------------------
    // Mutation
    // ---------------------------------------------------------------------

    /// Set an attribute value.
    ///
    /// Returns `false` (and notifies nobody) when the value is unchanged.
    pub fn set_attribute(
        &mut self,
        id: NodeId,
        attribute: &str,
        value: impl Into<AttributeValue>,
    ) -> Result<bool> {
        let value = value.into();
        let ty = self.data(id)?.node_type;
        let node_type = &self.schema[ty];
        let index = node_type
            .attribute_index(attribute)
            .ok_or_else(|| GraphError::UnknownAttribute {
                node_type: node_type.name().to_string(),
                attribute: attribute.to_string(),
            })?;
        let expected = node_type.attributes()[index].kind();
        if value.kind() != expected {
            return Err(GraphError::KindMismatch {
                attribute: attribute.to_string(),
                expected,
                got: value.kind(),
            });
        }

        let data = self.nodes.get_mut(id).ok_or(GraphError::StaleNode(id))?;
        if data.values[index] == value {
            return Ok(false);
        }
        let old_value = std::mem::replace(&mut data.values[index], value.clone());

        self.emit(GraphEvent::AttributeChanged {
            node: id,
            attribute: attribute.to_string(),
            old_value,
            new_value: value,
        });
        Ok(true)
    }

    /// Insert `child` into `parent`'s slot named `slot` at `index`.
    ///
    /// The child is first detached from its current parent. `index` is
    /// clamped to the child count. Returns the final index.
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        slot: &str,
        index: usize,
        child: NodeId,
    ) -> Result<usize> {
        let child_type = self.type_id(child)?;
        let parent_type = self.node_type(parent)?;
        let child_slot = parent_type
            .child_slot()
            .filter(|s| s.name() == slot)
            .ok_or_else(|| GraphError::NoChildSlot {
                node_type: parent_type.name().to_string(),
                slot: slot.to_string(),
            })?;
        self.check_slot(parent_type, child_slot, child_type)?;

        if child == parent || self.is_ancestor(child, parent) {
            return Err(GraphError::Cycle { parent, child });
        }

        if let Some(old_parent) = self.parent(child) {
            self.remove_child(old_parent, child)?;
        }

        let data = self.nodes.get_mut(parent).ok_or(GraphError::StaleNode(parent))?;
        let index = index.min(data.children.len());
        data.children.insert(index, child);
        if let Some(child_data) = self.nodes.get_mut(child) {
            child_data.parent = Some(parent);
        }

        self.emit(GraphEvent::ChildInserted {
            parent,
            child,
            index,
        });
        Ok(index)
    }

    /// Insert into the parent's only slot
    pub fn insert_at(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<usize> {
        let parent_type = self.node_type(parent)?;
        let slot = parent_type
            .child_slot()
            .map(|s| s.name().to_string())
            .ok_or_else(|| GraphError::NoChildSlot {
                node_type: parent_type.name().to_string(),
                slot: String::new(),
            })?;
        self.insert_child(parent, &slot, index, child)
    }

    /// Append to the parent's only slot
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<usize> {
        self.insert_at(parent, usize::MAX, child)
    }

    /// Remove `child` from `parent`, returning its former index.
    ///
    /// The node stays in the graph, detached.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<usize> {
        self.data(parent)?;
        let index = self
            .index_of(parent, child)
            .ok_or(GraphError::NotFound { parent, child })?;

        self.emit(GraphEvent::ChildRemoving {
            parent,
            child,
            index,
        });

        if let Some(data) = self.nodes.get_mut(parent) {
            data.children.remove(index);
        }
        if let Some(data) = self.nodes.get_mut(child) {
            data.parent = None;
        }

        self.emit(GraphEvent::ChildRemoved {
            parent,
            child,
            index,
        });
        Ok(index)
    }

    /// Detach a node from its parent, if it has one
    pub fn detach(&mut self, id: NodeId) -> Result<Option<(NodeId, usize)>> {
        match self.parent(id) {
            Some(parent) => Ok(Some((parent, self.remove_child(parent, id)?))),
            None => Ok(None),
        }
    }

    /// Deep copy of `id` and its descendants as a new detached subtree.
    ///
    /// No events are raised; the copy is unreachable until inserted.
    pub fn clone_subtree(&mut self, id: NodeId) -> Result<NodeId> {
        let source = self.data(id)?.clone();
        let copy = self.nodes.insert(NodeData {
            node_type: source.node_type,
            values: source.values,
            children: Vec::with_capacity(source.children.len()),
            parent: None,
        });

        for child in source.children {
            let child_copy = self.clone_subtree(child)?;
            if let Some(data) = self.nodes.get_mut(child_copy) {
                data.parent = Some(copy);
            }
            if let Some(data) = self.nodes.get_mut(copy) {
                data.children.push(child_copy);
            }
        }
        Ok(copy)
    }

    /// Overwrite a value on a node without notifying listeners
    pub(crate) fn set_detached_value(&mut self, id: NodeId, attribute: &str, value: AttributeValue) -> Result<()> {
        let ty = self.type_id(id)?;
        let index = self.schema[ty]
            .attribute_index(attribute)
            .ok_or_else(|| GraphError::UnknownAttribute {
                node_type: self.schema[ty].name().to_string(),
                attribute: attribute.to_string(),
            })?;
        if let Some(data) = self.nodes.get_mut(id) {
            data.values[index] = value;
        }
        Ok(())
    }

    /// Link a fresh node under a fresh parent without notifying listeners
    pub(crate) fn adopt_detached(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.data(parent)?;
        let data = self.nodes.get_mut(child).ok_or(GraphError::StaleNode(child))?;
        data.parent = Some(parent);
        if let Some(data) = self.nodes.get_mut(parent) {
            data.children.push(child);
        }
        Ok(())
    }

    /// Free every node not reachable from `root`. Returns the count freed.
    pub fn purge_unreachable(&mut self, root: NodeId) -> usize {
        let reachable: HashSet<NodeId> = self.subtree(root).collect();
        let dead: Vec<NodeId> = self.nodes.ids().filter(|id| !reachable.contains(id)).collect();
        for id in &dead {
            self.nodes.remove(*id);
        }
        if !dead.is_empty() {
            log::debug!("Purged {} unreachable nodes", dead.len());
        }
        dead.len()
    }

    // ---------------------------------------------------------------------
    // Notification
    // ---------------------------------------------------------------------

    /// Register a listener; called for every event in subscription order
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriberId
    where
        F: FnMut(&SceneGraph, &GraphEvent) + 'static,
    {
        let id = SubscriberId(self.next_subscriber_id);
        self.next_subscriber_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    fn emit(&mut self, event: GraphEvent) {
        if self.listeners.is_empty() {
            return;
        }
        let mut listeners = std::mem::take(&mut self.listeners);
        for (_, listener) in listeners.iter_mut() {
            listener(self, &event);
        }
        self.listeners = listeners;
    }
}

impl std::fmt::Debug for SceneGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneGraph")
            .field("namespace", &self.schema.namespace())
            .field("nodes", &self.nodes.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Lazy pre-order traversal. Clone to restart from the same point.
#[derive(Clone)]
pub struct Subtree<'g> {
    graph: &'g SceneGraph,
    stack: Vec<NodeId>,
}

impl Iterator for Subtree<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.graph.children(id).iter().rev().copied());
        Some(id)
    }
}

/// A graph together with the node it is rooted at
#[derive(Debug)]
pub struct SceneTree {
    pub graph: SceneGraph,
    pub root: NodeId,
}

impl SceneTree {
    /// A new graph holding a single root named `name`
    pub fn new(schema: Arc<TypeHierarchy>, name: &str) -> Result<Self> {
        let mut graph = SceneGraph::new(schema);
        let root = graph.create_root(name)?;
        Ok(Self { graph, root })
    }
}
