//! Change notifications raised by [`SceneGraph`](crate::SceneGraph)
//!
//! Events are delivered synchronously, in subscription order, before the
//! mutating call returns.

use scene_schema::AttributeValue;

use crate::arena::NodeId;
use crate::graph::SceneGraph;

/// A structural or attribute change
#[derive(Clone, Debug, PartialEq)]
pub enum GraphEvent {
    /// An attribute value changed
    AttributeChanged {
        node: NodeId,
        attribute: String,
        old_value: AttributeValue,
        new_value: AttributeValue,
    },
    /// A child was inserted at `index`
    ChildInserted {
        parent: NodeId,
        child: NodeId,
        index: usize,
    },
    /// A child is about to be removed from `index`; the graph is unchanged
    ChildRemoving {
        parent: NodeId,
        child: NodeId,
        index: usize,
    },
    /// A child was removed; `index` is its position before removal
    ChildRemoved {
        parent: NodeId,
        child: NodeId,
        index: usize,
    },
}

impl GraphEvent {
    /// The node whose state or child list changed
    pub fn target(&self) -> NodeId {
        match self {
            Self::AttributeChanged { node, .. } => *node,
            Self::ChildInserted { parent, .. }
            | Self::ChildRemoving { parent, .. }
            | Self::ChildRemoved { parent, .. } => *parent,
        }
    }
}

/// Subscriber ID
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriberId(pub u64);

/// Listener callback. Receives the graph in its current state.
pub type Listener = Box<dyn FnMut(&SceneGraph, &GraphEvent)>;
