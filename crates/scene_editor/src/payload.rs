//! Clipboard and drag-and-drop payloads
//!
//! A payload is a detached bundle of items. Node items are arena-independent
//! fragments, so pasting or dropping always creates fresh nodes in the
//! target document.

use serde::{Deserialize, Serialize};

use scene_graph::NodeFragment;

/// One dragged or copied item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum PayloadItem {
    /// A scene subtree
    Node(NodeFragment),
    /// Data from outside the editor (file names, text, ...)
    Foreign(String),
}

/// An ordered bundle of items
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    items: Vec<PayloadItem>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: PayloadItem) {
        self.items.push(item);
    }

    pub fn items(&self) -> &[PayloadItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Node fragments, or `None` if any item is not a node
    pub fn fragments(&self) -> Option<Vec<&NodeFragment>> {
        self.items
            .iter()
            .map(|item| match item {
                PayloadItem::Node(fragment) => Some(fragment),
                PayloadItem::Foreign(_) => None,
            })
            .collect()
    }

    /// True iff the payload is non-empty and every item is a node
    pub fn is_insertable(&self) -> bool {
        !self.items.is_empty() && self.fragments().is_some()
    }

    /// Clipboard interchange form
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl From<NodeFragment> for Payload {
    fn from(fragment: NodeFragment) -> Self {
        Self {
            items: vec![PayloadItem::Node(fragment)],
        }
    }
}

impl FromIterator<NodeFragment> for Payload {
    fn from_iter<I: IntoIterator<Item = NodeFragment>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().map(PayloadItem::Node).collect(),
        }
    }
}
