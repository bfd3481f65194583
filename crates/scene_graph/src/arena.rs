//! Node arena - generational index storage
//!
//! Nodes are addressed by [`NodeId`]. Freed slots are reused with a bumped
//! generation, so a handle to a purged node never aliases a new one.

use std::fmt;

use scene_schema::{AttributeValue, NodeTypeId};

/// Handle to a node in a [`SceneGraph`](crate::SceneGraph)
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    #[inline]
    const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Get the raw index
    #[inline]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Get the generation
    #[inline]
    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Per-node storage
#[derive(Clone, Debug)]
pub(crate) struct NodeData {
    pub node_type: NodeTypeId,
    /// One value per effective attribute, in declaration order
    pub values: Vec<AttributeValue>,
    pub children: Vec<NodeId>,
    /// Back-reference for traversal only; the parent's child list owns the node
    pub parent: Option<NodeId>,
}

struct Slot {
    value: Option<NodeData>,
    generation: u32,
}

#[derive(Default)]
pub(crate) struct NodeArena {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    len: usize,
}

impl NodeArena {
    pub fn insert(&mut self, data: NodeData) -> NodeId {
        self.len += 1;

        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(data);
            NodeId::new(index, slot.generation)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                value: Some(data),
                generation: 0,
            });
            NodeId::new(index, 0)
        }
    }

    pub fn remove(&mut self, id: NodeId) -> Option<NodeData> {
        let slot = self.slots.get_mut(id.index as usize)?;

        if slot.generation != id.generation || slot.value.is_none() {
            return None;
        }

        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(id.index);
        self.len -= 1;

        slot.value.take()
    }

    pub fn get(&self, id: NodeId) -> Option<&NodeData> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.value.as_ref()
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.value.as_mut()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.value
                .as_ref()
                .map(|_| NodeId::new(i as u32, slot.generation))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> NodeData {
        NodeData {
            node_type: scene_schema::builtin().root_type(),
            values: Vec::new(),
            children: Vec::new(),
            parent: None,
        }
    }

    #[test]
    fn test_arena_remove() {
        let mut arena = NodeArena::default();
        let id = arena.insert(data());
        assert!(arena.contains(id));

        assert!(arena.remove(id).is_some());
        assert!(!arena.contains(id));
        assert!(arena.remove(id).is_none());
        assert_eq!(arena.len(), 0);
    }

    #[test]
    fn test_arena_generation() {
        let mut arena = NodeArena::default();
        let first = arena.insert(data());
        arena.remove(first);

        let second = arena.insert(data());

        // Same index, different generation
        assert_eq!(first.index(), second.index());
        assert_ne!(first.generation(), second.generation());

        // Old handle must not resolve to the new node
        assert!(arena.get(first).is_none());
        assert!(arena.get(second).is_some());
        assert_eq!(arena.ids().collect::<Vec<_>>(), vec![second]);
    }
}
