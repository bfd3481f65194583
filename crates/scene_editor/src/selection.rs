//! Ordered node selection with multi-select modes.
//!
//! Selection order is preserved; the primary node is the most recently
//! selected one and is what the property panel shows.

use scene_graph::NodeId;

/// How a single pick combines with the existing selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// Replace current selection (normal click)
    #[default]
    Replace,
    /// Add to current selection (Shift+click)
    Add,
    /// Remove from current selection (Ctrl+click)
    Remove,
    /// Toggle selection state (Ctrl+Shift+click)
    Toggle,
}

impl SelectionMode {
    /// Determine selection mode from modifier keys.
    pub fn from_modifiers(shift: bool, ctrl: bool) -> Self {
        match (shift, ctrl) {
            (true, true) => Self::Toggle,
            (true, false) => Self::Add,
            (false, true) => Self::Remove,
            (false, false) => Self::Replace,
        }
    }
}

/// Ordered set of selected nodes.
///
/// Mutators return whether the selection actually changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    selected: Vec<NodeId>,
    primary: Option<NodeId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently selected node
    pub fn primary(&self) -> Option<NodeId> {
        self.primary
    }

    /// Selected nodes in selection order
    pub fn nodes(&self) -> &[NodeId] {
        &self.selected
    }

    pub fn count(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn is_selected(&self, id: NodeId) -> bool {
        self.selected.contains(&id)
    }

    /// Apply a single pick.
    pub fn select(&mut self, id: NodeId, mode: SelectionMode) -> bool {
        let before = self.clone();
        match mode {
            SelectionMode::Replace => {
                self.selected.clear();
                self.selected.push(id);
                self.primary = Some(id);
            }
            SelectionMode::Add => {
                if !self.selected.contains(&id) {
                    self.selected.push(id);
                }
                self.primary = Some(id);
            }
            SelectionMode::Remove => {
                self.remove(id);
            }
            SelectionMode::Toggle => {
                if self.selected.contains(&id) {
                    self.remove(id);
                } else {
                    self.selected.push(id);
                    self.primary = Some(id);
                }
            }
        }
        *self != before
    }

    /// Replace the selection; duplicates keep their first position.
    pub fn set(&mut self, ids: impl IntoIterator<Item = NodeId>) -> bool {
        let mut selected: Vec<NodeId> = Vec::new();
        for id in ids {
            if !selected.contains(&id) {
                selected.push(id);
            }
        }
        let primary = selected.last().copied();
        let changed = selected != self.selected;
        self.selected = selected;
        self.primary = primary;
        changed
    }

    pub fn clear(&mut self) -> bool {
        if self.selected.is_empty() {
            return false;
        }
        self.selected.clear();
        self.primary = None;
        true
    }

    /// Drop a node (e.g. when it leaves the scene).
    pub fn remove(&mut self, id: NodeId) -> bool {
        let before = self.selected.len();
        self.selected.retain(|&n| n != id);
        if self.primary == Some(id) {
            self.primary = self.selected.last().copied();
        }
        self.selected.len() != before
    }

    /// Keep only nodes matching `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(NodeId) -> bool) -> bool {
        let before = self.selected.len();
        self.selected.retain(|&n| keep(n));
        if self.primary.is_some_and(|p| !self.selected.contains(&p)) {
            self.primary = self.selected.last().copied();
        }
        self.selected.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scene_graph::SceneGraph;

    fn ids(n: usize) -> Vec<NodeId> {
        let mut graph = SceneGraph::new(scene_schema::builtin());
        (0..n)
            .map(|_| graph.create_node_by_name("nodeType").unwrap())
            .collect()
    }

    #[test]
    fn test_selection_replace() {
        let n = ids(2);
        let mut sel = Selection::new();
        sel.select(n[0], SelectionMode::Replace);
        sel.select(n[1], SelectionMode::Replace);

        assert_eq!(sel.count(), 1);
        assert!(sel.is_selected(n[1]));
        assert!(!sel.is_selected(n[0]));
    }

    #[test]
    fn test_selection_add_keeps_order() {
        let n = ids(3);
        let mut sel = Selection::new();
        sel.select(n[2], SelectionMode::Replace);
        sel.select(n[0], SelectionMode::Add);
        assert!(!sel.select(n[0], SelectionMode::Add));

        assert_eq!(sel.nodes(), &[n[2], n[0]]);
        assert_eq!(sel.primary(), Some(n[0]));
    }

    #[test]
    fn test_selection_toggle() {
        let n = ids(1);
        let mut sel = Selection::new();
        sel.select(n[0], SelectionMode::Replace);
        assert!(sel.select(n[0], SelectionMode::Toggle));

        assert!(sel.is_empty());
        assert_eq!(sel.primary(), None);
    }

    #[test]
    fn test_remove_primary_falls_back() {
        let n = ids(2);
        let mut sel = Selection::new();
        sel.set([n[0], n[1], n[0]]);
        assert_eq!(sel.nodes(), &[n[0], n[1]]);
        assert_eq!(sel.primary(), Some(n[1]));

        assert!(sel.remove(n[1]));
        assert_eq!(sel.primary(), Some(n[0]));
        assert!(!sel.remove(n[1]));
    }

    #[test]
    fn test_from_modifiers() {
        assert_eq!(SelectionMode::from_modifiers(false, false), SelectionMode::Replace);
        assert_eq!(SelectionMode::from_modifiers(true, true), SelectionMode::Toggle);
    }
}
