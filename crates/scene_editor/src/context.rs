//! Scene editing context
//!
//! Mediates every edit to a bound scene tree: the tree-view projection,
//! selection, insertion with legality checks, copy/cut/delete, unique
//! naming, and translation of graph events into view-level events.
//!
//! The context is either **unbound** (no tree) or **bound** to a tree it
//! exclusively owns. Binding subscribes to the tree's graph, runs the
//! naming pass and emits [`ContextEvent::Reloaded`].

use std::cell::RefCell;
use std::rc::Rc;

use scene_graph::{GraphEvent, NodeFragment, NodeId, SceneGraph, SceneTree, SubscriberId, UniqueNamer};
use scene_schema::{AttributeValue, NAME_ATTRIBUTE};

use crate::command::EditOp;
use crate::error::{EditorError, Result};
use crate::payload::Payload;
use crate::selection::{Selection, SelectionMode};

/// View-level change notification
#[derive(Clone, Debug, PartialEq)]
pub enum ContextEvent {
    /// `item` now appears at `index` among `parent`'s children
    ItemInserted {
        index: usize,
        item: NodeId,
        parent: NodeId,
    },
    /// `item` no longer appears at `index` among `parent`'s children
    ItemRemoved {
        index: usize,
        item: NodeId,
        parent: NodeId,
    },
    /// An attribute of `item` changed
    ItemChanged { item: NodeId },
    /// The whole tree was replaced or cleared
    Reloaded,
    /// The selection changed; carries the new selection in order
    SelectionChanged { selection: Vec<NodeId> },
}

/// Observer registration handle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Observer = Box<dyn FnMut(&ContextEvent)>;

/// State shared with the graph listener
#[derive(Default)]
struct ViewState {
    observers: Vec<(ObserverId, Observer)>,
    next_observer_id: u64,
    dirty: bool,
    last_remove_index: Option<usize>,
    recording: Option<Vec<EditOp>>,
}

impl ViewState {
    fn notify(&mut self, event: &ContextEvent) {
        for (_, observer) in self.observers.iter_mut() {
            observer(event);
        }
    }

    /// Translate a graph event for the tree bound at `root`
    fn on_graph_event(&mut self, graph: &SceneGraph, root: NodeId, event: &GraphEvent) {
        if let Some(ops) = self.recording.as_mut() {
            ops.extend(EditOp::from_event(event));
        }

        if graph.root_of(event.target()) != root {
            return;
        }

        match event {
            GraphEvent::AttributeChanged { node, .. } => {
                self.dirty = true;
                self.notify(&ContextEvent::ItemChanged { item: *node });
            }
            GraphEvent::ChildInserted { parent, child, .. } => {
                if let Some(index) = view_index(graph, *parent, *child) {
                    self.dirty = true;
                    self.notify(&ContextEvent::ItemInserted {
                        index,
                        item: *child,
                        parent: *parent,
                    });
                }
            }
            GraphEvent::ChildRemoving { parent, child, .. } => {
                self.last_remove_index = view_index(graph, *parent, *child);
            }
            GraphEvent::ChildRemoved { parent, child, .. } => {
                if let Some(index) = self.last_remove_index.take() {
                    self.dirty = true;
                    self.notify(&ContextEvent::ItemRemoved {
                        index,
                        item: *child,
                        parent: *parent,
                    });
                }
            }
        }
    }
}

/// Position of `child` in the projection a tree view shows for `parent`
fn view_index(graph: &SceneGraph, parent: NodeId, child: NodeId) -> Option<usize> {
    graph.children(parent).iter().position(|c| *c == child)
}

struct Binding {
    tree: SceneTree,
    subscription: SubscriberId,
}

/// The stateful mediator between a scene tree and its views
pub struct SceneEditingContext {
    binding: Option<Binding>,
    selection: Selection,
    namer: UniqueNamer,
    state: Rc<RefCell<ViewState>>,
}

impl Default for SceneEditingContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneEditingContext {
    /// An unbound context
    pub fn new() -> Self {
        Self {
            binding: None,
            selection: Selection::new(),
            namer: UniqueNamer::new(),
            state: Rc::new(RefCell::new(ViewState::default())),
        }
    }

    // ---------------------------------------------------------------------
    // Binding
    // ---------------------------------------------------------------------

    /// Bind a tree (or unbind with `None`), returning the previous tree.
    ///
    /// Unsubscribes from the old tree, forgets every reserved name, clears
    /// the selection, then subscribes to the new tree and makes its names
    /// unique. Observers get a single `Reloaded` at the end.
    ///
    /// The context starts clean unless the naming pass had to rename a
    /// node, in which case the renamed tree is dirty until saved.
    pub fn set_root(&mut self, tree: Option<SceneTree>) -> Option<SceneTree> {
        let previous = self.binding.take().map(|mut binding| {
            binding.tree.graph.unsubscribe(binding.subscription);
            binding.tree
        });
        self.namer.clear();
        let selection_cleared = self.selection.clear();

        {
            let mut state = self.state.borrow_mut();
            state.last_remove_index = None;
            state.recording = None;
            state.dirty = false;
        }

        if let Some(mut tree) = tree {
            let root = tree.root;
            let state = Rc::clone(&self.state);
            let subscription = tree.graph.subscribe(move |graph, event| {
                state.borrow_mut().on_graph_event(graph, root, event);
            });
            log::debug!("Bound scene {} ({} nodes)", root, tree.graph.len());
            self.binding = Some(Binding { tree, subscription });

            if let Err(e) = self.ensure_unique_names(root) {
                log::warn!("Naming pass failed: {}", e);
            }
        } else {
            log::debug!("Unbound editing context");
        }

        if selection_cleared {
            self.notify_selection();
        }
        self.state.borrow_mut().notify(&ContextEvent::Reloaded);
        previous
    }

    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    /// Root of the bound tree
    pub fn root(&self) -> Option<NodeId> {
        self.binding.as_ref().map(|b| b.tree.root)
    }

    pub fn tree(&self) -> Option<&SceneTree> {
        self.binding.as_ref().map(|b| &b.tree)
    }

    pub fn graph(&self) -> Option<&SceneGraph> {
        self.binding.as_ref().map(|b| &b.tree.graph)
    }

    pub fn graph_mut(&mut self) -> Result<&mut SceneGraph> {
        self.binding
            .as_mut()
            .map(|b| &mut b.tree.graph)
            .ok_or(EditorError::Unbound)
    }

    fn bound(&self) -> Result<&SceneTree> {
        self.tree().ok_or(EditorError::Unbound)
    }

    /// True if `node` is reachable from the bound root
    pub fn contains(&self, node: NodeId) -> bool {
        self.binding
            .as_ref()
            .is_some_and(|b| b.tree.graph.contains(node) && b.tree.graph.root_of(node) == b.tree.root)
    }

    fn require_in_scene(&self, node: NodeId) -> Result<()> {
        self.bound()?;
        if self.contains(node) {
            Ok(())
        } else {
            Err(EditorError::NotInScene(node))
        }
    }

    // ---------------------------------------------------------------------
    // Tree view projection
    // ---------------------------------------------------------------------

    /// Direct children of `node`; empty if it is not in the bound tree
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        match &self.binding {
            Some(b) if self.contains(node) => b.tree.graph.children(node),
            _ => &[],
        }
    }

    pub fn has_children(&self, node: NodeId) -> bool {
        !self.children(node).is_empty()
    }

    /// Display label: the node's name attribute
    pub fn label(&self, node: NodeId) -> Option<&str> {
        self.graph().and_then(|g| g.name(node))
    }

    pub fn is_leaf(&self, node: NodeId) -> bool {
        !self.has_children(node)
    }

    /// Enumerable items: the root's children
    pub fn items(&self) -> &[NodeId] {
        match self.root() {
            Some(root) => self.children(root),
            None => &[],
        }
    }

    // ---------------------------------------------------------------------
    // Insertion
    // ---------------------------------------------------------------------

    /// True iff the payload can be pasted or dropped onto the root
    pub fn can_insert(&self, payload: &Payload) -> bool {
        self.root()
            .is_some_and(|root| self.check_insert(root, payload).is_ok())
    }

    /// True iff the payload fits under `parent` (the root when `None`)
    pub fn can_insert_under(&self, parent: Option<NodeId>, payload: &Payload) -> bool {
        parent
            .or(self.root())
            .is_some_and(|p| self.check_insert(p, payload).is_ok())
    }

    /// True iff the payload fits as siblings under `parent`
    pub fn can_insert_between(&self, parent: NodeId, _before: Option<NodeId>, payload: &Payload) -> bool {
        self.check_insert(parent, payload).is_ok()
    }

    /// Paste/drop at the end of the root's children.
    ///
    /// The new top-level nodes become the selection.
    pub fn insert(&mut self, payload: &Payload) -> Result<Vec<NodeId>> {
        let root = self.bound()?.root;
        let inserted = self.place(root, usize::MAX, payload)?;
        if self.selection.set(inserted.iter().copied()) {
            self.notify_selection();
        }
        Ok(inserted)
    }

    /// Append the payload under `parent` (the root when `None`)
    pub fn insert_under(&mut self, parent: Option<NodeId>, payload: &Payload) -> Result<Vec<NodeId>> {
        let parent = match parent {
            Some(p) => p,
            None => self.bound()?.root,
        };
        self.place(parent, usize::MAX, payload)
    }

    /// Insert the payload under `parent` right after `before`.
    ///
    /// `None` inserts at the front; a sibling that is not found appends.
    pub fn insert_between(
        &mut self,
        parent: NodeId,
        before: Option<NodeId>,
        payload: &Payload,
    ) -> Result<Vec<NodeId>> {
        let siblings = self.children(parent);
        let index = match before {
            None => 0,
            Some(sibling) => siblings
                .iter()
                .position(|c| *c == sibling)
                .map_or(siblings.len(), |i| i + 1),
        };
        self.place(parent, index, payload)
    }

    fn check_insert(&self, parent: NodeId, payload: &Payload) -> Result<()> {
        self.require_in_scene(parent)?;
        let fragments = insertable_fragments(payload)?;
        let graph = &self.bound()?.graph;
        for fragment in fragments {
            let ty = graph
                .schema()
                .find(&fragment.node_type)
                .map(|t| t.id())
                .ok_or_else(|| scene_graph::GraphError::UnknownType(fragment.node_type.clone()))?;
            graph.accepts(parent, ty)?;
            graph.validate_fragment(fragment)?;
        }
        Ok(())
    }

    /// Instantiate, rename and attach. Nothing is attached unless every
    /// fragment fits.
    fn place(&mut self, parent: NodeId, index: usize, payload: &Payload) -> Result<Vec<NodeId>> {
        self.check_insert(parent, payload)?;
        let fragments = insertable_fragments(payload)?;

        let mut created = Vec::with_capacity(fragments.len());
        for fragment in fragments {
            created.push(self.graph_mut()?.instantiate(fragment)?);
        }
        for id in &created {
            self.ensure_unique_names(*id)?;
        }

        let graph = self.graph_mut()?;
        let mut at = index;
        for id in &created {
            at = graph.insert_at(parent, at, *id)? + 1;
        }
        log::debug!("Inserted {} nodes under {}", created.len(), parent);
        Ok(created)
    }

    /// Reserve the name of every editable node under `top`, renaming on
    /// collision
    fn ensure_unique_names(&mut self, top: NodeId) -> Result<()> {
        let Some(binding) = self.binding.as_mut() else {
            return Err(EditorError::Unbound);
        };
        let graph = &mut binding.tree.graph;
        let nodes: Vec<NodeId> = graph.subtree(top).collect();
        for id in nodes {
            if !graph.is_editable(id) {
                continue;
            }
            let name = graph.name(id).unwrap_or_default().to_string();
            let unique = self.namer.reserve(&name);
            if unique != name {
                log::debug!("Renamed '{}' to '{}'", name, unique);
                graph.set_attribute(id, NAME_ATTRIBUTE, unique)?;
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Instancing
    // ---------------------------------------------------------------------

    /// Snapshot the selection. `None` when nothing is selected.
    ///
    /// Selected nodes whose ancestor is also selected are carried inside
    /// the ancestor's fragment only.
    pub fn copy(&self) -> Option<Payload> {
        let graph = self.graph()?;
        let roots = self.selection_roots();
        if roots.is_empty() {
            return None;
        }
        roots
            .into_iter()
            .map(|id| graph.snapshot(id))
            .collect::<scene_graph::Result<Vec<NodeFragment>>>()
            .map(|fragments| fragments.into_iter().collect())
            .map_err(|e| log::warn!("Copy failed: {}", e))
            .ok()
    }

    /// Copy, then delete the selection
    pub fn cut(&mut self) -> Result<Option<Payload>> {
        let payload = self.copy();
        if payload.is_some() {
            self.delete()?;
        }
        Ok(payload)
    }

    /// Remove every selected node from its parent and clear the selection
    pub fn delete(&mut self) -> Result<()> {
        if self.selection.is_empty() {
            return Ok(());
        }
        let roots = self.selection_roots();
        let graph = self.graph_mut()?;
        for id in &roots {
            graph.detach(*id)?;
        }
        log::debug!("Deleted {} nodes", roots.len());
        if self.selection.clear() {
            self.notify_selection();
        }
        Ok(())
    }

    pub fn can_copy(&self) -> bool {
        !self.selection.is_empty()
    }

    pub fn can_delete(&self) -> bool {
        !self.selection.is_empty()
    }

    /// Selected in-scene nodes with no selected ancestor, in selection order.
    ///
    /// The bound root has no parent to be removed from, so it never counts,
    /// neither as a candidate nor as an ancestor hiding its descendants.
    fn selection_roots(&self) -> Vec<NodeId> {
        let Some(graph) = self.graph() else {
            return Vec::new();
        };
        let candidates: Vec<NodeId> = self
            .selection
            .nodes()
            .iter()
            .copied()
            .filter(|id| self.contains(*id) && graph.parent(*id).is_some())
            .collect();
        candidates
            .iter()
            .copied()
            .filter(|id| !candidates.iter().any(|other| graph.is_ancestor(*other, *id)))
            .collect()
    }

    // ---------------------------------------------------------------------
    // Selection
    // ---------------------------------------------------------------------

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Replace the selection. Nodes outside the bound tree are ignored.
    pub fn set_selection(&mut self, nodes: impl IntoIterator<Item = NodeId>) {
        let nodes: Vec<NodeId> = nodes.into_iter().filter(|id| self.contains(*id)).collect();
        if self.selection.set(nodes) {
            self.notify_selection();
        }
    }

    /// Apply a single pick with modifier semantics
    pub fn select(&mut self, node: NodeId, mode: SelectionMode) {
        if !self.contains(node) {
            return;
        }
        if self.selection.select(node, mode) {
            self.notify_selection();
        }
    }

    pub fn clear_selection(&mut self) {
        if self.selection.clear() {
            self.notify_selection();
        }
    }

    /// Drop selected nodes that are no longer in the bound tree
    pub fn prune_selection(&mut self) {
        let binding = self.binding.as_ref();
        let changed = self.selection.retain(|id| {
            binding.is_some_and(|b| b.tree.graph.contains(id) && b.tree.graph.root_of(id) == b.tree.root)
        });
        if changed {
            self.notify_selection();
        }
    }

    fn notify_selection(&self) {
        let event = ContextEvent::SelectionChanged {
            selection: self.selection.nodes().to_vec(),
        };
        self.state.borrow_mut().notify(&event);
    }

    // ---------------------------------------------------------------------
    // Attributes
    // ---------------------------------------------------------------------

    /// Set an attribute on a node of the bound tree.
    ///
    /// Renaming an editable node goes through the naming service, so the
    /// value applied may carry a suffix. Returns the applied value.
    pub fn set_attribute(
        &mut self,
        node: NodeId,
        attribute: &str,
        value: impl Into<AttributeValue>,
    ) -> Result<AttributeValue> {
        self.require_in_scene(node)?;
        let mut value = value.into();

        let graph = self.graph_mut()?;
        let is_rename = attribute == NAME_ATTRIBUTE && graph.is_editable(node);
        if is_rename {
            if let AttributeValue::String(requested) = &value {
                if graph.name(node) == Some(requested.as_str()) {
                    return Ok(value);
                }
                value = AttributeValue::String(self.namer.reserve(requested));
            }
        }

        self.graph_mut()?.set_attribute(node, attribute, value.clone())?;
        Ok(value)
    }

    // ---------------------------------------------------------------------
    // Observation and dirty tracking
    // ---------------------------------------------------------------------

    /// Register an observer for view-level events
    pub fn observe<F>(&mut self, observer: F) -> ObserverId
    where
        F: FnMut(&ContextEvent) + 'static,
    {
        let mut state = self.state.borrow_mut();
        state.next_observer_id += 1;
        let id = ObserverId(state.next_observer_id);
        state.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unobserve(&mut self, id: ObserverId) -> bool {
        let mut state = self.state.borrow_mut();
        let before = state.observers.len();
        state.observers.retain(|(oid, _)| *oid != id);
        state.observers.len() != before
    }

    /// True if the bound tree changed since binding or the last save
    pub fn is_dirty(&self) -> bool {
        self.state.borrow().dirty
    }

    pub fn set_dirty(&mut self, dirty: bool) {
        self.state.borrow_mut().dirty = dirty;
    }

    // ---------------------------------------------------------------------
    // Transaction recording
    // ---------------------------------------------------------------------

    pub fn is_recording(&self) -> bool {
        self.state.borrow().recording.is_some()
    }

    /// Start capturing every graph change as an [`EditOp`]
    pub(crate) fn begin_recording(&mut self) -> bool {
        let mut state = self.state.borrow_mut();
        if state.recording.is_some() {
            return false;
        }
        state.recording = Some(Vec::new());
        true
    }

    pub(crate) fn end_recording(&mut self) -> Vec<EditOp> {
        self.state.borrow_mut().recording.take().unwrap_or_default()
    }
}

fn insertable_fragments(payload: &Payload) -> Result<Vec<&NodeFragment>> {
    if payload.is_empty() {
        return Err(EditorError::InvalidPayload("empty payload".into()));
    }
    payload
        .fragments()
        .ok_or_else(|| EditorError::InvalidPayload("payload carries non-node items".into()))
}

impl std::fmt::Debug for SceneEditingContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneEditingContext")
            .field("root", &self.root())
            .field("selection", &self.selection)
            .field("dirty", &self.is_dirty())
            .finish()
    }
}
