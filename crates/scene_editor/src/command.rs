//! Undoable commands.
//!
//! Every change made inside a document transaction is captured as a list
//! of [`EditOp`]s. Undo reverts them newest first; redo replays them in
//! their original order.

use scene_graph::{GraphEvent, NodeId, SceneGraph};
use scene_schema::AttributeValue;

use crate::context::SceneEditingContext;
use crate::error::EditorError;

/// Result type for command execution.
pub type CommandResult = Result<(), EditorError>;

/// A single primitive graph change
#[derive(Clone, Debug, PartialEq)]
pub enum EditOp {
    SetAttribute {
        node: NodeId,
        attribute: String,
        old_value: AttributeValue,
        new_value: AttributeValue,
    },
    InsertChild {
        parent: NodeId,
        child: NodeId,
        index: usize,
    },
    RemoveChild {
        parent: NodeId,
        child: NodeId,
        index: usize,
    },
}

impl EditOp {
    /// The op describing a completed change, if the event is one
    pub fn from_event(event: &GraphEvent) -> Option<Self> {
        match event {
            GraphEvent::AttributeChanged {
                node,
                attribute,
                old_value,
                new_value,
            } => Some(Self::SetAttribute {
                node: *node,
                attribute: attribute.clone(),
                old_value: old_value.clone(),
                new_value: new_value.clone(),
            }),
            GraphEvent::ChildInserted { parent, child, index } => Some(Self::InsertChild {
                parent: *parent,
                child: *child,
                index: *index,
            }),
            GraphEvent::ChildRemoved { parent, child, index } => Some(Self::RemoveChild {
                parent: *parent,
                child: *child,
                index: *index,
            }),
            GraphEvent::ChildRemoving { .. } => None,
        }
    }

    /// Perform the change again
    pub fn apply(&self, graph: &mut SceneGraph) -> scene_graph::Result<()> {
        match self {
            Self::SetAttribute { node, attribute, new_value, .. } => {
                graph.set_attribute(*node, attribute, new_value.clone())?;
            }
            Self::InsertChild { parent, child, index } => {
                graph.insert_at(*parent, *index, *child)?;
            }
            Self::RemoveChild { parent, child, .. } => {
                graph.remove_child(*parent, *child)?;
            }
        }
        Ok(())
    }

    /// Perform the inverse change
    pub fn revert(&self, graph: &mut SceneGraph) -> scene_graph::Result<()> {
        match self {
            Self::SetAttribute { node, attribute, old_value, .. } => {
                graph.set_attribute(*node, attribute, old_value.clone())?;
            }
            Self::InsertChild { parent, child, .. } => {
                graph.remove_child(*parent, *child)?;
            }
            Self::RemoveChild { parent, child, index } => {
                graph.insert_at(*parent, *index, *child)?;
            }
        }
        Ok(())
    }
}

/// A command that can be executed, undone, and redone.
///
/// Commands operate on a document's editing context and must leave it
/// exactly as they found it when undone.
pub trait Command {
    /// Human-readable description for the undo/redo menu.
    fn description(&self) -> &str;

    /// Execute (or re-execute) the command.
    fn execute(&mut self, context: &mut SceneEditingContext) -> CommandResult;

    /// Undo the command, restoring the previous state.
    fn undo(&mut self, context: &mut SceneEditingContext) -> CommandResult;

}

/// The ops recorded by one transaction, undone as a unit
#[derive(Debug)]
pub struct RecordedEdit {
    description: String,
    ops: Vec<EditOp>,
}

impl RecordedEdit {
    pub fn new(description: impl Into<String>, ops: Vec<EditOp>) -> Self {
        Self {
            description: description.into(),
            ops,
        }
    }

    pub fn ops(&self) -> &[EditOp] {
        &self.ops
    }
}

impl Command for RecordedEdit {
    fn description(&self) -> &str {
        &self.description
    }

    /// Replays every op. If one fails, the ops already replayed are
    /// reverted so the graph is left as it was.
    fn execute(&mut self, context: &mut SceneEditingContext) -> CommandResult {
        let graph = context.graph_mut()?;
        for (done, op) in self.ops.iter().enumerate() {
            if let Err(e) = op.apply(graph) {
                roll_back(graph, self.ops[..done].iter().rev(), EditOp::revert);
                return Err(e.into());
            }
        }
        Ok(())
    }

    /// Reverts every op, newest first, with the same all-or-nothing rule
    fn undo(&mut self, context: &mut SceneEditingContext) -> CommandResult {
        let graph = context.graph_mut()?;
        for (pending, op) in self.ops.iter().enumerate().rev() {
            if let Err(e) = op.revert(graph) {
                roll_back(graph, self.ops[pending + 1..].iter(), EditOp::apply);
                return Err(e.into());
            }
        }
        Ok(())
    }
}

fn roll_back<'a>(
    graph: &mut SceneGraph,
    ops: impl Iterator<Item = &'a EditOp>,
    step: fn(&EditOp, &mut SceneGraph) -> scene_graph::Result<()>,
) {
    for op in ops {
        if let Err(e) = step(op, graph) {
            log::warn!("Could not roll back {:?}: {}", op, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scene_graph::SceneTree;

    #[test]
    fn test_ops_round_trip_structure() {
        let mut tree = SceneTree::new(scene_schema::builtin(), "Scene").unwrap();
        let a = tree.graph.create_node_by_name("MeshNode").unwrap();
        let b = tree.graph.create_node_by_name("MeshNode").unwrap();
        tree.graph.append_child(tree.root, a).unwrap();
        tree.graph.append_child(tree.root, b).unwrap();

        let recorded = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let sink = recorded.clone();
        tree.graph.subscribe(move |_, e| sink.borrow_mut().extend(EditOp::from_event(e)));

        // Move b under a, then rename it
        tree.graph.append_child(a, b).unwrap();
        tree.graph.set_attribute(b, "name", "moved").unwrap();
        let ops = recorded.borrow().clone();
        assert_eq!(ops.len(), 3);

        for op in ops.iter().rev() {
            op.revert(&mut tree.graph).unwrap();
        }
        assert_eq!(tree.graph.children(tree.root), &[a, b]);
        assert_eq!(tree.graph.name(b), Some(""));

        for op in &ops {
            op.apply(&mut tree.graph).unwrap();
        }
        assert_eq!(tree.graph.children(a), &[b]);
        assert_eq!(tree.graph.name(b), Some("moved"));
    }

    fn bound_with_cube() -> (SceneEditingContext, NodeId, NodeId) {
        let mut tree = SceneTree::new(scene_schema::builtin(), "Scene").unwrap();
        let cube = tree.graph.create_node_by_name("MeshNode").unwrap();
        tree.graph.set_attribute(cube, "name", "Cube").unwrap();
        tree.graph.append_child(tree.root, cube).unwrap();
        let stray = tree.graph.create_node_by_name("MeshNode").unwrap();
        let mut ctx = SceneEditingContext::new();
        ctx.set_root(Some(tree));
        (ctx, cube, stray)
    }

    fn rename(node: NodeId, from: &str, to: &str) -> EditOp {
        EditOp::SetAttribute {
            node,
            attribute: "name".into(),
            old_value: from.into(),
            new_value: to.into(),
        }
    }

    #[test]
    fn test_failed_execute_rolls_back() {
        let (mut ctx, cube, stray) = bound_with_cube();
        let root = ctx.root().unwrap();
        // The stray node is not a child of the root, so removing it fails
        let mut edit = RecordedEdit::new(
            "Broken",
            vec![
                rename(cube, "Cube", "Box"),
                EditOp::RemoveChild { parent: root, child: stray, index: 1 },
            ],
        );

        assert!(edit.execute(&mut ctx).is_err());
        assert_eq!(ctx.label(cube), Some("Cube"));
        assert_eq!(ctx.items(), &[cube]);
    }

    #[test]
    fn test_failed_undo_rolls_back() {
        let (mut ctx, cube, stray) = bound_with_cube();
        let root = ctx.root().unwrap();
        // Reverting the insert fails because the stray node was never added
        let mut edit = RecordedEdit::new(
            "Broken",
            vec![
                EditOp::InsertChild { parent: root, child: stray, index: 1 },
                rename(cube, "Cube", "Box"),
            ],
        );
        ctx.set_attribute(cube, "name", "Box").unwrap();

        assert!(edit.undo(&mut ctx).is_err());
        assert_eq!(ctx.label(cube), Some("Box"));
        assert_eq!(ctx.items(), &[cube]);
    }
}
