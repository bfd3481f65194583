//! Scene Explorer plugin
//!
//! Wires a scene document into the host: the tree control, the two export
//! commands, drag and drop onto the tree, and the property panel.

use scene_graph::NodeId;

use crate::commands::SceneCommand;
use crate::document::SceneDocument;
use crate::error::Result;
use crate::host::{CommandRegistrar, ControlHost, ControlId, ControlInfo, DockGroup, PropertyBinder, PropertyTarget};
use crate::payload::Payload;
use crate::properties::node_properties;

/// Name of the tree control
pub const CONTROL_NAME: &str = "Scene Explorer";
/// History entry for a drop
pub const DRAG_AND_DROP: &str = "Drag and Drop";

/// Where a drop lands in the tree
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropTarget {
    /// Empty space: append to the root
    Root,
    /// Onto a node: append to its children
    Under(NodeId),
    /// Between two rows: after `after` among `parent`'s children, or first
    /// when `after` is `None`
    Between { parent: NodeId, after: Option<NodeId> },
}

/// Cursor feedback while dragging
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropEffect {
    Move,
    None,
}

/// The tree-view plugin
#[derive(Debug, Default)]
pub struct SceneExplorer {
    control: Option<ControlId>,
}

impl SceneExplorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the tree control and the export commands
    pub fn initialize(&mut self, host: &mut dyn ControlHost, commands: &mut dyn CommandRegistrar) {
        let id = host.register_control(ControlInfo {
            name: CONTROL_NAME.to_string(),
            description: "Scene graph of the active document".to_string(),
            group: DockGroup::Left,
        });
        host.show_control(id);
        self.control = Some(id);

        for command in SceneCommand::ALL {
            commands.register_command(command);
        }
        log::debug!("{} registered as {:?}", CONTROL_NAME, id);
    }

    pub fn shutdown(&mut self, host: &mut dyn ControlHost) {
        if let Some(id) = self.control.take() {
            host.unregister_control(id);
        }
    }

    pub fn control(&self) -> Option<ControlId> {
        self.control
    }

    /// Whether `payload` may be dropped on `target`
    pub fn drag_over(&self, document: &SceneDocument, target: DropTarget, payload: &Payload) -> DropEffect {
        let context = document.context();
        let accepted = match target {
            DropTarget::Root => context.can_insert(payload),
            DropTarget::Under(parent) => context.can_insert_under(Some(parent), payload),
            DropTarget::Between { parent, after } => context.can_insert_between(parent, after, payload),
        };
        if accepted {
            DropEffect::Move
        } else {
            DropEffect::None
        }
    }

    /// Insert copies of the payload at `target` as one undoable step.
    ///
    /// Dropped nodes are always copies; the drag source is left untouched.
    pub fn drag_drop(&self, document: &mut SceneDocument, target: DropTarget, payload: &Payload) -> Result<Vec<NodeId>> {
        document.do_transaction(DRAG_AND_DROP, |context| match target {
            DropTarget::Root => context.insert(payload),
            DropTarget::Under(parent) => context.insert_under(Some(parent), payload),
            DropTarget::Between { parent, after } => context.insert_between(parent, after, payload),
        })
    }

    /// Show the primary selection in the property panel
    pub fn bind_selection(&self, document: &SceneDocument, binder: &mut dyn PropertyBinder) {
        let context = document.context();
        let target = context
            .selection()
            .primary()
            .zip(context.graph())
            .and_then(|(node, graph)| {
                let type_name = graph.node_type(node).ok()?.name().to_string();
                let properties = node_properties(graph, node)
                    .map_err(|e| log::warn!("No properties for {}: {}", node, e))
                    .ok()?;
                Some(PropertyTarget {
                    node,
                    type_name,
                    properties,
                })
            });
        binder.bind(target);
    }
}
