//! Interfaces the host application implements
//!
//! The editor never touches widgets. It describes what it wants shown and
//! hands structured data to whichever host implements these traits.

use scene_graph::NodeId;
use scene_schema::AttributeValue;

use crate::commands::SceneCommand;
use crate::properties::PropertyDescriptor;

/// Handle of a registered control
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ControlId(pub u64);

/// Where a control docks
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DockGroup {
    #[default]
    Left,
    Right,
    Bottom,
    Center,
}

/// Description of a hosted control
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControlInfo {
    pub name: String,
    pub description: String,
    pub group: DockGroup,
}

/// Docking service
pub trait ControlHost {
    fn register_control(&mut self, info: ControlInfo) -> ControlId;
    fn show_control(&mut self, id: ControlId);
    fn unregister_control(&mut self, id: ControlId);
}

/// Menu service
pub trait CommandRegistrar {
    fn register_command(&mut self, command: SceneCommand);
}

/// What the property panel should show for one node
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyTarget {
    pub node: NodeId,
    /// Qualified type name
    pub type_name: String,
    pub properties: Vec<(PropertyDescriptor, AttributeValue)>,
}

/// Property panel service; `None` clears the panel
pub trait PropertyBinder {
    fn bind(&mut self, target: Option<PropertyTarget>);
}
