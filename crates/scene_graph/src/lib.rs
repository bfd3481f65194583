//! # scene_graph - Typed Scene Node Model
//!
//! In-memory scene trees built on a schema from `scene_schema`:
//!
//! - Generational node handles ([`NodeId`]) into a per-graph arena
//! - Typed attribute storage with defaults
//! - Ordered child lists with slot compatibility and cycle checks
//! - Synchronous change notification ([`GraphEvent`])
//! - Arena-independent snapshots ([`NodeFragment`]) for clipboard and drag
//! - Per-document unique naming ([`UniqueNamer`])
//!
//! ```ignore
//! let mut tree = SceneTree::new(scene_schema::builtin(), "Scene")?;
//! let cube = tree.graph.create_node_by_name("MeshNode")?;
//! tree.graph.set_attribute(cube, "name", "Cube")?;
//! tree.graph.append_child(tree.root, cube)?;
//! ```

mod arena;
pub mod error;
pub mod event;
pub mod fragment;
pub mod graph;
pub mod naming;

pub use arena::NodeId;
pub use error::{GraphError, Result};
pub use event::{GraphEvent, Listener, SubscriberId};
pub use fragment::NodeFragment;
pub use graph::{SceneGraph, SceneTree, Subtree};
pub use naming::UniqueNamer;
