//! Error types for structural and attribute mutations

use scene_schema::AttributeKind;
use thiserror::Error;

use crate::arena::NodeId;

/// Graph mutation errors.
///
/// The structural variants are precondition violations: UI flows gate on the
/// editing context's `can_insert*` checks, so these only surface on
/// programmatic misuse.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// Handle does not refer to a live node of this graph
    #[error("Node not found in graph: {0}")]
    StaleNode(NodeId),

    /// Child's type is not compatible with the slot's base type
    #[error("Type '{child_type}' cannot be a child in slot '{slot}' of '{parent_type}'")]
    InvalidChildType {
        parent_type: String,
        slot: String,
        child_type: String,
    },

    /// Insertion would make a node its own ancestor
    #[error("Inserting {child} under {parent} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },

    /// Child is not currently a child of the given parent
    #[error("{child} is not a child of {parent}")]
    NotFound { parent: NodeId, child: NodeId },

    /// Parent type declares no slot with the requested name
    #[error("Type '{node_type}' has no child slot '{slot}'")]
    NoChildSlot { node_type: String, slot: String },

    /// Type name not declared by the schema
    #[error("Unknown node type: {0}")]
    UnknownType(String),

    /// Attribute name not declared on the node's type
    #[error("Type '{node_type}' has no attribute '{attribute}'")]
    UnknownAttribute { node_type: String, attribute: String },

    /// Value kind does not match the attribute definition
    #[error("Attribute '{attribute}' expects {expected}, got {got}")]
    KindMismatch {
        attribute: String,
        expected: AttributeKind,
        got: AttributeKind,
    },
}

/// Result type for graph operations
pub type Result<T> = std::result::Result<T, GraphError>;
