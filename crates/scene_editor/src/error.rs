//! Error types for the editing layer

use std::path::PathBuf;

use scene_graph::{GraphError, NodeId};
use scene_schema::SchemaLoadError;
use thiserror::Error;

use crate::config::ConfigError;

/// Scene file read/write errors.
///
/// A failed write never replaces the destination file.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("XML error: {0}")]
    Xml(String),

    #[error("Malformed scene file: {0}")]
    Malformed(String),

    #[error("Invalid scene content: {0}")]
    Graph(#[from] GraphError),
}

impl PersistenceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Editing, document and command errors
#[derive(Debug, Error)]
pub enum EditorError {
    /// The context has no scene bound
    #[error("No scene is bound to the editing context")]
    Unbound,

    /// Node is not part of the bound scene
    #[error("{0} is not part of the bound scene")]
    NotInScene(NodeId),

    /// Payload is empty, carries foreign items or does not fit the target
    #[error("Payload cannot be inserted: {0}")]
    InvalidPayload(String),

    /// A transaction is already recording
    #[error("Transaction '{0}' is already open")]
    TransactionOpen(String),

    /// Document has never been saved and has no path
    #[error("Document '{0}' has no file path")]
    Untitled(String),

    /// Command is disabled in the current state
    #[error("Command '{0}' is not available")]
    CommandUnavailable(&'static str),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Schema(#[from] SchemaLoadError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for editor operations
pub type Result<T> = std::result::Result<T, EditorError>;
