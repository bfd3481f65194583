//! Scene Editor
//!
//! Editing core for hierarchical scene documents, independent of any UI
//! toolkit.
//!
//! ## Features
//!
//! - **Editing Context**: Tree projection, selection, paste/drop/delete with
//!   legality checks and unique naming
//! - **Undo/Redo**: Transactions recorded from graph events
//! - **Documents**: XML scene files, dirty tracking, text export
//! - **Registry**: Open documents, active document, recent files
//! - **Host Glue**: Control, command and property panel interfaces
//!
//! ## Architecture
//!
//! ```text
//! Host UI → SceneExplorer → SceneDocument::do_transaction → SceneEditingContext → SceneGraph
//!                                                                    ↓
//!                                                             ContextEvent observers
//! ```

mod atomic;
pub mod command;
pub mod commands;
pub mod config;
pub mod context;
pub mod document;
pub mod editor;
pub mod error;
pub mod export;
pub mod history;
pub mod host;
pub mod palette;
pub mod payload;
pub mod properties;
pub mod registry;
pub mod selection;
pub mod xml;

// Re-export commonly used types
pub use command::{Command, CommandResult, EditOp, RecordedEdit};
pub use commands::SceneCommand;
pub use config::{ConfigError, EditorConfig};
pub use context::{ContextEvent, ObserverId, SceneEditingContext};
pub use document::{export_path, SceneDocument};
pub use editor::{DropEffect, DropTarget, SceneExplorer};
pub use error::{EditorError, PersistenceError, Result};
pub use history::UndoHistory;
pub use palette::{NodePalette, PaletteItem};
pub use payload::{Payload, PayloadItem};
pub use registry::{DocumentId, DocumentRegistry, OpenDocument, RecentFiles, RegistryEvent};
pub use selection::{Selection, SelectionMode};
