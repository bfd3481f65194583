//! Scene documents
//!
//! A document owns one editing context, the undo history for it, and the
//! location the scene is saved to.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use scene_graph::SceneTree;
use scene_schema::TypeHierarchy;

use crate::command::RecordedEdit;
use crate::config::EditorConfig;
use crate::context::SceneEditingContext;
use crate::error::{EditorError, Result};
use crate::history::UndoHistory;
use crate::{export, xml};

/// Extension of editable scene files
pub const SOURCE_EXTENSION: &str = "source_scene";
/// Extension of text exports
pub const EXPORT_EXTENSION: &str = "scene";

const UNTITLED: &str = "Untitled.source_scene";

/// An open scene file
pub struct SceneDocument {
    uri: PathBuf,
    untitled: bool,
    schema: Arc<TypeHierarchy>,
    context: SceneEditingContext,
    history: UndoHistory,
    xml_indent: usize,
}

impl SceneDocument {
    /// A new document holding an empty scene named "Scene"
    pub fn new_untitled(schema: Arc<TypeHierarchy>) -> Result<Self> {
        let tree = SceneTree::new(Arc::clone(&schema), "Scene")?;
        Ok(Self::with_tree(schema, tree, PathBuf::from(UNTITLED), true))
    }

    /// Open an existing scene file
    pub fn open(schema: Arc<TypeHierarchy>, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let tree = xml::load_scene(Arc::clone(&schema), &path)?;
        Ok(Self::with_tree(schema, tree, path, false))
    }

    fn with_tree(schema: Arc<TypeHierarchy>, tree: SceneTree, uri: PathBuf, untitled: bool) -> Self {
        let mut context = SceneEditingContext::new();
        context.set_root(Some(tree));
        Self {
            uri,
            untitled,
            schema,
            context,
            history: UndoHistory::new(),
            xml_indent: 2,
        }
    }

    /// Apply the undo depth and file indentation from `config`
    pub fn configured(self, config: &EditorConfig) -> Self {
        self.with_undo_limit(config.max_undo)
            .with_xml_indent(config.xml_indent)
    }

    /// Replaces the history, so call it before any edit
    pub fn with_undo_limit(mut self, max_size: usize) -> Self {
        self.history = UndoHistory::with_capacity(max_size);
        self
    }

    pub fn with_xml_indent(mut self, indent: usize) -> Self {
        self.xml_indent = indent;
        self
    }

    // =========================================================================
    // Metadata
    // =========================================================================

    pub fn uri(&self) -> &Path {
        &self.uri
    }

    /// True until the document is first saved
    pub fn is_untitled(&self) -> bool {
        self.untitled
    }

    pub fn schema(&self) -> &Arc<TypeHierarchy> {
        &self.schema
    }

    pub fn is_dirty(&self) -> bool {
        self.context.is_dirty()
    }

    /// File name, with a trailing `*` when there are unsaved changes
    pub fn display_name(&self) -> String {
        let name = self
            .uri
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.uri.display().to_string());
        if self.is_dirty() {
            format!("{}*", name)
        } else {
            name
        }
    }

    /// Full path of the document
    pub fn description(&self) -> String {
        self.uri.display().to_string()
    }

    pub fn context(&self) -> &SceneEditingContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut SceneEditingContext {
        &mut self.context
    }

    pub fn history(&self) -> &UndoHistory {
        &self.history
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Save to the document's own path
    pub fn save(&mut self) -> Result<()> {
        if self.untitled {
            return Err(EditorError::Untitled(self.display_name()));
        }
        let tree = self.context.tree().ok_or(EditorError::Unbound)?;
        xml::save_scene(&tree.graph, tree.root, &self.uri, self.xml_indent)?;
        self.context.set_dirty(false);
        Ok(())
    }

    /// Save to `path`, which becomes the document's path on success
    pub fn save_as(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        let tree = self.context.tree().ok_or(EditorError::Unbound)?;
        xml::save_scene(&tree.graph, tree.root, &path, self.xml_indent)?;
        self.uri = path;
        self.untitled = false;
        self.context.set_dirty(false);
        Ok(())
    }

    /// Write the text export next to the document
    pub fn export(&self) -> Result<PathBuf> {
        let path = export_path(&self.uri);
        self.export_to(&path)?;
        Ok(path)
    }

    pub fn export_to(&self, path: &Path) -> Result<()> {
        let tree = self.context.tree().ok_or(EditorError::Unbound)?;
        export::write_text(&tree.graph, tree.root, path)?;
        Ok(())
    }

    // =========================================================================
    // Transactions
    // =========================================================================

    /// Run `edit` as one undoable step.
    ///
    /// Every graph change `edit` makes is recorded. On success the changes
    /// become a single history entry named `name`; on failure they are
    /// reverted and the error is returned.
    pub fn do_transaction<T, F>(&mut self, name: &str, edit: F) -> Result<T>
    where
        F: FnOnce(&mut SceneEditingContext) -> Result<T>,
    {
        if !self.context.begin_recording() {
            return Err(EditorError::TransactionOpen(name.to_string()));
        }
        let was_dirty = self.context.is_dirty();

        let result = edit(&mut self.context);
        let ops = self.context.end_recording();

        match result {
            Ok(value) => {
                if !ops.is_empty() {
                    log::debug!("Transaction '{}' recorded {} ops", name, ops.len());
                    self.history.push(Box::new(RecordedEdit::new(name, ops)));
                }
                Ok(value)
            }
            Err(e) => {
                log::warn!("Transaction '{}' failed, reverting {} ops: {}", name, ops.len(), e);
                if let Ok(graph) = self.context.graph_mut() {
                    for op in ops.iter().rev() {
                        if let Err(revert) = op.revert(graph) {
                            log::warn!("Could not revert {:?}: {}", op, revert);
                        }
                    }
                }
                self.context.set_dirty(was_dirty);
                self.context.prune_selection();
                Err(e)
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Undo the latest transaction. Returns `false` if there was none.
    pub fn undo(&mut self) -> Result<bool> {
        let Some(mut command) = self.history.pop_undo() else {
            return Ok(false);
        };
        let was_dirty = self.context.is_dirty();
        if let Err(e) = command.undo(&mut self.context) {
            log::warn!("Undo of '{}' failed: {}", command.description(), e);
            self.context.set_dirty(was_dirty);
            self.history.push_to_undo(command);
            return Err(e);
        }
        self.history.push_to_redo(command);
        self.context.set_dirty(true);
        self.context.prune_selection();
        Ok(true)
    }

    /// Redo the latest undone transaction. Returns `false` if there was none.
    pub fn redo(&mut self) -> Result<bool> {
        let Some(mut command) = self.history.pop_redo() else {
            return Ok(false);
        };
        let was_dirty = self.context.is_dirty();
        if let Err(e) = command.execute(&mut self.context) {
            log::warn!("Redo of '{}' failed: {}", command.description(), e);
            self.context.set_dirty(was_dirty);
            self.history.push_to_redo(command);
            return Err(e);
        }
        self.history.push_to_undo(command);
        self.context.set_dirty(true);
        self.context.prune_selection();
        Ok(true)
    }

    /// Forget undo history and free nodes only it could have restored
    pub fn clear_history(&mut self) {
        self.history.clear();
        if let Some(root) = self.context.root() {
            if let Ok(graph) = self.context.graph_mut() {
                let purged = graph.purge_unreachable(root);
                log::debug!("Purged {} detached nodes", purged);
            }
        }
    }
}

impl std::fmt::Debug for SceneDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneDocument")
            .field("uri", &self.uri)
            .field("untitled", &self.untitled)
            .field("dirty", &self.is_dirty())
            .field("undo", &self.history.undo_count())
            .finish()
    }
}

/// Export location for a scene file.
///
/// `level.source_scene` and `level.scene.src` both map to `level.scene`;
/// any other extension is replaced.
pub fn export_path(source: &Path) -> PathBuf {
    let Some(file_name) = source.file_name().and_then(|n| n.to_str()) else {
        return source.with_extension(EXPORT_EXTENSION);
    };

    let stripped = [".source_scene", ".src"]
        .iter()
        .find_map(|suffix| file_name.strip_suffix(suffix))
        .map(|stem| stem.strip_suffix(".scene").unwrap_or(stem));

    match stripped {
        Some(stem) => source.with_file_name(format!("{}.{}", stem, EXPORT_EXTENSION)),
        None => source.with_extension(EXPORT_EXTENSION),
    }
}
