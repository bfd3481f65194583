//! Open document registry
//!
//! Tracks every open document, which one is active, and the recently used
//! files. Scene documents sit next to documents owned by other editors; the
//! commands only ever act on the scene ones.

use std::path::{Path, PathBuf};

use scene_graph::SubscriberId;

use crate::config::EditorConfig;
use crate::document::SceneDocument;

/// Handle of an open document
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(u64);

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Document({})", self.0)
    }
}

/// A document of any kind the host has open
#[derive(Debug)]
pub enum OpenDocument {
    Scene(SceneDocument),
    /// Document owned by another editor
    Foreign { uri: PathBuf, type_name: String },
}

impl OpenDocument {
    pub fn uri(&self) -> &Path {
        match self {
            Self::Scene(doc) => doc.uri(),
            Self::Foreign { uri, .. } => uri,
        }
    }

    pub fn as_scene(&self) -> Option<&SceneDocument> {
        match self {
            Self::Scene(doc) => Some(doc),
            Self::Foreign { .. } => None,
        }
    }

    pub fn as_scene_mut(&mut self) -> Option<&mut SceneDocument> {
        match self {
            Self::Scene(doc) => Some(doc),
            Self::Foreign { .. } => None,
        }
    }

    pub fn is_scene(&self) -> bool {
        matches!(self, Self::Scene(_))
    }
}

/// Registry change notification
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistryEvent {
    DocumentAdded(DocumentId),
    DocumentRemoved(DocumentId),
    /// The active document changed; `None` when no document is open
    ActiveDocumentChanged(Option<DocumentId>),
}

type RegistryListener = Box<dyn FnMut(&RegistryEvent)>;

/// Scene paths the user opened or saved, newest first
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecentFiles {
    paths: Vec<PathBuf>,
    limit: usize,
}

impl Default for RecentFiles {
    fn default() -> Self {
        Self::new(EditorConfig::default().max_recent_files)
    }
}

impl RecentFiles {
    pub fn new(limit: usize) -> Self {
        Self {
            paths: Vec::with_capacity(limit),
            limit,
        }
    }

    /// Make `path` the newest entry. Returns the entry that fell off the
    /// end, if the list was full.
    pub fn touch(&mut self, path: impl Into<PathBuf>) -> Option<PathBuf> {
        let path = path.into();
        if let Some(existing) = self.paths.iter().position(|p| *p == path) {
            self.paths.remove(existing);
        }
        self.paths.insert(0, path);
        if self.paths.len() > self.limit {
            self.paths.pop()
        } else {
            None
        }
    }

    /// Drop `path`, e.g. after it failed to open
    pub fn forget(&mut self, path: &Path) -> bool {
        let before = self.paths.len();
        self.paths.retain(|p| p != path);
        self.paths.len() != before
    }

    pub fn clear(&mut self) {
        self.paths.clear();
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn newest(&self) -> Option<&Path> {
        self.paths.first().map(PathBuf::as_path)
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }
}

/// All open documents, in the order they were opened
#[derive(Default)]
pub struct DocumentRegistry {
    documents: Vec<(DocumentId, OpenDocument)>,
    active: Option<DocumentId>,
    next_id: u64,
    recent: RecentFiles,
    listeners: Vec<(SubscriberId, RegistryListener)>,
    next_subscriber_id: u64,
}

impl DocumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_recent_limit(max: usize) -> Self {
        Self {
            recent: RecentFiles::new(max),
            ..Self::default()
        }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::with_recent_limit(config.max_recent_files)
    }

    // =========================================================================
    // Documents
    // =========================================================================

    /// Register a document and make it active
    pub fn add(&mut self, document: OpenDocument) -> DocumentId {
        self.next_id += 1;
        let id = DocumentId(self.next_id);

        let titled = document.as_scene().map_or(true, |doc| !doc.is_untitled());
        if titled {
            if let Some(dropped) = self.recent.touch(document.uri()) {
                log::debug!("{:?} dropped from recent files", dropped);
            }
        }
        log::info!("Opened {} ({:?})", id, document.uri());

        self.documents.push((id, document));
        self.emit(RegistryEvent::DocumentAdded(id));
        self.set_active(Some(id));
        id
    }

    /// Close a document. The previous document becomes active if the closed
    /// one was.
    pub fn remove(&mut self, id: DocumentId) -> Option<OpenDocument> {
        let position = self.documents.iter().position(|(d, _)| *d == id)?;
        let (_, document) = self.documents.remove(position);
        self.emit(RegistryEvent::DocumentRemoved(id));

        if self.active == Some(id) {
            let next = self
                .documents
                .get(position.saturating_sub(1))
                .map(|(d, _)| *d);
            self.set_active(next);
        }
        Some(document)
    }

    pub fn get(&self, id: DocumentId) -> Option<&OpenDocument> {
        self.documents.iter().find(|(d, _)| *d == id).map(|(_, doc)| doc)
    }

    pub fn get_mut(&mut self, id: DocumentId) -> Option<&mut OpenDocument> {
        self.documents
            .iter_mut()
            .find(|(d, _)| *d == id)
            .map(|(_, doc)| doc)
    }

    pub fn documents(&self) -> impl Iterator<Item = (DocumentId, &OpenDocument)> {
        self.documents.iter().map(|(id, doc)| (*id, doc))
    }

    /// Open scene documents in registry order
    pub fn scene_documents(&self) -> impl Iterator<Item = &SceneDocument> {
        self.documents.iter().filter_map(|(_, doc)| doc.as_scene())
    }

    pub fn any_scene(&self) -> bool {
        self.documents.iter().any(|(_, doc)| doc.is_scene())
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    // =========================================================================
    // Active document
    // =========================================================================

    pub fn active(&self) -> Option<DocumentId> {
        self.active
    }

    /// Change the active document. Unknown ids are ignored.
    pub fn set_active(&mut self, id: Option<DocumentId>) -> bool {
        if id.is_some_and(|id| self.get(id).is_none()) || id == self.active {
            return false;
        }
        self.active = id;
        self.emit(RegistryEvent::ActiveDocumentChanged(id));
        true
    }

    pub fn active_document(&self) -> Option<&OpenDocument> {
        self.active.and_then(|id| self.get(id))
    }

    /// The active document, if it is a scene
    pub fn active_scene(&self) -> Option<&SceneDocument> {
        self.active_document().and_then(OpenDocument::as_scene)
    }

    pub fn active_scene_mut(&mut self) -> Option<&mut SceneDocument> {
        let id = self.active?;
        self.get_mut(id).and_then(OpenDocument::as_scene_mut)
    }

    // =========================================================================
    // Recent files
    // =========================================================================

    pub fn recent_files(&self) -> &RecentFiles {
        &self.recent
    }

    /// Record a path, e.g. after "Save As"
    pub fn touch_recent(&mut self, path: impl Into<PathBuf>) {
        self.recent.touch(path);
    }

    pub fn forget_recent(&mut self, path: &Path) -> bool {
        self.recent.forget(path)
    }

    pub fn clear_recent(&mut self) {
        self.recent.clear();
    }

    // =========================================================================
    // Observation
    // =========================================================================

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriberId
    where
        F: FnMut(&RegistryEvent) + 'static,
    {
        self.next_subscriber_id += 1;
        let id = SubscriberId(self.next_subscriber_id);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    fn emit(&mut self, event: RegistryEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(&event);
        }
    }
}

impl std::fmt::Debug for DocumentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentRegistry")
            .field("documents", &self.documents.len())
            .field("active", &self.active)
            .field("recent", &self.recent.len())
            .finish()
    }
}
