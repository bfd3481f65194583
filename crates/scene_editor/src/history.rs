//! Undo/Redo history.
//!
//! Each document owns one history. Entries are commands that have already
//! been executed; undoing moves them to the redo stack and back.

use std::collections::VecDeque;

use crate::command::Command;

/// Bounded undo/redo stacks. The oldest entry is dropped once the undo side
/// is full.
pub struct UndoHistory {
    /// Oldest first
    undo: VecDeque<Box<dyn Command>>,
    redo: Vec<Box<dyn Command>>,
    limit: usize,
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoHistory {
    pub const DEFAULT_MAX_SIZE: usize = 100;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_MAX_SIZE)
    }

    /// History keeping at most `limit` undo entries (at least one)
    pub fn with_capacity(limit: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            limit: limit.max(1),
        }
    }

    pub fn max_size(&self) -> usize {
        self.limit
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Menu text for the next undo
    pub fn undo_description(&self) -> Option<&str> {
        self.undo.back().map(|c| c.description())
    }

    /// Menu text for the next redo
    pub fn redo_description(&self) -> Option<&str> {
        self.redo.last().map(|c| c.description())
    }

    /// Record a command that has already been executed. Invalidates the
    /// redo side.
    pub fn push(&mut self, command: Box<dyn Command>) {
        self.redo.clear();
        self.push_to_undo(command);
    }

    pub fn pop_undo(&mut self) -> Option<Box<dyn Command>> {
        self.undo.pop_back()
    }

    pub fn pop_redo(&mut self) -> Option<Box<dyn Command>> {
        self.redo.pop()
    }

    /// Return a redone command to the undo side without touching redo
    pub fn push_to_undo(&mut self, command: Box<dyn Command>) {
        self.undo.push_back(command);
        if self.undo.len() > self.limit {
            self.undo.pop_front();
        }
    }

    /// Park an undone command on the redo side
    pub fn push_to_redo(&mut self, command: Box<dyn Command>) {
        self.redo.push(command);
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    pub fn undo_count(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo.len()
    }
}

impl std::fmt::Debug for UndoHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UndoHistory")
            .field("undo", &self.undo.len())
            .field("redo", &self.redo.len())
            .field("limit", &self.limit)
            .finish()
    }
}
