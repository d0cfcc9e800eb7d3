//! Linear undo/redo history.

use super::Command;
use crate::document::Document;
use crate::error::{EditorResult, ValidationError};

/// Default maximum number of undo steps.
pub const MAX_UNDO_HISTORY: usize = 100;

/// Undo and redo stacks of commands.
#[derive(Debug, Clone)]
pub struct UndoManager {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
    /// Maximum undo depth. The oldest command is dropped past this.
    max_depth: usize,
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::new(MAX_UNDO_HISTORY)
    }
}

impl UndoManager {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Apply a command and record it.
    pub fn execute(&mut self, command: Command, doc: &mut Document) -> EditorResult<()> {
        command.redo(doc)?;
        self.add_undo_command(command);
        Ok(())
    }

    /// Record a command whose effect is already applied. Clears the redo tail.
    pub fn add_undo_command(&mut self, command: Command) {
        log::info!("Recorded {} command", command.name());
        self.undo_stack.push(command);
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }

    /// Reverse the latest command.
    pub fn undo(&mut self, doc: &mut Document) -> EditorResult<()> {
        let command = self.undo_stack.pop().ok_or(ValidationError::NothingToUndo)?;
        if let Err(err) = command.undo(doc) {
            self.undo_stack.push(command);
            return Err(err);
        }
        log::debug!("Undid {} command", command.name());
        self.redo_stack.push(command);
        Ok(())
    }

    /// Re-apply the latest undone command.
    pub fn redo(&mut self, doc: &mut Document) -> EditorResult<()> {
        let command = self.redo_stack.pop().ok_or(ValidationError::NothingToRedo)?;
        if let Err(err) = command.redo(doc) {
            self.redo_stack.push(command);
            return Err(err);
        }
        log::debug!("Redid {} command", command.name());
        self.undo_stack.push(command);
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
