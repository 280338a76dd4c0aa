//! Two-stack undo/redo engine

use crate::error::HistoryError;

use super::Memento;

/// Undo and redo stacks.
///
/// Pushing a new memento clears the redo stack. Merging only happens into
/// the top of the undo stack while the merge window is open; `seal`,
/// `undo` and `redo` close it.
#[derive(Debug)]
pub struct UndoStack<M> {
    undo: Vec<M>,
    redo: Vec<M>,
    limit: Option<usize>,
    sealed: bool,
}

impl<M: Memento> Default for UndoStack<M> {
    fn default() -> Self {
        Self::new(None)
    }
}

impl<M: Memento> UndoStack<M> {
    /// Create a stack keeping at most `limit` undo steps
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            limit: limit.filter(|l| *l > 0),
            sealed: true,
        }
    }

    /// Record an applied operation.
    ///
    /// Returns true when the memento was merged into the previous one.
    pub fn make_undoable(&mut self, memento: M, allow_merge: bool) -> bool {
        self.redo.clear();
        if allow_merge
            && !self.sealed
            && let Some(top) = self.undo.last_mut()
            && top.merge(&memento)
        {
            log::debug!("Merged '{}' into previous step", memento.action_name());
            return true;
        }

        log::debug!("Undo step '{}'", memento.action_name());
        self.undo.push(memento);
        self.sealed = false;
        if let Some(limit) = self.limit
            && self.undo.len() > limit
        {
            self.undo.remove(0);
        }
        false
    }

    /// Close the merge window so the next memento starts a new step
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn undo(&mut self, target: &mut M::Target) -> Result<(), HistoryError> {
        let mut memento = self.undo.pop().ok_or(HistoryError::NothingToUndo)?;
        memento.undo(target);
        self.redo.push(memento);
        self.sealed = true;
        Ok(())
    }

    pub fn redo(&mut self, target: &mut M::Target) -> Result<(), HistoryError> {
        let mut memento = self.redo.pop().ok_or(HistoryError::NothingToRedo)?;
        memento.redo(target);
        self.undo.push(memento);
        self.sealed = true;
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Action names of the undo stack, oldest first
    pub fn history(&self) -> Vec<&'static str> {
        self.undo.iter().map(Memento::action_name).collect()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
        self.sealed = true;
    }
}
