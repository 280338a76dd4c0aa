//! Reversible operation records and the undo/redo engine

pub mod stack;

pub use stack::UndoStack;

/// One undoable operation on a target.
///
/// A memento is created after its operation has been applied. `undo`
/// restores the state before it, `redo` re-applies it; the same memento
/// moves between the undo and redo stacks.
pub trait Memento {
    type Target;

    fn undo(&mut self, target: &mut Self::Target);

    fn redo(&mut self, target: &mut Self::Target);

    /// Fold `next`, issued right after `self` within one gesture, into
    /// `self`. Returns false when the two can't be merged.
    fn merge(&mut self, next: &Self) -> bool;

    /// Short description for history listings
    fn action_name(&self) -> &'static str;
}
