//! Command bus and reference undo history
//!
//! Manipulators never write a committed value themselves. On release they
//! hand a [`TransformAction`] to a [`CommandBus`], which applies it through
//! the pivot and is free to record it for undo.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::pivot::Pivot;

/// Kind of transform a manipulator commits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKey {
    SetPosition,
    SetRotation,
    SetScale,
}

/// A committed transform value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TransformAction {
    Position(Vec3),
    Rotation(Quat),
    Scale(Vec3),
}

impl TransformAction {
    pub fn key(&self) -> ActionKey {
        match self {
            TransformAction::Position(_) => ActionKey::SetPosition,
            TransformAction::Rotation(_) => ActionKey::SetRotation,
            TransformAction::Scale(_) => ActionKey::SetScale,
        }
    }

    /// Current pivot value for `key`
    pub fn capture_current(key: ActionKey, pivot: &Pivot) -> Self {
        match key {
            ActionKey::SetPosition => TransformAction::Position(pivot.position()),
            ActionKey::SetRotation => TransformAction::Rotation(pivot.rotation()),
            ActionKey::SetScale => TransformAction::Scale(pivot.scale()),
        }
    }

    /// Gesture-start pivot value for `key`
    pub fn capture_last(key: ActionKey, pivot: &Pivot) -> Self {
        match key {
            ActionKey::SetPosition => TransformAction::Position(pivot.last_position()),
            ActionKey::SetRotation => TransformAction::Rotation(pivot.last_rotation()),
            ActionKey::SetScale => TransformAction::Scale(pivot.last_scale()),
        }
    }

    /// Write the value through the pivot and make it the new snapshot.
    pub fn apply(&self, pivot: &mut Pivot) {
        match *self {
            TransformAction::Position(v) => pivot.set_position(v, true),
            TransformAction::Rotation(q) => pivot.set_rotation(q, true),
            TransformAction::Scale(v) => pivot.set_scale(v, true),
        }
    }
}

/// Sink for committed manipulations.
pub trait CommandBus {
    /// Apply `action` to `pivot`.
    fn execute(&mut self, action: TransformAction, pivot: &mut Pivot);

    /// Register the value that undoes the next [`CommandBus::execute`].
    fn record_undo(&mut self, action: TransformAction);
}

/// One undoable step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommandEntry {
    pub forward: TransformAction,
    pub inverse: TransformAction,
}

/// In-memory undo/redo history.
#[derive(Debug, Clone, Default)]
pub struct CommandHistory {
    undo_stack: Vec<CommandEntry>,
    redo_stack: Vec<CommandEntry>,
    pending_inverse: Option<TransformAction>,
    limit: Option<usize>,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `limit` undo steps; the oldest are dropped first.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit.max(1));
        self
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    /// Most recent undoable step
    pub fn last_entry(&self) -> Option<&CommandEntry> {
        self.undo_stack.last()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.pending_inverse = None;
    }

    /// Revert the most recent step. Returns the value that was restored.
    pub fn undo(&mut self, pivot: &mut Pivot) -> Result<TransformAction, CommandError> {
        let entry = self.undo_stack.pop().ok_or(CommandError::NothingToUndo)?;
        entry.inverse.apply(pivot);
        tracing::info!(action = ?entry.inverse, "undo");
        self.redo_stack.push(entry);
        Ok(entry.inverse)
    }

    /// Re-apply the most recently undone step.
    pub fn redo(&mut self, pivot: &mut Pivot) -> Result<TransformAction, CommandError> {
        let entry = self.redo_stack.pop().ok_or(CommandError::NothingToRedo)?;
        entry.forward.apply(pivot);
        tracing::info!(action = ?entry.forward, "redo");
        self.undo_stack.push(entry);
        Ok(entry.forward)
    }
}

impl CommandBus for CommandHistory {
    fn execute(&mut self, action: TransformAction, pivot: &mut Pivot) {
        let inverse = match self.pending_inverse.take() {
            Some(inverse) if inverse.key() == action.key() => inverse,
            Some(stale) => {
                tracing::debug!(?stale, "discarding undo value of a different kind");
                TransformAction::capture_last(action.key(), pivot)
            }
            None => TransformAction::capture_last(action.key(), pivot),
        };

        action.apply(pivot);
        tracing::info!(?action, "committed");

        self.redo_stack.clear();
        self.undo_stack.push(CommandEntry {
            forward: action,
            inverse,
        });
        if let Some(limit) = self.limit {
            let excess = self.undo_stack.len().saturating_sub(limit);
            self.undo_stack.drain(..excess);
        }
    }

    fn record_undo(&mut self, action: TransformAction) {
        self.pending_inverse = Some(action);
    }
}

/// Command history errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("Nothing to undo")]
    NothingToUndo,
    #[error("Nothing to redo")]
    NothingToRedo,
    #[error("A manipulation is in progress")]
    GestureInProgress,
}
