//! # Edit History
//!
//! A single-writer document session over a `RepStruct`.
//!
//! Every successful update pushes the previous version onto the undo stack.
//! Versions share unchanged cells, so a deep history costs one pointer map
//! per version plus the cells that were actually edited.
//!
//! The history is not synchronized. Put it behind a lock when several
//! threads write; readers can clone `current()` and walk away with it.

use crate::primitives::DEFAULT_HISTORY_LIMIT;
use crate::{RepError, RepStruct, RepUpdate};
use std::collections::VecDeque;

/// A version and the update that produced the next one.
#[derive(Debug, Clone)]
struct Step {
    before: RepStruct,
    update: RepUpdate,
}

/// Undo/redo over value snapshots, with the applied updates as an event log.
#[derive(Debug, Clone)]
pub struct EditHistory {
    current: RepStruct,
    undo: VecDeque<Step>,
    redo: Vec<Step>,
    limit: usize,
}

impl EditHistory {
    /// Start a history at `rep` with the default depth limit.
    #[must_use]
    pub fn new(rep: RepStruct) -> Self {
        Self::with_limit(rep, DEFAULT_HISTORY_LIMIT)
    }

    /// Start a history that keeps at most `limit` undo steps.
    ///
    /// A limit of zero disables undo entirely.
    #[must_use]
    pub fn with_limit(rep: RepStruct, limit: usize) -> Self {
        Self {
            current: rep,
            undo: VecDeque::new(),
            redo: Vec::new(),
            limit,
        }
    }

    #[must_use]
    pub fn current(&self) -> &RepStruct {
        &self.current
    }

    /// Apply `update` to the current version.
    ///
    /// On error nothing changes, including the redo stack.
    pub fn apply(&mut self, update: RepUpdate) -> Result<&RepStruct, RepError> {
        let next = update.apply(&self.current)?;
        let before = std::mem::replace(&mut self.current, next);

        self.redo.clear();
        if self.limit > 0 {
            if self.undo.len() >= self.limit {
                self.undo.pop_front();
            }
            self.undo.push_back(Step { before, update });
        }

        tracing::trace!(
            graph = %self.current.id(),
            depth = self.undo.len(),
            "history advanced"
        );
        Ok(&self.current)
    }

    /// Step back one version. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(step) = self.undo.pop_back() else {
            return false;
        };
        let after = std::mem::replace(&mut self.current, step.before);
        self.redo.push(Step {
            before: after,
            update: step.update,
        });
        true
    }

    /// Re-apply the last undone update. Returns false when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(step) = self.redo.pop() else {
            return false;
        };
        let before = std::mem::replace(&mut self.current, step.before);
        self.undo.push_back(Step {
            before,
            update: step.update,
        });
        true
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Updates that lead from the oldest retained version to `current()`.
    pub fn log(&self) -> impl Iterator<Item = &RepUpdate> {
        self.undo.iter().map(|step| &step.update)
    }

    /// Drop the history and keep only the current version.
    #[must_use]
    pub fn into_current(self) -> RepStruct {
        self.current
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cell, Identifier, Value};

    fn id(n: u128) -> Identifier {
        Identifier::from_u128(n)
    }

    fn add(n: u128) -> RepUpdate {
        RepUpdate::AddCell {
            id: id(n),
            data: Default::default(),
            ports: Default::default(),
        }
    }

    #[test]
    fn undo_restores_exact_prior_value() {
        let start = RepStruct::with_id(id(100), "h").adding(Cell::new(id(1)));
        let mut history = EditHistory::new(start.clone());

        history.apply(add(2)).expect("add");
        history
            .apply(RepUpdate::UpdateData {
                id: id(1),
                key: "k".to_string(),
                value: Value::Int(1),
            })
            .expect("update");
        let latest = history.current().clone();

        assert!(history.undo());
        assert!(history.undo());
        assert_eq!(history.current(), &start);
        assert!(!history.undo());

        assert!(history.redo());
        assert!(history.redo());
        assert_eq!(history.current(), &latest);
        assert!(!history.redo());
    }

    #[test]
    fn failed_apply_changes_nothing() {
        let mut history = EditHistory::new(RepStruct::new("h"));
        history.apply(add(1)).expect("add");
        assert!(history.undo());

        let before = history.current().clone();
        let result = history.apply(RepUpdate::RemoveCell { id: id(9) });
        assert_eq!(result.err(), Some(RepError::CellNotFound(id(9))));
        assert_eq!(history.current(), &before);
        assert!(history.can_redo());
    }

    #[test]
    fn new_edit_clears_redo() {
        let mut history = EditHistory::new(RepStruct::new("h"));
        history.apply(add(1)).expect("add");
        assert!(history.undo());
        history.apply(add(2)).expect("add");
        assert!(!history.can_redo());
    }

    #[test]
    fn log_follows_undo_and_redo() {
        let mut history = EditHistory::new(RepStruct::new("h"));
        history.apply(add(1)).expect("add");
        history.apply(add(2)).expect("add");
        assert_eq!(history.log().count(), 2);

        assert!(history.undo());
        assert_eq!(history.log().cloned().collect::<Vec<_>>(), vec![add(1)]);

        assert!(history.redo());
        assert_eq!(history.log().cloned().collect::<Vec<_>>(), vec![add(1), add(2)]);
    }

    #[test]
    fn limit_drops_oldest_versions() {
        let mut history = EditHistory::with_limit(RepStruct::new("h"), 2);
        for n in 1..=4 {
            history.apply(add(n)).expect("add");
        }
        assert!(history.undo());
        assert!(history.undo());
        assert!(!history.undo());
        assert_eq!(history.current().len(), 2);
    }

    #[test]
    fn zero_limit_disables_undo() {
        let mut history = EditHistory::with_limit(RepStruct::new("h"), 0);
        history.apply(add(1)).expect("add");
        assert!(!history.can_undo());
        assert_eq!(history.into_current().len(), 1);
    }
}
