//! Undo ledger.
//!
//! Every applied action records a full snapshot of the task collection as
//! it was immediately before the action's effect, keyed by
//! `(message_id, action_index)`. Undoing consumes the entry, so each
//! applied action can be reversed at most once.

use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use taskpilot_core::types::Task;

/// Store of pre-mutation snapshots for one-shot reversal.
#[derive(Debug, Default)]
pub struct UndoLedger {
    entries: Mutex<HashMap<(Uuid, usize), Vec<Task>>>,
}

impl UndoLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the collection as it stood before the action at
    /// `(message_id, index)` was applied. The snapshot is an owned copy,
    /// never an alias of the live collection.
    pub fn record(&self, message_id: Uuid, index: usize, snapshot: Vec<Task>) {
        self.entries
            .lock()
            .unwrap()
            .insert((message_id, index), snapshot);
    }

    /// Consume and return the snapshot for `(message_id, index)`.
    ///
    /// Returns `None` if the action was never recorded or was already
    /// undone; a second undo on the same key restores nothing.
    pub fn undo(&self, message_id: Uuid, index: usize) -> Option<Vec<Task>> {
        self.entries.lock().unwrap().remove(&(message_id, index))
    }

    /// Whether a snapshot exists for the given key.
    pub fn contains(&self, message_id: Uuid, index: usize) -> bool {
        self.entries.lock().unwrap().contains_key(&(message_id, index))
    }

    /// Number of recorded snapshots.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
