//! Proposed mutations and their per-action execution states.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use taskpilot_core::types::TaskId;

/// A structured mutation proposed by the assistant.
///
/// `Create` carries a partial task for the normalizer; the task and patch
/// payloads stay as raw JSON so that a badly shaped field degrades during
/// normalization instead of failing deserialization of the whole block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Action {
    Create {
        #[serde(default)]
        task: Value,
    },
    Update {
        id: TaskId,
        #[serde(default)]
        fields: Value,
    },
    Complete {
        id: TaskId,
        #[serde(default)]
        completed: Option<bool>,
        #[serde(rename = "completedDate", default)]
        completed_date: Option<String>,
    },
    Delete {
        id: TaskId,
    },
}

impl Action {
    /// Whether this action requires explicit approval before execution.
    pub fn is_destructive(&self) -> bool {
        matches!(self, Action::Delete { .. })
    }

    /// The existing task id this action targets, if any.
    pub fn target_id(&self) -> Option<&TaskId> {
        match self {
            Action::Create { .. } => None,
            Action::Update { id, .. } | Action::Complete { id, .. } | Action::Delete { id } => {
                Some(id)
            }
        }
    }
}

/// Execution state of one action within a processed message.
///
/// At most one action per message is `PendingApproval`; everything before it
/// has reached a terminal state and everything after it is `Blocked`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionState {
    /// Not yet reached by the executor.
    #[default]
    Blocked,
    /// The next delete; execution has halted here.
    PendingApproval,
    /// Applied (includes approved deletes).
    Executed,
    /// Declined by the user; no mutation was performed.
    Rejected,
    /// Applied and then reversed via the undo ledger.
    Undone,
}

impl ActionState {
    /// Terminal states: the executor will never revisit this action.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ActionState::Executed | ActionState::Rejected | ActionState::Undone
        )
    }
}

impl fmt::Display for ActionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionState::Blocked => write!(f, "blocked"),
            ActionState::PendingApproval => write!(f, "pending_approval"),
            ActionState::Executed => write!(f, "executed"),
            ActionState::Rejected => write!(f, "rejected"),
            ActionState::Undone => write!(f, "undone"),
        }
    }
}
