//! Action executor.
//!
//! Applies an ordered list of proposed mutations to a task collection.
//! Creates, updates, and completes run automatically; the walk halts at the
//! first delete, which waits as `PendingApproval` until the user approves
//! or rejects it, then the walk resumes. Every applied action records a
//! pre-mutation snapshot in the undo ledger.
//!
//! The input collection is never mutated: every operation returns a new
//! collection value, which is what makes the ledger snapshots safe.

use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use serde_json::Value;
use taskpilot_core::clock::Clock;
use taskpilot_core::config::PipelineConfig;
use taskpilot_core::types::{Due, RecurrenceKind, Task, TaskId};

use crate::error::ExecutorError;
use crate::ledger::UndoLedger;
use crate::normalize::{
    clean_tags, clean_title, normalize_recurrence, parse_iso_date, parse_minutes,
    parse_objective, parse_priority, parse_task_id, Normalizer,
};
use crate::recurrence::first_occurrence;
use crate::types::{Action, ActionState};

/// Result of one executor operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionOutcome {
    /// The new task collection.
    pub tasks: Vec<Task>,
    /// Per-action execution state, index-aligned with the action list.
    pub states: Vec<ActionState>,
    /// Number of actions that have reached a terminal state; equivalently,
    /// the index of the current stopping point.
    pub executed: usize,
}

/// The action pipeline's core state machine.
pub struct Executor {
    normalizer: Normalizer,
    ledger: UndoLedger,
    clock: Arc<dyn Clock>,
    config: PipelineConfig,
}

impl Executor {
    pub fn new(clock: Arc<dyn Clock>, config: PipelineConfig) -> Self {
        Self {
            normalizer: Normalizer::new(),
            ledger: UndoLedger::new(),
            clock,
            config,
        }
    }

    /// The undo ledger backing this executor.
    pub fn ledger(&self) -> &UndoLedger {
        &self.ledger
    }

    /// Auto-run phase, triggered once per assistant turn.
    ///
    /// Walks the actions in order, executing until the list ends or a
    /// delete halts the walk as `PendingApproval`.
    pub fn run(&self, message_id: Uuid, tasks: &[Task], actions: &[Action]) -> ExecutionOutcome {
        let mut states = vec![ActionState::Blocked; actions.len()];
        let tasks = self.walk(message_id, tasks.to_vec(), actions, &mut states, 0);
        outcome(tasks, states)
    }

    /// Approve the pending delete at `index`: execute it, then resume the
    /// walk until the next delete or the end of the list.
    pub fn approve(
        &self,
        message_id: Uuid,
        tasks: &[Task],
        actions: &[Action],
        states: &[ActionState],
        index: usize,
    ) -> Result<ExecutionOutcome, ExecutorError> {
        check_pending(states, index)?;
        let mut states = states.to_vec();
        let tasks = self.apply(message_id, tasks.to_vec(), &actions[index], index);
        states[index] = ActionState::Executed;
        let tasks = self.walk(message_id, tasks, actions, &mut states, index + 1);
        Ok(outcome(tasks, states))
    }

    /// Reject the pending delete at `index`: no mutation for that action,
    /// then resume the walk identically to an approval.
    pub fn reject(
        &self,
        message_id: Uuid,
        tasks: &[Task],
        actions: &[Action],
        states: &[ActionState],
        index: usize,
    ) -> Result<ExecutionOutcome, ExecutorError> {
        check_pending(states, index)?;
        let mut states = states.to_vec();
        states[index] = ActionState::Rejected;
        let tasks = self.walk(message_id, tasks.to_vec(), actions, &mut states, index + 1);
        Ok(outcome(tasks, states))
    }

    /// Reverse the applied action at `(message_id, index)`.
    ///
    /// Restores the ledger snapshot as the new authoritative collection and
    /// marks the action `Undone`. Returns `None` when there is nothing to
    /// restore (never applied, or already undone).
    pub fn undo(
        &self,
        message_id: Uuid,
        index: usize,
        states: &[ActionState],
    ) -> Option<ExecutionOutcome> {
        let snapshot = self.ledger.undo(message_id, index)?;
        let mut states = states.to_vec();
        if index < states.len() {
            states[index] = ActionState::Undone;
        }
        Some(outcome(snapshot, states))
    }

    // -----------------------------------------------------------------
    // Walk
    // -----------------------------------------------------------------

    fn walk(
        &self,
        message_id: Uuid,
        mut tasks: Vec<Task>,
        actions: &[Action],
        states: &mut [ActionState],
        start: usize,
    ) -> Vec<Task> {
        for (index, action) in actions.iter().enumerate().skip(start) {
            if action.is_destructive() && !self.config.auto_approve_deletes {
                debug!(index, "Halting at delete; awaiting approval");
                states[index] = ActionState::PendingApproval;
                return tasks;
            }
            tasks = self.apply(message_id, tasks, action, index);
            states[index] = ActionState::Executed;
        }
        tasks
    }

    /// Apply one action, recording its pre-mutation snapshot first.
    fn apply(
        &self,
        message_id: Uuid,
        tasks: Vec<Task>,
        action: &Action,
        index: usize,
    ) -> Vec<Task> {
        self.ledger.record(message_id, index, tasks.clone());
        match action {
            Action::Create { task } => self.apply_create(tasks, task),
            Action::Update { id, fields } => self.apply_update(tasks, id, fields),
            Action::Complete {
                id,
                completed,
                completed_date,
            } => self.apply_complete(tasks, id, *completed, completed_date.as_deref()),
            Action::Delete { id } => apply_delete(tasks, id),
        }
    }

    // -----------------------------------------------------------------
    // Per-action application
    // -----------------------------------------------------------------

    fn apply_create(&self, mut tasks: Vec<Task>, raw: &Value) -> Vec<Task> {
        let today = self.clock.today();
        let mut task = self.normalizer.normalize(raw, today);

        // Ids are unique within a collection; a colliding id from the
        // assistant gets replaced rather than trusted.
        if tasks.iter().any(|t| t.id == task.id) {
            let fresh = self.normalizer.fresh_id();
            debug!(old = %task.id, new = %fresh, "Create id collision; reassigning");
            task.id = fresh;
        }

        self.seed_recurrence(&mut task, today);
        tasks.push(task);
        tasks
    }

    fn apply_update(&self, mut tasks: Vec<Task>, id: &TaskId, fields: &Value) -> Vec<Task> {
        let Some(pos) = tasks.iter().position(|t| &t.id == id) else {
            debug!(%id, "Update target not found; skipping");
            return tasks;
        };
        let Some(fields) = fields.as_object() else {
            debug!(%id, "Update fields not an object; skipping");
            return tasks;
        };

        let today = self.clock.today();
        let task = &mut tasks[pos];

        if let Some(v) = fields.get("title") {
            task.title = clean_title(v.as_str().unwrap_or(""));
        }
        if let Some(v) = fields.get("due") {
            patch_due(&mut task.due, v);
        }
        if let Some(v) = fields.get("priority") {
            task.priority = parse_priority(Some(v));
        }
        if let Some(v) = fields.get("tags") {
            task.tags = clean_tags(Some(v));
        }
        if let Some(v) = fields.get("completed") {
            let completed = v.as_bool().unwrap_or(false);
            task.completed = completed;
            if completed {
                task.completed_date
                    .get_or_insert_with(|| iso(today));
            } else {
                task.completed_date = None;
            }
        }
        if let Some(v) = fields.get("completedDate") {
            // Only a completed task carries a completion date.
            task.completed_date = match v.as_str() {
                Some(date) if task.completed => Some(date.to_string()),
                _ => None,
            };
        }
        if let Some(v) = fields.get("timeAllocated") {
            task.time_allocated = parse_minutes(Some(v));
        }
        if fields.contains_key("objective") || fields.contains_key("target") {
            task.objective = parse_objective(&Value::Object(fields.clone()));
        }
        if let Some(v) = fields.get("goalId") {
            task.goal_id = parse_task_id(Some(v));
        }
        if let Some(v) = fields.get("inToday") {
            task.in_today = v.as_bool().unwrap_or(false);
        }
        if let Some(v) = fields.get("recurrence") {
            task.recurrence = normalize_recurrence(v);
            self.seed_recurrence(task, today);
        }

        tasks
    }

    fn apply_complete(
        &self,
        mut tasks: Vec<Task>,
        id: &TaskId,
        completed: Option<bool>,
        completed_date: Option<&str>,
    ) -> Vec<Task> {
        let Some(pos) = tasks.iter().position(|t| &t.id == id) else {
            debug!(%id, "Complete target not found; skipping");
            return tasks;
        };

        let task = &mut tasks[pos];
        let completed = completed.unwrap_or(true);
        task.completed = completed;
        task.completed_date = if completed {
            completed_date
                .map(str::to_string)
                .or_else(|| Some(iso(self.clock.today())))
        } else {
            None
        };
        tasks
    }

    /// When a task carries a live recurrence rule, its due date snaps to
    /// the rule's first occurrence.
    fn seed_recurrence(&self, task: &mut Task, today: chrono::NaiveDate) {
        if task.recurrence.kind == RecurrenceKind::None {
            return;
        }
        let base = parse_iso_date(&task.due.date);
        let first = first_occurrence(&task.recurrence, base, today);
        task.due.date = iso(first);
    }
}

fn apply_delete(mut tasks: Vec<Task>, id: &TaskId) -> Vec<Task> {
    let before = tasks.len();
    tasks.retain(|t| &t.id != id);
    if tasks.len() == before {
        debug!(%id, "Delete target not found; skipping");
    }
    tasks
}

/// Merge a due patch: present keys replace, null clears, null patch clears
/// both components.
fn patch_due(due: &mut Due, patch: &Value) {
    match patch {
        Value::Object(map) => {
            if let Some(date) = map.get("date") {
                due.date = date.as_str().unwrap_or("").to_string();
            }
            if let Some(time) = map.get("time") {
                due.time = time.as_str().unwrap_or("").to_string();
            }
        }
        _ => *due = Due::default(),
    }
}

fn check_pending(states: &[ActionState], index: usize) -> Result<(), ExecutorError> {
    if index >= states.len() {
        return Err(ExecutorError::IndexOutOfBounds {
            index,
            len: states.len(),
        });
    }
    if states[index] != ActionState::PendingApproval {
        return Err(ExecutorError::NotPendingApproval {
            index,
            state: states[index],
        });
    }
    Ok(())
}

fn outcome(tasks: Vec<Task>, states: Vec<ActionState>) -> ExecutionOutcome {
    let executed = states
        .iter()
        .position(|s| !s.is_terminal())
        .unwrap_or(states.len());
    ExecutionOutcome {
        tasks,
        states,
        executed,
    }
}

fn iso(date: chrono::NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
