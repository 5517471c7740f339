//! Task normalization.
//!
//! Coerces arbitrary, partial, or badly shaped task objects from the
//! assistant into the canonical [`Task`] shape. Normalization never rejects
//! input: every invalid field falls back to a safe default. Normalizing an
//! already-normalized task is a no-op.

use chrono::{Days, NaiveDate, Utc};
use serde_json::Value;
use std::sync::Mutex;

use taskpilot_core::types::{
    Due, Objective, Priority, Recurrence, RecurrenceKind, Task, TaskId,
};

/// Monotonically increasing task id generator.
///
/// Combines a coarse (per-second) timestamp with a rolling counter that
/// wraps modulo 1000, so up to a thousand ids minted within the same tick
/// never collide. Instantiated once per process and injected into the
/// normalizer rather than accessed as ambient global state.
#[derive(Debug, Default)]
pub struct IdGenerator {
    counter: Mutex<u64>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a fresh numeric id.
    pub fn next_id(&self) -> TaskId {
        let mut counter = self.counter.lock().unwrap();
        *counter = (*counter + 1) % 1000;
        let stamp = Utc::now().timestamp();
        TaskId::Num(stamp * 1000 + *counter as i64)
    }
}

/// Normalizer turning partial task objects into canonical [`Task`]s.
#[derive(Debug, Default)]
pub struct Normalizer {
    ids: IdGenerator,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a fresh id from the underlying generator.
    pub fn fresh_id(&self) -> TaskId {
        self.ids.next_id()
    }

    /// Coerce a raw task object into the canonical shape.
    ///
    /// `today` drives the `inToday` derivation for tasks that do not state
    /// it explicitly.
    pub fn normalize(&self, raw: &Value, today: NaiveDate) -> Task {
        let id = parse_task_id(raw.get("id")).unwrap_or_else(|| self.ids.next_id());
        let title = clean_title(raw.get("title").and_then(Value::as_str).unwrap_or(""));
        let due = parse_due(raw.get("due"));
        let completed = raw
            .get("completed")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        // completedDate is only meaningful on a completed task.
        let completed_date = if completed {
            raw.get("completedDate")
                .and_then(Value::as_str)
                .map(str::to_string)
        } else {
            None
        };

        let in_today = match raw.get("inToday").and_then(Value::as_bool) {
            Some(explicit) => explicit,
            None => derive_in_today(&due.date, today),
        };

        Task {
            id,
            title,
            due,
            priority: parse_priority(raw.get("priority")),
            tags: clean_tags(raw.get("tags")),
            completed,
            completed_date,
            time_allocated: parse_minutes(raw.get("timeAllocated")),
            objective: parse_objective(raw),
            goal_id: parse_task_id(raw.get("goalId")),
            recurrence: normalize_recurrence(raw.get("recurrence").unwrap_or(&Value::Null)),
            in_today,
        }
    }
}

// =============================================================================
// Field coercions
// =============================================================================

/// Trim a title, defaulting when empty.
pub(crate) fn clean_title(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        "Untitled task".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Accept a numeric or non-empty string id.
pub(crate) fn parse_task_id(raw: Option<&Value>) -> Option<TaskId> {
    match raw? {
        Value::Number(n) => n.as_i64().map(TaskId::Num),
        Value::String(s) if !s.is_empty() => Some(TaskId::Text(s.clone())),
        _ => None,
    }
}

/// Missing date/time components become empty strings, never null.
pub(crate) fn parse_due(raw: Option<&Value>) -> Due {
    let Some(Value::Object(map)) = raw else {
        return Due::default();
    };
    Due {
        date: map
            .get("date")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
        time: map
            .get("time")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
    }
}

/// Unknown priority tokens fall back to `None`.
pub(crate) fn parse_priority(raw: Option<&Value>) -> Priority {
    raw.and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
        .unwrap_or_default()
}

/// Drop falsy and duplicate entries; non-array input coerces to empty.
pub(crate) fn clean_tags(raw: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = raw else {
        return Vec::new();
    };
    let mut tags: Vec<String> = Vec::new();
    for item in items {
        if let Some(s) = item.as_str() {
            let trimmed = s.trim();
            if !trimmed.is_empty() && !tags.iter().any(|t| t == trimmed) {
                tags.push(trimmed.to_string());
            }
        }
    }
    tags
}

/// Parse minutes to a non-negative integer; anything else is null.
pub(crate) fn parse_minutes(raw: Option<&Value>) -> Option<i64> {
    let n = match raw? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
        _ => return None,
    };
    if n.is_finite() && n >= 0.0 {
        Some(n.trunc() as i64)
    } else {
        None
    }
}

/// `objective` wins; the legacy `target` field is the fallback.
pub(crate) fn parse_objective(raw: &Value) -> Option<Objective> {
    coerce_objective(raw.get("objective")).or_else(|| coerce_objective(raw.get("target")))
}

fn coerce_objective(raw: Option<&Value>) -> Option<Objective> {
    match raw? {
        Value::String(s) => Some(Objective::Text(s.clone())),
        Value::Number(n) => n.as_f64().map(Objective::Amount),
        _ => None,
    }
}

/// Parse an ISO `YYYY-MM-DD` date, tolerating empty or junk strings.
pub(crate) fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// A task belongs in the daily view when it is overdue, due today, or due
/// tomorrow. No due date means not in today.
pub(crate) fn derive_in_today(due_date: &str, today: NaiveDate) -> bool {
    match parse_iso_date(due_date) {
        Some(date) => {
            let tomorrow = today
                .checked_add_days(Days::new(1))
                .unwrap_or(today);
            date <= tomorrow
        }
        None => false,
    }
}

// =============================================================================
// Recurrence normalization
// =============================================================================

/// Coerce a raw recurrence object into a canonical [`Recurrence`].
///
/// Bad type/unit tokens fall back to their defaults. `interval` survives
/// only for `Custom` rules and only as a positive integer. `daysOfWeek` is
/// filtered to valid tokens, deduplicated, sorted Mon -> Sun, and retained
/// only for `Weekly` or `Custom` week rules.
pub fn normalize_recurrence(raw: &Value) -> Recurrence {
    let kind: RecurrenceKind = raw
        .get("type")
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
        .unwrap_or_default();
    let unit = raw
        .get("unit")
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
        .unwrap_or_default();

    let interval = if kind == RecurrenceKind::Custom {
        parse_interval(raw.get("interval"))
    } else {
        None
    };

    let mut rec = Recurrence {
        kind,
        interval,
        unit,
        days_of_week: Vec::new(),
    };

    if rec.pins_weekdays() {
        let mut days: Vec<_> = raw
            .get("daysOfWeek")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().and_then(|s| s.parse().ok()))
                    .collect()
            })
            .unwrap_or_default();
        days.sort();
        days.dedup();
        rec.days_of_week = days;
    }

    rec
}

/// A recurrence interval must be a finite positive number.
fn parse_interval(raw: Option<&Value>) -> Option<i64> {
    let n = match raw? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if n.is_finite() && n >= 1.0 {
        Some(n.trunc() as i64)
    } else {
        None
    }
}
