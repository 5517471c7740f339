//! Canonical task model and value objects.
//!
//! These are the shapes the action pipeline normalizes into and mutates.
//! Field names on the wire are camelCase to match the embedded action block
//! emitted by the assistant.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Enums
// =============================================================================

/// Task priority. Wire tokens are capitalized (`"High"` .. `"None"`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
    #[default]
    None,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::High => write!(f, "High"),
            Priority::Medium => write!(f, "Medium"),
            Priority::Low => write!(f, "Low"),
            Priority::None => write!(f, "None"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "High" => Ok(Priority::High),
            "Medium" => Ok(Priority::Medium),
            "Low" => Ok(Priority::Low),
            "None" => Ok(Priority::None),
            _ => Err(format!("Unknown priority: {}", s)),
        }
    }
}

/// Day of the week, in canonical Monday-first order.
///
/// The derived `Ord` gives the canonical Mon -> Sun sort used for
/// `daysOfWeek` normalization.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    /// All days in canonical order.
    pub const ALL: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    /// Convert from a chrono weekday.
    pub fn from_chrono(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => Weekday::Mon,
            chrono::Weekday::Tue => Weekday::Tue,
            chrono::Weekday::Wed => Weekday::Wed,
            chrono::Weekday::Thu => Weekday::Thu,
            chrono::Weekday::Fri => Weekday::Fri,
            chrono::Weekday::Sat => Weekday::Sat,
            chrono::Weekday::Sun => Weekday::Sun,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Weekday::Mon => write!(f, "Mon"),
            Weekday::Tue => write!(f, "Tue"),
            Weekday::Wed => write!(f, "Wed"),
            Weekday::Thu => write!(f, "Thu"),
            Weekday::Fri => write!(f, "Fri"),
            Weekday::Sat => write!(f, "Sat"),
            Weekday::Sun => write!(f, "Sun"),
        }
    }
}

impl std::str::FromStr for Weekday {
    type Err = String;

    /// Accepts the three-letter wire token, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mon" => Ok(Weekday::Mon),
            "tue" => Ok(Weekday::Tue),
            "wed" => Ok(Weekday::Wed),
            "thu" => Ok(Weekday::Thu),
            "fri" => Ok(Weekday::Fri),
            "sat" => Ok(Weekday::Sat),
            "sun" => Ok(Weekday::Sun),
            _ => Err(format!("Unknown weekday: {}", s)),
        }
    }
}

/// Recurrence schedule kind. Wire tokens are capitalized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecurrenceKind {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    Custom,
}

impl fmt::Display for RecurrenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecurrenceKind::None => write!(f, "None"),
            RecurrenceKind::Daily => write!(f, "Daily"),
            RecurrenceKind::Weekly => write!(f, "Weekly"),
            RecurrenceKind::Monthly => write!(f, "Monthly"),
            RecurrenceKind::Custom => write!(f, "Custom"),
        }
    }
}

impl std::str::FromStr for RecurrenceKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "None" => Ok(RecurrenceKind::None),
            "Daily" => Ok(RecurrenceKind::Daily),
            "Weekly" => Ok(RecurrenceKind::Weekly),
            "Monthly" => Ok(RecurrenceKind::Monthly),
            "Custom" => Ok(RecurrenceKind::Custom),
            _ => Err(format!("Unknown recurrence kind: {}", s)),
        }
    }
}

/// Interval unit for `Custom` recurrence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceUnit {
    #[default]
    Day,
    Week,
    Month,
}

impl fmt::Display for RecurrenceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecurrenceUnit::Day => write!(f, "day"),
            RecurrenceUnit::Week => write!(f, "week"),
            RecurrenceUnit::Month => write!(f, "month"),
        }
    }
}

impl std::str::FromStr for RecurrenceUnit {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(RecurrenceUnit::Day),
            "week" => Ok(RecurrenceUnit::Week),
            "month" => Ok(RecurrenceUnit::Month),
            _ => Err(format!("Unknown recurrence unit: {}", s)),
        }
    }
}

// =============================================================================
// Value objects
// =============================================================================

/// Task identifier: numeric or string, stable once assigned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskId {
    Num(i64),
    Text(String),
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskId::Num(n) => write!(f, "{}", n),
            TaskId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for TaskId {
    fn from(n: i64) -> Self {
        TaskId::Num(n)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        TaskId::Text(s.to_string())
    }
}

/// Due date and time. Missing components are empty strings, never null,
/// so the serialized shape stays stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Due {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
}

impl Due {
    pub fn new(date: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            time: time.into(),
        }
    }
}

/// Free-form progress target: text or a numeric amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Objective {
    Text(String),
    Amount(f64),
}

/// Recurrence rule embedded in a task.
///
/// `interval` is meaningful only for `Custom`; `days_of_week` only for
/// `Weekly` or `Custom` with a week unit. Normalization forces the other
/// combinations back to null / empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recurrence {
    #[serde(rename = "type")]
    pub kind: RecurrenceKind,
    pub interval: Option<i64>,
    pub unit: RecurrenceUnit,
    #[serde(rename = "daysOfWeek", default)]
    pub days_of_week: Vec<Weekday>,
}

impl Default for Recurrence {
    fn default() -> Self {
        Self {
            kind: RecurrenceKind::None,
            interval: None,
            unit: RecurrenceUnit::Day,
            days_of_week: Vec::new(),
        }
    }
}

impl Recurrence {
    /// Whether this rule pins specific weekdays (`Weekly`, or `Custom` with
    /// a week unit).
    pub fn pins_weekdays(&self) -> bool {
        matches!(self.kind, RecurrenceKind::Weekly)
            || (self.kind == RecurrenceKind::Custom && self.unit == RecurrenceUnit::Week)
    }
}

// =============================================================================
// Task
// =============================================================================

/// A schedulable unit of work in canonical shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub due: Due,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub completed: bool,
    /// ISO date, set only while `completed` is true.
    #[serde(default)]
    pub completed_date: Option<String>,
    /// Minutes allocated, or null.
    #[serde(default)]
    pub time_allocated: Option<i64>,
    #[serde(default)]
    pub objective: Option<Objective>,
    /// Weak reference to an externally owned goal.
    #[serde(default)]
    pub goal_id: Option<TaskId>,
    #[serde(default)]
    pub recurrence: Recurrence,
    #[serde(default)]
    pub in_today: bool,
}
