//! Shared types, configuration, and error taxonomy for Taskpilot.
//!
//! Defines the canonical [`types::Task`] shape that the action pipeline
//! produces and consumes, the injectable [`clock::Clock`] used for every
//! "today" calculation, and the TOML-backed [`config::PilotConfig`].

pub mod clock;
pub mod config;
pub mod error;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{GeneralConfig, PilotConfig, PipelineConfig};
pub use error::{PilotError, Result};
pub use types::{
    Due, Objective, Priority, Recurrence, RecurrenceKind, RecurrenceUnit, Task, TaskId, Weekday,
};
