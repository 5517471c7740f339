//! Taskpilot application binary - composition root.
//!
//! Wires configuration, logging, and the clock together and drives the
//! action pipeline against a flat JSON task file:
//! 1. Load configuration from TOML
//! 2. Read the task collection and the assistant reply
//! 3. Parse the reply's action block and run the executor
//! 4. Persist the new collection and report per-action states

mod cli;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use uuid::Uuid;

use cli::{CliArgs, Command};
use taskpilot_action::normalize::normalize_recurrence;
use taskpilot_action::{next_occurrence, parse_reply, ActionState, Executor};
use taskpilot_core::clock::{Clock, FixedClock, SystemClock};
use taskpilot_core::config::PilotConfig;
use taskpilot_core::error::{PilotError, Result};
use taskpilot_core::types::Task;

fn main() -> Result<()> {
    let args = CliArgs::parse();
    let config = PilotConfig::load_or_default(&args.resolve_config_path());
    init_logging(&args.resolve_log_level(&config.general.log_level));
    let clock = resolve_clock(args.today.as_deref())?;

    match args.command {
        Command::Apply {
            tasks,
            reply,
            auto_approve_deletes,
        } => run_apply(&config, clock, tasks, reply, auto_approve_deletes),
        Command::Next { recurrence, from } => run_next(clock, &recurrence, from.as_deref()),
    }
}

fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// A `--today` override pins the clock; otherwise use local wall time.
fn resolve_clock(today: Option<&str>) -> Result<Arc<dyn Clock>> {
    match today {
        Some(raw) => {
            let date = chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|e| PilotError::Config(format!("Invalid --today date: {}", e)))?;
            Ok(Arc::new(FixedClock(date)))
        }
        None => Ok(Arc::new(SystemClock)),
    }
}

fn run_apply(
    config: &PilotConfig,
    clock: Arc<dyn Clock>,
    tasks_path: Option<PathBuf>,
    reply_path: Option<PathBuf>,
    auto_approve_deletes: bool,
) -> Result<()> {
    let mut pipeline = config.pipeline.clone();
    if auto_approve_deletes {
        pipeline.auto_approve_deletes = true;
    }

    let tasks_path = tasks_path.unwrap_or_else(|| expand_home(&config.general.tasks_file));
    let tasks = load_tasks(&tasks_path)?;

    let reply_text = match reply_path {
        Some(path) => std::fs::read_to_string(path)?,
        None => std::io::read_to_string(std::io::stdin())?,
    };
    let parsed = parse_reply(&reply_text);
    tracing::info!(actions = parsed.actions.len(), "Parsed assistant reply");

    let executor = Executor::new(clock, pipeline);
    let message_id = Uuid::new_v4();
    let out = executor.run(message_id, &tasks, &parsed.actions);

    save_tasks(&tasks_path, &out.tasks)?;

    if out
        .states
        .contains(&ActionState::PendingApproval)
    {
        tracing::warn!(
            "A delete is awaiting approval and was not applied; \
             re-run with --auto-approve-deletes to apply deletes"
        );
    }

    let report = serde_json::json!({
        "messageId": message_id,
        "displayText": parsed.display_text,
        "executed": out.executed,
        "states": out.states,
        "tasks": out.tasks,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_next(clock: Arc<dyn Clock>, recurrence: &str, from: Option<&str>) -> Result<()> {
    let raw: serde_json::Value = serde_json::from_str(recurrence)?;
    let rec = normalize_recurrence(&raw);

    let current = match from {
        Some(raw) => chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|e| PilotError::Config(format!("Invalid --from date: {}", e)))?,
        None => clock.today(),
    };

    match next_occurrence(&rec, current) {
        Some(date) => println!("{}", date.format("%Y-%m-%d")),
        None => println!("none"),
    }
    Ok(())
}

/// Expand a leading `~/` against $HOME; other paths pass through.
fn expand_home(raw: &str) -> PathBuf {
    if let Some(rest) = raw.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(raw)
}

/// Missing task file means an empty collection, not an error.
fn load_tasks(path: &Path) -> Result<Vec<Task>> {
    if !path.exists() {
        tracing::info!("Task file {} not found; starting empty", path.display());
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn save_tasks(path: &Path, tasks: &[Task]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(tasks)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_clock_with_override() {
        let clock = resolve_clock(Some("2025-03-10")).unwrap();
        assert_eq!(
            clock.today(),
            chrono::NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
        );
    }

    #[test]
    fn test_resolve_clock_rejects_bad_date() {
        assert!(resolve_clock(Some("next tuesday")).is_err());
    }

    #[test]
    fn test_expand_home_passes_absolute_paths_through() {
        assert_eq!(
            expand_home("/var/data/tasks.json"),
            PathBuf::from("/var/data/tasks.json")
        );
        assert_eq!(expand_home("relative.json"), PathBuf::from("relative.json"));
    }

    #[test]
    fn test_load_tasks_missing_file_is_empty() {
        let tasks = load_tasks(Path::new("/nonexistent/tasks.json")).unwrap();
        assert!(tasks.is_empty());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tasks.json");

        let tasks: Vec<Task> = serde_json::from_value(serde_json::json!([{
            "id": 1,
            "title": "Persisted",
            "due": {"date": "", "time": ""},
            "priority": "None",
            "tags": [],
            "completed": false,
            "completedDate": null,
            "timeAllocated": null,
            "objective": null,
            "goalId": null,
            "recurrence": {"type": "None", "interval": null, "unit": "day", "daysOfWeek": []},
            "inToday": false
        }]))
        .unwrap();

        save_tasks(&path, &tasks).unwrap();
        let loaded = load_tasks(&path).unwrap();
        assert_eq!(loaded, tasks);
    }
}
