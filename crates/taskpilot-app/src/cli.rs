//! CLI argument definitions for the Taskpilot binary.
//!
//! Uses `clap` with derive macros. Priority resolution:
//! CLI args > env vars > config file > defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Taskpilot — applies assistant-proposed task mutations with approval
/// gating and undo.
#[derive(Parser, Debug)]
#[command(name = "taskpilot", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Override "today" for date calculations (YYYY-MM-DD).
    #[arg(long = "today")]
    pub today: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse an assistant reply and apply its actions to the task file.
    Apply {
        /// Task collection JSON file (defaults to the configured path).
        #[arg(short = 't', long = "tasks")]
        tasks: Option<PathBuf>,

        /// Assistant reply file; reads stdin when omitted.
        reply: Option<PathBuf>,

        /// Execute deletes without pausing for approval.
        #[arg(long = "auto-approve-deletes")]
        auto_approve_deletes: bool,
    },
    /// Print the next occurrence date for a recurrence rule.
    Next {
        /// Recurrence rule as JSON, e.g.
        /// '{"type":"Weekly","daysOfWeek":["Mon","Wed"]}'.
        recurrence: String,

        /// Date to advance from (YYYY-MM-DD); defaults to today.
        #[arg(long = "from")]
        from: Option<String>,
    },
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > TASKPILOT_CONFIG env var > platform
    /// default (~/.taskpilot/config.toml).
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("TASKPILOT_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".taskpilot").join("config.toml");
    }
    PathBuf::from("config.toml")
}
