use thiserror::Error;

/// Top-level error type for the Taskpilot system.
///
/// Subsystem crates define their own error types and implement
/// `From<SubsystemError> for PilotError` so that the `?` operator works
/// across crate boundaries. Note that the pipeline's graceful-degradation
/// cases (malformed action blocks, dangling task ids, invalid recurrence
/// shapes, double-undo) are deliberately NOT errors; they recover silently.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PilotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Executor error: {0}")]
    Executor(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for PilotError {
    fn from(err: toml::de::Error) -> Self {
        PilotError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for PilotError {
    fn from(err: toml::ser::Error) -> Self {
        PilotError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for PilotError {
    fn from(err: serde_json::Error) -> Self {
        PilotError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Taskpilot operations.
pub type Result<T> = std::result::Result<T, PilotError>;
