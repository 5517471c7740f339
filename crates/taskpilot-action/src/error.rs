//! Error types for the action pipeline.
//!
//! Only caller bugs surface as errors. Everything originating from the
//! assistant (malformed blocks, dangling ids, bad recurrence shapes) is
//! recovered inside the pipeline and never raised.

use crate::types::ActionState;
use taskpilot_core::error::PilotError;

/// Errors from the action executor's resume operations.
#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    #[error("Action index {index} out of bounds for {len} actions")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("Action at index {index} is {state}, not pending_approval")]
    NotPendingApproval { index: usize, state: ActionState },
}

impl From<ExecutorError> for PilotError {
    fn from(err: ExecutorError) -> Self {
        PilotError::Executor(err.to_string())
    }
}
