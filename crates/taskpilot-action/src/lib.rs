//! Action pipeline for Taskpilot.
//!
//! Takes a free-form assistant reply, extracts the embedded action block,
//! and applies the proposed mutations to a task collection: creates and
//! updates run automatically, deletes pause for explicit approval, and every
//! applied mutation is recorded in an undo ledger so it can be reversed.
//!
//! The pipeline treats the assistant as untrusted: malformed blocks,
//! dangling task ids, and invalid recurrence shapes all degrade gracefully
//! instead of failing the surrounding session.

pub mod error;
pub mod executor;
pub mod ledger;
pub mod normalize;
pub mod parser;
pub mod recurrence;
pub mod types;

pub use error::ExecutorError;
pub use executor::{ExecutionOutcome, Executor};
pub use ledger::UndoLedger;
pub use normalize::{IdGenerator, Normalizer};
pub use parser::{parse_reply, ParsedReply};
pub use recurrence::{first_occurrence, next_occurrence};
pub use types::{Action, ActionState};
