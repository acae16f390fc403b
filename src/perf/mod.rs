//! Session-scoped step timing
//!
//! This module provides the `SessionRecorder` that:
//! - Times the named steps of one unit of work (a "session")
//! - Computes each step's share of the total session time
//! - Appends the finished record to a JSON Lines log store
//! - Optionally prints a header, per-step lines and a summary table

mod record;
mod recorder;
mod timer;

pub use record::{round_to, SessionRecord, StepMetadata, StepRecord};
pub use recorder::SessionRecorder;
pub use timer::{time_step, StepTimer};
