//! Offline analysis of the performance log store
//!
//! Reads every parseable session record, optionally keeps only the most
//! recent N, and aggregates success counts, overall timing and per-step
//! timing. `format_report` renders the result for the terminal.

mod analyzer;
mod report;
mod types;

pub use analyzer::analyze;
pub use report::format_report;
pub use types::{Analysis, AnalysisError, OverallPerformance, StepStats, Summary};
