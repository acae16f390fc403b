use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Why there was nothing to analyze
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("Log file not found")]
    LogFileNotFound,

    #[error("No valid sessions found")]
    NoValidSessions,
}

/// Cross-session statistics for a log store
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub summary: Summary,
    pub overall_performance: OverallPerformance,
    pub step_performance: BTreeMap<String, StepStats>,
    /// Sessions considered after applying `last_n`
    pub analyzed_sessions: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_sessions: usize,
    pub successful_sessions: usize,
    pub failed_sessions: usize,
    /// Percentage of successful sessions, 1 decimal
    pub success_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallPerformance {
    pub avg_total_time_ms: f64,
    pub min_total_time_ms: f64,
    pub max_total_time_ms: f64,
    pub avg_size_mb: f64,
}

/// Timing of one step name across the sessions that contain it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepStats {
    pub avg_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub count: usize,
}

/// Lenient view of a log line. Only what the statistics need is read, and
/// anything optional may be missing from older or hand-written records.
#[derive(Debug, Deserialize)]
pub(crate) struct LoggedSession {
    /// Missing or null counts as a failed session
    #[serde(default)]
    pub success: Option<bool>,

    #[serde(default)]
    pub steps: Option<BTreeMap<String, LoggedStep>>,

    pub total_time_ms: Option<f64>,

    #[serde(alias = "file_size_mb")]
    pub size_mb: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoggedStep {
    /// Required, but null for non-finite durations serialized by older writers
    #[serde(deserialize_with = "nullable")]
    pub duration_ms: Option<f64>,
}

// Without `#[serde(default)]` a missing field is still an error
fn nullable<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<f64>::deserialize(deserializer)
}

impl LoggedSession {
    pub fn succeeded(&self) -> bool {
        self.success.unwrap_or(false)
    }

    /// Steps that carry a usable duration
    pub fn timed_steps(&self) -> impl Iterator<Item = (&str, f64)> {
        self.steps
            .iter()
            .flatten()
            .filter_map(|(name, step)| step.duration_ms.map(|ms| (name.as_str(), ms)))
    }
}
