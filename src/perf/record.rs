use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Free-form step metadata, kept in insertion order
pub type StepMetadata = Map<String, Value>;

/// One line of the performance log store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// When the session was started
    pub timestamp: DateTime<Local>,

    /// Name of the work item (basename of the input file)
    #[serde(alias = "audio_file")]
    pub subject_id: String,

    /// Size of the work item in bytes, 0 if it could not be read
    #[serde(alias = "file_size_bytes")]
    pub size_bytes: u64,

    /// Size of the work item in MiB, rounded to 2 decimals
    #[serde(alias = "file_size_mb")]
    pub size_mb: f64,

    /// Timed steps keyed by name
    #[serde(default)]
    pub steps: BTreeMap<String, StepRecord>,

    /// Wall-clock time from start to end, rounded to 2 decimals
    #[serde(default)]
    pub total_time_ms: f64,

    #[serde(default)]
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Each step's share of `total_time_ms` (0-100, 1 decimal).
    /// Only present when `total_time_ms > 0`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown_percent: Option<BTreeMap<String, f64>>,
}

impl SessionRecord {
    /// Fresh record for a subject, with nothing timed yet
    pub fn new(subject_id: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            timestamp: Local::now(),
            subject_id: subject_id.into(),
            size_bytes,
            size_mb: round_to(size_bytes as f64 / (1024.0 * 1024.0), 2),
            steps: BTreeMap::new(),
            total_time_ms: 0.0,
            success: false,
            error: None,
            breakdown_percent: None,
        }
    }

    /// Percentage of `total_time_ms` spent in each step, `None` when no time elapsed
    pub fn compute_breakdown(&self) -> Option<BTreeMap<String, f64>> {
        if self.total_time_ms <= 0.0 {
            return None;
        }

        Some(
            self.steps
                .iter()
                .map(|(name, step)| {
                    let percent = step.duration_ms / self.total_time_ms * 100.0;
                    (name.clone(), round_to(percent, 1))
                })
                .collect(),
        )
    }

    /// Steps ordered by descending duration
    pub fn steps_by_duration(&self) -> Vec<(&String, &StepRecord)> {
        let mut steps: Vec<_> = self.steps.iter().collect();
        steps.sort_by(|a, b| b.1.duration_ms.total_cmp(&a.1.duration_ms));
        steps
    }
}

/// A single timed step. Metadata is flattened next to `duration_ms` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    /// Duration in milliseconds, rounded to 2 decimals
    pub duration_ms: f64,

    #[serde(flatten)]
    pub metadata: StepMetadata,
}

impl StepRecord {
    pub fn new(duration_ms: f64, metadata: StepMetadata) -> Self {
        Self {
            duration_ms: round_to(duration_ms, 2),
            metadata,
        }
    }
}

/// Round half away from zero to `places` decimals
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
