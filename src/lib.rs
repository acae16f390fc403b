pub mod analysis;
pub mod config;
pub mod perf;

pub use analysis::{
    analyze, format_report, Analysis, AnalysisError, OverallPerformance, StepStats, Summary,
};
pub use config::{Config, PerfConfig, DEFAULT_LOG_FILE};
pub use perf::{time_step, SessionRecord, SessionRecorder, StepMetadata, StepRecord, StepTimer};
