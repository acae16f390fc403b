use std::time::Instant;

use super::record::StepMetadata;
use super::recorder::SessionRecorder;

/// Guard that records a step on the recorder when it goes out of scope
///
/// The step is recorded exactly once, on drop, whether the scope exits
/// normally, through `?` or by unwinding a panic. The guard never touches
/// the error that ended the scope.
///
/// ```no_run
/// use loqa_perf::{SessionRecorder, StepTimer};
///
/// let mut recorder = SessionRecorder::with_log_file("performance_logs.jsonl");
/// recorder.start("meeting.wav");
/// {
///     let _timer = StepTimer::new(&mut recorder, "transcribe");
///     // ... work ...
/// }
/// recorder.end(true, None);
/// ```
pub struct StepTimer<'a> {
    recorder: &'a mut SessionRecorder,
    name: String,
    metadata: StepMetadata,
    started_at: Instant,
}

impl<'a> StepTimer<'a> {
    pub fn new(recorder: &'a mut SessionRecorder, name: impl Into<String>) -> Self {
        Self::with_metadata(recorder, name, StepMetadata::new())
    }

    pub fn with_metadata(
        recorder: &'a mut SessionRecorder,
        name: impl Into<String>,
        metadata: StepMetadata,
    ) -> Self {
        Self {
            recorder,
            name: name.into(),
            metadata,
            started_at: Instant::now(),
        }
    }

    /// Attach another metadata field before the step is recorded
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.metadata.insert(key.into(), value.into());
    }

    /// The recorder is borrowed for the guard's lifetime; this hands it back
    /// for nested bookkeeping (e.g. recording sub-steps directly).
    pub fn recorder(&mut self) -> &mut SessionRecorder {
        self.recorder
    }
}

impl Drop for StepTimer<'_> {
    fn drop(&mut self) {
        let duration_ms = self.started_at.elapsed().as_secs_f64() * 1000.0;
        let metadata = std::mem::take(&mut self.metadata);
        self.recorder.record_step(&self.name, duration_ms, metadata);
    }
}

/// Run `f` as a timed step and pass its result through untouched
pub fn time_step<T>(
    recorder: &mut SessionRecorder,
    name: &str,
    metadata: StepMetadata,
    f: impl FnOnce() -> T,
) -> T {
    let _timer = StepTimer::with_metadata(recorder, name, metadata);
    f()
}
