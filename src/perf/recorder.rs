use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

use super::record::{round_to, SessionRecord, StepMetadata, StepRecord};
use crate::config::PerfConfig;

const HEADER_WIDTH: usize = 60;
const TABLE_WIDTH: usize = 50;

/// Times the steps of one unit of work and appends the result to a JSON Lines log store
///
/// Instrumentation never fails the caller: a missing subject file, a missing
/// `start()` or an unwritable log store all degrade to warnings.
pub struct SessionRecorder {
    log_file: PathBuf,
    console_output: bool,
    current: SessionRecord,
    started_at: Option<Instant>,
}

impl SessionRecorder {
    pub fn new(config: PerfConfig) -> Self {
        Self {
            log_file: config.log_path(),
            console_output: config.console_output,
            current: SessionRecord::new("", 0),
            started_at: None,
        }
    }

    /// Recorder writing to `log_file` with console output enabled
    pub fn with_log_file(log_file: impl Into<PathBuf>) -> Self {
        Self {
            log_file: log_file.into(),
            console_output: true,
            current: SessionRecord::new("", 0),
            started_at: None,
        }
    }

    /// Toggle the stdout header, step lines and summary table
    pub fn console_output(mut self, enabled: bool) -> Self {
        self.console_output = enabled;
        self
    }

    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    /// The in-progress session record
    pub fn current(&self) -> &SessionRecord {
        &self.current
    }

    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    /// Start a new session for `subject_path`, discarding any unfinished one
    pub fn start(&mut self, subject_path: impl AsRef<Path>) {
        let subject_path = subject_path.as_ref();
        self.started_at = Some(Instant::now());

        // A missing subject is fine, it just reports as 0 bytes
        let size_bytes = fs::metadata(subject_path).map(|m| m.len()).unwrap_or(0);
        let subject_id = subject_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| subject_path.display().to_string());

        self.current = SessionRecord::new(subject_id, size_bytes);

        info!(
            "Performance session started: {} ({} bytes)",
            self.current.subject_id, size_bytes
        );

        if self.console_output {
            println!("\n{}", "=".repeat(HEADER_WIDTH));
            println!("🎵 Performance Tracking Started");
            println!("   File: {}", self.current.subject_id);
            println!(
                "   Size: {} ({} bytes)",
                format_mb(self.current.size_mb),
                group_thousands(size_bytes)
            );
            println!("{}", "=".repeat(HEADER_WIDTH));
        }
    }

    /// Record a step's duration. Re-recording a name replaces the earlier entry.
    pub fn record_step(&mut self, name: &str, duration_ms: f64, metadata: StepMetadata) {
        // JSON has no NaN or infinity; they would be written as null
        let duration_ms = if duration_ms.is_finite() {
            duration_ms
        } else {
            warn!(step = name, "Non-finite step duration {}, recording 0", duration_ms);
            0.0
        };

        debug!(step = name, duration_ms, "Step recorded");

        if self.console_output {
            let mut line = format!("⏱️  {}: {:.0}ms", name, duration_ms);
            if !metadata.is_empty() {
                let meta = metadata
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, display_value(v)))
                    .collect::<Vec<_>>()
                    .join(", ");
                line.push_str(&format!(" ({})", meta));
            }
            println!("{}", line);
        }

        self.current
            .steps
            .insert(name.to_string(), StepRecord::new(duration_ms, metadata));
    }

    /// Close the session, append it to the log store and return a copy of it
    pub fn end(&mut self, success: bool, error: Option<&str>) -> SessionRecord {
        let total_time_ms = self
            .started_at
            .map(|started| started.elapsed().as_secs_f64() * 1000.0);
        self.finish(total_time_ms, success, error)
    }

    fn finish(
        &mut self,
        total_time_ms: Option<f64>,
        success: bool,
        error: Option<&str>,
    ) -> SessionRecord {
        match total_time_ms {
            Some(total) => self.current.total_time_ms = round_to(total, 2),
            None => warn!("Performance session ended without being started"),
        }

        self.current.success = success;
        if let Some(error) = error.filter(|e| !e.is_empty()) {
            self.current.error = Some(error.to_string());
        }

        self.current.breakdown_percent = self.current.compute_breakdown();

        if let Err(e) = self.append_to_log() {
            warn!("Failed to write to log file {}: {:#}", self.log_file.display(), e);
            if self.console_output {
                println!("⚠️  Warning: Failed to write to log file: {:#}", e);
            }
        }

        info!(
            "Performance session complete: {} ({:.2}ms, success={})",
            self.current.subject_id, self.current.total_time_ms, success
        );

        if self.console_output {
            self.print_summary();
        }

        self.current.clone()
    }

    /// Append the current record as a single line
    fn append_to_log(&self) -> Result<()> {
        if let Some(parent) = self.log_file.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create log directory: {:?}", parent))?;
            }
        }

        let mut line =
            serde_json::to_string(&self.current).context("Failed to serialize session")?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)
            .with_context(|| format!("Failed to open log file: {:?}", self.log_file))?;

        // One write call per record keeps concurrent appenders from splitting lines
        file.write_all(line.as_bytes())
            .context("Failed to append session to log file")?;

        Ok(())
    }

    fn print_summary(&self) {
        let session = &self.current;

        println!("\n{}", "=".repeat(HEADER_WIDTH));
        println!("📊 Performance Summary");
        println!("{}", "=".repeat(HEADER_WIDTH));

        println!("File: {}", session.subject_id);
        println!("Size: {}", format_mb(session.size_mb));
        println!(
            "Status: {}",
            if session.success { "✅ Success" } else { "❌ Failed" }
        );
        if let Some(error) = &session.error {
            println!("Error: {}", error);
        }

        println!("\n{:<30} {:<12} {:<8}", "Step Breakdown:", "Time", "%");
        println!("{}", "-".repeat(TABLE_WIDTH));

        for (name, step) in session.steps_by_duration() {
            let percent = session
                .breakdown_percent
                .as_ref()
                .and_then(|b| b.get(name))
                .copied()
                .unwrap_or(0.0);
            println!("{:<30} {:>8.0}ms   {:>5.1}%", name, step.duration_ms, percent);
        }

        println!("{}", "-".repeat(TABLE_WIDTH));
        println!(
            "{:<30} {:>8.0}ms   100.0%",
            "TOTAL", session.total_time_ms
        );
        println!("{}\n", "=".repeat(HEADER_WIDTH));
    }
}

/// Sizes print with their shortest exact decimal, keeping a trailing `.0`
fn format_mb(size_mb: f64) -> String {
    format!("{:?} MB", size_mb)
}

/// Strings print bare, everything else as JSON
fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
