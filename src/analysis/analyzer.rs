use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info, warn};

use super::types::{
    Analysis, AnalysisError, LoggedSession, OverallPerformance, StepStats, Summary,
};
use crate::perf::round_to;

/// Aggregate the sessions in a log store, optionally only the last `last_n`
///
/// `last_n` of `None` or `Some(0)` analyzes every session.
pub fn analyze(
    log_file: impl AsRef<Path>,
    last_n: Option<usize>,
) -> Result<Analysis, AnalysisError> {
    let log_file = log_file.as_ref();

    if !log_file.exists() {
        return Err(AnalysisError::LogFileNotFound);
    }

    let mut sessions = match File::open(log_file) {
        Ok(file) => read_sessions(BufReader::new(file)),
        Err(e) => {
            warn!("Failed to open log file {}: {}", log_file.display(), e);
            Vec::new()
        }
    };

    if sessions.is_empty() {
        return Err(AnalysisError::NoValidSessions);
    }

    if let Some(n) = last_n.filter(|&n| n > 0) {
        if sessions.len() > n {
            sessions.drain(..sessions.len() - n);
        }
    }

    info!(
        "Analyzing {} sessions from {}",
        sessions.len(),
        log_file.display()
    );

    Ok(aggregate(&sessions))
}

/// Parse every well-formed line, skipping anything that doesn't parse.
/// A read error ends the scan but keeps what was already collected.
fn read_sessions(reader: impl BufRead) -> Vec<LoggedSession> {
    let mut sessions = Vec::new();
    let mut skipped = 0usize;

    for line in reader.split(b'\n') {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Stopped reading log file after {} sessions: {}", sessions.len(), e);
                break;
            }
        };
        let line = String::from_utf8_lossy(&line);
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<LoggedSession>(line) {
            Ok(session) => sessions.push(session),
            Err(_) => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!("Skipped {} malformed lines", skipped);
    }

    sessions
}

fn aggregate(sessions: &[LoggedSession]) -> Analysis {
    let total_sessions = sessions.len();
    let successful_sessions = sessions.iter().filter(|s| s.succeeded()).count();

    let success_rate = if total_sessions > 0 {
        round_to(successful_sessions as f64 / total_sessions as f64 * 100.0, 1)
    } else {
        0.0
    };

    let mut step_times: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for session in sessions {
        for (name, duration_ms) in session.timed_steps() {
            step_times.entry(name).or_default().push(duration_ms);
        }
    }

    let step_performance = step_times
        .into_iter()
        .map(|(name, times)| {
            let stats = StepStats {
                avg_ms: round_to(mean(&times), 2),
                min_ms: round_to(min(&times), 2),
                max_ms: round_to(max(&times), 2),
                count: times.len(),
            };
            (name.to_string(), stats)
        })
        .collect();

    let total_times: Vec<f64> = sessions.iter().filter_map(|s| s.total_time_ms).collect();
    let sizes: Vec<f64> = sessions.iter().filter_map(|s| s.size_mb).collect();

    Analysis {
        summary: Summary {
            total_sessions,
            successful_sessions,
            failed_sessions: total_sessions - successful_sessions,
            success_rate,
        },
        overall_performance: OverallPerformance {
            avg_total_time_ms: round_to(mean(&total_times), 2),
            min_total_time_ms: round_to(min(&total_times), 2),
            max_total_time_ms: round_to(max(&total_times), 2),
            avg_size_mb: round_to(mean(&sizes), 2),
        },
        step_performance,
        analyzed_sessions: total_sessions,
    }
}

// Empty input yields 0 for all three helpers

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn min(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::min).unwrap_or(0.0)
}

fn max(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::max).unwrap_or(0.0)
}
