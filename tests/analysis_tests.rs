// Integration tests for log analysis
//
// These tests write sessions with the recorder (or by hand, for malformed
// input) and check the aggregated statistics.

use anyhow::Result;
use loqa_perf::{analyze, format_report, AnalysisError, SessionRecorder, StepMetadata};
use std::fs::{self, OpenOptions};
use std::io::Write;
use tempfile::TempDir;

#[test]
fn test_analyze_recorded_sessions() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let log_file = temp_dir.path().join("perf.jsonl");

    let mut recorder = SessionRecorder::with_log_file(&log_file).console_output(false);
    for (i, load_ms) in [Some(10.0), Some(20.0), None, Some(30.0)].into_iter().enumerate() {
        recorder.start(format!("session-{}.wav", i));
        if let Some(ms) = load_ms {
            recorder.record_step("load", ms, StepMetadata::new());
        }
        recorder.record_step("transcribe", 100.0 * (i + 1) as f64, StepMetadata::new());
        recorder.end(i != 2, None);
    }

    let analysis = analyze(&log_file, None).map_err(anyhow::Error::from)?;

    assert_eq!(analysis.summary.total_sessions, 4);
    assert_eq!(analysis.summary.successful_sessions, 3);
    assert_eq!(analysis.summary.success_rate, 75.0);

    let load = &analysis.step_performance["load"];
    assert_eq!((load.avg_ms, load.min_ms, load.max_ms, load.count), (20.0, 10.0, 30.0, 3));

    let transcribe = &analysis.step_performance["transcribe"];
    assert_eq!(transcribe.count, 4);
    assert_eq!(transcribe.avg_ms, 250.0);

    Ok(())
}

#[test]
fn test_partial_trailing_line_is_ignored() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let log_file = temp_dir.path().join("perf.jsonl");

    let mut recorder = SessionRecorder::with_log_file(&log_file).console_output(false);
    recorder.start("a.wav");
    recorder.end(true, None);

    // Simulate a writer that crashed mid-line
    let mut file = OpenOptions::new().append(true).open(&log_file)?;
    file.write_all(br#"{"timestamp":"2025-10-28T10:00:00+00:00","subject_id":"b.wa"#)?;
    drop(file);

    let analysis = analyze(&log_file, None).map_err(anyhow::Error::from)?;
    assert_eq!(analysis.summary.total_sessions, 1);

    Ok(())
}

#[test]
fn test_report_for_missing_store() {
    let temp_dir = TempDir::new().unwrap();
    let analysis = analyze(temp_dir.path().join("none.jsonl"), Some(3));

    assert_eq!(analysis, Err(AnalysisError::LogFileNotFound));
    assert_eq!(format_report(&analysis), "❌ Error: Log file not found\n");
}

#[test]
fn test_report_for_garbage_store() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let log_file = temp_dir.path().join("perf.jsonl");
    fs::write(&log_file, "garbage\n{\n")?;

    let analysis = analyze(&log_file, None);
    assert_eq!(format_report(&analysis), "❌ Error: No valid sessions found\n");

    Ok(())
}

#[test]
fn test_report_lists_recorded_steps() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let log_file = temp_dir.path().join("perf.jsonl");

    let mut recorder = SessionRecorder::with_log_file(&log_file).console_output(false);
    recorder.start("a.wav");
    recorder.record_step("transcribe", 800.0, StepMetadata::new());
    recorder.record_step("postprocess", 200.0, StepMetadata::new());
    recorder.end(true, None);

    let report = format_report(&analyze(&log_file, None));
    assert!(report.contains("Total Sessions: 1"));
    assert!(report.contains("Successful: 1 (100.0%)"));

    let transcribe = report.find("transcribe").unwrap();
    let postprocess = report.find("postprocess").unwrap();
    assert!(transcribe < postprocess);

    Ok(())
}

#[test]
fn test_infinite_step_duration_keeps_session_in_analysis() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let log_file = temp_dir.path().join("perf.jsonl");

    let mut recorder = SessionRecorder::with_log_file(&log_file).console_output(false);
    recorder.start("a.wav");
    recorder.record_step("transcribe", f64::INFINITY, StepMetadata::new());
    recorder.record_step("load", 5.0, StepMetadata::new());
    recorder.end(true, None);

    let analysis = analyze(&log_file, None).map_err(anyhow::Error::from)?;
    assert_eq!(analysis.summary.total_sessions, 1);
    assert_eq!(analysis.step_performance["transcribe"].max_ms, 0.0);
    assert_eq!(analysis.step_performance["load"].avg_ms, 5.0);

    Ok(())
}
