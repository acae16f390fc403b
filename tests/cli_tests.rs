// Integration tests for the loqa-perf command line

use anyhow::Result;
use assert_cmd::Command;
use std::fs;
use tempfile::TempDir;

const TWO_SESSIONS: &str = concat!(
    r#"{"timestamp":"2025-10-28T10:00:00+00:00","subject_id":"a.wav","size_bytes":1048576,"size_mb":1.0,"steps":{"transcribe":{"duration_ms":80.0}},"total_time_ms":100.0,"success":true,"breakdown_percent":{"transcribe":80.0}}"#,
    "\n",
    r#"{"timestamp":"2025-10-28T11:00:00+00:00","subject_id":"b.wav","size_bytes":3145728,"size_mb":3.0,"steps":{"transcribe":{"duration_ms":240.0}},"total_time_ms":300.0,"success":false,"error":"boom","breakdown_percent":{"transcribe":80.0}}"#,
    "\n",
);

fn loqa_perf() -> Command {
    let mut cmd = Command::cargo_bin("loqa-perf").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_prints_report() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let log_file = temp_dir.path().join("perf.jsonl");
    fs::write(&log_file, TWO_SESSIONS)?;

    let output = loqa_perf().arg("--log-file").arg(&log_file).output()?;
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("Total Sessions: 2"));
    assert!(stdout.contains("Successful: 1 (50.0%)"));
    assert!(stdout.contains("Average Total Time: 200ms"));
    assert!(stdout.contains("transcribe"));

    Ok(())
}

#[test]
fn test_cli_last_and_json() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let log_file = temp_dir.path().join("perf.jsonl");
    fs::write(&log_file, TWO_SESSIONS)?;

    let output = loqa_perf()
        .arg("--log-file")
        .arg(&log_file)
        .args(["--last", "1", "--json"])
        .output()?;
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["analyzed_sessions"], 1);
    assert_eq!(value["summary"]["failed_sessions"], 1);
    assert_eq!(value["overall_performance"]["avg_total_time_ms"], 300.0);
    assert_eq!(value["step_performance"]["transcribe"]["count"], 1);

    Ok(())
}

#[test]
fn test_cli_missing_store_exits_cleanly() -> Result<()> {
    let temp_dir = TempDir::new()?;

    let output = loqa_perf()
        .arg("--log-file")
        .arg(temp_dir.path().join("absent.jsonl"))
        .output()?;
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout)?, "❌ Error: Log file not found\n");

    Ok(())
}

#[test]
fn test_cli_rejects_non_numeric_last() {
    loqa_perf().args(["--last", "many"]).assert().failure();
}
