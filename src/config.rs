use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;

/// Default location of the performance log store
pub const DEFAULT_LOG_FILE: &str = "performance_logs.jsonl";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub perf: PerfConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PerfConfig {
    /// Path of the JSON Lines log store (a leading `~` is expanded)
    #[serde(default = "default_log_file")]
    pub log_file: String,

    /// Print headers, step lines and summaries to stdout
    #[serde(default = "default_console_output")]
    pub console_output: bool,
}

fn default_log_file() -> String {
    DEFAULT_LOG_FILE.to_string()
}

fn default_console_output() -> bool {
    true
}

impl Default for PerfConfig {
    fn default() -> Self {
        Self {
            log_file: default_log_file(),
            console_output: default_console_output(),
        }
    }
}

impl PerfConfig {
    /// Resolved log store path with `~` expanded
    pub fn log_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.log_file).into_owned())
    }
}

impl Config {
    /// Load from a config file (any format the `config` crate understands),
    /// layered with `LOQA_PERF_*` environment overrides.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("LOQA_PERF").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Defaults plus environment overrides, no file required
    pub fn from_env() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix("LOQA_PERF").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
