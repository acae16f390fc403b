use anyhow::Result;
use clap::Parser;
use loqa_perf::{analyze, format_report, Config};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Analyze performance logs
#[derive(Debug, Parser)]
#[command(name = "loqa-perf", version)]
struct Args {
    /// Path to log file
    #[arg(long)]
    log_file: Option<String>,

    /// Analyze only the last N sessions
    #[arg(long)]
    last: Option<usize>,

    /// Print the analysis as JSON instead of the text report
    #[arg(long)]
    json: bool,

    /// Config file providing the default log file
    #[arg(long)]
    config: Option<String>,

    /// Log diagnostics to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cfg = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::from_env()?,
    };

    let log_file = match args.log_file {
        Some(path) => std::path::PathBuf::from(path),
        None => cfg.perf.log_path(),
    };

    info!("Analyzing {}", log_file.display());

    let analysis = analyze(&log_file, args.last);

    if args.json {
        let value = match &analysis {
            Ok(analysis) => serde_json::to_value(analysis)?,
            Err(e) => serde_json::json!({ "error": e.to_string() }),
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print!("{}", format_report(&analysis));
    }

    Ok(())
}
