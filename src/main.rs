//! Sysstats recorder entrypoint: record host metrics to `<prefix><timestamp>.csv`
//! every interval until Ctrl+C.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use sysstats_recorder::{lifecycle, RecorderConfig, StructuredLogger, SystemSource};
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(version, about = "Record host CPU, memory and host facts to a CSV file")]
struct Cli {
    /// Filename prefix to store data to (timestamp and .csv get appended automatically)
    #[arg(short = 'f', long = "file-prefix")]
    file_prefix: Option<String>,
    /// Time interval for measurements in ms
    #[arg(short = 't', long = "interval-ms")]
    interval_ms: Option<u64>,
    /// JSON config file (defaults to $SYSSTATS_CONFIG_PATH, then sysstats.json)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .or_else(|| std::env::var("SYSSTATS_CONFIG_PATH").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("sysstats.json"));
    let config =
        RecorderConfig::load(&config_path).with_overrides(cli.file_prefix, cli.interval_ms);

    StructuredLogger::init(config.log.json, &config.log.level);
    info!(config = ?config_path, "sysstats recorder starting (Ctrl+C to stop)");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let interrupt = lifecycle::interrupt_signal()?;
    let source = Arc::new(SystemSource::new());

    match runtime.block_on(lifecycle::run(&config, source, interrupt)) {
        Ok(summary) => {
            info!(
                path = %summary.path.display(),
                ticks = summary.sampling.ticks,
                rows = summary.rows_written,
                "sysstats recorder stopped"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "sysstats recorder failed");
            Err(e.into())
        }
    }
}
