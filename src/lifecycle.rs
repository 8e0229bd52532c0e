//! Process lifecycle: open the sink, record static facts, run the sampling loop
//! until interrupted, then drain and close.

use crate::collectors::MetricsSource;
use crate::config::{ConfigError, RecorderConfig};
use crate::sampling::{record_static_facts, LoopSummary, SamplingLoop};
use crate::storage::{RecordError, Recorder};
use chrono::Local;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("cannot create output file {}: {source}", path.display())]
    Sink { path: PathBuf, source: RecordError },
    #[error("sampling loop failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("cannot close output file: {0}")]
    Close(RecordError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub path: PathBuf,
    pub static_rows: u64,
    pub sampling: LoopSummary,
    pub rows_written: u64,
}

/// Run a full recording session. Returns once `interrupt` resolves and the
/// output file is closed.
pub async fn run<F>(
    config: &RecorderConfig,
    source: Arc<dyn MetricsSource>,
    interrupt: F,
) -> Result<RunSummary, RunError>
where
    F: Future<Output = ()>,
{
    config.validate()?;

    let path = config.output_path(Local::now());
    let recorder = Recorder::create(&path).map_err(|source| RunError::Sink {
        path: path.clone(),
        source,
    })?;
    let recorder = Arc::new(recorder);
    info!(path = %path.display(), interval_ms = config.interval_ms, "recording started");

    let startup = record_static_facts(source.as_ref(), &recorder);
    info!(
        rows = startup.rows,
        write_failures = startup.write_failures,
        "static host facts recorded"
    );

    let (stop_tx, stop_rx) = watch::channel(false);
    let sampler =
        SamplingLoop::new(source, Arc::clone(&recorder), config.interval()).spawn(stop_rx);

    interrupt.await;
    info!("interrupt received, stopping");

    // The loop may already be gone; joining below reports why.
    let _ = stop_tx.send(true);
    let sampling = sampler.await?;
    info!(ticks = sampling.ticks, "ticker stopped");

    if let Err(e) = recorder.flush() {
        warn!(error = %e, "final flush failed");
    }
    recorder.close().map_err(RunError::Close)?;

    let summary = RunSummary {
        path,
        static_rows: startup.rows as u64,
        sampling,
        rows_written: recorder.rows_written(),
    };
    info!(
        path = %summary.path.display(),
        rows = summary.rows_written,
        "output file closed"
    );
    Ok(summary)
}

/// Future that resolves on the first Ctrl-C / SIGTERM. Install once per process.
pub fn interrupt_signal() -> Result<impl Future<Output = ()>, ctrlc::Error> {
    let (tx, mut rx) = watch::channel(false);
    ctrlc::set_handler(move || {
        let _ = tx.send(true);
    })?;
    Ok(async move {
        // A dropped sender would mean the handler is gone; treat it as an interrupt too.
        let _ = rx.wait_for(|interrupted| *interrupted).await;
    })
}
