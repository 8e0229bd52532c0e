//! Timer-driven sampling loop.
//!
//! The loop is RUNNING from the moment it is spawned until a stop is observed
//! on its `watch` channel, after which it is STOPPED for good. The stop is
//! polled before the timer, so a stop and a due tick arriving together never
//! produce one more sample. A tick that is
//! already being sampled finishes before the stop is looked at, so awaiting the
//! returned handle guarantees no row is written afterwards.

mod facts;

pub use facts::{record_static_facts, sample_tick, utilization_quantity, TickReport};

use crate::collectors::MetricsSource;
use crate::storage::Recorder;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

/// Totals over the loop's lifetime, returned when it exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopSummary {
    pub ticks: u64,
    pub rows: u64,
    pub source_failures: u64,
    pub write_failures: u64,
}

impl LoopSummary {
    fn absorb(&mut self, tick: TickReport) {
        self.ticks += 1;
        self.rows += tick.rows as u64;
        self.source_failures += tick.source_failures as u64;
        self.write_failures += tick.write_failures as u64;
    }
}

pub struct SamplingLoop {
    source: Arc<dyn MetricsSource>,
    recorder: Arc<Recorder>,
    interval: Duration,
}

impl SamplingLoop {
    pub fn new(
        source: Arc<dyn MetricsSource>,
        recorder: Arc<Recorder>,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            recorder,
            interval,
        }
    }

    pub fn spawn(self, stop: watch::Receiver<bool>) -> JoinHandle<LoopSummary> {
        tokio::spawn(self.run(stop))
    }

    /// Sample once per interval until `stop` turns true or its sender is dropped.
    /// The first sample is taken one full interval after the call.
    pub async fn run(self, mut stop: watch::Receiver<bool>) -> LoopSummary {
        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut summary = LoopSummary::default();
        let mut state = if *stop.borrow() {
            LoopState::Stopped
        } else {
            LoopState::Running
        };

        while state == LoopState::Running {
            tokio::select! {
                biased;

                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        state = LoopState::Stopped;
                    }
                }
                _ = ticker.tick() => {
                    summary.absorb(self.tick().await);
                }
            }
        }

        debug!(ticks = summary.ticks, rows = summary.rows, "sampling loop stopped");
        summary
    }

    async fn tick(&self) -> TickReport {
        let source = Arc::clone(&self.source);
        let recorder = Arc::clone(&self.recorder);
        match tokio::task::spawn_blocking(move || sample_tick(source.as_ref(), &recorder)).await {
            Ok(report) => report,
            Err(e) => {
                warn!(error = %e, "sampling tick aborted");
                TickReport {
                    source_failures: 1,
                    ..TickReport::default()
                }
            }
        }
    }
}
