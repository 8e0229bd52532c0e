//! Sysstats recorder: samples host metrics on a fixed interval and appends them
//! as timestamped rows to a CSV file until interrupted.
//!
//! Modular structure:
//! - [`collectors`] — Metrics source trait and the sysinfo-backed implementation
//! - [`storage`] — Durable, lock-serialized CSV recorder
//! - [`sampling`] — Static startup facts and the timer-driven sampling loop
//! - [`lifecycle`] — Startup, interrupt handling, drain-then-close shutdown
//! - [`logging`] — Operator log output

pub mod collectors;
pub mod config;
pub mod lifecycle;
pub mod logging;
pub mod sampling;
pub mod storage;

pub use collectors::{
    CollectError, CpuIdentity, HostIdentity, MemoryStats, MetricsSource, SystemSource,
};
pub use config::RecorderConfig;
pub use lifecycle::{run, RunError, RunSummary};
pub use logging::StructuredLogger;
pub use sampling::{LoopState, LoopSummary, SamplingLoop};
pub use storage::{Record, RecordError, Recorder};
