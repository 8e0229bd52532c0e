//! Turning metrics source readings into recorded rows.

use crate::collectors::{CpuIdentity, HostIdentity, MemoryStats, MetricsSource};
use crate::storage::Recorder;
use chrono::{DateTime, Local};
use tracing::warn;

pub const UNIT_NONE: &str = "-";
pub const UNIT_PERCENT: &str = "%";
pub const UNIT_BYTES: &str = "Bytes";
pub const UNIT_MHZ: &str = "MHz";
pub const UNIT_SECONDS: &str = "s";

/// Outcome of one sampling pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub rows: usize,
    pub source_failures: usize,
    pub write_failures: usize,
}

impl TickReport {
    fn emit(
        &mut self,
        recorder: &Recorder,
        at: Option<DateTime<Local>>,
        quantity: &str,
        value: &str,
        unit: &str,
    ) {
        let result = match at {
            Some(at) => recorder.emit_at(at, quantity, value, unit),
            None => recorder.emit(quantity, value, unit),
        };
        match result {
            Ok(()) => self.rows += 1,
            Err(e) => {
                self.write_failures += 1;
                warn!(quantity, error = %e, "failed to record row");
            }
        }
    }

    fn source_failed(&mut self, what: &str, error: impl std::fmt::Display) {
        self.source_failures += 1;
        warn!(what, error = %error, "metrics source query failed");
    }
}

pub fn utilization_quantity(idx: usize) -> String {
    format!("Current CPU utilization: [{idx}]")
}

fn decimal(v: f64) -> String {
    format!("{v:.2}")
}

/// One periodic sample: per-core utilization, then memory, all sharing one
/// capture instant. A failed query drops that group only.
pub fn sample_tick(source: &dyn MetricsSource, recorder: &Recorder) -> TickReport {
    let mut report = TickReport::default();

    let utilization = source
        .cpu_utilization()
        .map_err(|e| report.source_failed("cpu utilization", e))
        .unwrap_or_default();
    let memory = source
        .memory_stats()
        .map_err(|e| report.source_failed("virtual memory", e))
        .ok();

    let now = Local::now();
    for (idx, percent) in utilization.iter().enumerate() {
        let quantity = utilization_quantity(idx);
        report.emit(recorder, Some(now), &quantity, &decimal(*percent), UNIT_PERCENT);
    }
    if let Some(mem) = memory {
        record_memory(&mut report, recorder, now, &mem);
    }
    report
}

fn record_memory(
    report: &mut TickReport,
    recorder: &Recorder,
    at: DateTime<Local>,
    mem: &MemoryStats,
) {
    let at = Some(at);
    report.emit(recorder, at, "Total memory", &mem.total_bytes.to_string(), UNIT_BYTES);
    report.emit(recorder, at, "Available memory", &mem.available_bytes.to_string(), UNIT_BYTES);
    report.emit(recorder, at, "Percentage used memory", &decimal(mem.used_percent), UNIT_PERCENT);
}

/// Startup facts: header, CPU identity per logical CPU (one shared instant),
/// then host identity stamped row by row. Write failures, the header's
/// included, are logged and counted; the next row retries the header.
pub fn record_static_facts(source: &dyn MetricsSource, recorder: &Recorder) -> TickReport {
    let mut report = TickReport::default();

    let cpus = source
        .cpu_identities()
        .map_err(|e| report.source_failed("cpu identity", e))
        .unwrap_or_default();
    let host = source
        .host_identity()
        .map_err(|e| report.source_failed("host identity", e))
        .unwrap_or_default();

    if let Err(e) = recorder.write_header() {
        report.write_failures += 1;
        warn!(error = %e, "failed to write header");
    }

    let now = Local::now();
    for (idx, cpu) in cpus.iter().enumerate() {
        record_cpu(&mut report, recorder, now, idx, cpu);
    }
    record_host(&mut report, recorder, &host);
    report
}

fn record_cpu(
    report: &mut TickReport,
    recorder: &Recorder,
    at: DateTime<Local>,
    idx: usize,
    cpu: &CpuIdentity,
) {
    let at = Some(at);
    let cores = cpu.cores.to_string();
    report.emit(recorder, at, &format!("CPU {idx} VendorID"), &cpu.vendor_id, UNIT_NONE);
    report.emit(recorder, at, &format!("CPU {idx} Family"), &cpu.family, UNIT_NONE);
    report.emit(recorder, at, &format!("CPU {idx} Number of cores"), &cores, UNIT_NONE);
    report.emit(recorder, at, &format!("CPU {idx} Model Name"), &cpu.model_name, UNIT_NONE);
    report.emit(recorder, at, &format!("CPU {idx} Speed"), &decimal(cpu.mhz), UNIT_MHZ);
}

fn record_host(report: &mut TickReport, recorder: &Recorder, host: &HostIdentity) {
    let uptime = host.uptime_secs.to_string();
    report.emit(recorder, None, "Hostname", &host.hostname, UNIT_NONE);
    report.emit(recorder, None, "Uptime", &uptime, UNIT_SECONDS);
    report.emit(recorder, None, "OS", &host.os, UNIT_NONE);
    report.emit(recorder, None, "Platform", &host.platform, UNIT_NONE);
}
