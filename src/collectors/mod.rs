//! Metrics sources: CPU identity and utilization, host identity, virtual memory.
//! The recorder only sees the [`MetricsSource`] trait; [`SystemSource`] backs it with sysinfo.

mod cpu;
mod host;
mod memory;

use std::sync::{Mutex, MutexGuard};
use sysinfo::System;

#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error("{0} is not available on this host")]
    Unavailable(&'static str),
    #[error("metrics source lock poisoned")]
    Poisoned,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Static identity of one logical CPU
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CpuIdentity {
    pub vendor_id: String,
    pub family: String,
    pub cores: u32,
    pub model_name: String,
    pub mhz: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostIdentity {
    pub hostname: String,
    pub uptime_secs: u64,
    pub os: String,
    pub platform: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MemoryStats {
    pub total_bytes: u64,
    pub available_bytes: u64,
    pub used_percent: f64,
}

/// Point-in-time host readings. Every call may fail on its own.
pub trait MetricsSource: Send + Sync {
    fn cpu_identities(&self) -> Result<Vec<CpuIdentity>, CollectError>;
    fn host_identity(&self) -> Result<HostIdentity, CollectError>;
    /// Utilization per logical core, in percent, since the previous call
    fn cpu_utilization(&self) -> Result<Vec<f64>, CollectError>;
    fn memory_stats(&self) -> Result<MemoryStats, CollectError>;
}

/// sysinfo-backed source. CPU usage is a delta, so the first reading after
/// construction is relative to the refresh done in [`SystemSource::new`].
pub struct SystemSource {
    sys: Mutex<System>,
}

impl Default for SystemSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemSource {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu();
        sys.refresh_memory();
        Self {
            sys: Mutex::new(sys),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, System>, CollectError> {
        self.sys.lock().map_err(|_| CollectError::Poisoned)
    }
}

impl MetricsSource for SystemSource {
    fn cpu_identities(&self) -> Result<Vec<CpuIdentity>, CollectError> {
        let mut sys = self.lock()?;
        sys.refresh_cpu();
        cpu::identities(&sys)
    }

    fn host_identity(&self) -> Result<HostIdentity, CollectError> {
        host::identity()
    }

    fn cpu_utilization(&self) -> Result<Vec<f64>, CollectError> {
        let mut sys = self.lock()?;
        sys.refresh_cpu();
        Ok(cpu::utilization(&sys))
    }

    fn memory_stats(&self) -> Result<MemoryStats, CollectError> {
        let mut sys = self.lock()?;
        sys.refresh_memory();
        memory::stats(&sys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_source_reads_this_host() {
        let source = SystemSource::new();
        let util = source.cpu_utilization().unwrap();
        assert!(util.iter().all(|p| p.is_finite() && *p >= 0.0));
        // sandboxes without /proc report no memory at all
        if let Ok(mem) = source.memory_stats() {
            assert!(mem.available_bytes <= mem.total_bytes);
            assert!((0.0..=100.0).contains(&mem.used_percent));
        }
    }
}
