//! Per-logical-CPU identity and utilization.

use super::{CollectError, CpuIdentity};
use sysinfo::System;

pub(super) fn identities(sys: &System) -> Result<Vec<CpuIdentity>, CollectError> {
    let cpus = sys.cpus();
    if cpus.is_empty() {
        return Err(CollectError::Unavailable("cpu info"));
    }
    let families = families();
    let cores = sys.physical_core_count().unwrap_or(cpus.len()) as u32;
    Ok(cpus
        .iter()
        .enumerate()
        .map(|(idx, cpu)| CpuIdentity {
            vendor_id: cpu.vendor_id().to_string(),
            family: families.get(idx).cloned().unwrap_or_default(),
            cores,
            model_name: cpu.brand().trim().to_string(),
            mhz: cpu.frequency() as f64,
        })
        .collect())
}

pub(super) fn utilization(sys: &System) -> Vec<f64> {
    sys.cpus().iter().map(|cpu| f64::from(cpu.cpu_usage())).collect()
}

#[cfg(target_os = "linux")]
fn families() -> Vec<String> {
    std::fs::read_to_string("/proc/cpuinfo")
        .map(|s| parse_cpu_families(&s))
        .unwrap_or_default()
}

// sysinfo has no notion of CPU family outside /proc/cpuinfo
#[cfg(not(target_os = "linux"))]
fn families() -> Vec<String> {
    Vec::new()
}

/// `cpu family` per processor block, in processor order.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_cpu_families(cpuinfo: &str) -> Vec<String> {
    cpuinfo
        .lines()
        .filter_map(|line| {
            let (key, value) = line.split_once(':')?;
            (key.trim() == "cpu family").then(|| value.trim().to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_family_per_processor() {
        let cpuinfo = "processor\t: 0\nvendor_id\t: GenuineIntel\ncpu family\t: 6\n\n\
                       processor\t: 1\nvendor_id\t: GenuineIntel\ncpu family\t: 6\n";
        assert_eq!(parse_cpu_families(cpuinfo), vec!["6", "6"]);
    }

    #[test]
    fn missing_family_yields_nothing() {
        assert!(parse_cpu_families("processor : 0\nHardware : BCM2835\n").is_empty());
    }
}
