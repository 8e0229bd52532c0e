//! Virtual memory totals.

use super::{CollectError, MemoryStats};
use sysinfo::System;

pub(super) fn stats(sys: &System) -> Result<MemoryStats, CollectError> {
    let total_bytes = sys.total_memory();
    if total_bytes == 0 {
        return Err(CollectError::Unavailable("virtual memory"));
    }
    let available_bytes = sys.available_memory().min(total_bytes);
    Ok(MemoryStats {
        total_bytes,
        available_bytes,
        used_percent: used_percent(total_bytes, available_bytes),
    })
}

fn used_percent(total: u64, available: u64) -> f64 {
    (total - available) as f64 / total as f64 * 100.0
}
