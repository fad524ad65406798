// OS identity, boot time, CPU and memory models

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::format::human_bytes;

/// Host identity as reported by uname(2) or its platform equivalent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OsIdentity {
    pub name: String,
    pub node: String,
    pub release: String,
    pub version: String,
    pub machine: String,
    pub processor: String,
}

impl fmt::Display for OsIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} {}>", self.name, self.version)
    }
}

/// System boot instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootTime {
    pub epoch_secs: u64,
    pub local: DateTime<Local>,
}

impl BootTime {
    /// Build from Unix seconds. Returns None if the value is out of chrono's range.
    pub fn from_epoch_secs(epoch_secs: u64) -> Option<Self> {
        let secs = i64::try_from(epoch_secs).ok()?;
        let utc = DateTime::from_timestamp(secs, 0)?;
        Some(Self {
            epoch_secs,
            local: utc.with_timezone(&Local),
        })
    }
}

impl fmt::Display for BootTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.local.format("%Y-%m-%d %H:%M:%S"))
    }
}

/// CPU topology, frequency and utilization over one sampling window.
/// Frequencies are in MHz; any of them may be missing on virtualized hosts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuReading {
    pub physical_cores: Option<usize>,
    pub logical_cores: usize,
    pub min_freq_mhz: Option<f64>,
    pub max_freq_mhz: Option<f64>,
    pub current_freq_mhz: Option<f64>,
    /// Core index to utilization percent, one entry per logical core.
    pub per_core_usage: BTreeMap<usize, f32>,
    pub total_usage: f32,
}

impl fmt::Display for CpuReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let physical = self
            .physical_cores
            .map(|n| n.to_string())
            .unwrap_or_else(|| "?".into());
        write!(
            f,
            "<CPU {} physical, {} logical, {:.1}%>",
            physical, self.logical_cores, self.total_usage
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryReading {
    pub total: u64,
    pub available: u64,
    pub used: u64,
    pub percent: f64,
    pub swap_total: u64,
    pub swap_free: u64,
    pub swap_used: u64,
    pub swap_percent: f64,
}

impl MemoryReading {
    /// Derive percentages from raw byte counts. Used values are capped at their totals.
    pub fn from_raw(
        total: u64,
        available: u64,
        used: u64,
        swap_total: u64,
        swap_free: u64,
        swap_used: u64,
    ) -> Self {
        let used = used.min(total);
        let swap_used = swap_used.min(swap_total);
        Self {
            total,
            available,
            used,
            percent: ratio_percent(total.saturating_sub(available), total),
            swap_total,
            swap_free,
            swap_used,
            swap_percent: ratio_percent(swap_used, swap_total),
        }
    }
}

impl fmt::Display for MemoryReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Memory total={} available={} used={} {:.1}%>",
            human_bytes(self.total),
            human_bytes(self.available),
            human_bytes(self.used),
            self.percent
        )
    }
}

/// Percentage rounded to one decimal; 0 when the denominator is 0.
pub(crate) fn ratio_percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    ((part as f64 / whole as f64) * 1000.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_percent_uses_available_not_used() {
        let m = MemoryReading::from_raw(1000, 250, 700, 0, 0, 0);
        assert_eq!(m.percent, 75.0);
        assert_eq!(m.swap_percent, 0.0);
    }

    #[test]
    fn memory_used_is_capped_at_total() {
        let m = MemoryReading::from_raw(100, 0, 150, 10, 0, 20);
        assert_eq!(m.used, 100);
        assert_eq!(m.swap_used, 10);
        assert_eq!(m.swap_percent, 100.0);
    }

    #[test]
    fn boot_time_keeps_epoch_seconds() {
        let boot = BootTime::from_epoch_secs(1_700_000_000).expect("in range");
        assert_eq!(boot.local.timestamp(), 1_700_000_000);
        assert_eq!(boot.epoch_secs, 1_700_000_000);
    }

    #[test]
    fn boot_time_rejects_out_of_range() {
        assert!(BootTime::from_epoch_secs(u64::MAX).is_none());
    }
}
