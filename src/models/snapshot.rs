// Aggregated snapshot: every reading from one collection epoch

use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::{BatteryReading, BootTime, CpuReading, DiskReading, MemoryReading, NetworkReading, OsIdentity};

/// The reader a value or an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Os,
    Boot,
    Cpu,
    Memory,
    Disk,
    Network,
    Battery,
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Domain::Os => "os",
            Domain::Boot => "boot",
            Domain::Cpu => "cpu",
            Domain::Memory => "memory",
            Domain::Disk => "disk",
            Domain::Network => "network",
            Domain::Battery => "battery",
        };
        f.write_str(s)
    }
}

/// One consistent bundle of readings. Built whole by the collector and never
/// patched field by field; a reload replaces the value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Collection number, increasing per collector.
    pub epoch: u64,
    pub collected_at: DateTime<Local>,
    pub os: OsIdentity,
    pub boot: BootTime,
    pub cpu: CpuReading,
    pub memory: MemoryReading,
    pub disk: DiskReading,
    pub network: NetworkReading,
    /// None when the host has no battery.
    pub battery: Option<BatteryReading>,
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<SysInfo os={} boot={} cpu={} memory={} disk={} network={} battery=",
            self.os, self.boot, self.cpu, self.memory, self.disk, self.network
        )?;
        match &self.battery {
            Some(b) => write!(f, "{b}>"),
            None => write!(f, "none>"),
        }
    }
}
