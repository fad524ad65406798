// Storage / disk partition models

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::system::ratio_percent;
use crate::format::human_bytes;

/// One OS-reported partition before usage and label are resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionEntry {
    pub device: String,
    pub mount_point: PathBuf,
    pub fs_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskUsage {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub percent: f64,
}

impl DiskUsage {
    /// Usage from statvfs-style block counts.
    ///
    /// `free` is what an unprivileged user may still allocate, `used` excludes
    /// blocks reserved for root, and `percent` is relative to `used + free`.
    pub fn from_blocks(blocks: u64, blocks_free: u64, blocks_avail: u64, fragment_size: u64) -> Self {
        let total = blocks.saturating_mul(fragment_size);
        let used = blocks.saturating_sub(blocks_free).saturating_mul(fragment_size);
        let free = blocks_avail.saturating_mul(fragment_size);
        Self {
            total,
            used,
            free,
            percent: ratio_percent(used, used.saturating_add(free)),
        }
    }

    /// Usage from total and available space only (no reserved-block figure).
    pub fn from_space(total: u64, available: u64) -> Self {
        let free = available.min(total);
        let used = total - free;
        Self {
            total,
            used,
            free,
            percent: ratio_percent(used, total),
        }
    }
}

/// A partition with its resolved label and, when the mount point could be
/// queried, its usage. `usage` is None exactly when the availability flag is off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskPartition {
    pub device: String,
    pub mount_point: PathBuf,
    pub fs_type: String,
    pub label: String,
    pub usage: Option<DiskUsage>,
}

impl DiskPartition {
    pub fn new(entry: PartitionEntry, label: String, usage: Option<DiskUsage>) -> Self {
        Self {
            device: entry.device,
            mount_point: entry.mount_point,
            fs_type: entry.fs_type,
            label,
            usage,
        }
    }

    /// Availability flag: whether usage figures could be read for this mount.
    pub fn usage_available(&self) -> bool {
        self.usage.is_some()
    }
}

impl fmt::Display for DiskPartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<DiskPartition \"{}\" {} ({})",
            self.label,
            self.mount_point.display(),
            self.fs_type
        )?;
        match &self.usage {
            Some(u) => write!(
                f,
                " total={} used={} free={} percent={:.1}%>",
                human_bytes(u.total),
                human_bytes(u.used),
                human_bytes(u.free),
                u.percent
            ),
            None => write!(f, " usage unavailable>"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskReading {
    pub partitions: Vec<DiskPartition>,
}

impl fmt::Display for DiskReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Disk [")?;
        for (i, p) in self.partitions.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{p}")?;
        }
        write!(f, "]>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_blocks_excludes_root_reserved_space_from_free() {
        // 1000 blocks of 4 KiB, 200 free, 150 available to users.
        let u = DiskUsage::from_blocks(1000, 200, 150, 4096);
        assert_eq!(u.total, 4_096_000);
        assert_eq!(u.used, 800 * 4096);
        assert_eq!(u.free, 150 * 4096);
        // 800 / 950
        assert_eq!(u.percent, 84.2);
    }

    #[test]
    fn from_blocks_empty_filesystem_is_zero_percent() {
        let u = DiskUsage::from_blocks(0, 0, 0, 4096);
        assert_eq!(u.total, 0);
        assert_eq!(u.percent, 0.0);
    }

    #[test]
    fn from_space_caps_available_at_total() {
        let u = DiskUsage::from_space(100, 400);
        assert_eq!(u.free, 100);
        assert_eq!(u.used, 0);
        assert_eq!(u.percent, 0.0);
    }

    #[test]
    fn display_marks_unavailable_usage() {
        let p = DiskPartition::new(
            PartitionEntry {
                device: "/dev/sdb1".into(),
                mount_point: "/mnt/locked".into(),
                fs_type: "ext4".into(),
            },
            String::new(),
            None,
        );
        assert!(!p.usage_available());
        assert!(p.to_string().contains("usage unavailable"));
    }
}
