// Shared test helpers: a HostProbe double whose readings carry a tag

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use hostsnap::HostProbe;
use hostsnap::error::ProbeError;
use hostsnap::models::*;

pub const GIB: u64 = 1024 * 1024 * 1024;

/// Fake host. Every reading embeds the current `tag`, so a test can bump the
/// tag between collections and check which collection each field came from.
pub struct FakeProbe {
    tag: AtomicU64,
    logical_cores: usize,
    fail_memory: AtomicBool,
    fail_network: AtomicBool,
    has_battery: AtomicBool,
    battery_broken: AtomicBool,
    labels_supported: bool,
    denied_mounts: Vec<PathBuf>,
    mounts: Vec<PathBuf>,
}

impl Default for FakeProbe {
    fn default() -> Self {
        Self {
            tag: AtomicU64::new(1),
            logical_cores: 4,
            fail_memory: AtomicBool::new(false),
            fail_network: AtomicBool::new(false),
            has_battery: AtomicBool::new(true),
            battery_broken: AtomicBool::new(false),
            labels_supported: true,
            denied_mounts: Vec::new(),
            mounts: vec![PathBuf::from("/"), PathBuf::from("/boot")],
        }
    }
}

impl FakeProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cores(mut self, n: usize) -> Self {
        self.logical_cores = n;
        self
    }

    pub fn without_battery(self) -> Self {
        self.has_battery.store(false, Ordering::SeqCst);
        self
    }

    pub fn with_broken_battery(self) -> Self {
        self.battery_broken.store(true, Ordering::SeqCst);
        self
    }

    pub fn without_labels(mut self) -> Self {
        self.labels_supported = false;
        self
    }

    pub fn with_mounts(mut self, mounts: &[&str]) -> Self {
        self.mounts = mounts.iter().map(PathBuf::from).collect();
        self
    }

    pub fn with_denied_mount(mut self, mount: &str) -> Self {
        self.denied_mounts.push(PathBuf::from(mount));
        self
    }

    pub fn set_tag(&self, tag: u64) {
        self.tag.store(tag, Ordering::SeqCst);
    }

    pub fn set_memory_failing(&self, failing: bool) {
        self.fail_memory.store(failing, Ordering::SeqCst);
    }

    pub fn set_network_failing(&self, failing: bool) {
        self.fail_network.store(failing, Ordering::SeqCst);
    }

    fn tag(&self) -> u64 {
        self.tag.load(Ordering::SeqCst)
    }
}

impl HostProbe for FakeProbe {
    fn os_identity(&self) -> Result<OsIdentity, ProbeError> {
        Ok(OsIdentity {
            name: "Linux".into(),
            node: format!("host-{}", self.tag()),
            release: "6.8.0".into(),
            version: "#1 SMP".into(),
            machine: "x86_64".into(),
            processor: "Fake CPU".into(),
        })
    }

    fn boot_time(&self) -> Result<BootTime, ProbeError> {
        BootTime::from_epoch_secs(1_700_000_000 + self.tag())
            .ok_or_else(|| ProbeError::Unavailable("boot".into()))
    }

    fn cpu(&self, _sample_window: Duration) -> Result<CpuReading, ProbeError> {
        let usage = self.tag() as f32;
        let per_core_usage: BTreeMap<usize, f32> =
            (0..self.logical_cores).map(|i| (i, usage)).collect();
        Ok(CpuReading {
            physical_cores: Some(self.logical_cores / 2),
            logical_cores: self.logical_cores,
            min_freq_mhz: None,
            max_freq_mhz: None,
            current_freq_mhz: None,
            per_core_usage,
            total_usage: usage,
        })
    }

    fn memory(&self) -> Result<MemoryReading, ProbeError> {
        if self.fail_memory.load(Ordering::SeqCst) {
            return Err(ProbeError::Unavailable("memory query failed".into()));
        }
        let total = self.tag() * GIB;
        Ok(MemoryReading::from_raw(total, total / 2, total / 2, 0, 0, 0))
    }

    fn partitions(&self) -> Result<Vec<PartitionEntry>, ProbeError> {
        Ok(self
            .mounts
            .iter()
            .enumerate()
            .map(|(i, m)| PartitionEntry {
                device: format!("/dev/sda{}", i + 1),
                mount_point: m.clone(),
                fs_type: "ext4".into(),
            })
            .collect())
    }

    fn disk_usage(&self, mount_point: &Path) -> Result<DiskUsage, ProbeError> {
        if self.denied_mounts.iter().any(|m| m == mount_point) {
            return Err(ProbeError::PermissionDenied(mount_point.to_path_buf()));
        }
        Ok(DiskUsage::from_space(100 * GIB, 40 * GIB))
    }

    fn volume_label(&self, partition: &PartitionEntry) -> Result<String, ProbeError> {
        if !self.labels_supported {
            return Err(ProbeError::Unsupported);
        }
        Ok(format!("vol-{}-{}", self.tag(), partition.mount_point.display()))
    }

    fn network(&self) -> Result<NetworkReading, ProbeError> {
        if self.fail_network.load(Ordering::SeqCst) {
            return Err(ProbeError::Unavailable("no interfaces".into()));
        }
        Ok(NetworkReading {
            interfaces: vec![NetworkInterface {
                name: format!("eth{}", self.tag()),
                addresses: vec![NetworkAddress {
                    address: "10.0.0.2".into(),
                    netmask: Some("255.255.255.0".into()),
                    broadcast: Some("10.0.0.255".into()),
                    family: AddressFamily::Ipv4,
                }],
            }],
        })
    }

    fn battery(&self) -> Result<BatteryReading, ProbeError> {
        if self.battery_broken.load(Ordering::SeqCst) {
            return Err(ProbeError::Unavailable("capacity unreadable".into()));
        }
        if !self.has_battery.load(Ordering::SeqCst) {
            return Err(ProbeError::NoBattery);
        }
        Ok(BatteryReading {
            percent: self.tag() as f64,
            secs_left: SecondsLeft::Unlimited,
            power_plugged: true,
        })
    }
}

/// Asserts every tagged field of `s` carries `tag`.
pub fn assert_single_epoch(s: &Snapshot, tag: u64) {
    assert_eq!(s.os.node, format!("host-{tag}"), "os");
    assert_eq!(s.boot.epoch_secs, 1_700_000_000 + tag, "boot");
    assert_eq!(s.cpu.total_usage, tag as f32, "cpu");
    assert_eq!(s.memory.total, tag * GIB, "memory");
    for p in &s.disk.partitions {
        assert!(p.label.starts_with(&format!("vol-{tag}-")), "disk label {}", p.label);
    }
    assert_eq!(s.network.interfaces[0].name, format!("eth{tag}"), "network");
    if let Some(b) = &s.battery {
        assert_eq!(b.percent, tag as f64, "battery");
    }
}
