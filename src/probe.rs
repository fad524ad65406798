// Boundary to the host OS: one query per domain

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::error::ProbeError;
use crate::models::*;

/// Host introspection queries the readers are built on.
///
/// Implementations must not keep shared mutable state between calls: every
/// method returns a fresh value and may run concurrently with any other.
/// `SysinfoRepo` is the production implementation; tests substitute doubles.
pub trait HostProbe {
    fn os_identity(&self) -> Result<OsIdentity, ProbeError>;

    fn boot_time(&self) -> Result<BootTime, ProbeError>;

    /// Blocks for `sample_window` while utilization is measured.
    fn cpu(&self, sample_window: Duration) -> Result<CpuReading, ProbeError>;

    fn memory(&self) -> Result<MemoryReading, ProbeError>;

    /// Partitions in OS enumeration order, usage not yet resolved.
    fn partitions(&self) -> Result<Vec<PartitionEntry>, ProbeError>;

    /// Usage for one mount point. `PermissionDenied` when the mount cannot be queried.
    fn disk_usage(&self, mount_point: &Path) -> Result<DiskUsage, ProbeError>;

    /// Volume label. `Unsupported` on platforms without a label query.
    fn volume_label(&self, partition: &PartitionEntry) -> Result<String, ProbeError>;

    fn network(&self) -> Result<NetworkReading, ProbeError>;

    /// `NoBattery` when the host has no battery sensor.
    fn battery(&self) -> Result<BatteryReading, ProbeError>;
}

impl<P: HostProbe + ?Sized> HostProbe for Arc<P> {
    fn os_identity(&self) -> Result<OsIdentity, ProbeError> {
        (**self).os_identity()
    }

    fn boot_time(&self) -> Result<BootTime, ProbeError> {
        (**self).boot_time()
    }

    fn cpu(&self, sample_window: Duration) -> Result<CpuReading, ProbeError> {
        (**self).cpu(sample_window)
    }

    fn memory(&self) -> Result<MemoryReading, ProbeError> {
        (**self).memory()
    }

    fn partitions(&self) -> Result<Vec<PartitionEntry>, ProbeError> {
        (**self).partitions()
    }

    fn disk_usage(&self, mount_point: &Path) -> Result<DiskUsage, ProbeError> {
        (**self).disk_usage(mount_point)
    }

    fn volume_label(&self, partition: &PartitionEntry) -> Result<String, ProbeError> {
        (**self).volume_label(partition)
    }

    fn network(&self) -> Result<NetworkReading, ProbeError> {
        (**self).network()
    }

    fn battery(&self) -> Result<BatteryReading, ProbeError> {
        (**self).battery()
    }
}
