// Disk reader: partition enumeration plus per-partition usage and label

use tracing::{debug, warn};

use crate::error::ProbeError;
use crate::models::{DiskPartition, DiskReading};
use crate::probe::HostProbe;

/// Enumerate partitions and resolve each one's usage and label.
///
/// Only enumeration failure is an error. A mount point whose usage cannot be
/// read is kept with `usage = None`, and a label that cannot be resolved is
/// left empty, so one bad partition never hides the others.
pub fn read_disks<P: HostProbe + ?Sized>(probe: &P) -> Result<DiskReading, ProbeError> {
    let entries = probe.partitions()?;
    let mut partitions = Vec::with_capacity(entries.len());
    for entry in entries {
        let usage = match probe.disk_usage(&entry.mount_point) {
            Ok(u) => Some(u),
            Err(ProbeError::PermissionDenied(path)) => {
                warn!(mount = %path.display(), "disk usage: permission denied");
                None
            }
            Err(e) => {
                warn!(mount = %entry.mount_point.display(), error = %e, "disk usage unavailable");
                None
            }
        };
        let label = match probe.volume_label(&entry) {
            Ok(label) => label,
            Err(ProbeError::Unsupported) => String::new(),
            Err(e) => {
                debug!(device = %entry.device, error = %e, "volume label unavailable");
                String::new()
            }
        };
        partitions.push(DiskPartition::new(entry, label, usage));
    }
    Ok(DiskReading { partitions })
}
