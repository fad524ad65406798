// Host queries via sysinfo, with platform helpers where sysinfo has no answer

mod linux;
#[cfg(unix)]
mod unix;

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

#[cfg(not(target_os = "linux"))]
use sysinfo::Disks;
use sysinfo::{Networks, System};
use tracing::{debug, instrument};

use crate::error::ProbeError;
use crate::models::*;
use crate::probe::HostProbe;

/// Production `HostProbe`. Stateless: every query builds its own sysinfo
/// structures, so queries can run concurrently without locking.
#[derive(Debug, Default, Clone, Copy)]
pub struct SysinfoRepo;

impl SysinfoRepo {
    pub fn new() -> Self {
        Self
    }
}

impl HostProbe for SysinfoRepo {
    #[instrument(skip(self), fields(repo = "sysinfo", operation = "os_identity"))]
    fn os_identity(&self) -> Result<OsIdentity, ProbeError> {
        let processor = linux::read_cpu_model_linux()
            .or_else(|| {
                let mut sys = System::new();
                sys.refresh_cpu_all();
                sys.cpus()
                    .first()
                    .map(|c| c.brand().trim().to_string())
                    .filter(|s| !s.is_empty())
            })
            .unwrap_or_default();

        #[cfg(unix)]
        {
            let uts = unix::uname().map_err(|e| ProbeError::io("uname", e))?;
            if uts.sysname.is_empty() {
                return Err(ProbeError::Unavailable("uname returned no system name".into()));
            }
            Ok(OsIdentity {
                name: uts.sysname,
                node: uts.nodename,
                release: uts.release,
                version: uts.version,
                machine: uts.machine,
                processor,
            })
        }
        #[cfg(not(unix))]
        {
            let name = System::name()
                .ok_or_else(|| ProbeError::Unavailable("OS reports no system name".into()))?;
            Ok(OsIdentity {
                name,
                node: System::host_name().unwrap_or_default(),
                release: System::kernel_version().unwrap_or_default(),
                version: System::os_version().unwrap_or_default(),
                machine: std::env::consts::ARCH.to_string(),
                processor,
            })
        }
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "boot_time"))]
    fn boot_time(&self) -> Result<BootTime, ProbeError> {
        let secs = System::boot_time();
        if secs == 0 {
            return Err(ProbeError::Unavailable("OS reports no boot time".into()));
        }
        BootTime::from_epoch_secs(secs)
            .ok_or_else(|| ProbeError::Unavailable(format!("boot time {secs} out of range")))
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "cpu"))]
    fn cpu(&self, sample_window: Duration) -> Result<CpuReading, ProbeError> {
        let mut sys = System::new();
        // First refresh loads the CPU list, frequencies and the usage baseline.
        sys.refresh_cpu_all();
        if sys.cpus().is_empty() {
            return Err(ProbeError::Unavailable("OS reports no CPUs".into()));
        }
        let frequencies: Vec<u64> = sys.cpus().iter().map(|c| c.frequency()).collect();

        let window = sample_window.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
        debug!(window_ms = window.as_millis() as u64, "sampling cpu usage");
        std::thread::sleep(window);
        sys.refresh_cpu_usage();

        let usages: Vec<f32> = sys.cpus().iter().map(|c| c.cpu_usage()).collect();
        #[cfg(target_os = "linux")]
        let (min_freq, max_freq) = linux::read_cpufreq_bounds(Path::new(linux::CPUFREQ_ROOT));
        #[cfg(not(target_os = "linux"))]
        let (min_freq, max_freq) = (None, None);

        Ok(build_cpu_reading(
            System::physical_core_count(),
            &usages,
            sys.global_cpu_usage(),
            &frequencies,
            min_freq,
            max_freq,
        ))
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "memory"))]
    fn memory(&self) -> Result<MemoryReading, ProbeError> {
        let mut sys = System::new();
        sys.refresh_memory();
        let total = sys.total_memory();
        if total == 0 {
            return Err(ProbeError::Unavailable("OS reports zero total memory".into()));
        }
        Ok(MemoryReading::from_raw(
            total,
            sys.available_memory(),
            sys.used_memory(),
            sys.total_swap(),
            sys.free_swap(),
            sys.used_swap(),
        ))
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "partitions"))]
    fn partitions(&self) -> Result<Vec<PartitionEntry>, ProbeError> {
        #[cfg(target_os = "linux")]
        {
            linux::read_partitions(
                Path::new(linux::PROC_MOUNTS),
                Path::new(linux::PROC_FILESYSTEMS),
            )
        }
        #[cfg(not(target_os = "linux"))]
        {
            let disks = Disks::new_with_refreshed_list();
            Ok(disks
                .list()
                .iter()
                .map(|d| PartitionEntry {
                    device: d.name().to_string_lossy().into_owned(),
                    mount_point: d.mount_point().to_path_buf(),
                    fs_type: d.file_system().to_string_lossy().into_owned(),
                })
                .collect())
        }
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "disk_usage"))]
    fn disk_usage(&self, mount_point: &Path) -> Result<DiskUsage, ProbeError> {
        #[cfg(unix)]
        {
            unix::statvfs(mount_point)
        }
        #[cfg(not(unix))]
        {
            let disks = Disks::new_with_refreshed_list();
            disks
                .list()
                .iter()
                .find(|d| d.mount_point() == mount_point)
                .map(|d| DiskUsage::from_space(d.total_space(), d.available_space()))
                .ok_or_else(|| {
                    ProbeError::Unavailable(format!("no usage for {}", mount_point.display()))
                })
        }
    }

    #[instrument(skip(self, partition), fields(repo = "sysinfo", operation = "volume_label", device = %partition.device))]
    fn volume_label(&self, partition: &PartitionEntry) -> Result<String, ProbeError> {
        #[cfg(target_os = "linux")]
        {
            linux::label_for_device(Path::new(linux::DISK_BY_LABEL), &partition.device)
                .map(Option::unwrap_or_default)
                .map_err(|e| ProbeError::io(format!("read {}", linux::DISK_BY_LABEL), e))
        }
        #[cfg(not(target_os = "linux"))]
        {
            Err(ProbeError::Unsupported)
        }
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "network"))]
    fn network(&self) -> Result<NetworkReading, ProbeError> {
        let networks = Networks::new_with_refreshed_list();
        let mut interfaces: Vec<NetworkInterface> = networks
            .list()
            .iter()
            .map(|(name, data)| {
                let mac = data.mac_address().to_string();
                NetworkInterface {
                    name: name.clone(),
                    addresses: interface_addresses(
                        data.ip_networks().iter().map(|n| (n.addr, n.prefix)),
                        Some(mac),
                    ),
                }
            })
            .collect();
        if interfaces.is_empty() {
            return Err(ProbeError::Unavailable("OS reports no network interfaces".into()));
        }
        // sysinfo keys interfaces by name in a hash map.
        interfaces.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(NetworkReading { interfaces })
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "battery"))]
    fn battery(&self) -> Result<BatteryReading, ProbeError> {
        #[cfg(target_os = "linux")]
        {
            linux::read_battery(Path::new(linux::POWER_SUPPLY_ROOT))
        }
        #[cfg(not(target_os = "linux"))]
        {
            Err(ProbeError::NoBattery)
        }
    }
}

/// Assemble a CPU reading from raw sysinfo figures. Frequencies of 0 mean unknown.
fn build_cpu_reading(
    physical_cores: Option<usize>,
    usages: &[f32],
    global_usage: f32,
    frequencies_mhz: &[u64],
    min_freq_mhz: Option<f64>,
    max_freq_mhz: Option<f64>,
) -> CpuReading {
    let per_core_usage: BTreeMap<usize, f32> = usages
        .iter()
        .enumerate()
        .map(|(i, u)| (i, clamp_percent(*u)))
        .collect();
    let known: Vec<u64> = frequencies_mhz.iter().copied().filter(|f| *f > 0).collect();
    let current_freq_mhz = if known.is_empty() {
        None
    } else {
        Some(known.iter().sum::<u64>() as f64 / known.len() as f64)
    };
    CpuReading {
        physical_cores,
        logical_cores: usages.len(),
        min_freq_mhz,
        max_freq_mhz,
        current_freq_mhz,
        per_core_usage,
        total_usage: clamp_percent(global_usage),
    }
}

fn clamp_percent(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 100.0) }
}

/// IP networks become IPv4/IPv6 addresses with a prefix-derived netmask; the
/// MAC, when known, is appended as the link-layer address.
pub(crate) fn interface_addresses(
    ip_networks: impl IntoIterator<Item = (IpAddr, u8)>,
    mac: Option<String>,
) -> Vec<NetworkAddress> {
    let mut out: Vec<NetworkAddress> = ip_networks
        .into_iter()
        .map(|(addr, prefix)| match addr {
            IpAddr::V4(v4) => {
                let prefix = u32::from(prefix.min(32));
                let mask = if prefix == 0 { 0 } else { u32::MAX << (32 - prefix) };
                // No directed broadcast on loopback or point-to-point links.
                let broadcast = (prefix < 31 && !v4.is_loopback())
                    .then(|| std::net::Ipv4Addr::from(u32::from(v4) | !mask).to_string());
                NetworkAddress {
                    address: v4.to_string(),
                    netmask: Some(std::net::Ipv4Addr::from(mask).to_string()),
                    broadcast,
                    family: AddressFamily::Ipv4,
                }
            }
            IpAddr::V6(v6) => {
                let prefix = u32::from(prefix.min(128));
                let mask = if prefix == 0 { 0 } else { u128::MAX << (128 - prefix) };
                NetworkAddress {
                    address: v6.to_string(),
                    netmask: Some(std::net::Ipv6Addr::from(mask).to_string()),
                    broadcast: None,
                    family: AddressFamily::Ipv6,
                }
            }
        })
        .collect();
    if let Some(mac) = mac.filter(|m| !m.is_empty()) {
        out.push(NetworkAddress {
            address: mac,
            netmask: None,
            broadcast: None,
            family: AddressFamily::LinkLayer,
        });
    }
    out
}
