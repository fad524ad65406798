// Snapshot aggregation: run every reader, then build one Snapshot from the results.
// A snapshot is only ever constructed whole, so a reload never exposes a mix of epochs.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use chrono::Local;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

use crate::config::AppConfig;
use crate::disk::read_disks;
use crate::error::{ProbeError, SnapshotError};
use crate::models::*;
use crate::probe::HostProbe;

/// Default CPU utilization window.
pub const DEFAULT_CPU_WINDOW: Duration = Duration::from_secs(1);

/// Builds snapshots from a `HostProbe`. The only state is the epoch counter,
/// which is per collector; snapshots themselves belong to the caller.
pub struct Collector<P> {
    probe: Arc<P>,
    cpu_window: Duration,
    epochs: AtomicU64,
}

/// Readings from one pass, before the snapshot is assembled.
struct Readings {
    os: OsIdentity,
    boot: BootTime,
    cpu: CpuReading,
    memory: MemoryReading,
    disk: DiskReading,
    network: NetworkReading,
    battery: Option<BatteryReading>,
}

impl<P: HostProbe> Collector<P> {
    pub fn new(probe: P) -> Self {
        Self::from_shared(Arc::new(probe))
    }

    pub fn from_shared(probe: Arc<P>) -> Self {
        Self {
            probe,
            cpu_window: DEFAULT_CPU_WINDOW,
            epochs: AtomicU64::new(0),
        }
    }

    pub fn with_config(probe: P, config: &AppConfig) -> Self {
        Self::new(probe).with_cpu_window(config.sampling.cpu_interval())
    }

    pub fn with_cpu_window(mut self, window: Duration) -> Self {
        self.cpu_window = window;
        self
    }

    /// Run every reader in sequence and build a new snapshot.
    ///
    /// Blocks for the CPU sampling window. Fails with the first required
    /// domain that cannot be read; a missing battery is recorded as `None`.
    #[instrument(skip(self), fields(operation = "collect"))]
    pub fn collect(&self) -> Result<Snapshot, SnapshotError> {
        let started = Instant::now();
        let epoch = self.next_epoch();
        let readings = Readings {
            os: required(Domain::Os, self.probe.os_identity())?,
            boot: required(Domain::Boot, self.probe.boot_time())?,
            cpu: required(Domain::Cpu, self.probe.cpu(self.cpu_window))?,
            memory: required(Domain::Memory, self.probe.memory())?,
            disk: required(Domain::Disk, read_disks(self.probe.as_ref()))?,
            network: required(Domain::Network, self.probe.network())?,
            battery: battery_or_absent(self.probe.battery()),
        };
        Ok(assemble(epoch, readings, started))
    }

    /// Re-collect everything and replace `current` with the new snapshot.
    /// On error `current` is left exactly as it was.
    pub fn reload(&self, current: &mut Snapshot) -> Result<(), SnapshotError> {
        let fresh = self.collect()?;
        tracing::debug!(
            previous_epoch = current.epoch,
            epoch = fresh.epoch,
            "snapshot reloaded"
        );
        *current = fresh;
        Ok(())
    }

    fn next_epoch(&self) -> u64 {
        self.epochs.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl<P: HostProbe + Send + Sync + 'static> Collector<P> {
    /// Like `collect`, but each reader runs on tokio's blocking pool so the CPU
    /// window overlaps the other queries. All readers are joined before the
    /// snapshot is built.
    #[instrument(skip(self), fields(operation = "collect_concurrent"))]
    pub async fn collect_concurrent(&self) -> Result<Snapshot, SnapshotError> {
        let started = Instant::now();
        let epoch = self.next_epoch();
        let cpu_window = self.cpu_window;

        let os = spawn_reader(&self.probe, |p| p.os_identity());
        let boot = spawn_reader(&self.probe, |p| p.boot_time());
        let cpu = spawn_reader(&self.probe, move |p| p.cpu(cpu_window));
        let memory = spawn_reader(&self.probe, |p| p.memory());
        let disk = spawn_reader(&self.probe, |p| read_disks(p));
        let network = spawn_reader(&self.probe, |p| p.network());
        let battery = spawn_reader(&self.probe, |p| p.battery());

        let (os, boot, cpu, memory, disk, network, battery) = tokio::try_join!(
            joined(Domain::Os, os),
            joined(Domain::Boot, boot),
            joined(Domain::Cpu, cpu),
            joined(Domain::Memory, memory),
            joined(Domain::Disk, disk),
            joined(Domain::Network, network),
            joined(Domain::Battery, battery),
        )?;

        let readings = Readings {
            os: required(Domain::Os, os)?,
            boot: required(Domain::Boot, boot)?,
            cpu: required(Domain::Cpu, cpu)?,
            memory: required(Domain::Memory, memory)?,
            disk: required(Domain::Disk, disk)?,
            network: required(Domain::Network, network)?,
            battery: battery_or_absent(battery),
        };
        Ok(assemble(epoch, readings, started))
    }
}

fn assemble(epoch: u64, r: Readings, started: Instant) -> Snapshot {
    info!(
        epoch,
        elapsed_ms = started.elapsed().as_millis() as u64,
        partitions = r.disk.partitions.len(),
        interfaces = r.network.interfaces.len(),
        battery = r.battery.is_some(),
        "snapshot collected"
    );
    Snapshot {
        epoch,
        collected_at: Local::now(),
        os: r.os,
        boot: r.boot,
        cpu: r.cpu,
        memory: r.memory,
        disk: r.disk,
        network: r.network,
        battery: r.battery,
    }
}

fn required<T>(domain: Domain, result: Result<T, ProbeError>) -> Result<T, SnapshotError> {
    result.map_err(|source| {
        warn!(%domain, error = %source, "required reading failed");
        SnapshotError::Unavailable { domain, source }
    })
}

/// Battery is never required: absence is expected, and any other failure is
/// logged and also recorded as absent.
fn battery_or_absent(result: Result<BatteryReading, ProbeError>) -> Option<BatteryReading> {
    match result {
        Ok(b) => Some(b),
        Err(ProbeError::NoBattery) => {
            tracing::debug!("no battery present");
            None
        }
        Err(e) => {
            warn!(error = %e, "battery reading failed, recording as absent");
            None
        }
    }
}

fn spawn_reader<P, T, F>(probe: &Arc<P>, read: F) -> JoinHandle<Result<T, ProbeError>>
where
    P: HostProbe + Send + Sync + 'static,
    T: Send + 'static,
    F: FnOnce(&P) -> Result<T, ProbeError> + Send + 'static,
{
    let probe = Arc::clone(probe);
    tokio::task::spawn_blocking(move || read(probe.as_ref()))
}

async fn joined<T>(
    domain: Domain,
    handle: JoinHandle<Result<T, ProbeError>>,
) -> Result<Result<T, ProbeError>, SnapshotError> {
    handle.await.map_err(|e| SnapshotError::Task {
        domain,
        reason: e.to_string(),
    })
}
