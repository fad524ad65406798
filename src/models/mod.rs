// Domain models: one value object per reader plus the aggregated snapshot

mod network;
mod power;
mod snapshot;
mod storage;
mod system;

pub use network::{AddressFamily, NetworkAddress, NetworkInterface, NetworkReading};
pub use power::{BatteryReading, SecondsLeft};
pub use snapshot::{Domain, Snapshot};
pub use storage::{DiskPartition, DiskReading, DiskUsage, PartitionEntry};
pub use system::{BootTime, CpuReading, MemoryReading, OsIdentity};
