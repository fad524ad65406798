// Library for the binary and tests

pub mod collector;
pub mod config;
pub mod disk;
pub mod error;
pub mod format;
pub mod models;
pub mod probe;
pub mod report;
pub mod sysinfo_repo;
pub mod version;

pub use collector::Collector;
pub use error::{ProbeError, SnapshotError};
pub use models::Snapshot;
pub use probe::HostProbe;
pub use sysinfo_repo::SysinfoRepo;
