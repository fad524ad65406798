// Error types for host queries and snapshot collection

use std::path::PathBuf;

use thiserror::Error;

use crate::models::Domain;

/// Failure of a single host query.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The OS facility did not respond or returned nothing usable.
    #[error("{0}")]
    Unavailable(String),
    /// Usage query denied for one mount point.
    #[error("permission denied for {}", .0.display())]
    PermissionDenied(PathBuf),
    /// The host has no battery sensor.
    #[error("no battery present")]
    NoBattery,
    /// The query does not exist on this platform.
    #[error("not supported on this platform")]
    Unsupported,
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl ProbeError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        ProbeError::Io {
            context: context.into(),
            source,
        }
    }
}

/// Failure of a whole collect or reload. No snapshot is produced.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("{domain} reading unavailable: {source}")]
    Unavailable {
        domain: Domain,
        #[source]
        source: ProbeError,
    },
    #[error("{domain} reader task failed: {reason}")]
    Task { domain: Domain, reason: String },
}

impl SnapshotError {
    /// The required domain that could not be read.
    pub fn domain(&self) -> Domain {
        match self {
            SnapshotError::Unavailable { domain, .. } | SnapshotError::Task { domain, .. } => {
                *domain
            }
        }
    }
}
