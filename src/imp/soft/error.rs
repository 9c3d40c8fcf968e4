// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use std::fmt::Display;

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    OutOfMemory { requested: u64, available: u64 },
    SpawnWorker(#[from] std::io::Error),
    QueueDisconnected,
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::OutOfMemory {
                requested,
                available,
            } => write!(
                f,
                "requested {} bytes but only {} remain in the heap",
                requested, available
            ),
            Error::SpawnWorker(e) => write!(f, "could not start queue worker: {}", e),
            Error::QueueDisconnected => write!(f, "queue worker exited"),
        }
    }
}

impl From<Error> for crate::Error {
    fn from(value: Error) -> Self {
        logwise::warn_sync!(
            "software backend error: {err}",
            err = logwise::privacy::LogIt(&value)
        );
        match value {
            Error::OutOfMemory { .. } => crate::Error::OutOfDeviceMemory,
            Error::SpawnWorker(_) => crate::Error::InitializationFailed,
            Error::QueueDisconnected => crate::Error::DeviceLost,
        }
    }
}
