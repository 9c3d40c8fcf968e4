// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use std::fmt::Display;

use crate::format::Format;

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    RequestDevice(#[from] wgpu::RequestDeviceError),
    SpawnPoll(#[from] std::io::Error),
    Wgpu(#[from] wgpu::Error),
    UnsupportedFormat(Format),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::CreateSurface(e) => write!(f, "{}", e),
            Error::RequestDevice(e) => write!(f, "{}", e),
            Error::SpawnPoll(e) => write!(f, "could not start wgpu poll thread: {}", e),
            Error::Wgpu(e) => write!(f, "{}", e),
            Error::UnsupportedFormat(format) => write!(f, "wgpu has no equivalent of {}", format),
        }
    }
}

impl From<Error> for crate::Error {
    fn from(value: Error) -> Self {
        logwise::warn_sync!(
            "wgpu backend error: {err}",
            err = logwise::privacy::LogIt(&value)
        );
        match value {
            Error::CreateSurface(_) | Error::RequestDevice(_) | Error::SpawnPoll(_) => {
                crate::Error::InitializationFailed
            }
            Error::Wgpu(wgpu::Error::OutOfMemory { .. }) => crate::Error::OutOfDeviceMemory,
            Error::Wgpu(wgpu::Error::Internal { .. }) => crate::Error::DriverFailure,
            Error::Wgpu(_) => crate::Error::Unknown,
            Error::UnsupportedFormat(_) => crate::Error::InvalidFormat,
        }
    }
}
