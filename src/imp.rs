// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Backend selection and the types every backend shares.
//!
//! Each backend exports the same set of types with the same inherent methods:
//! `Instance`, `Adapter`, `Device`, `Queue`, `CommandGroup`, `CommandList`, `Submission`,
//! `Fence`, `Semaphore`, `Resource`, `Surface`, `Swapchain` and `Error`.  The frontend only
//! names them through this module.

use crate::adapter::AdapterExtension;
use crate::instance::InstanceExtension;
use crate::queue::QueueDesc;
use crate::resource::{ResourceState, SampleCount, TextureSubresourceRange};

#[cfg(not(feature = "backend_wgpu"))]
mod soft;
#[cfg(not(feature = "backend_wgpu"))]
pub(crate) use soft::*;

#[cfg(feature = "backend_wgpu")]
mod wgpu;
#[cfg(feature = "backend_wgpu")]
pub(crate) use self::wgpu::*;

/// Runtime configuration handed to a backend instance.
#[derive(Debug, Clone, Copy)]
pub(crate) struct InstanceConfig<'a> {
    pub(crate) extensions: &'a [InstanceExtension],
    pub(crate) application_name: Option<&'a str>,
}

impl InstanceConfig<'_> {
    pub(crate) fn enabled(&self, extension: InstanceExtension) -> bool {
        self.extensions.contains(&extension)
    }
}

/// What a backend device is created with.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DeviceConfig<'a> {
    pub(crate) extensions: &'a [AdapterExtension],
    pub(crate) queues: &'a [QueueDesc],
}

/// Raw capabilities of one format, as a driver reports them.
///
/// The frontend projects this onto [crate::FormatProperties].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct FormatSupport {
    pub(crate) transfer: bool,
    pub(crate) sample: bool,
    pub(crate) storage: bool,
    pub(crate) render_target: bool,
    pub(crate) depth_stencil: bool,
    pub(crate) texture_1d: bool,
    pub(crate) texture_2d: bool,
    pub(crate) texture_3d: bool,
    /// Quality levels per sample count, indexed in [SampleCount::ALL] order.  Zero means
    /// the count is unsupported.
    pub(crate) quality_levels: [u32; SampleCount::COUNT],
}

impl FormatSupport {
    pub(crate) fn is_supported(&self) -> bool {
        self.texture_1d || self.texture_2d || self.texture_3d
    }

    pub(crate) fn quality_levels(&self, count: SampleCount) -> u32 {
        SampleCount::ALL
            .iter()
            .position(|c| *c == count)
            .map(|i| self.quality_levels[i])
            .unwrap_or(0)
    }
}

/// A barrier as the backend receives it, with its range resolved against the resource.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Barrier<'a> {
    ReadWrite {
        resource: &'a Resource,
    },
    Transition {
        resource: &'a Resource,
        /// `None` is the backend's undefined initial layout.
        old_state: Option<ResourceState>,
        new_state: ResourceState,
        range: TextureSubresourceRange,
    },
}

/// One queue submission.
#[derive(Debug)]
pub(crate) struct Batch {
    /// Semaphores to wait on, each at the given counter value.
    pub(crate) waits: Vec<(Semaphore, u64)>,
    pub(crate) submissions: Vec<Submission>,
    /// Semaphores to signal, each to the given counter value.
    pub(crate) signals: Vec<(Semaphore, u64)>,
    pub(crate) fence: Option<(Fence, u64)>,
}
