// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Swapchains: rings of presentable textures tied to a surface.

use crate::device::DeviceRef;
use crate::format::Format;
use crate::imp;
use crate::math::Extent2D;
use crate::resource::ResourceUsageFlags;
use crate::surface::SurfaceExt;

closed_enum! {
    /// How presented textures reach the screen.
    pub enum PresentModeExt {
        /// Presented at once; may tear.
        Immediate = 0,
        /// Queued and shown at vertical blank.  Always available.
        Fifo = 1,
        /// At vertical blank, replacing any texture still waiting.
        Mailbox = 2,
    }
}

/// What swapchains on a surface may look like.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SurfaceCapabilitiesExt {
    pub min_texture_count: u32,
    pub max_texture_count: u32,
    pub min_extent: Extent2D,
    pub max_extent: Extent2D,
    pub formats: Vec<Format>,
    pub present_modes: Vec<PresentModeExt>,
    /// Usage a swapchain texture may have.
    pub usage_bits: ResourceUsageFlags,
}

/// Describes a swapchain to create.
///
/// Every field must lie within the capabilities
/// [crate::Adapter::query_surface_capabilities_ext] reports for `surface`.
#[derive(Debug, Clone, Copy)]
pub struct SwapchainDescExt<'a> {
    pub surface: &'a SurfaceExt,
    pub texture_count: u32,
    pub extent: Extent2D,
    pub format: Format,
    pub present_mode: PresentModeExt,
    pub usage: ResourceUsageFlags,
}

impl SwapchainDescExt<'_> {
    pub fn info(&self) -> SwapchainInfoExt {
        SwapchainInfoExt {
            texture_count: self.texture_count,
            extent: self.extent,
            format: self.format,
            present_mode: self.present_mode,
            usage: self.usage,
        }
    }
}

/// A swapchain descriptor without its surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SwapchainInfoExt {
    pub texture_count: u32,
    pub extent: Extent2D,
    pub format: Format,
    pub present_mode: PresentModeExt,
    pub usage: ResourceUsageFlags,
}

/// Created by [crate::Device::create_swapchain_ext].
pub struct SwapchainExt {
    device: DeviceRef,
    info: SwapchainInfoExt,
    _imp: imp::Swapchain,
}

impl SwapchainExt {
    pub(crate) fn new(device: DeviceRef, info: SwapchainInfoExt, imp: imp::Swapchain) -> Self {
        SwapchainExt {
            device,
            info,
            _imp: imp,
        }
    }

    pub(crate) fn device_id(&self) -> u64 {
        self.device.id
    }

    pub fn get_desc(&self) -> SwapchainInfoExt {
        self.info
    }
}

impl std::fmt::Debug for SwapchainExt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwapchainExt")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}
