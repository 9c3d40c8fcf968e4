// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Emulated presentation.  Surfaces are never backed by a real window.

use std::sync::Arc;

use crate::format::Format;
use crate::imp::soft::Error;
use crate::imp::soft::resource::{Allocation, MemoryHeap};
use crate::math::Extent2D;
use crate::queue::QueueType;
use crate::resource::ResourceUsageFlagBits;
use crate::surface::{SurfaceDescExt, SurfacePlatformExt};
use crate::swapchain::{PresentModeExt, SurfaceCapabilitiesExt, SwapchainInfoExt};

#[derive(Debug)]
pub(crate) struct Surface {
    platform: SurfacePlatformExt,
}

impl Surface {
    pub(crate) fn new(desc: &SurfaceDescExt) -> Self {
        logwise::info_sync!(
            "software surface for {platform}",
            platform = logwise::privacy::LogIt(&desc.platform())
        );
        Surface {
            platform: desc.platform(),
        }
    }

    pub(crate) fn present_support(&self, ty: QueueType) -> bool {
        ty != QueueType::Transfer
    }

    pub(crate) fn capabilities(&self) -> SurfaceCapabilitiesExt {
        logwise::trace_sync!(
            "software surface capabilities ({platform})",
            platform = logwise::privacy::LogIt(&self.platform)
        );
        SurfaceCapabilitiesExt {
            min_texture_count: 2,
            max_texture_count: 8,
            min_extent: Extent2D::new(1, 1),
            max_extent: Extent2D::new(16384, 16384),
            formats: vec![
                Format::BGRA8UNorm,
                Format::BGRA8sRGB,
                Format::RGBA8UNorm,
                Format::RGBA8sRGB,
            ],
            present_modes: vec![
                PresentModeExt::Fifo,
                PresentModeExt::Immediate,
                PresentModeExt::Mailbox,
            ],
            usage_bits: ResourceUsageFlagBits::ColorAttachment
                | ResourceUsageFlagBits::TransferSrc
                | ResourceUsageFlagBits::TransferDst
                | ResourceUsageFlagBits::Sampled,
        }
    }
}

/// The presentable textures of a swapchain.
#[derive(Debug)]
pub(crate) struct Swapchain {
    _textures: Vec<Allocation>,
}

impl Swapchain {
    pub(crate) fn new(info: &SwapchainInfoExt, heap: &Arc<MemoryHeap>) -> Result<Self, Error> {
        let bytes = info.extent.width as u64
            * info.extent.height as u64
            * info.format.bytes_per_texel() as u64;
        let textures = (0..info.texture_count)
            .map(|_| heap.allocate(bytes))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Swapchain {
            _textures: textures,
        })
    }
}
