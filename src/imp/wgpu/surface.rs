// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use crate::imp::wgpu::Error;
use crate::imp::wgpu::format::{from_wgpu, to_wgpu};
use crate::imp::wgpu::resource::texture_usages_of;
use crate::math::Extent2D;
use crate::resource::{ResourceUsageFlagBits, ResourceUsageFlags};
use crate::surface::SurfaceDescExt;
use crate::swapchain::{PresentModeExt, SurfaceCapabilitiesExt, SwapchainInfoExt};

/// wgpu keeps at most this many frames in flight.
const MAX_FRAME_LATENCY: u32 = 2;

#[derive(Debug)]
pub(crate) struct Surface {
    surface: wgpu::Surface<'static>,
}

pub(super) fn create(instance: &wgpu::Instance, desc: &SurfaceDescExt) -> Result<Surface, Error> {
    let (raw_display_handle, raw_window_handle) = desc.raw_handles();
    let target = wgpu::SurfaceTargetUnsafe::RawHandle {
        raw_display_handle,
        raw_window_handle,
    };
    // SAFETY: the caller promises the window outlives the surface.
    let surface = unsafe { instance.create_surface_unsafe(target) }?;
    Ok(Surface { surface })
}

fn present_mode(mode: wgpu::PresentMode) -> Option<PresentModeExt> {
    match mode {
        wgpu::PresentMode::Immediate => Some(PresentModeExt::Immediate),
        wgpu::PresentMode::Fifo => Some(PresentModeExt::Fifo),
        wgpu::PresentMode::Mailbox => Some(PresentModeExt::Mailbox),
        _ => None,
    }
}

fn usage_bits(usages: wgpu::TextureUsages) -> ResourceUsageFlags {
    let mut bits = ResourceUsageFlags::empty();
    let table = [
        (wgpu::TextureUsages::RENDER_ATTACHMENT, ResourceUsageFlagBits::ColorAttachment),
        (wgpu::TextureUsages::COPY_SRC, ResourceUsageFlagBits::TransferSrc),
        (wgpu::TextureUsages::COPY_DST, ResourceUsageFlagBits::TransferDst),
        (wgpu::TextureUsages::TEXTURE_BINDING, ResourceUsageFlagBits::Sampled),
        (wgpu::TextureUsages::STORAGE_BINDING, ResourceUsageFlagBits::ShaderWrite),
    ];
    for (usage, bit) in table {
        if usages.contains(usage) {
            bits.insert(bit);
        }
    }
    bits
}

impl Surface {
    pub(super) fn wgpu(&self) -> &wgpu::Surface<'static> {
        &self.surface
    }

    pub(crate) fn capabilities(&self, adapter: &wgpu::Adapter) -> SurfaceCapabilitiesExt {
        let caps = self.surface.get_capabilities(adapter);
        let max = adapter.limits().max_texture_dimension_2d;
        SurfaceCapabilitiesExt {
            min_texture_count: 2,
            max_texture_count: MAX_FRAME_LATENCY + 1,
            min_extent: Extent2D::new(1, 1),
            max_extent: Extent2D::new(max, max),
            formats: caps.formats.iter().copied().filter_map(from_wgpu).collect(),
            present_modes: caps
                .present_modes
                .iter()
                .copied()
                .filter_map(present_mode)
                .collect(),
            usage_bits: usage_bits(caps.usages),
        }
    }
}

/// A configured surface.
#[derive(Debug)]
pub(crate) struct Swapchain {
    _config: wgpu::SurfaceConfiguration,
}

impl Swapchain {
    pub(crate) fn configure(
        surface: &Surface,
        device: &wgpu::Device,
        info: &SwapchainInfoExt,
    ) -> Result<Self, Error> {
        let format = to_wgpu(info.format).ok_or(Error::UnsupportedFormat(info.format))?;
        let config = wgpu::SurfaceConfiguration {
            usage: texture_usages_of(info.usage),
            format,
            width: info.extent.width,
            height: info.extent.height,
            present_mode: match info.present_mode {
                PresentModeExt::Immediate => wgpu::PresentMode::Immediate,
                PresentModeExt::Fifo => wgpu::PresentMode::Fifo,
                PresentModeExt::Mailbox => wgpu::PresentMode::Mailbox,
            },
            desired_maximum_frame_latency: info.texture_count.saturating_sub(1).clamp(1, MAX_FRAME_LATENCY),
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: Vec::new(),
        };
        surface.surface.configure(device, &config);
        Ok(Swapchain { _config: config })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_modes_are_not_reported() {
        assert_eq!(present_mode(wgpu::PresentMode::AutoVsync), None);
        assert_eq!(
            present_mode(wgpu::PresentMode::Mailbox),
            Some(PresentModeExt::Mailbox)
        );
    }

    #[test]
    fn usages_project_onto_usage_bits() {
        let bits = usage_bits(wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_DST);
        assert_eq!(
            bits,
            ResourceUsageFlagBits::ColorAttachment | ResourceUsageFlagBits::TransferDst
        );
    }
}
