// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use crate::imp::wgpu::Error;
use crate::imp::wgpu::format::to_wgpu;
use crate::resource::{
    MemoryType, ResourceDesc, ResourceType, ResourceUsageFlagBits, ResourceUsageFlags,
};

#[derive(Debug)]
enum Backing {
    Buffer(wgpu::Buffer),
    Texture(wgpu::Texture),
}

#[derive(Debug)]
pub(crate) struct Resource {
    pub(crate) id: u64,
    backing: Backing,
}

/// Host-visible buffers may only combine mapping with copies.
pub(crate) fn buffer_usages(desc: &ResourceDesc) -> wgpu::BufferUsages {
    match desc.memory_type {
        MemoryType::Upload => wgpu::BufferUsages::MAP_WRITE | wgpu::BufferUsages::COPY_SRC,
        MemoryType::Read => wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        MemoryType::Local => {
            let mut usages =
                wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::INDEX | wgpu::BufferUsages::UNIFORM;
            if desc.usage.contains(ResourceUsageFlagBits::TransferSrc) {
                usages |= wgpu::BufferUsages::COPY_SRC;
            }
            if desc.usage.contains(ResourceUsageFlagBits::TransferDst) {
                usages |= wgpu::BufferUsages::COPY_DST;
            }
            if desc
                .usage
                .intersects(ResourceUsageFlagBits::Sampled | ResourceUsageFlagBits::ShaderWrite)
            {
                usages |= wgpu::BufferUsages::STORAGE;
            }
            usages
        }
    }
}

pub(crate) fn texture_usages_of(usage: ResourceUsageFlags) -> wgpu::TextureUsages {
    let mut usages = wgpu::TextureUsages::empty();
    for bit in usage.iter() {
        usages |= match bit {
            ResourceUsageFlagBits::TransferSrc => wgpu::TextureUsages::COPY_SRC,
            ResourceUsageFlagBits::TransferDst => wgpu::TextureUsages::COPY_DST,
            ResourceUsageFlagBits::Sampled => wgpu::TextureUsages::TEXTURE_BINDING,
            ResourceUsageFlagBits::ShaderWrite => wgpu::TextureUsages::STORAGE_BINDING,
            ResourceUsageFlagBits::ColorAttachment
            | ResourceUsageFlagBits::DepthStencilAttachment => {
                wgpu::TextureUsages::RENDER_ATTACHMENT
            }
            ResourceUsageFlagBits::DenyShaderResource => wgpu::TextureUsages::empty(),
        };
    }
    usages
}

impl Resource {
    pub(crate) fn new(device: &wgpu::Device, desc: &ResourceDesc) -> Result<Self, Error> {
        let id = crate::unique_id();
        let label = format!("llri {} {id}", desc.resource_type.as_str()).to_lowercase();
        let backing = if desc.resource_type == ResourceType::Buffer {
            Backing::Buffer(device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(&label),
                size: (desc.width as u64).next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT),
                usage: buffer_usages(desc),
                mapped_at_creation: false,
            }))
        } else {
            let format = to_wgpu(desc.texture_format)
                .ok_or(Error::UnsupportedFormat(desc.texture_format))?;
            let dimension = match desc.resource_type {
                ResourceType::Texture1D => wgpu::TextureDimension::D1,
                ResourceType::Texture3D => wgpu::TextureDimension::D3,
                _ => wgpu::TextureDimension::D2,
            };
            Backing::Texture(device.create_texture(&wgpu::TextureDescriptor {
                label: Some(&label),
                size: wgpu::Extent3d {
                    width: desc.width,
                    height: desc.height,
                    depth_or_array_layers: desc.depth_or_array_layers as u32,
                },
                mip_level_count: desc.mip_levels as u32,
                sample_count: desc.sample_count.samples(),
                dimension,
                format,
                usage: texture_usages_of(desc.usage),
                view_formats: &[],
            }))
        };
        logwise::trace_sync!(
            "wgpu resource {id}: {backing}",
            id = id,
            backing = logwise::privacy::LogIt(&backing)
        );
        Ok(Resource { id, backing })
    }
}

impl Drop for Resource {
    fn drop(&mut self) {
        match &self.backing {
            Backing::Buffer(buffer) => buffer.destroy(),
            Backing::Texture(texture) => texture.destroy(),
        }
    }
}
