// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Resources and their taxonomy.

A [Resource] is a buffer or texture together with its backing memory.  What a resource may be
used for is fixed at creation by its [ResourceDesc]; the state it is in at any moment decides
which operations are legal on it.

# State legality

| State | Requires | Valid types |
|---|---|---|
| General | | all |
| Upload | [MemoryType::Upload], no ShaderWrite | all |
| ColorAttachment | ColorAttachment | textures |
| DepthStencilAttachment | DepthStencilAttachment | Texture2D |
| DepthStencilAttachmentReadOnly | DepthStencilAttachment | Texture2D |
| ShaderReadOnly | Sampled (textures only) | all |
| ShaderReadWrite | ShaderWrite | all |
| TransferSrc | TransferSrc | all |
| TransferDst | TransferDst | all |
| VertexBuffer, IndexBuffer, ConstantBuffer | | Buffer |
*/

use crate::device::DeviceRef;
use crate::format::Format;
use crate::imp;

closed_enum! {
    /// What kind of object a resource is.
    pub enum ResourceType {
        Buffer = 0,
        Texture1D = 1,
        Texture2D = 2,
        Texture3D = 3,
    }
}

impl ResourceType {
    pub const fn is_texture(self) -> bool {
        !matches!(self, ResourceType::Buffer)
    }
}

closed_enum! {
    /// The state a resource is in on the GPU timeline.
    pub enum ResourceState {
        /// Any access, at the cost of performance.
        General = 0,
        /// Host writes.  Only for [MemoryType::Upload] resources.
        Upload = 1,
        ColorAttachment = 2,
        DepthStencilAttachment = 3,
        DepthStencilAttachmentReadOnly = 4,
        ShaderReadOnly = 5,
        ShaderReadWrite = 6,
        TransferSrc = 7,
        TransferDst = 8,
        VertexBuffer = 9,
        IndexBuffer = 10,
        ConstantBuffer = 11,
    }
}

closed_enum! {
    /// Texel samples per pixel.
    pub enum SampleCount {
        Count1 = 1,
        Count2 = 2,
        Count4 = 4,
        Count8 = 8,
        Count16 = 16,
        Count32 = 32,
    }
}

impl SampleCount {
    pub const fn samples(self) -> u32 {
        self as u32
    }
}

closed_enum! {
    /// Where a resource's memory lives.
    pub enum MemoryType {
        /// Device memory, not host visible.
        Local = 0,
        /// Host-visible memory the host writes and the device reads.
        Upload = 1,
        /// Host-visible memory the device writes and the host reads.
        Read = 2,
    }
}

flag_bits! {
    /// What a resource may be used for.
    pub enum ResourceUsageFlagBits: u16 as ResourceUsageFlags {
        TransferSrc = 1 << 0,
        TransferDst = 1 << 1,
        /// Sampled or read in shaders.
        Sampled = 1 << 2,
        /// Written from shaders.
        ShaderWrite = 1 << 3,
        ColorAttachment = 1 << 4,
        DepthStencilAttachment = 1 << 5,
        /// Hint that a depth-stencil resource is never read in shaders.
        DenyShaderResource = 1 << 6,
    }
}

/// Describes a resource to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceDesc {
    /// The node the resource is created on.  `0` reads as node 0.
    pub create_node_mask: u32,
    /// The nodes that may access the resource.  `0` reads as node 0.
    pub visible_node_mask: u32,
    pub resource_type: ResourceType,
    pub usage: ResourceUsageFlags,
    pub memory_type: MemoryType,
    pub initial_state: ResourceState,
    /// Width in texels, or the size in bytes for buffers.
    pub width: u32,
    pub height: u32,
    /// Depth for [ResourceType::Texture3D], the array layer count for other textures.
    pub depth_or_array_layers: u16,
    pub mip_levels: u16,
    pub sample_count: SampleCount,
    /// [Format::Undefined] for buffers.
    pub texture_format: Format,
}

impl ResourceDesc {
    /// A buffer of `size` bytes.
    pub fn buffer(
        usage: ResourceUsageFlags,
        memory_type: MemoryType,
        initial_state: ResourceState,
        size: u32,
    ) -> Self {
        ResourceDesc {
            create_node_mask: 0,
            visible_node_mask: 0,
            resource_type: ResourceType::Buffer,
            usage,
            memory_type,
            initial_state,
            width: size,
            height: 1,
            depth_or_array_layers: 1,
            mip_levels: 1,
            sample_count: SampleCount::Count1,
            texture_format: Format::Undefined,
        }
    }

    pub fn texture_1d(
        format: Format,
        usage: ResourceUsageFlags,
        initial_state: ResourceState,
        width: u32,
        array_layers: u16,
        mip_levels: u16,
    ) -> Self {
        Self::texture(
            ResourceType::Texture1D,
            format,
            usage,
            initial_state,
            width,
            1,
            array_layers,
            mip_levels,
        )
    }

    pub fn texture_2d(
        format: Format,
        usage: ResourceUsageFlags,
        initial_state: ResourceState,
        width: u32,
        height: u32,
        array_layers: u16,
        mip_levels: u16,
    ) -> Self {
        Self::texture(
            ResourceType::Texture2D,
            format,
            usage,
            initial_state,
            width,
            height,
            array_layers,
            mip_levels,
        )
    }

    pub fn texture_3d(
        format: Format,
        usage: ResourceUsageFlags,
        initial_state: ResourceState,
        width: u32,
        height: u32,
        depth: u16,
        mip_levels: u16,
    ) -> Self {
        Self::texture(
            ResourceType::Texture3D,
            format,
            usage,
            initial_state,
            width,
            height,
            depth,
            mip_levels,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn texture(
        resource_type: ResourceType,
        format: Format,
        usage: ResourceUsageFlags,
        initial_state: ResourceState,
        width: u32,
        height: u32,
        depth_or_array_layers: u16,
        mip_levels: u16,
    ) -> Self {
        ResourceDesc {
            create_node_mask: 0,
            visible_node_mask: 0,
            resource_type,
            usage,
            memory_type: MemoryType::Local,
            initial_state,
            width,
            height,
            depth_or_array_layers,
            mip_levels,
            sample_count: SampleCount::Count1,
            texture_format: format,
        }
    }

    pub fn with_node_masks(mut self, create: u32, visible: u32) -> Self {
        self.create_node_mask = create;
        self.visible_node_mask = visible;
        self
    }

    pub fn with_sample_count(mut self, sample_count: SampleCount) -> Self {
        self.sample_count = sample_count;
        self
    }

    pub fn with_memory_type(mut self, memory_type: MemoryType) -> Self {
        self.memory_type = memory_type;
        self
    }

    /// Array layers addressable by barriers.  3D textures have exactly one.
    pub(crate) fn array_layers(&self) -> u32 {
        match self.resource_type {
            ResourceType::Texture3D | ResourceType::Buffer => 1,
            _ => self.depth_or_array_layers as u32,
        }
    }
}

/// A range of mip levels and array layers of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureSubresourceRange {
    pub base_mip_level: u16,
    pub num_mip_levels: u16,
    pub base_array_layer: u16,
    pub num_array_layers: u16,
}

impl TextureSubresourceRange {
    /// Every subresource, whatever the texture's size.
    pub const ALL: TextureSubresourceRange = TextureSubresourceRange {
        base_mip_level: 0,
        num_mip_levels: u16::MAX,
        base_array_layer: 0,
        num_array_layers: u16::MAX,
    };

    pub const fn new(
        base_mip_level: u16,
        num_mip_levels: u16,
        base_array_layer: u16,
        num_array_layers: u16,
    ) -> Self {
        TextureSubresourceRange {
            base_mip_level,
            num_mip_levels,
            base_array_layer,
            num_array_layers,
        }
    }

    /// The range naming every subresource of `desc` exactly.
    pub fn all_of(desc: &ResourceDesc) -> Self {
        TextureSubresourceRange {
            base_mip_level: 0,
            num_mip_levels: desc.mip_levels,
            base_array_layer: 0,
            num_array_layers: desc.array_layers() as u16,
        }
    }

    /// True when the range covers everything in `desc`, so no per-subresource work is needed.
    pub(crate) fn covers_all_of(&self, desc: &ResourceDesc) -> bool {
        *self == Self::ALL || *self == Self::all_of(desc)
    }

    /// Resolves [Self::ALL] against `desc`.
    pub(crate) fn resolve(&self, desc: &ResourceDesc) -> Self {
        if *self == Self::ALL {
            Self::all_of(desc)
        } else {
            *self
        }
    }

    pub(crate) fn in_bounds_of(&self, desc: &ResourceDesc) -> bool {
        if self.covers_all_of(desc) {
            return true;
        }
        let mips = self.base_mip_level as u32 + self.num_mip_levels as u32;
        let layers = self.base_array_layer as u32 + self.num_array_layers as u32;
        self.num_mip_levels > 0
            && self.num_array_layers > 0
            && mips <= desc.mip_levels as u32
            && layers <= desc.array_layers()
    }
}

impl Default for TextureSubresourceRange {
    fn default() -> Self {
        Self::ALL
    }
}

/// True when `state` exists for resources of type `ty`.
pub(crate) fn state_valid_for_type(state: ResourceState, ty: ResourceType) -> bool {
    use ResourceState::*;
    match state {
        ColorAttachment => ty.is_texture(),
        DepthStencilAttachment | DepthStencilAttachmentReadOnly => ty == ResourceType::Texture2D,
        VertexBuffer | IndexBuffer | ConstantBuffer => ty == ResourceType::Buffer,
        General | Upload | ShaderReadOnly | ShaderReadWrite | TransferSrc | TransferDst => true,
    }
}

/// True when `desc` was created with what `state` requires.
pub(crate) fn state_usage_satisfied(state: ResourceState, desc: &ResourceDesc) -> bool {
    use ResourceState::*;
    let usage = desc.usage;
    match state {
        General | VertexBuffer | IndexBuffer | ConstantBuffer => true,
        Upload => {
            desc.memory_type == MemoryType::Upload
                && !usage.contains(ResourceUsageFlagBits::ShaderWrite)
        }
        ColorAttachment => usage.contains(ResourceUsageFlagBits::ColorAttachment),
        DepthStencilAttachment | DepthStencilAttachmentReadOnly => {
            usage.contains(ResourceUsageFlagBits::DepthStencilAttachment)
        }
        ShaderReadOnly => {
            !desc.resource_type.is_texture() || usage.contains(ResourceUsageFlagBits::Sampled)
        }
        ShaderReadWrite => usage.contains(ResourceUsageFlagBits::ShaderWrite),
        TransferSrc => usage.contains(ResourceUsageFlagBits::TransferSrc),
        TransferDst => usage.contains(ResourceUsageFlagBits::TransferDst),
    }
}

/// True when `desc` may be in `state` at all.
pub(crate) fn state_legal_for(state: ResourceState, desc: &ResourceDesc) -> bool {
    state_valid_for_type(state, desc.resource_type) && state_usage_satisfied(state, desc)
}

/// A buffer or texture and its memory.
///
/// Created by [crate::Device::create_resource].
pub struct Resource {
    pub(crate) device: DeviceRef,
    pub(crate) id: u64,
    pub(crate) desc: ResourceDesc,
    pub(crate) imp: imp::Resource,
}

impl Resource {
    /// The descriptor this resource was created with, exactly as passed.
    pub fn get_desc(&self) -> ResourceDesc {
        self.desc
    }
}

impl std::fmt::Debug for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resource")
            .field("id", &self.id)
            .field("desc", &self.desc)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texture(usage: ResourceUsageFlags) -> ResourceDesc {
        ResourceDesc::texture_2d(
            Format::RGBA8UNorm,
            usage,
            ResourceState::TransferDst,
            64,
            64,
            1,
            1,
        )
    }

    #[test]
    fn depth_states_are_2d_only() {
        for ty in ResourceType::ALL {
            assert_eq!(
                state_valid_for_type(ResourceState::DepthStencilAttachment, ty),
                ty == ResourceType::Texture2D
            );
        }
        assert!(state_valid_for_type(ResourceState::ColorAttachment, ResourceType::Texture3D));
        assert!(!state_valid_for_type(ResourceState::ColorAttachment, ResourceType::Buffer));
        assert!(!state_valid_for_type(ResourceState::IndexBuffer, ResourceType::Texture1D));
    }

    #[test]
    fn shader_read_needs_sampled_on_textures() {
        let plain = texture(ResourceUsageFlagBits::TransferDst.into());
        assert!(!state_legal_for(ResourceState::ShaderReadOnly, &plain));
        let sampled = texture(ResourceUsageFlagBits::TransferDst | ResourceUsageFlagBits::Sampled);
        assert!(state_legal_for(ResourceState::ShaderReadOnly, &sampled));
        let buffer = ResourceDesc::buffer(
            ResourceUsageFlags::empty(),
            MemoryType::Local,
            ResourceState::General,
            256,
        );
        assert!(state_legal_for(ResourceState::ShaderReadOnly, &buffer));
    }

    #[test]
    fn upload_needs_upload_memory() {
        let local = ResourceDesc::buffer(
            ResourceUsageFlagBits::TransferSrc.into(),
            MemoryType::Local,
            ResourceState::General,
            256,
        );
        assert!(!state_legal_for(ResourceState::Upload, &local));
        let upload = local.with_memory_type(MemoryType::Upload);
        assert!(state_legal_for(ResourceState::Upload, &upload));
    }

    #[test]
    fn subresource_bounds() {
        let mut desc = texture(ResourceUsageFlagBits::Sampled.into());
        desc.mip_levels = 10;
        desc.depth_or_array_layers = 2;
        assert!(!TextureSubresourceRange::new(9, 5, 0, 1).in_bounds_of(&desc));
        assert!(TextureSubresourceRange::new(3, 2, 1, 1).in_bounds_of(&desc));
        assert!(TextureSubresourceRange::ALL.in_bounds_of(&desc));
        assert!(TextureSubresourceRange::new(0, 10, 0, 2).covers_all_of(&desc));
        assert!(!TextureSubresourceRange::new(0, 1, 2, 1).in_bounds_of(&desc));

        let mut volume = desc;
        volume.resource_type = ResourceType::Texture3D;
        volume.depth_or_array_layers = 8;
        assert!(!TextureSubresourceRange::new(0, 1, 1, 1).in_bounds_of(&volume));
        assert!(TextureSubresourceRange::new(0, 1, 0, 1).in_bounds_of(&volume));
    }
}
