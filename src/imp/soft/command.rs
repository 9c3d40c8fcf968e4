// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Command recording and barrier lowering.

Barriers lower the way an explicit API expects them: every batch of barriers becomes a single
pipeline barrier from all commands to all commands, carrying image barriers (layout and
access), buffer barriers (access) and memory barriers (read/write hazards).
*/

use std::sync::Arc;

use crate::command_list::CommandListUsage;
use crate::imp::Barrier;
use crate::imp::soft::Error;
use crate::imp::soft::resource::ImageState;
use crate::imp::soft::timeline::ExecutionContext;
use crate::queue::QueueType;
use crate::resource::{ResourceState, TextureSubresourceRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum ImageLayout {
    Undefined,
    General,
    ColorAttachmentOptimal,
    DepthStencilAttachmentOptimal,
    DepthStencilReadOnlyOptimal,
    ShaderReadOnlyOptimal,
    TransferSrcOptimal,
    TransferDstOptimal,
}

flag_bits! {
    pub(crate) enum AccessBits: u32 as Access {
        HostWrite = 1 << 0,
        ColorAttachmentRead = 1 << 1,
        ColorAttachmentWrite = 1 << 2,
        DepthStencilRead = 1 << 3,
        DepthStencilWrite = 1 << 4,
        ShaderRead = 1 << 5,
        ShaderWrite = 1 << 6,
        TransferRead = 1 << 7,
        TransferWrite = 1 << 8,
        VertexAttributeRead = 1 << 9,
        IndexRead = 1 << 10,
        UniformRead = 1 << 11,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PipelineStage {
    AllCommands,
}

pub(crate) fn layout_for(state: ResourceState) -> ImageLayout {
    use ResourceState::*;
    match state {
        General | Upload | ShaderReadWrite | VertexBuffer | IndexBuffer | ConstantBuffer => {
            ImageLayout::General
        }
        ColorAttachment => ImageLayout::ColorAttachmentOptimal,
        DepthStencilAttachment => ImageLayout::DepthStencilAttachmentOptimal,
        DepthStencilAttachmentReadOnly => ImageLayout::DepthStencilReadOnlyOptimal,
        ShaderReadOnly => ImageLayout::ShaderReadOnlyOptimal,
        TransferSrc => ImageLayout::TransferSrcOptimal,
        TransferDst => ImageLayout::TransferDstOptimal,
    }
}

pub(crate) fn access_for(state: ResourceState) -> Access {
    use ResourceState::*;
    match state {
        General => Access::empty(),
        Upload => AccessBits::HostWrite.into(),
        ColorAttachment => AccessBits::ColorAttachmentRead | AccessBits::ColorAttachmentWrite,
        DepthStencilAttachment => AccessBits::DepthStencilRead | AccessBits::DepthStencilWrite,
        DepthStencilAttachmentReadOnly => AccessBits::DepthStencilRead.into(),
        ShaderReadOnly => AccessBits::ShaderRead.into(),
        ShaderReadWrite => AccessBits::ShaderRead | AccessBits::ShaderWrite,
        TransferSrc => AccessBits::TransferRead.into(),
        TransferDst => AccessBits::TransferWrite.into(),
        VertexBuffer => AccessBits::VertexAttributeRead.into(),
        IndexBuffer => AccessBits::IndexRead.into(),
        ConstantBuffer => AccessBits::UniformRead.into(),
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ImageBarrier {
    pub(crate) image: Arc<ImageState>,
    pub(crate) old_layout: ImageLayout,
    pub(crate) new_layout: ImageLayout,
    pub(crate) src_access: Access,
    pub(crate) dst_access: Access,
    pub(crate) range: TextureSubresourceRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BufferBarrier {
    pub(crate) buffer: u64,
    pub(crate) src_access: Access,
    pub(crate) dst_access: Access,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MemoryBarrier {
    pub(crate) src_access: Access,
    pub(crate) dst_access: Access,
}

#[derive(Debug, Clone)]
pub(crate) struct PipelineBarrier {
    pub(crate) src_stage: PipelineStage,
    pub(crate) dst_stage: PipelineStage,
    pub(crate) memory: Vec<MemoryBarrier>,
    pub(crate) buffers: Vec<BufferBarrier>,
    pub(crate) images: Vec<ImageBarrier>,
}

impl PipelineBarrier {
    pub(crate) fn lower(barriers: &[Barrier<'_>]) -> Self {
        let mut lowered = PipelineBarrier {
            src_stage: PipelineStage::AllCommands,
            dst_stage: PipelineStage::AllCommands,
            memory: Vec::new(),
            buffers: Vec::new(),
            images: Vec::new(),
        };
        for barrier in barriers {
            match *barrier {
                Barrier::ReadWrite { resource } => {
                    logwise::trace_sync!("read/write hazard on resource {id}", id = resource.id);
                    lowered.memory.push(MemoryBarrier {
                        src_access: AccessBits::ShaderWrite.into(),
                        dst_access: AccessBits::ShaderRead | AccessBits::ShaderWrite,
                    });
                }
                Barrier::Transition {
                    resource,
                    old_state,
                    new_state,
                    range,
                    ..
                } => {
                    let src_access = old_state.map(access_for).unwrap_or_default();
                    let dst_access = access_for(new_state);
                    match &resource.image {
                        Some(image) => lowered.images.push(ImageBarrier {
                            image: image.clone(),
                            old_layout: old_state.map(layout_for).unwrap_or(ImageLayout::Undefined),
                            new_layout: layout_for(new_state),
                            src_access,
                            dst_access,
                            range,
                        }),
                        None => lowered.buffers.push(BufferBarrier {
                            buffer: resource.id,
                            src_access,
                            dst_access,
                        }),
                    }
                }
            }
        }
        lowered
    }

    pub(crate) fn execute(&self, context: &ExecutionContext) {
        logwise::trace_sync!(
            "pipeline barrier {src} -> {dst}",
            src = logwise::privacy::LogIt(&self.src_stage),
            dst = logwise::privacy::LogIt(&self.dst_stage)
        );
        for memory in &self.memory {
            logwise::trace_sync!(
                "memory barrier {src} -> {dst}",
                src = logwise::privacy::LogIt(&memory.src_access),
                dst = logwise::privacy::LogIt(&memory.dst_access)
            );
        }
        for buffer in &self.buffers {
            logwise::trace_sync!(
                "buffer {id} barrier {src} -> {dst}",
                id = buffer.buffer,
                src = logwise::privacy::LogIt(&buffer.src_access),
                dst = logwise::privacy::LogIt(&buffer.dst_access)
            );
        }
        for image in &self.images {
            image.image.transition(image, context);
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Command {
    PipelineBarrier(PipelineBarrier),
}

/// Recorded work, detached from its list for submission.
#[derive(Debug, Clone)]
pub(crate) struct Submission {
    pub(crate) commands: Vec<Command>,
}

#[derive(Debug)]
pub(crate) struct CommandGroup {
    ty: QueueType,
}

impl CommandGroup {
    pub(crate) fn new(ty: QueueType) -> Self {
        CommandGroup { ty }
    }

    pub(crate) fn allocate(
        &self,
        node_mask: u32,
        usage: CommandListUsage,
    ) -> Result<CommandList, Error> {
        logwise::trace_sync!(
            "software allocate {usage} list for {ty} group, node mask {mask}",
            usage = logwise::privacy::LogIt(&usage),
            ty = logwise::privacy::LogIt(&self.ty),
            mask = node_mask
        );
        Ok(CommandList {
            commands: Vec::new(),
        })
    }

    pub(crate) fn reset(&self) -> Result<(), Error> {
        Ok(())
    }
}

#[derive(Debug)]
pub(crate) struct CommandList {
    commands: Vec<Command>,
}

impl CommandList {
    pub(crate) fn begin(&mut self) -> Result<(), Error> {
        self.commands.clear();
        Ok(())
    }

    pub(crate) fn end(&mut self) -> Result<(), Error> {
        Ok(())
    }

    pub(crate) fn resource_barriers(&mut self, barriers: &[Barrier<'_>]) -> Result<(), Error> {
        let lowered = PipelineBarrier::lower(barriers);
        logwise::trace_sync!(
            "software pipeline barrier: {images} image, {buffers} buffer, {memory} memory",
            images = lowered.images.len(),
            buffers = lowered.buffers.len(),
            memory = lowered.memory.len()
        );
        self.commands.push(Command::PipelineBarrier(lowered));
        Ok(())
    }

    pub(crate) fn take_submission(&mut self) -> Submission {
        Submission {
            commands: self.commands.clone(),
        }
    }

    pub(crate) fn reset(&mut self) {
        self.commands.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layouts_collapse_general_states() {
        assert_eq!(layout_for(ResourceState::Upload), ImageLayout::General);
        assert_eq!(layout_for(ResourceState::ConstantBuffer), ImageLayout::General);
        assert_eq!(
            layout_for(ResourceState::DepthStencilAttachmentReadOnly),
            ImageLayout::DepthStencilReadOnlyOptimal
        );
    }

    #[test]
    fn access_table() {
        assert!(access_for(ResourceState::General).is_empty());
        assert_eq!(
            access_for(ResourceState::ShaderReadWrite),
            AccessBits::ShaderRead | AccessBits::ShaderWrite
        );
        assert_eq!(
            access_for(ResourceState::TransferDst),
            Access::from(AccessBits::TransferWrite)
        );
    }
}
