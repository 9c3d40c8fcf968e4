// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Command recording.

wgpu derives barriers from resource usage, so recorded barriers only leave a debug marker
in the encoder that executes the list.
*/

use crate::command_list::CommandListUsage;
use crate::imp::Barrier;
use crate::imp::wgpu::Error;
use crate::queue::QueueType;

/// Recorded work, detached from its list for submission.
#[derive(Debug, Clone)]
pub(crate) struct Submission {
    pub(crate) label: String,
    pub(crate) markers: Vec<String>,
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
            "wgpu allocate {usage} list for {ty} group, node mask {mask}",
            usage = logwise::privacy::LogIt(&usage),
            ty = logwise::privacy::LogIt(&self.ty),
            mask = node_mask
        );
        Ok(CommandList {
            label: format!("llri {} list", self.ty.as_str()).to_lowercase(),
            markers: Vec::new(),
        })
    }

    pub(crate) fn reset(&self) -> Result<(), Error> {
        Ok(())
    }
}

#[derive(Debug)]
pub(crate) struct CommandList {
    label: String,
    markers: Vec<String>,
}

fn marker(barrier: &Barrier<'_>) -> String {
    match barrier {
        Barrier::ReadWrite { resource } => format!("read/write barrier, resource {}", resource.id),
        Barrier::Transition {
            resource,
            old_state,
            new_state,
            ..
        } => match old_state {
            Some(old) => format!("resource {}: {old} -> {new_state}", resource.id),
            None => format!("resource {}: undefined -> {new_state}", resource.id),
        },
    }
}

impl CommandList {
    pub(crate) fn begin(&mut self) -> Result<(), Error> {
        self.markers.clear();
        Ok(())
    }

    pub(crate) fn end(&mut self) -> Result<(), Error> {
        Ok(())
    }

    pub(crate) fn resource_barriers(&mut self, barriers: &[Barrier<'_>]) -> Result<(), Error> {
        self.markers.extend(barriers.iter().map(marker));
        Ok(())
    }

    pub(crate) fn take_submission(&mut self) -> Submission {
        Submission {
            label: self.label.clone(),
            markers: self.markers.clone(),
        }
    }

    pub(crate) fn reset(&mut self) {
        self.markers.clear();
    }
}

impl Submission {
    /// Encodes the list into a wgpu command buffer.
    pub(crate) fn encode(&self, device: &wgpu::Device) -> wgpu::CommandBuffer {
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some(&self.label),
        });
        for marker in &self.markers {
            encoder.insert_debug_marker(marker);
        }
        encoder.finish()
    }
}
