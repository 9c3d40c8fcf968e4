// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use std::sync::Arc;

use crate::callback::Messenger;
use crate::imp::soft::Error;
use crate::imp::soft::command::CommandGroup;
use crate::imp::soft::resource::{MemoryHeap, Resource};
use crate::imp::soft::surface::{Surface, Swapchain};
use crate::imp::soft::timeline::{self, ExecutionContext, Fence, Queue, Semaphore};
use crate::queue::{QueueDesc, QueueType};
use crate::resource::{MemoryType, ResourceDesc};
use crate::swapchain::SwapchainInfoExt;

#[derive(Debug)]
struct DeviceCore {
    validate: bool,
    local: Arc<MemoryHeap>,
    host: Arc<MemoryHeap>,
    messenger: Arc<Messenger>,
}

#[derive(Debug, Clone)]
pub(crate) struct Device(Arc<DeviceCore>);

impl Device {
    pub(super) fn new(
        validate: bool,
        local: Arc<MemoryHeap>,
        host: Arc<MemoryHeap>,
        messenger: Arc<Messenger>,
    ) -> Self {
        Device(Arc::new(DeviceCore {
            validate,
            local,
            host,
            messenger,
        }))
    }

    pub(crate) fn create_queue(&self, desc: &QueueDesc, index: u8, node: u8) -> Result<Queue, Error> {
        let label = format!("llri_{}_{}_node{}", desc.ty.as_str(), index, node).to_lowercase();
        logwise::trace_sync!(
            "software queue {label}, priority {priority}",
            label = label.clone(),
            priority = logwise::privacy::LogIt(&desc.priority.value())
        );
        Queue::spawn(
            label,
            ExecutionContext {
                messenger: self.0.messenger.clone(),
                validate: self.0.validate,
            },
        )
    }

    pub(crate) fn create_command_group(&self, ty: QueueType) -> Result<CommandGroup, Error> {
        Ok(CommandGroup::new(ty))
    }

    pub(crate) fn create_fence(&self) -> Result<Fence, Error> {
        Ok(Fence::new())
    }

    pub(crate) fn create_semaphore(&self) -> Result<Semaphore, Error> {
        Ok(Semaphore::new())
    }

    /// Returns whether every fence reached its value within the timeout.
    pub(crate) fn wait_fences(&self, fences: &[(&Fence, u64)], timeout_ms: u32) -> Result<bool, Error> {
        Ok(timeline::wait_all(fences, timeout_ms))
    }

    fn heap(&self, memory_type: MemoryType) -> &Arc<MemoryHeap> {
        match memory_type {
            MemoryType::Local => &self.0.local,
            MemoryType::Upload | MemoryType::Read => &self.0.host,
        }
    }

    pub(crate) fn create_resource(&self, desc: &ResourceDesc) -> Result<Resource, Error> {
        Resource::new(desc, self.heap(desc.memory_type))
    }

    pub(crate) fn create_swapchain(
        &self,
        surface: &Surface,
        info: &SwapchainInfoExt,
    ) -> Result<Swapchain, Error> {
        logwise::info_sync!(
            "software swapchain, {count} textures, present support {support}",
            count = info.texture_count,
            support = logwise::privacy::LogIt(&surface.present_support(QueueType::Graphics))
        );
        Swapchain::new(info, &self.0.local)
    }
}
