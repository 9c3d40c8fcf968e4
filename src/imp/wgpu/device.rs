// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
The wgpu device, its poll thread and queue handles.

wgpu only runs completion callbacks while the device is polled.  A dedicated thread blocks in
`poll(Wait)` whenever work is submitted, so fences advance without the caller polling.
*/

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use wgpu::PollType;

use crate::callback::{MessageSeverity, Messenger};
use crate::imp::Batch;
use crate::imp::wgpu::Error;
use crate::imp::wgpu::command::CommandGroup;
use crate::imp::wgpu::resource::Resource;
use crate::imp::wgpu::surface::{Surface, Swapchain};
use crate::imp::wgpu::sync::{self, Fence, Semaphore};
use crate::queue::{QueueDesc, QueueType};
use crate::resource::ResourceDesc;
use crate::swapchain::SwapchainInfoExt;

const WAIT_SLICE: Duration = Duration::from_millis(5);

/// Features requested whenever the adapter has them.  Formats needing missing features
/// are reported unsupported.
fn optional_features() -> wgpu::Features {
    wgpu::Features::DEPTH32FLOAT_STENCIL8
        | wgpu::Features::TEXTURE_FORMAT_16BIT_NORM
        | wgpu::Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES
}

#[derive(Debug)]
struct DeviceCore {
    device: wgpu::Device,
    queue: wgpu::Queue,
    poll_trigger: Option<Sender<()>>,
    poll_thread: Option<JoinHandle<()>>,
}

impl DeviceCore {
    fn set_needs_poll(&self) {
        if let Some(sender) = &self.poll_trigger {
            //a closed channel means we're shutting down
            let _ = sender.send(());
        }
    }

    /// Runs `f` inside validation and out-of-memory error scopes.
    fn scoped<T>(&self, f: impl FnOnce(&wgpu::Device) -> T) -> Result<T, Error> {
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = f(&self.device);
        let validation = test_executors::sleep_on(self.device.pop_error_scope());
        let memory = test_executors::sleep_on(self.device.pop_error_scope());
        match memory.or(validation) {
            Some(error) => Err(error.into()),
            None => Ok(value),
        }
    }
}

impl Drop for DeviceCore {
    fn drop(&mut self) {
        //closing the channel ends the poll loop
        self.poll_trigger.take();
        if let Some(thread) = self.poll_thread.take() {
            if thread.join().is_err() {
                logwise::error_sync!("wgpu poll thread panicked");
            }
        }
    }
}

fn run_poll(device: wgpu::Device, receiver: Receiver<()>) {
    for () in receiver {
        if let Err(e) = device.poll(PollType::Wait) {
            logwise::warn_sync!(
                "wgpu poll failed: {err}",
                err = logwise::privacy::LogIt(&e)
            );
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Device(Arc<DeviceCore>);

impl Device {
    pub(super) fn request(adapter: &wgpu::Adapter, messenger: Arc<Messenger>) -> Result<Self, Error> {
        let descriptor = wgpu::DeviceDescriptor {
            label: Some("llri device"),
            required_features: adapter.features() & optional_features(),
            required_limits: adapter.limits(),
            memory_hints: Default::default(),
            trace: wgpu::Trace::Off,
        };
        let (device, queue) = {
            let _interval = logwise::perfwarn_begin!("wgpu request_device");
            test_executors::sleep_on(adapter.request_device(&descriptor))?
        };
        let uncaptured = messenger.clone();
        device.on_uncaptured_error(Box::new(move |error| {
            uncaptured.push(MessageSeverity::Error, error.to_string());
        }));

        let (sender, receiver) = mpsc::channel();
        let poll_device = device.clone();
        let prior_context = logwise::context::Context::current();
        let poll_thread = thread::Builder::new()
            .name("wgpu_poll".to_string())
            .spawn(move || {
                let c = logwise::context::Context::new_task(Some(prior_context), "wgpu poll");
                let id = c.context_id();
                c.set_current();
                run_poll(poll_device, receiver);
                logwise::context::Context::pop(id);
            })?;
        Ok(Device(Arc::new(DeviceCore {
            device,
            queue,
            poll_trigger: Some(sender),
            poll_thread: Some(poll_thread),
        })))
    }

    pub(crate) fn create_queue(&self, desc: &QueueDesc, index: u8, node: u8) -> Result<Queue, Error> {
        logwise::trace_sync!(
            "wgpu queue {ty} {index} on node {node}, priority {priority}",
            ty = logwise::privacy::LogIt(&desc.ty),
            index = index,
            node = node,
            priority = logwise::privacy::LogIt(&desc.priority.value())
        );
        Ok(Queue {
            core: self.0.clone(),
        })
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
        let deadline = (timeout_ms != crate::TIMEOUT_MAX)
            .then(|| Instant::now() + Duration::from_millis(timeout_ms as u64));
        Ok(sync::wait_all(fences, deadline, WAIT_SLICE, || {
            //drive callbacks ourselves in case the poll thread is between polls
            let _ = self.0.device.poll(PollType::Poll);
        }))
    }

    pub(crate) fn create_resource(&self, desc: &ResourceDesc) -> Result<Resource, Error> {
        self.0.scoped(|device| Resource::new(device, desc))?
    }

    pub(crate) fn create_swapchain(
        &self,
        surface: &Surface,
        info: &SwapchainInfoExt,
    ) -> Result<Swapchain, Error> {
        logwise::info_sync!(
            "wgpu swapchain, {count} textures, {width}x{height}",
            count = info.texture_count,
            width = info.extent.width,
            height = info.extent.height
        );
        self.0
            .scoped(|device| Swapchain::configure(surface, device, info))?
    }
}

/// A handle onto the device's single queue.
#[derive(Debug, Clone)]
pub(crate) struct Queue {
    core: Arc<DeviceCore>,
}

impl Queue {
    /// Waits are satisfied by submission order on the single wgpu queue.
    pub(crate) fn submit(&self, batch: Batch) -> Result<(), Error> {
        for (semaphore, value) in &batch.waits {
            if semaphore.0.get() < *value {
                logwise::trace_sync!(
                    "wgpu submit waits on semaphore value {value}, ordered by queue",
                    value = *value
                );
            }
        }
        let buffers: Vec<wgpu::CommandBuffer> = batch
            .submissions
            .iter()
            .map(|submission| submission.encode(&self.core.device))
            .collect();
        self.core.queue.submit(buffers);
        for (semaphore, value) in batch.signals {
            self.core
                .queue
                .on_submitted_work_done(move || semaphore.0.signal(value));
        }
        if let Some((fence, value)) = batch.fence {
            self.core
                .queue
                .on_submitted_work_done(move || fence.0.signal(value));
        }
        self.core.set_needs_poll();
        Ok(())
    }

    /// Signals `fence` to `value` once all earlier work on this queue has completed.
    pub(crate) fn signal_fence(&self, fence: &Fence, value: u64) -> Result<(), Error> {
        let fence = fence.clone();
        self.core
            .queue
            .on_submitted_work_done(move || fence.0.signal(value));
        self.core.set_needs_poll();
        Ok(())
    }
}
