// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Logical devices.

A [Device] is the only way to create GPU objects.  It owns its queues outright; every other
object it creates holds a counted reference back to it.

Besides the queues the caller asked for, a device keeps a private *work* context (a command
group, one command list and a fence on its first queue).  The backend creates textures in an
undefined layout; the work context moves each new texture into its
[ResourceDesc::initial_state] before [Device::create_resource] returns.
*/

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use wasm_safe_mutex::Mutex;

use crate::adapter::{Adapter, AdapterExtension, AdapterFeatures};
use crate::bittricks;
use crate::command_group::CommandGroup;
use crate::fence::{Fence, FenceFlagBits, FenceFlags};
use crate::format::Format;
use crate::imp::{self, Barrier, Batch, DeviceConfig};
use crate::instance::InstanceRef;
use crate::owner::{Owner, OwnerRef};
use crate::queue::{Queue, QueueDesc, QueueType};
use crate::resource::{
    MemoryType, Resource, ResourceDesc, ResourceState, ResourceType, ResourceUsageFlagBits,
    ResourceUsageFlags, SampleCount, TextureSubresourceRange, state_usage_satisfied,
    state_valid_for_type,
};
use crate::semaphore::Semaphore;
use crate::swapchain::{SwapchainDescExt, SwapchainExt};
use crate::command_list::CommandListUsage;
use crate::validation;
use crate::{Error, Result};

const MAX_TEXTURE_DIMENSION: u32 = 16384;
const MAX_TEXTURE_3D_DIMENSION: u32 = 2048;

/// Describes a device to create.
#[derive(Debug, Clone, Copy)]
pub struct DeviceDesc<'a> {
    pub adapter: &'a Adapter,
    /// Reserved.
    pub features: AdapterFeatures,
    /// Each extension at most once, each supported by the adapter.
    pub extensions: &'a [AdapterExtension],
    /// At least one queue; per type no more than [Adapter::query_queue_count].
    pub queues: &'a [QueueDesc],
}

impl<'a> DeviceDesc<'a> {
    pub fn new(adapter: &'a Adapter, queues: &'a [QueueDesc]) -> Self {
        DeviceDesc {
            adapter,
            features: AdapterFeatures::default(),
            extensions: &[],
            queues,
        }
    }

    pub fn with_extensions(mut self, extensions: &'a [AdapterExtension]) -> Self {
        self.extensions = extensions;
        self
    }
}

pub(crate) struct DeviceShared {
    pub(crate) id: u64,
    pub(crate) instance: InstanceRef,
    pub(crate) node_count: u8,
    live_children: AtomicUsize,
}

impl Owner for DeviceShared {
    fn live_children(&self) -> &AtomicUsize {
        &self.live_children
    }
}

pub(crate) type DeviceRef = OwnerRef<DeviceShared>;

struct WorkContext {
    group: imp::CommandGroup,
    list: imp::CommandList,
    queue: imp::Queue,
    fence: imp::Fence,
    value: u64,
}

/// A logical device on an [Adapter].
pub struct Device {
    shared: Arc<DeviceShared>,
    adapter: Adapter,
    extensions: Vec<AdapterExtension>,
    /// Indexed by [QueueType].
    queues: [Vec<Queue>; QueueType::COUNT],
    work: Mutex<WorkContext>,
    imp: imp::Device,
}

impl Device {
    /// Creates the backend device.  `desc` has been validated by the instance.
    pub(crate) fn new(instance: InstanceRef, desc: &DeviceDesc<'_>) -> Result<Self> {
        let imp_adapter = desc.adapter.imp()?;
        let messenger = instance.messenger.clone();
        let config = DeviceConfig {
            extensions: desc.extensions,
            queues: desc.queues,
        };
        let imp = validation::dispatch(&messenger, || {
            imp_adapter.create_device(&config, messenger.clone())
        })?;
        let shared = Arc::new(DeviceShared {
            id: crate::unique_id(),
            instance,
            node_count: desc.adapter.query_node_count().max(1),
            live_children: AtomicUsize::new(0),
        });

        let mut queues: [Vec<Queue>; QueueType::COUNT] = Default::default();
        for queue_desc in desc.queues {
            let of_type = &mut queues[queue_desc.ty as usize];
            let index = of_type.len() as u8;
            of_type.push(validation::dispatch(&messenger, || {
                Queue::new(shared.id, &imp, &messenger, *queue_desc, index, shared.node_count)
            })?);
        }

        let (work_type, work_queue) = QueueType::ALL
            .iter()
            .find_map(|ty| {
                queues[*ty as usize]
                    .first()
                    .and_then(|q| q.primary())
                    .map(|q| (*ty, q.clone()))
            })
            .ok_or(Error::InvalidUsage)?;
        let work = validation::dispatch(&messenger, || -> std::result::Result<_, imp::Error> {
            let group = imp.create_command_group(work_type)?;
            let list = group.allocate(1, CommandListUsage::Direct)?;
            Ok(WorkContext {
                group,
                list,
                queue: work_queue,
                fence: imp.create_fence()?,
                value: 0,
            })
        })?;

        logwise::info_sync!(
            "llri: created device on {adapter} with {queues} queues, work on {ty}",
            adapter = desc.adapter.query_info().name,
            queues = desc.queues.len(),
            ty = logwise::privacy::LogIt(&work_type)
        );
        Ok(Device {
            shared,
            adapter: desc.adapter.clone(),
            extensions: desc.extensions.to_vec(),
            queues,
            work: Mutex::new(work),
            imp,
        })
    }

    pub(crate) fn instance_id(&self) -> u64 {
        self.shared.instance.id
    }

    fn child(&self) -> DeviceRef {
        OwnerRef::new(&self.shared)
    }

    fn messenger(&self) -> &crate::callback::Messenger {
        &self.shared.instance.messenger
    }

    /// The `index`th queue of type `ty`, in the order the queues were requested.
    pub fn get_queue(&self, ty: QueueType, index: u8) -> Option<&Queue> {
        self.queues[ty as usize].get(index as usize)
    }

    /// How many queues of type `ty` the device was created with.
    pub fn query_queue_count(&self, ty: QueueType) -> u8 {
        self.queues[ty as usize].len() as u8
    }

    pub fn get_adapter(&self) -> &Adapter {
        &self.adapter
    }

    /// The number of nodes of the device's adapter.
    pub fn query_node_count(&self) -> u8 {
        self.shared.node_count
    }

    /// Creates a command group for queues of type `ty`.  The device must have such a queue.
    pub fn create_command_group(&self, ty: QueueType) -> Result<CommandGroup> {
        require!(
            self.query_queue_count(ty) > 0,
            Error::InvalidUsage,
            "the device has no {ty} queue"
        );
        let imp = validation::dispatch(self.messenger(), || self.imp.create_command_group(ty))?;
        Ok(CommandGroup::new(self.child(), ty, imp))
    }

    pub fn destroy_command_group(&self, group: CommandGroup) -> Result<()> {
        require!(
            group.device_id() == self.shared.id,
            Error::InvalidUsage,
            "group was created by a different device"
        );
        drop(group);
        Ok(())
    }

    /// Creates a fence.  With [FenceFlagBits::Signaled] the first wait succeeds at once.
    pub fn create_fence(&self, flags: FenceFlags) -> Result<Fence> {
        require!(
            FenceFlags::from(FenceFlagBits::Signaled).contains(flags),
            Error::InvalidUsage,
            "flags {flags} has bits besides Signaled"
        );
        let imp = validation::dispatch(self.messenger(), || self.imp.create_fence())?;
        Ok(Fence::new(self.child(), flags, imp))
    }

    pub fn destroy_fence(&self, fence: Fence) -> Result<()> {
        require!(
            fence.device_id() == self.shared.id,
            Error::InvalidUsage,
            "fence was created by a different device"
        );
        drop(fence);
        Ok(())
    }

    /// Waits until every fence has been reached, then resets them all.
    ///
    /// `timeout_ms` of [crate::TIMEOUT_MIN] polls and [crate::TIMEOUT_MAX] waits forever.
    /// Returns [Error::Timeout], leaving the fences signaled, if the time runs out first.
    pub fn wait_fences(&self, fences: &[&Fence], timeout_ms: u32) -> Result<()> {
        require!(!fences.is_empty(), Error::InvalidUsage, "fences is empty");
        for (i, fence) in fences.iter().enumerate() {
            require!(
                fence.device_id() == self.shared.id,
                Error::InvalidUsage,
                "fences[{i}] was created by a different device"
            );
        }
        for (i, fence) in fences.iter().enumerate() {
            require!(
                fence.is_signaled(),
                Error::NotSignaled,
                "fences[{i}] is not signaled; submit it before waiting"
            );
        }
        let targets: Vec<(&imp::Fence, u64)> =
            fences.iter().map(|f| (&f.imp, f.target())).collect();
        let _interval = logwise::perfwarn_begin!("llri Device::wait_fences");
        let reached = validation::dispatch(self.messenger(), || {
            self.imp.wait_fences(&targets, timeout_ms)
        })?;
        if !reached {
            logwise::trace_sync!(
                "llri: wait on {count} fences timed out after {ms} ms",
                count = fences.len(),
                ms = timeout_ms
            );
            return Err(Error::Timeout);
        }
        for fence in fences {
            fence.disarm();
        }
        Ok(())
    }

    pub fn wait_fence(&self, fence: &Fence, timeout_ms: u32) -> Result<()> {
        self.wait_fences(&[fence], timeout_ms)
    }

    pub fn create_semaphore(&self) -> Result<Semaphore> {
        let imp = validation::dispatch(self.messenger(), || self.imp.create_semaphore())?;
        Ok(Semaphore::new(self.child(), imp))
    }

    pub fn destroy_semaphore(&self, semaphore: Semaphore) -> Result<()> {
        require!(
            semaphore.device_id() == self.shared.id,
            Error::InvalidUsage,
            "semaphore was created by a different device"
        );
        drop(semaphore);
        Ok(())
    }

    fn check_resource_desc(&self, desc: &ResourceDesc) -> std::result::Result<(), (Error, String)> {
        use ResourceUsageFlagBits::*;
        let invalid = |reason: String| Err((Error::InvalidUsage, reason));
        let nodes = self.shared.node_count;
        let create = bittricks::normalize(desc.create_node_mask);
        let visible = bittricks::normalize(desc.visible_node_mask);
        if !bittricks::has_single_bit(create) || !bittricks::fits_nodes(create, nodes) {
            return Err((
                Error::InvalidNodeMask,
                format!(
                    "desc.create_node_mask {:#x} must select exactly one of {nodes} nodes",
                    desc.create_node_mask
                ),
            ));
        }
        if !bittricks::fits_nodes(visible, nodes) || visible & create != create {
            return Err((
                Error::InvalidNodeMask,
                format!(
                    "desc.visible_node_mask {:#x} must lie within {nodes} nodes and include the create node",
                    desc.visible_node_mask
                ),
            ));
        }

        let usage = desc.usage;
        if usage.bits() & !ResourceUsageFlags::all().bits() != 0 {
            return invalid(format!("desc.usage {usage} has undefined bits"));
        }
        if usage.contains(DenyShaderResource) {
            let allowed = DenyShaderResource | DepthStencilAttachment | TransferSrc | TransferDst;
            if !usage.contains(DepthStencilAttachment) || !allowed.contains(usage) {
                return invalid(format!(
                    "desc.usage {usage} has DenyShaderResource, which needs DepthStencilAttachment and allows only {allowed}"
                ));
            }
        }
        let is_texture = desc.resource_type.is_texture();
        if !is_texture {
            let allowed = TransferSrc | TransferDst | ShaderWrite;
            if !allowed.contains(usage) {
                return invalid(format!(
                    "desc.usage {usage} is not valid for buffers, which allow only {allowed}"
                ));
            }
        }
        if is_texture && desc.memory_type != MemoryType::Local {
            return invalid(format!(
                "textures must use Local memory, not {}",
                desc.memory_type
            ));
        }
        if desc.memory_type != MemoryType::Local
            && usage.intersects(ShaderWrite | ColorAttachment | DepthStencilAttachment | DenyShaderResource)
        {
            return invalid(format!(
                "desc.usage {usage} is not allowed in {} memory",
                desc.memory_type
            ));
        }

        let state = desc.initial_state;
        if !state_valid_for_type(state, desc.resource_type) {
            return invalid(format!(
                "desc.initial_state {state} is not valid for a {}",
                desc.resource_type
            ));
        }
        if !state_usage_satisfied(state, desc) {
            return invalid(format!(
                "desc.initial_state {state} is not allowed by desc.usage {usage} in {} memory",
                desc.memory_type
            ));
        }
        let paired = match desc.memory_type {
            MemoryType::Local => state != ResourceState::Upload,
            MemoryType::Upload => state == ResourceState::Upload,
            MemoryType::Read => state == ResourceState::TransferDst,
        };
        if !paired {
            return invalid(format!(
                "{} memory can't start in {state}",
                desc.memory_type
            ));
        }

        if desc.width == 0 {
            return invalid("desc.width is 0".to_string());
        }
        if !is_texture {
            return Ok(());
        }

        let limit = if desc.resource_type == ResourceType::Texture3D {
            MAX_TEXTURE_3D_DIMENSION
        } else {
            MAX_TEXTURE_DIMENSION
        };
        let dimensions = [
            ("width", desc.width),
            ("height", desc.height),
            ("depth_or_array_layers", desc.depth_or_array_layers as u32),
        ];
        for (name, value) in dimensions {
            if value == 0 || value > limit {
                return invalid(format!(
                    "desc.{name} is {value} but must be in 1..={limit} for a {}",
                    desc.resource_type
                ));
            }
        }
        if desc.mip_levels == 0 {
            return invalid("desc.mip_levels is 0".to_string());
        }
        if desc.resource_type == ResourceType::Texture1D && desc.height != 1 {
            return invalid(format!("a Texture1D must have height 1, not {}", desc.height));
        }
        if desc.width == 1 && desc.mip_levels != 1 {
            return invalid("a texture of width 1 has exactly one mip level".to_string());
        }

        let multisampled = desc.sample_count != SampleCount::Count1;
        if multisampled && desc.resource_type != ResourceType::Texture2D {
            return invalid(format!(
                "only Texture2D may be multisampled, not {}",
                desc.resource_type
            ));
        }
        if multisampled && usage.contains(ShaderWrite) {
            return invalid("ShaderWrite textures must use Count1".to_string());
        }
        if multisampled && !usage.intersects(ColorAttachment | DepthStencilAttachment) {
            return invalid(
                "multisampled textures need ColorAttachment or DepthStencilAttachment".to_string(),
            );
        }
        if multisampled && desc.mip_levels > 1 {
            return invalid("multisampled textures have exactly one mip level".to_string());
        }
        if desc.mip_levels > 1 && (desc.width as u64) < (1u64 << desc.mip_levels.min(63)) {
            return invalid(format!(
                "desc.width {} is too small for {} mip levels",
                desc.width, desc.mip_levels
            ));
        }

        let invalid_format = |reason: String| Err((Error::InvalidFormat, reason));
        if desc.texture_format == Format::Undefined {
            return invalid_format("textures need a format".to_string());
        }
        let properties = self
            .adapter
            .query_format_properties_of(desc.texture_format)
            .map_err(|e| (e, "the adapter is lost".to_string()))?;
        if !properties.supported {
            return invalid_format(format!("{} is not supported", desc.texture_format));
        }
        if !properties.supports_type(desc.resource_type) {
            return invalid_format(format!(
                "{} does not support {}",
                desc.texture_format, desc.resource_type
            ));
        }
        if !properties.supports_sample_count(desc.sample_count) {
            return invalid_format(format!(
                "{} does not support {}",
                desc.texture_format, desc.sample_count
            ));
        }
        if !properties.usage.contains(usage) {
            return invalid_format(format!(
                "{} supports usage {} but desc.usage is {usage}",
                desc.texture_format, properties.usage
            ));
        }
        Ok(())
    }

    /// Creates a buffer or texture.
    ///
    /// Textures are in [ResourceDesc::initial_state] when this returns.
    pub fn create_resource(&self, desc: &ResourceDesc) -> Result<Resource> {
        if cfg!(not(feature = "disable_validation")) {
            if let Err((error, reason)) = self.check_resource_desc(desc) {
                return Err(validation::violation(function_name!(), error, &reason));
            }
        }
        let imp = validation::dispatch(self.messenger(), || self.imp.create_resource(desc))?;
        if desc.resource_type.is_texture() {
            self.initial_transition(&imp, desc)?;
        }
        let resource = Resource {
            device: self.child(),
            id: crate::unique_id(),
            desc: *desc,
            imp,
        };
        logwise::trace_sync!(
            "llri: created {ty} resource {id}",
            ty = logwise::privacy::LogIt(&desc.resource_type),
            id = resource.id
        );
        Ok(resource)
    }

    /// Moves a new texture out of the backend's undefined layout.
    fn initial_transition(&self, resource: &imp::Resource, desc: &ResourceDesc) -> Result<()> {
        let mut work = self.work.lock_sync();
        let work = &mut *work;
        let barrier = Barrier::Transition {
            resource,
            old_state: None,
            new_state: desc.initial_state,
            range: TextureSubresourceRange::all_of(desc),
        };
        let value = work.value + 1;
        validation::dispatch(self.messenger(), || -> std::result::Result<bool, imp::Error> {
            work.group.reset()?;
            work.list.reset();
            work.list.begin()?;
            work.list.resource_barriers(&[barrier])?;
            work.list.end()?;
            work.queue.submit(Batch {
                waits: Vec::new(),
                submissions: vec![work.list.take_submission()],
                signals: Vec::new(),
                fence: Some((work.fence.clone(), value)),
            })?;
            self.imp.wait_fences(&[(&work.fence, value)], crate::TIMEOUT_MAX)
        })?;
        work.value = value;
        Ok(())
    }

    pub fn destroy_resource(&self, resource: Resource) -> Result<()> {
        require!(
            resource.device.id == self.shared.id,
            Error::InvalidUsage,
            "resource was created by a different device"
        );
        drop(resource);
        Ok(())
    }

    /// Creates a swapchain on `desc.surface`.
    ///
    /// Requires [AdapterExtension::Swapchain].  Every field of `desc` must lie within the
    /// surface's capabilities.
    pub fn create_swapchain_ext(&self, desc: &SwapchainDescExt<'_>) -> Result<SwapchainExt> {
        require!(
            self.extensions.contains(&AdapterExtension::Swapchain),
            Error::ExtensionNotEnabled,
            "the device was created without the Swapchain extension"
        );
        require!(
            desc.surface.instance_id() == self.instance_id(),
            Error::InvalidUsage,
            "desc.surface was created by a different instance"
        );
        let capabilities = self.adapter.query_surface_capabilities_ext(desc.surface)?;
        require!(
            (capabilities.min_texture_count..=capabilities.max_texture_count)
                .contains(&desc.texture_count),
            Error::InvalidUsage,
            "desc.texture_count {} is outside {}..={}",
            desc.texture_count,
            capabilities.min_texture_count,
            capabilities.max_texture_count
        );
        require!(
            desc.extent.within(capabilities.min_extent, capabilities.max_extent),
            Error::InvalidUsage,
            "desc.extent {:?} is outside {:?}..={:?}",
            desc.extent,
            capabilities.min_extent,
            capabilities.max_extent
        );
        require!(
            capabilities.formats.contains(&desc.format),
            Error::InvalidUsage,
            "desc.format {} is not supported by the surface",
            desc.format
        );
        require!(
            capabilities.present_modes.contains(&desc.present_mode),
            Error::InvalidUsage,
            "desc.present_mode {} is not supported by the surface",
            desc.present_mode
        );
        require!(
            !desc.usage.is_empty() && capabilities.usage_bits.contains(desc.usage),
            Error::InvalidUsage,
            "desc.usage {} must be nonempty and within {}",
            desc.usage,
            capabilities.usage_bits
        );
        let info = desc.info();
        let imp = validation::dispatch(self.messenger(), || {
            self.imp.create_swapchain(desc.surface.imp(), &info)
        })?;
        logwise::info_sync!(
            "llri: created swapchain {width}x{height}, {count} textures",
            width = info.extent.width,
            height = info.extent.height,
            count = info.texture_count
        );
        Ok(SwapchainExt::new(self.child(), info, imp))
    }

    pub fn destroy_swapchain_ext(&self, swapchain: SwapchainExt) -> Result<()> {
        require!(
            swapchain.device_id() == self.shared.id,
            Error::InvalidUsage,
            "swapchain was created by a different device"
        );
        drop(swapchain);
        Ok(())
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        let live = self.shared.live_children.load(Ordering::Acquire);
        if live > 0 {
            validation::warning(
                function_name!(),
                &format!("the device was destroyed while {live} objects it created were alive"),
            );
        }
        logwise::info_sync!("llri: device destroyed");
    }
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("id", &self.shared.id)
            .field("adapter", &self.adapter)
            .field("extensions", &self.extensions)
            .finish_non_exhaustive()
    }
}
