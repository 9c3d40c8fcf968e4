/*! llri is a low-level rendering interface: a thin, uniform, validated frontend over
a GPU backend chosen at build time.

Applications express GPU work (device enumeration, command recording, resource creation,
synchronization, presentation) against one API surface, and every call is routed to the
backend that was linked into the build.  [query_implementation] reports which one that is;
callers never conditionally compile against backend symbols.

# Object model

Ownership is strictly tree-shaped:

| Owner        | Owns                                                                     |
|--------------|--------------------------------------------------------------------------|
| [Instance]   | the [Adapter] cache, every [Device], every [SurfaceExt]                  |
| [Device]     | [Queue]s, [CommandGroup]s, [Fence]s, [Semaphore]s, [Resource]s, [SwapchainExt]s |
| [CommandGroup] | its [CommandList]s                                                     |

Handles are ordinary Rust values.  Release them through their owner's `destroy_*` function,
or simply drop them.  Children keep their owner's shared state alive, so a backend object is
never torn down underneath a child; destroying an owner early is reported through the
message callback instead.

# Validation

Every operation checks its arguments before the backend sees them.  A failing check
returns an [Error] and reports a message with [MessageSeverity::Error] and
[MessageSource::Api] through the callback registered with [set_user_callback].
After each backend call, diagnostics produced by the backend's own validation layers are
forwarded through the same callback with [MessageSource::Implementation].

Both halves can be compiled out:

* `disable_validation` removes the pre-dispatch checks.
* `disable_implementation_message_polling` removes the post-dispatch forwarding.

# Backends

| Feature        | Backend                                                               |
|----------------|-----------------------------------------------------------------------|
| *(default)*    | [Implementation::Software], a host-emulated reference driver          |
| `backend_wgpu` | [Implementation::Wgpu], built on [wgpu](https://wgpu.rs)              |

The software backend needs no GPU.  It runs every queue as a worker thread, tracks texture
layouts per subresource and accounts device memory, which makes it the default for tests
and headless tooling.

# Example

```
# #[cfg(not(feature = "backend_wgpu"))]
# fn main() -> llri::Result<()> {
let instance = llri::create_instance(&llri::InstanceDesc::default())?;
let mut adapters = Vec::new();
instance.enumerate_adapters(&mut adapters)?;

let queues = [llri::QueueDesc::new(llri::QueueType::Graphics, llri::QueuePriority::Normal)];
let device = instance.create_device(&llri::DeviceDesc::new(&adapters[0], &queues))?;
let queue = device.get_queue(llri::QueueType::Graphics, 0).expect("graphics queue");

let group = device.create_command_group(llri::QueueType::Graphics)?;
let list = group.allocate(&llri::CommandListAllocDesc::default())?;
list.record(&llri::CommandListBeginDesc::default(), |_list| Ok(()))?;

let fence = device.create_fence(llri::FenceFlags::empty())?;
queue.submit(&llri::SubmitDesc::new(&[&list]).with_fence(&fence))?;
device.wait_fence(&fence, llri::TIMEOUT_MAX)?;
# Ok(())
# }
# #[cfg(feature = "backend_wgpu")]
# fn main() {}
```
*/

#[macro_use]
mod validation;
#[macro_use]
mod enumeration;
#[macro_use]
pub mod flags;

mod adapter;
mod bittricks;
mod callback;
mod command_group;
mod command_list;
mod device;
mod fence;
mod format;
mod imp;
mod instance;
mod math;
mod owner;
mod queue;
mod resource;
mod resource_barrier;
mod result;
mod semaphore;
mod surface;
mod swapchain;

use std::sync::atomic::{AtomicU64, Ordering};

pub use adapter::{
    Adapter, AdapterExtension, AdapterFeatures, AdapterInfo, AdapterLimits, AdapterType,
    FormatProperties,
};
pub use callback::{MessageSeverity, MessageSource, clear_user_callback, set_user_callback};
pub use command_group::CommandGroup;
pub use command_list::{
    CommandList, CommandListAllocDesc, CommandListBeginDesc, CommandListState, CommandListUsage,
};
pub use device::{Device, DeviceDesc};
pub use fence::{Fence, FenceFlagBits, FenceFlags};
pub use flags::{FlagBits, Flags};
pub use format::Format;
pub use instance::{
    Instance, InstanceDesc, InstanceExtension, create_instance, destroy_instance,
    query_instance_extension_support,
};
pub use math::{Extent2D, Offset2D};
pub use queue::{Queue, QueueDesc, QueuePriority, QueueType, SubmitDesc};
pub use resource::{
    MemoryType, Resource, ResourceDesc, ResourceState, ResourceType, ResourceUsageFlagBits,
    ResourceUsageFlags, SampleCount, TextureSubresourceRange,
};
pub use resource_barrier::{ResourceBarrier, ResourceBarrierType};
pub use result::{Error, ErrorCategory, Result};
pub use semaphore::Semaphore;
pub use surface::{SurfaceDescExt, SurfaceExt, SurfacePlatformExt};
pub use swapchain::{
    PresentModeExt, SurfaceCapabilitiesExt, SwapchainDescExt, SwapchainExt, SwapchainInfoExt,
};

/// Passing this as a timeout polls: the wait returns immediately.
pub const TIMEOUT_MIN: u32 = 0;
/// Passing this as a timeout waits until the condition is met, however long that takes.
pub const TIMEOUT_MAX: u32 = 0xFFFF_FFFF;

closed_enum! {
    /// The backend linked into this build.
    pub enum Implementation {
        /// Host-emulated reference driver.  Selected when no backend feature is enabled.
        Software = 0,
        /// [wgpu](https://wgpu.rs), selected by the `backend_wgpu` feature.
        Wgpu = 1,
    }
}

/// Reports which backend this build routes calls to.
pub fn query_implementation() -> Implementation {
    imp::IMPLEMENTATION
}

/// Process-unique id used for owner back-references.
pub(crate) fn unique_id() -> u64 {
    static NEXT: AtomicU64 = AtomicU64::new(1);
    NEXT.fetch_add(1, Ordering::Relaxed)
}
