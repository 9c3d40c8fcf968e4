// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Host-emulated reference backend.

Queues are worker threads that execute submissions in order, semaphores and fences are
counters guarded by a condition variable, and texture layouts are tracked per subresource.
No GPU is needed, which makes this backend deterministic enough to test the frontend
against.
*/

mod command;
mod device;
mod error;
mod instance;
mod profile;
mod resource;
mod surface;
mod timeline;

pub(crate) use command::{CommandGroup, CommandList, Submission};
pub(crate) use device::Device;
pub(crate) use error::Error;
pub(crate) use instance::{Adapter, Instance};
pub(crate) use resource::Resource;
pub(crate) use surface::{Surface, Swapchain};
pub(crate) use timeline::{Fence, Queue, Semaphore};

use crate::Implementation;
use crate::instance::InstanceExtension;

pub(crate) const IMPLEMENTATION: Implementation = Implementation::Software;

/// Every instance extension is emulated.
pub(crate) fn query_instance_extension_support(_extension: InstanceExtension) -> bool {
    true
}
