// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
The wgpu backend.

wgpu exposes one queue per device and tracks resource state itself, so this backend is thin:

* every llri queue multiplexes onto the single `wgpu::Queue`, whose submission order
  subsumes semaphore ordering;
* barriers are recorded for diagnostics only and left to wgpu's state tracking;
* fences and semaphores are host-side counters advanced from
  `Queue::on_submitted_work_done`, with a poll thread driving the callbacks.

Adapters are never linked, so every adapter has a single node.
*/

mod command;
mod device;
mod error;
mod format;
mod instance;
mod resource;
mod surface;
mod sync;

pub(crate) use command::{CommandGroup, CommandList, Submission};
pub(crate) use device::{Device, Queue};
pub(crate) use error::Error;
pub(crate) use instance::{Adapter, Instance};
pub(crate) use resource::Resource;
pub(crate) use surface::{Surface, Swapchain};
pub(crate) use sync::{Fence, Semaphore};

use crate::Implementation;
use crate::instance::InstanceExtension;

pub(crate) const IMPLEMENTATION: Implementation = Implementation::Wgpu;

/// Validation maps onto wgpu's instance flags; surfaces onto the platforms wgpu targets here.
pub(crate) fn query_instance_extension_support(extension: InstanceExtension) -> bool {
    match extension {
        InstanceExtension::DriverValidation | InstanceExtension::GpuValidation => true,
        InstanceExtension::SurfaceWin32 => cfg!(target_os = "windows"),
        InstanceExtension::SurfaceCocoa => cfg!(target_os = "macos"),
        InstanceExtension::SurfaceXlib | InstanceExtension::SurfaceXcb => cfg!(all(
            unix,
            not(target_os = "macos"),
            not(target_os = "ios"),
            not(target_os = "android")
        )),
    }
}
