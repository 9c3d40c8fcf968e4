// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Resource barriers.

use crate::resource::{Resource, ResourceState, TextureSubresourceRange};

closed_enum! {
    /// The kind of a [ResourceBarrier].
    pub enum ResourceBarrierType {
        /// Orders shader reads and writes of a resource against each other.
        ReadWrite = 0,
        /// Moves a resource, or part of a texture, from one state to another.
        Transition = 1,
    }
}

/// A synchronization point recorded with [crate::CommandList::resource_barrier].
#[derive(Debug, Clone, Copy)]
pub enum ResourceBarrier<'a> {
    /// Every prior shader write to `resource` completes before any later shader access.
    /// The resource must allow `ShaderWrite`.
    ReadWrite { resource: &'a Resource },
    /// `resource` leaves `old_state` and enters `new_state`.
    Transition {
        resource: &'a Resource,
        old_state: ResourceState,
        new_state: ResourceState,
        /// Ignored for buffers.
        range: TextureSubresourceRange,
    },
}

impl<'a> ResourceBarrier<'a> {
    pub fn read_write(resource: &'a Resource) -> Self {
        ResourceBarrier::ReadWrite { resource }
    }

    /// A transition of every subresource.
    pub fn transition(
        resource: &'a Resource,
        old_state: ResourceState,
        new_state: ResourceState,
    ) -> Self {
        Self::transition_range(resource, old_state, new_state, TextureSubresourceRange::ALL)
    }

    pub fn transition_range(
        resource: &'a Resource,
        old_state: ResourceState,
        new_state: ResourceState,
        range: TextureSubresourceRange,
    ) -> Self {
        ResourceBarrier::Transition {
            resource,
            old_state,
            new_state,
            range,
        }
    }

    pub fn barrier_type(&self) -> ResourceBarrierType {
        match self {
            ResourceBarrier::ReadWrite { .. } => ResourceBarrierType::ReadWrite,
            ResourceBarrier::Transition { .. } => ResourceBarrierType::Transition,
        }
    }

    pub fn resource(&self) -> &'a Resource {
        match *self {
            ResourceBarrier::ReadWrite { resource } => resource,
            ResourceBarrier::Transition { resource, .. } => resource,
        }
    }
}
