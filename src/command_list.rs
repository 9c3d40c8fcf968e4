// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Command lists.

A list moves through three states:

```text
Empty --begin--> Recording --end--> Ready
  ^                                   |
  +-------- CommandGroup::reset ------+
```

Only one list of a [crate::CommandGroup] may be recording at a time.
*/

use std::sync::Arc;

use wasm_safe_mutex::Mutex;

use crate::command_group::GroupShared;
use crate::imp::{self, Barrier};
use crate::queue::QueueType;
use crate::resource::state_legal_for;
use crate::resource_barrier::ResourceBarrier;
use crate::validation;
use crate::{Error, Result};

closed_enum! {
    /// How a command list is executed.
    pub enum CommandListUsage {
        /// Submitted to a queue.
        Direct = 0,
        /// Executed from another command list.
        Indirect = 1,
    }
}

closed_enum! {
    /// Where a command list is in its lifecycle.
    pub enum CommandListState {
        Empty = 0,
        Recording = 1,
        Ready = 2,
    }
}

/// Describes command lists to allocate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandListAllocDesc {
    /// The single node the lists record for.  `0` reads as node 0.
    pub node_mask: u32,
    pub usage: CommandListUsage,
}

impl Default for CommandListAllocDesc {
    fn default() -> Self {
        CommandListAllocDesc {
            node_mask: 0,
            usage: CommandListUsage::Direct,
        }
    }
}

/// Options for [CommandList::begin].  Reserved; nothing is configurable yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CommandListBeginDesc {}

pub(crate) struct ListInner {
    pub(crate) state: CommandListState,
    pub(crate) imp: imp::CommandList,
}

/// The part of a list its group also sees.
pub(crate) struct ListSlot {
    pub(crate) id: u64,
    pub(crate) desc: CommandListAllocDesc,
    pub(crate) inner: Mutex<ListInner>,
}

/// A sequence of recorded GPU commands.
///
/// Allocated by [crate::CommandGroup::allocate].  If its group is destroyed first, every
/// operation reports [Error::InvalidState].
pub struct CommandList {
    group: Arc<GroupShared>,
    slot: Arc<ListSlot>,
}

impl CommandList {
    pub(crate) fn new(group: Arc<GroupShared>, slot: Arc<ListSlot>) -> Self {
        CommandList { group, slot }
    }

    pub(crate) fn group_id(&self) -> u64 {
        self.group.id
    }

    pub(crate) fn device_id(&self) -> u64 {
        self.group.device.id
    }

    pub(crate) fn queue_type(&self) -> QueueType {
        self.group.ty
    }

    /// The recorded commands, ready to hand to a queue.
    pub(crate) fn submission(&self) -> imp::Submission {
        self.slot.inner.lock_sync().imp.take_submission()
    }

    pub fn query_state(&self) -> CommandListState {
        self.slot.inner.lock_sync().state
    }

    /// The descriptor this list was allocated with.
    pub fn get_desc(&self) -> CommandListAllocDesc {
        self.slot.desc
    }

    /// Starts recording.  The list must be [CommandListState::Empty].
    ///
    /// Fails with [Error::Occupied] while another list of the same group is recording.
    pub fn begin(&self, _desc: &CommandListBeginDesc) -> Result<()> {
        require!(
            self.group.is_alive(),
            Error::InvalidState,
            "the command group of this list was destroyed"
        );
        let mut inner = self.slot.inner.lock_sync();
        require!(
            inner.state == CommandListState::Empty,
            Error::InvalidState,
            "the list is {} but must be Empty",
            inner.state
        );
        let mut recording = self.group.recording.lock_sync();
        require!(
            recording.is_none(),
            Error::Occupied,
            "another command list of the same group is recording"
        );
        validation::dispatch(&self.group.device.instance.messenger, || inner.imp.begin())?;
        inner.state = CommandListState::Recording;
        *recording = Some(self.slot.id);
        Ok(())
    }

    /// Finishes recording.  The list must be [CommandListState::Recording].
    pub fn end(&self) -> Result<()> {
        require!(
            self.group.is_alive(),
            Error::InvalidState,
            "the command group of this list was destroyed"
        );
        let mut inner = self.slot.inner.lock_sync();
        require!(
            inner.state == CommandListState::Recording,
            Error::InvalidState,
            "the list is {} but must be Recording",
            inner.state
        );
        validation::dispatch(&self.group.device.instance.messenger, || inner.imp.end())?;
        inner.state = CommandListState::Ready;
        let mut recording = self.group.recording.lock_sync();
        if *recording == Some(self.slot.id) {
            *recording = None;
        }
        Ok(())
    }

    /// Begins, runs `commands` and ends.
    ///
    /// The list is ended even when `commands` fails; the first error is returned.
    pub fn record<F>(&self, desc: &CommandListBeginDesc, commands: F) -> Result<()>
    where
        F: FnOnce(&CommandList) -> Result<()>,
    {
        self.begin(desc)?;
        let recorded = commands(self);
        let ended = self.end();
        recorded.and(ended)
    }

    pub fn resource_barrier(&self, barrier: &ResourceBarrier<'_>) -> Result<()> {
        self.resource_barriers(std::slice::from_ref(barrier))
    }

    /// Records barriers.  The list must be [CommandListState::Recording].
    pub fn resource_barriers(&self, barriers: &[ResourceBarrier<'_>]) -> Result<()> {
        require!(
            self.group.is_alive(),
            Error::InvalidState,
            "the command group of this list was destroyed"
        );
        let mut inner = self.slot.inner.lock_sync();
        require!(
            inner.state == CommandListState::Recording,
            Error::InvalidState,
            "the list is {} but must be Recording",
            inner.state
        );
        require!(
            !barriers.is_empty(),
            Error::InvalidUsage,
            "barriers is empty"
        );
        if cfg!(not(feature = "disable_validation")) {
            for (i, barrier) in barriers.iter().enumerate() {
                if let Err((error, reason)) = self.check_barrier(barrier) {
                    return Err(validation::violation(
                        function_name!(),
                        error,
                        &format!("barriers[{i}]: {reason}"),
                    ));
                }
            }
        }
        let lowered: Vec<Barrier<'_>> = barriers
            .iter()
            .map(|barrier| match *barrier {
                ResourceBarrier::ReadWrite { resource } => Barrier::ReadWrite {
                    resource: &resource.imp,
                },
                ResourceBarrier::Transition {
                    resource,
                    old_state,
                    new_state,
                    range,
                } => Barrier::Transition {
                    resource: &resource.imp,
                    old_state: Some(old_state),
                    new_state,
                    range: range.resolve(&resource.desc),
                },
            })
            .collect();
        validation::dispatch(&self.group.device.instance.messenger, || {
            inner.imp.resource_barriers(&lowered)
        })?;
        Ok(())
    }

    fn check_barrier(&self, barrier: &ResourceBarrier<'_>) -> std::result::Result<(), (Error, String)> {
        let resource = barrier.resource();
        if resource.device.id != self.device_id() {
            return Err((
                Error::InvalidUsage,
                "the resource was created by a different device".to_string(),
            ));
        }
        match *barrier {
            ResourceBarrier::Transition {
                old_state,
                new_state,
                range,
                ..
            } => {
                if old_state == new_state {
                    return Err((
                        Error::InvalidUsage,
                        format!("old_state and new_state are both {new_state}"),
                    ));
                }
                if !state_legal_for(new_state, &resource.desc) {
                    return Err((
                        Error::InvalidState,
                        format!(
                            "a {} created with usage {} can't enter {new_state}",
                            resource.desc.resource_type, resource.desc.usage
                        ),
                    ));
                }
                if resource.desc.resource_type.is_texture() && !range.in_bounds_of(&resource.desc) {
                    return Err((
                        Error::InvalidUsage,
                        format!(
                            "range {range:?} exceeds the texture's {} mip levels and {} array layers",
                            resource.desc.mip_levels,
                            resource.desc.array_layers()
                        ),
                    ));
                }
            }
            ResourceBarrier::ReadWrite { .. } => {
                if !resource
                    .desc
                    .usage
                    .contains(crate::ResourceUsageFlagBits::ShaderWrite)
                {
                    return Err((
                        Error::InvalidState,
                        "read/write barriers require a resource created with ShaderWrite"
                            .to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

impl Drop for CommandList {
    fn drop(&mut self) {
        self.group.forget(self.slot.id);
    }
}

impl std::fmt::Debug for CommandList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandList")
            .field("id", &self.slot.id)
            .field("desc", &self.slot.desc)
            .field("state", &self.query_state())
            .finish()
    }
}
