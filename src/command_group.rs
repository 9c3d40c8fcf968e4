// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Command groups: single-threaded allocators of command lists.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use wasm_safe_mutex::Mutex;

use crate::bittricks;
use crate::command_list::{
    CommandList, CommandListAllocDesc, CommandListState, ListInner, ListSlot,
};
use crate::device::DeviceRef;
use crate::imp;
use crate::queue::QueueType;
use crate::validation;
use crate::{Error, Result};

pub(crate) struct GroupShared {
    pub(crate) id: u64,
    pub(crate) device: DeviceRef,
    pub(crate) ty: QueueType,
    imp: imp::CommandGroup,
    alive: AtomicBool,
    /// The list currently recording, if any.
    pub(crate) recording: Mutex<Option<u64>>,
    lists: Mutex<Vec<Arc<ListSlot>>>,
}

impl GroupShared {
    pub(crate) fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Called when a list is dropped.
    pub(crate) fn forget(&self, list: u64) {
        self.lists.lock_sync().retain(|slot| slot.id != list);
        let mut recording = self.recording.lock_sync();
        if *recording == Some(list) {
            *recording = None;
        }
    }
}

/// Allocates command lists for one queue type and resets them together.
///
/// A group and its lists must be used from one thread at a time.  Record on several
/// threads by giving each its own group.
pub struct CommandGroup {
    shared: Arc<GroupShared>,
}

impl CommandGroup {
    pub(crate) fn new(device: DeviceRef, ty: QueueType, imp: imp::CommandGroup) -> Self {
        CommandGroup {
            shared: Arc::new(GroupShared {
                id: crate::unique_id(),
                device,
                ty,
                imp,
                alive: AtomicBool::new(true),
                recording: Mutex::new(None),
                lists: Mutex::new(Vec::new()),
            }),
        }
    }

    pub(crate) fn device_id(&self) -> u64 {
        self.shared.device.id
    }

    /// The queue type the group's lists are submitted to.
    pub fn get_type(&self) -> QueueType {
        self.shared.ty
    }

    /// Returns every list of the group to [CommandListState::Empty].
    ///
    /// Fails with [Error::InvalidState], changing nothing, while any list is recording.
    pub fn reset(&self) -> Result<()> {
        require!(
            self.shared.recording.lock_sync().is_none(),
            Error::InvalidState,
            "a command list of this group is recording"
        );
        validation::dispatch(&self.shared.device.instance.messenger, || {
            self.shared.imp.reset()
        })?;
        for slot in self.shared.lists.lock_sync().iter() {
            let mut inner = slot.inner.lock_sync();
            inner.imp.reset();
            inner.state = CommandListState::Empty;
        }
        logwise::trace_sync!("llri: command group {id} reset", id = self.shared.id);
        Ok(())
    }

    fn check_alloc_desc(&self, desc: &CommandListAllocDesc) -> Result<()> {
        let mask = bittricks::normalize(desc.node_mask);
        let nodes = self.shared.device.node_count;
        require!(
            bittricks::has_single_bit(mask),
            Error::InvalidNodeMask,
            "desc.node_mask {:#x} must have exactly one bit set",
            desc.node_mask
        );
        require!(
            bittricks::fits_nodes(mask, nodes),
            Error::InvalidNodeMask,
            "desc.node_mask {:#x} names a node beyond the device's {nodes}",
            desc.node_mask
        );
        Ok(())
    }

    fn allocate_unchecked(&self, desc: &CommandListAllocDesc) -> Result<CommandList> {
        let mask = bittricks::normalize(desc.node_mask);
        let imp = validation::dispatch(&self.shared.device.instance.messenger, || {
            self.shared.imp.allocate(mask, desc.usage)
        })?;
        let slot = Arc::new(ListSlot {
            id: crate::unique_id(),
            desc: *desc,
            inner: Mutex::new(ListInner {
                state: CommandListState::Empty,
                imp,
            }),
        });
        self.shared.lists.lock_sync().push(slot.clone());
        Ok(CommandList::new(self.shared.clone(), slot))
    }

    /// Allocates one list.
    pub fn allocate(&self, desc: &CommandListAllocDesc) -> Result<CommandList> {
        self.check_alloc_desc(desc)?;
        self.allocate_unchecked(desc)
    }

    /// Allocates `count` lists into `lists`, which is cleared first.
    ///
    /// Either every list is allocated or none is.
    pub fn allocate_many(
        &self,
        desc: &CommandListAllocDesc,
        count: u8,
        lists: &mut Vec<CommandList>,
    ) -> Result<()> {
        lists.clear();
        require!(count > 0, Error::InvalidUsage, "count is 0");
        self.check_alloc_desc(desc)?;
        for _ in 0..count {
            match self.allocate_unchecked(desc) {
                Ok(list) => lists.push(list),
                Err(e) => {
                    lists.clear();
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    fn check_free(&self, list: &CommandList) -> std::result::Result<(), (Error, &'static str)> {
        if list.group_id() != self.shared.id {
            return Err((Error::InvalidUsage, "was allocated by a different command group"));
        }
        if list.query_state() == CommandListState::Recording {
            return Err((Error::InvalidState, "is recording"));
        }
        Ok(())
    }

    /// Returns a list to the group.
    ///
    /// A rejected list is handed back with the error, still owned by its group and in the
    /// state it was in.
    pub fn free(&self, list: CommandList) -> std::result::Result<(), (Error, CommandList)> {
        if cfg!(not(feature = "disable_validation")) {
            if let Err((error, reason)) = self.check_free(&list) {
                let error =
                    validation::violation(function_name!(), error, &format!("the list {reason}"));
                return Err((error, list));
            }
        }
        drop(list);
        Ok(())
    }

    /// Returns several lists to the group.
    ///
    /// Nothing is freed unless every list may be; on failure all of `lists` is handed back.
    pub fn free_many(
        &self,
        lists: Vec<CommandList>,
    ) -> std::result::Result<(), (Error, Vec<CommandList>)> {
        if cfg!(not(feature = "disable_validation")) {
            if lists.is_empty() {
                let error =
                    validation::violation(function_name!(), Error::InvalidUsage, "lists is empty");
                return Err((error, lists));
            }
            let rejected = lists
                .iter()
                .enumerate()
                .find_map(|(i, list)| self.check_free(list).err().map(|e| (i, e)));
            if let Some((i, (error, reason))) = rejected {
                let error =
                    validation::violation(function_name!(), error, &format!("lists[{i}] {reason}"));
                return Err((error, lists));
            }
        }
        drop(lists);
        Ok(())
    }
}

impl Drop for CommandGroup {
    fn drop(&mut self) {
        self.shared.alive.store(false, Ordering::Release);
        let mut lists = self.shared.lists.lock_sync();
        for slot in lists.iter() {
            let mut inner = slot.inner.lock_sync();
            inner.imp.reset();
            inner.state = CommandListState::Empty;
        }
        lists.clear();
        *self.shared.recording.lock_sync() = None;
    }
}

impl std::fmt::Debug for CommandGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandGroup")
            .field("id", &self.shared.id)
            .field("type", &self.shared.ty)
            .field("lists", &self.shared.lists.lock_sync().len())
            .finish()
    }
}
