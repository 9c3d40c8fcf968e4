// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Queues and submission.

Work submitted to one queue executes in submission order.  Work on different queues is only
ordered through [Semaphore]s, and the host only observes completion through a [Fence].

On a linked adapter a queue holds one backend handle per node; the submission's node mask
picks which one receives the work.
*/

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::bittricks;
use crate::callback::Messenger;
use crate::command_list::{CommandList, CommandListState, CommandListUsage};
use crate::fence::Fence;
use crate::imp::{self, Batch};
use crate::semaphore::Semaphore;
use crate::validation;
use crate::{Error, Result};

closed_enum! {
    /// What a queue can execute.  Graphics can do everything Compute can, and Compute
    /// everything Transfer can.
    pub enum QueueType {
        Graphics = 0,
        Compute = 1,
        Transfer = 2,
    }
}

closed_enum! {
    /// A scheduling hint.
    pub enum QueuePriority {
        Normal = 0,
        High = 1,
    }
}

impl QueuePriority {
    /// The backend priority hint.
    pub fn value(self) -> f32 {
        match self {
            QueuePriority::Normal => 0.5,
            QueuePriority::High => 1.0,
        }
    }
}

/// One queue requested by [crate::DeviceDesc].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueueDesc {
    pub ty: QueueType,
    pub priority: QueuePriority,
}

impl QueueDesc {
    pub const fn new(ty: QueueType, priority: QueuePriority) -> Self {
        QueueDesc { ty, priority }
    }
}

/// Describes one submission.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmitDesc<'a> {
    /// The node that executes the work.  `0` reads as node 0.
    pub node_mask: u32,
    /// Executed in order as one batch.  Each must be [CommandListState::Ready].
    pub command_lists: &'a [&'a CommandList],
    /// Waited on before the batch starts.
    pub wait_semaphores: &'a [&'a Semaphore],
    /// Signaled once the batch completes.
    pub signal_semaphores: &'a [&'a Semaphore],
    /// Signaled after the semaphores.
    pub fence: Option<&'a Fence>,
}

impl<'a> SubmitDesc<'a> {
    pub fn new(command_lists: &'a [&'a CommandList]) -> Self {
        SubmitDesc {
            command_lists,
            ..Default::default()
        }
    }

    pub fn with_node_mask(mut self, node_mask: u32) -> Self {
        self.node_mask = node_mask;
        self
    }

    pub fn with_fence(mut self, fence: &'a Fence) -> Self {
        self.fence = Some(fence);
        self
    }

    pub fn with_wait_semaphores(mut self, semaphores: &'a [&'a Semaphore]) -> Self {
        self.wait_semaphores = semaphores;
        self
    }

    pub fn with_signal_semaphores(mut self, semaphores: &'a [&'a Semaphore]) -> Self {
        self.signal_semaphores = semaphores;
        self
    }
}

/// A per-node backend queue, and the fence [Queue::wait_idle] signals on it.
struct Node {
    imp: imp::Queue,
    idle: imp::Fence,
    idle_value: AtomicU64,
}

/// Executes submissions.  Owned by its [crate::Device] and reached through
/// [crate::Device::get_queue].
///
/// Concurrent submits to one queue must be serialized by the caller.
pub struct Queue {
    device_id: u64,
    desc: QueueDesc,
    index: u8,
    nodes: Vec<Node>,
    device: imp::Device,
    messenger: Arc<Messenger>,
}

impl Queue {
    pub(crate) fn new(
        device_id: u64,
        device: &imp::Device,
        messenger: &Arc<Messenger>,
        desc: QueueDesc,
        index: u8,
        node_count: u8,
    ) -> Result<Self> {
        let nodes = (0..node_count)
            .map(|node| {
                Ok(Node {
                    imp: device.create_queue(&desc, index, node)?,
                    idle: device.create_fence()?,
                    idle_value: AtomicU64::new(0),
                })
            })
            .collect::<std::result::Result<Vec<_>, imp::Error>>()?;
        Ok(Queue {
            device_id,
            desc,
            index,
            nodes,
            device: device.clone(),
            messenger: messenger.clone(),
        })
    }

    /// The backend handle on node 0.
    pub(crate) fn primary(&self) -> Option<&imp::Queue> {
        self.nodes.first().map(|node| &node.imp)
    }

    /// The descriptor this queue was created with.
    pub fn get_desc(&self) -> QueueDesc {
        self.desc
    }

    fn check_submit(&self, desc: &SubmitDesc<'_>) -> std::result::Result<(), (Error, String)> {
        let mask = bittricks::normalize(desc.node_mask);
        let nodes = self.nodes.len() as u8;
        if !bittricks::has_single_bit(mask) || !bittricks::fits_nodes(mask, nodes) {
            return Err((
                Error::InvalidNodeMask,
                format!(
                    "desc.node_mask {:#x} must select exactly one of the device's {nodes} nodes",
                    desc.node_mask
                ),
            ));
        }
        if desc.command_lists.is_empty() {
            return Err((Error::InvalidUsage, "desc.command_lists is empty".to_string()));
        }
        for (i, list) in desc.command_lists.iter().enumerate() {
            if list.device_id() != self.device_id {
                return Err((
                    Error::InvalidUsage,
                    format!("desc.command_lists[{i}] was allocated from a different device"),
                ));
            }
            if list.get_desc().usage != CommandListUsage::Direct {
                return Err((
                    Error::InvalidUsage,
                    format!("desc.command_lists[{i}] is not a Direct command list"),
                ));
            }
            let state = list.query_state();
            if state != CommandListState::Ready {
                return Err((
                    Error::InvalidState,
                    format!("desc.command_lists[{i}] is {state} but must be Ready"),
                ));
            }
            if bittricks::normalize(list.get_desc().node_mask) != mask {
                return Err((
                    Error::IncompatibleNodeMask,
                    format!(
                        "desc.command_lists[{i}] was allocated for node mask {:#x}, not {mask:#x}",
                        list.get_desc().node_mask
                    ),
                ));
            }
            if list.queue_type() != self.desc.ty {
                return Err((
                    Error::InvalidUsage,
                    format!(
                        "desc.command_lists[{i}] belongs to a {} group but this is a {} queue",
                        list.queue_type(),
                        self.desc.ty
                    ),
                ));
            }
        }
        let semaphores = desc
            .wait_semaphores
            .iter()
            .map(|s| ("wait_semaphores", s))
            .chain(desc.signal_semaphores.iter().map(|s| ("signal_semaphores", s)));
        for (field, semaphore) in semaphores {
            if semaphore.device_id() != self.device_id {
                return Err((
                    Error::InvalidUsage,
                    format!("a semaphore in desc.{field} was created by a different device"),
                ));
            }
        }
        if let Some(fence) = desc.fence {
            if fence.device_id() != self.device_id {
                return Err((
                    Error::InvalidUsage,
                    "desc.fence was created by a different device".to_string(),
                ));
            }
            if fence.is_signaled() {
                return Err((
                    Error::AlreadySignaled,
                    "desc.fence is already signaled; wait on it first".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Submits command lists, with optional semaphores and a fence.
    pub fn submit(&self, desc: &SubmitDesc<'_>) -> Result<()> {
        if cfg!(not(feature = "disable_validation")) {
            if let Err((error, reason)) = self.check_submit(desc) {
                return Err(validation::violation(function_name!(), error, &reason));
            }
        }
        let node = &self.nodes[bittricks::node_index(desc.node_mask).min(self.nodes.len() - 1)];
        let signals: Vec<(&Semaphore, u64)> = desc
            .signal_semaphores
            .iter()
            .map(|s| (*s, s.current() + 1))
            .collect();
        let fence = desc.fence.map(|f| (f, f.next_value()));
        let batch = Batch {
            waits: desc
                .wait_semaphores
                .iter()
                .map(|s| (s.imp.clone(), s.current()))
                .collect(),
            submissions: desc.command_lists.iter().map(|l| l.submission()).collect(),
            signals: signals.iter().map(|(s, v)| (s.imp.clone(), *v)).collect(),
            fence: fence.map(|(f, v)| (f.imp.clone(), v)),
        };
        logwise::trace_sync!(
            "llri: submit {lists} lists to {ty} queue {index}",
            lists = desc.command_lists.len(),
            ty = logwise::privacy::LogIt(&self.desc.ty),
            index = self.index
        );
        validation::dispatch(&self.messenger, || node.imp.submit(batch))?;
        for (semaphore, value) in signals {
            semaphore.advance_to(value);
        }
        if let Some((fence, value)) = fence {
            fence.arm(value);
        }
        Ok(())
    }

    /// Blocks until all work submitted to this queue, on every node, has completed.
    pub fn wait_idle(&self) -> Result<()> {
        let mut targets = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let value = node.idle_value.fetch_add(1, Ordering::AcqRel) + 1;
            validation::dispatch(&self.messenger, || node.imp.signal_fence(&node.idle, value))?;
            targets.push((&node.idle, value));
        }
        let _interval = logwise::perfwarn_begin!("llri Queue::wait_idle");
        let done = validation::dispatch(&self.messenger, || {
            self.device.wait_fences(&targets, crate::TIMEOUT_MAX)
        })?;
        if done { Ok(()) } else { Err(Error::Timeout) }
    }
}

impl std::fmt::Debug for Queue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Queue")
            .field("desc", &self.desc)
            .field("index", &self.index)
            .field("nodes", &self.nodes.len())
            .finish()
    }
}
