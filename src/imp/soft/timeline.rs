// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
The emulated GPU timeline.

Every queue handle owns a worker thread that executes batches in submission order.
Fences and semaphores are monotonic counters; waiting blocks on a condition variable until
the counter reaches the requested value.
*/

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use wasm_safe_mutex::Mutex;
use wasm_safe_mutex::condvar::Condvar;

use crate::callback::Messenger;
use crate::imp::Batch;
use crate::imp::soft::Error;
use crate::imp::soft::command::Command;

/// How often a blocked worker rechecks for shutdown.
const SHUTDOWN_SLICE: Duration = Duration::from_millis(20);

#[derive(Debug)]
pub(crate) struct TimelineValue {
    value: Mutex<u64>,
    changed: Condvar,
}

impl TimelineValue {
    fn new() -> Self {
        TimelineValue {
            value: Mutex::new(0),
            changed: Condvar::new(),
        }
    }

    pub(crate) fn get(&self) -> u64 {
        *self.value.lock_sync()
    }

    /// Counters never move backwards.
    pub(crate) fn signal(&self, value: u64) {
        let mut current = self.value.lock_sync();
        if value > *current {
            *current = value;
        }
        drop(current);
        self.changed.notify_all();
    }

    /// Blocks until the counter reaches `target`.  Gives up at `deadline`, or when
    /// `shutdown` is raised.  Returns whether the target was reached.
    pub(crate) fn wait_until(
        &self,
        target: u64,
        deadline: Option<Instant>,
        shutdown: Option<&AtomicBool>,
    ) -> bool {
        let mut current = self.value.lock_sync();
        while *current < target {
            if shutdown.is_some_and(|s| s.load(Ordering::Relaxed)) {
                return false;
            }
            let slice_end = Instant::now() + SHUTDOWN_SLICE;
            let wake = match deadline {
                Some(deadline) if Instant::now() >= deadline => return false,
                Some(deadline) => deadline.min(slice_end),
                None => slice_end,
            };
            current = self
                .changed
                .wait_sync_timeout_while(current, wake, |value| *value < target)
                .0;
        }
        true
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Fence(pub(crate) Arc<TimelineValue>);

impl Fence {
    pub(crate) fn new() -> Self {
        Fence(Arc::new(TimelineValue::new()))
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Semaphore(pub(crate) Arc<TimelineValue>);

impl Semaphore {
    pub(crate) fn new() -> Self {
        Semaphore(Arc::new(TimelineValue::new()))
    }
}

enum Packet {
    Batch(Batch),
}

/// Everything a worker needs to execute commands.
pub(crate) struct ExecutionContext {
    pub(crate) messenger: Arc<Messenger>,
    /// Report layout mismatches.
    pub(crate) validate: bool,
}

#[derive(Debug)]
struct Worker {
    sender: Option<Sender<Packet>>,
    shutdown: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        //closing the channel ends the worker loop
        self.sender.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                logwise::error_sync!("software queue worker panicked");
            }
        }
    }
}

/// One per-node queue handle.
#[derive(Debug, Clone)]
pub(crate) struct Queue {
    worker: Arc<Worker>,
}

impl Queue {
    pub(crate) fn spawn(label: String, context: ExecutionContext) -> Result<Self, Error> {
        let (sender, receiver) = mpsc::channel();
        let shutdown = Arc::new(AtomicBool::new(false));
        let thread_shutdown = shutdown.clone();
        let prior_context = logwise::context::Context::current();
        let thread = thread::Builder::new().name(label).spawn(move || {
            let c = logwise::context::Context::new_task(Some(prior_context), "llri queue".to_string());
            let id = c.context_id();
            c.set_current();
            run(receiver, &context, &thread_shutdown);
            logwise::context::Context::pop(id);
        })?;
        Ok(Queue {
            worker: Arc::new(Worker {
                sender: Some(sender),
                shutdown,
                thread: Some(thread),
            }),
        })
    }

    pub(crate) fn submit(&self, batch: Batch) -> Result<(), Error> {
        let sender = self.worker.sender.as_ref().ok_or(Error::QueueDisconnected)?;
        sender
            .send(Packet::Batch(batch))
            .map_err(|_| Error::QueueDisconnected)
    }

    /// Signals `fence` to `value` once all earlier work on this queue has completed.
    pub(crate) fn signal_fence(&self, fence: &Fence, value: u64) -> Result<(), Error> {
        self.submit(Batch {
            waits: Vec::new(),
            submissions: Vec::new(),
            signals: Vec::new(),
            fence: Some((fence.clone(), value)),
        })
    }
}

fn run(receiver: Receiver<Packet>, context: &ExecutionContext, shutdown: &AtomicBool) {
    for packet in receiver {
        match packet {
            Packet::Batch(batch) => {
                if !execute(batch, context, shutdown) {
                    logwise::trace_sync!("software queue abandoned a batch at shutdown");
                    return;
                }
            }
        }
    }
}

/// Returns false if shutdown interrupted a wait.
fn execute(batch: Batch, context: &ExecutionContext, shutdown: &AtomicBool) -> bool {
    logwise::trace_sync!(
        "software queue executing {lists} lists, {waits} waits, {signals} signals",
        lists = batch.submissions.len(),
        waits = batch.waits.len(),
        signals = batch.signals.len()
    );
    for (semaphore, value) in &batch.waits {
        if !semaphore.0.wait_until(*value, None, Some(shutdown)) {
            return false;
        }
    }
    for submission in &batch.submissions {
        for command in &submission.commands {
            match command {
                Command::PipelineBarrier(barrier) => barrier.execute(context),
            }
        }
    }
    for (semaphore, value) in &batch.signals {
        semaphore.0.signal(*value);
    }
    if let Some((fence, value)) = &batch.fence {
        fence.0.signal(*value);
    }
    true
}

/// Waits for every fence to reach its value.  Returns whether all did before the timeout.
pub(crate) fn wait_all(fences: &[(&Fence, u64)], timeout_ms: u32) -> bool {
    let deadline = if timeout_ms == crate::TIMEOUT_MAX {
        None
    } else {
        Some(Instant::now() + Duration::from_millis(timeout_ms as u64))
    };
    fences
        .iter()
        .all(|(fence, value)| fence.0.wait_until(*value, deadline, None))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> ExecutionContext {
        ExecutionContext {
            messenger: Messenger::new(),
            validate: true,
        }
    }

    #[test]
    fn counters_are_monotonic() {
        let t = TimelineValue::new();
        t.signal(3);
        t.signal(2);
        assert_eq!(t.get(), 3);
        assert!(t.wait_until(3, Some(Instant::now()), None));
        assert!(!t.wait_until(4, Some(Instant::now()), None));
    }

    #[test]
    fn batches_execute_in_order() {
        let queue = Queue::spawn("test queue".to_string(), context()).unwrap();
        let fence = Fence::new();
        for value in 1..=5 {
            queue.signal_fence(&fence, value).unwrap();
        }
        assert!(wait_all(&[(&fence, 5)], crate::TIMEOUT_MAX));
        assert_eq!(fence.0.get(), 5);
    }

    #[test]
    fn waits_block_until_signaled() {
        let waiter = Queue::spawn("waiter".to_string(), context()).unwrap();
        let signaler = Queue::spawn("signaler".to_string(), context()).unwrap();
        let semaphore = Semaphore::new();
        let fence = Fence::new();
        waiter
            .submit(Batch {
                waits: vec![(semaphore.clone(), 1)],
                submissions: Vec::new(),
                signals: Vec::new(),
                fence: Some((fence.clone(), 1)),
            })
            .unwrap();
        assert!(!wait_all(&[(&fence, 1)], 50));
        signaler
            .submit(Batch {
                waits: Vec::new(),
                submissions: Vec::new(),
                signals: vec![(semaphore.clone(), 1)],
                fence: None,
            })
            .unwrap();
        assert!(wait_all(&[(&fence, 1)], crate::TIMEOUT_MAX));
    }

    #[test]
    fn drop_with_pending_wait_does_not_hang() {
        let queue = Queue::spawn("abandoned".to_string(), context()).unwrap();
        queue
            .submit(Batch {
                waits: vec![(Semaphore::new(), 1)],
                submissions: Vec::new(),
                signals: Vec::new(),
                fence: None,
            })
            .unwrap();
        drop(queue);
    }
}
