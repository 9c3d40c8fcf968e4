// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Host-side counters advanced by queue completion callbacks.

use std::sync::Arc;
use std::time::{Duration, Instant};

use wasm_safe_mutex::Mutex;
use wasm_safe_mutex::condvar::Condvar;

#[derive(Debug)]
pub(crate) struct Counter {
    value: Mutex<u64>,
    changed: Condvar,
}

impl Counter {
    fn new() -> Self {
        Counter {
            value: Mutex::new(0),
            changed: Condvar::new(),
        }
    }

    pub(crate) fn get(&self) -> u64 {
        *self.value.lock_sync()
    }

    pub(crate) fn signal(&self, value: u64) {
        let mut current = self.value.lock_sync();
        *current = (*current).max(value);
        drop(current);
        self.changed.notify_all();
    }

    /// Waits at most `slice` for the counter to reach `target`.
    pub(crate) fn wait_for(&self, target: u64, slice: Duration) -> bool {
        let current = self.value.lock_sync();
        let (current, _) =
            self.changed
                .wait_sync_timeout_while(current, Instant::now() + slice, |value| *value < target);
        *current >= target
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Fence(pub(crate) Arc<Counter>);

impl Fence {
    pub(crate) fn new() -> Self {
        Fence(Arc::new(Counter::new()))
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Semaphore(pub(crate) Arc<Counter>);

impl Semaphore {
    pub(crate) fn new() -> Self {
        Semaphore(Arc::new(Counter::new()))
    }
}

/// Waits for every fence, calling `poll` between slices so completion callbacks can run.
pub(crate) fn wait_all(
    fences: &[(&Fence, u64)],
    deadline: Option<Instant>,
    slice: Duration,
    mut poll: impl FnMut(),
) -> bool {
    for (fence, target) in fences {
        loop {
            poll();
            let slice = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        if fence.0.get() >= *target {
                            break;
                        }
                        return false;
                    }
                    (deadline - now).min(slice)
                }
                None => slice,
            };
            if fence.0.wait_for(*target, slice) {
                break;
            }
        }
    }
    true
}
