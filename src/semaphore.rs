// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! GPU-side ordering between queues.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::device::DeviceRef;
use crate::imp;

/// Orders work across queues.  Never observed by the host.
///
/// Each signal advances a monotonic counter; a wait blocks the GPU until the counter has
/// reached the value it had when the wait was submitted.
pub struct Semaphore {
    device: DeviceRef,
    pub(crate) imp: imp::Semaphore,
    counter: AtomicU64,
}

impl Semaphore {
    pub(crate) fn new(device: DeviceRef, imp: imp::Semaphore) -> Self {
        Semaphore {
            device,
            imp,
            counter: AtomicU64::new(0),
        }
    }

    pub(crate) fn device_id(&self) -> u64 {
        self.device.id
    }

    pub(crate) fn current(&self) -> u64 {
        self.counter.load(Ordering::Acquire)
    }

    pub(crate) fn advance_to(&self, value: u64) {
        self.counter.fetch_max(value, Ordering::AcqRel);
    }
}

impl std::fmt::Debug for Semaphore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Semaphore")
            .field("counter", &self.current())
            .finish_non_exhaustive()
    }
}
