// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Host-visible, single-shot completion signals.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::device::DeviceRef;
use crate::imp;

flag_bits! {
    /// Options for [crate::Device::create_fence].
    pub enum FenceFlagBits: u8 as FenceFlags {
        /// The fence starts out signaled, so the first wait succeeds immediately.
        Signaled = 1 << 0,
    }
}

/// Signaled by a submission; waited on by the host with [crate::Device::wait_fences].
///
/// A fence is armed by exactly one submission and disarmed by exactly one successful wait.
/// Submitting it again before the wait is [crate::Error::AlreadySignaled]; waiting on it
/// again after the wait is [crate::Error::NotSignaled].
pub struct Fence {
    device: DeviceRef,
    flags: FenceFlags,
    pub(crate) imp: imp::Fence,
    /// The backend value the most recent submission signals.
    counter: AtomicU64,
    signaled: AtomicBool,
}

impl Fence {
    pub(crate) fn new(device: DeviceRef, flags: FenceFlags, imp: imp::Fence) -> Self {
        Fence {
            device,
            flags,
            imp,
            counter: AtomicU64::new(0),
            signaled: AtomicBool::new(flags.contains(FenceFlagBits::Signaled)),
        }
    }

    pub(crate) fn device_id(&self) -> u64 {
        self.device.id
    }

    /// The flags this fence was created with.
    pub fn get_flags(&self) -> FenceFlags {
        self.flags
    }

    /// True between a submission and the wait that consumes it.
    pub fn is_signaled(&self) -> bool {
        self.signaled.load(Ordering::Acquire)
    }

    pub(crate) fn target(&self) -> u64 {
        self.counter.load(Ordering::Acquire)
    }

    pub(crate) fn next_value(&self) -> u64 {
        self.target() + 1
    }

    /// Records that a submission will signal `value`.
    pub(crate) fn arm(&self, value: u64) {
        self.counter.store(value, Ordering::Release);
        self.signaled.store(true, Ordering::Release);
    }

    pub(crate) fn disarm(&self) {
        self.signaled.store(false, Ordering::Release);
    }
}

impl std::fmt::Debug for Fence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fence")
            .field("flags", &self.flags)
            .field("signaled", &self.is_signaled())
            .finish_non_exhaustive()
    }
}
