// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Emulated memory heaps and resources.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use wasm_safe_mutex::Mutex;

use crate::callback::MessageSeverity;
use crate::imp::soft::Error;
use crate::imp::soft::command::{ImageBarrier, ImageLayout};
use crate::imp::soft::timeline::ExecutionContext;
use crate::resource::{ResourceDesc, ResourceType};

/// A memory budget.
#[derive(Debug)]
pub(crate) struct MemoryHeap {
    name: &'static str,
    budget: u64,
    used: AtomicU64,
}

impl MemoryHeap {
    pub(crate) fn new(name: &'static str, budget: u64) -> Arc<Self> {
        Arc::new(MemoryHeap {
            name,
            budget,
            used: AtomicU64::new(0),
        })
    }

    pub(crate) fn allocate(self: &Arc<Self>, bytes: u64) -> Result<Allocation, Error> {
        let mut used = self.used.load(Ordering::Relaxed);
        loop {
            let available = self.budget - used;
            if bytes > available {
                return Err(Error::OutOfMemory {
                    requested: bytes,
                    available,
                });
            }
            match self.used.compare_exchange_weak(
                used,
                used + bytes,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(actual) => used = actual,
            }
        }
        logwise::trace_sync!(
            "{heap} heap: allocated {bytes} bytes",
            heap = logwise::privacy::LogIt(&self.name),
            bytes = bytes
        );
        Ok(Allocation {
            heap: self.clone(),
            bytes,
        })
    }

    #[cfg(test)]
    pub(crate) fn used(&self) -> u64 {
        self.used.load(Ordering::Relaxed)
    }
}

/// Returns its bytes to the heap on drop.
#[derive(Debug)]
pub(crate) struct Allocation {
    heap: Arc<MemoryHeap>,
    bytes: u64,
}

impl Drop for Allocation {
    fn drop(&mut self) {
        self.heap.used.fetch_sub(self.bytes, Ordering::AcqRel);
    }
}

/// Bytes a resource described by `desc` occupies.
pub(crate) fn size_of(desc: &ResourceDesc) -> u64 {
    if desc.resource_type == ResourceType::Buffer {
        return desc.width as u64;
    }
    let texel = desc.texture_format.bytes_per_texel() as u64 * desc.sample_count.samples() as u64;
    let layers = desc.array_layers() as u64;
    (0..desc.mip_levels as u32)
        .map(|mip| {
            let w = (desc.width >> mip).max(1) as u64;
            let h = (desc.height >> mip).max(1) as u64;
            let d = if desc.resource_type == ResourceType::Texture3D {
                ((desc.depth_or_array_layers as u32) >> mip).max(1) as u64
            } else {
                1
            };
            w * h * d
        })
        .sum::<u64>()
        * texel
        * layers
}

/// The tracked layout of every subresource of a texture.
#[derive(Debug)]
pub(crate) struct ImageState {
    id: u64,
    mip_levels: u32,
    array_layers: u32,
    layouts: Mutex<Vec<ImageLayout>>,
}

impl ImageState {
    fn new(id: u64, desc: &ResourceDesc) -> Self {
        let mip_levels = desc.mip_levels as u32;
        let array_layers = desc.array_layers();
        ImageState {
            id,
            mip_levels,
            array_layers,
            layouts: Mutex::new(vec![
                ImageLayout::Undefined;
                (mip_levels * array_layers) as usize
            ]),
        }
    }

    /// Applies an image barrier, reporting subresources whose tracked layout disagrees with
    /// the barrier's old layout.
    pub(crate) fn transition(&self, barrier: &ImageBarrier, context: &ExecutionContext) {
        logwise::trace_sync!(
            "image {id}: {old} -> {new}, access {src} -> {dst}",
            id = self.id,
            old = logwise::privacy::LogIt(&barrier.old_layout),
            new = logwise::privacy::LogIt(&barrier.new_layout),
            src = logwise::privacy::LogIt(&barrier.src_access),
            dst = logwise::privacy::LogIt(&barrier.dst_access)
        );
        let range = barrier.range;
        let mips = range.base_mip_level as u32
            ..(range.base_mip_level as u32 + range.num_mip_levels as u32).min(self.mip_levels);
        let layers = range.base_array_layer as u32
            ..(range.base_array_layer as u32 + range.num_array_layers as u32)
                .min(self.array_layers);
        let mut layouts = self.layouts.lock_sync();
        let mut mismatched = 0u32;
        let mut tracked = barrier.old_layout;
        for mip in mips {
            for layer in layers.clone() {
                let slot = &mut layouts[(mip * self.array_layers + layer) as usize];
                //a transition from undefined discards, so it matches anything
                if barrier.old_layout != ImageLayout::Undefined && *slot != barrier.old_layout {
                    mismatched += 1;
                    tracked = *slot;
                }
                *slot = barrier.new_layout;
            }
        }
        drop(layouts);
        if mismatched > 0 && context.validate {
            context.messenger.push(
                MessageSeverity::Error,
                format!(
                    "image {} barrier expected layout {:?} but {} subresource(s) were in {:?}",
                    self.id, barrier.old_layout, mismatched, tracked
                ),
            );
        }
    }

    #[cfg(test)]
    pub(crate) fn layout(&self, mip: u32, layer: u32) -> ImageLayout {
        self.layouts.lock_sync()
            [(mip * self.array_layers + layer) as usize]
    }
}

#[derive(Debug)]
pub(crate) struct Resource {
    pub(crate) id: u64,
    pub(crate) image: Option<Arc<ImageState>>,
    _allocation: Allocation,
}

impl Resource {
    pub(crate) fn new(desc: &ResourceDesc, heap: &Arc<MemoryHeap>) -> Result<Self, Error> {
        let allocation = heap.allocate(size_of(desc))?;
        let id = crate::unique_id();
        let image = desc
            .resource_type
            .is_texture()
            .then(|| Arc::new(ImageState::new(id, desc)));
        Ok(Resource {
            id,
            image,
            _allocation: allocation,
        })
    }
}
