// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! The emulated adapters and their capabilities.

use crate::adapter::AdapterType;
use crate::format::Format;
use crate::imp::FormatSupport;
use crate::queue::QueueType;

/// PCI vendor id Mesa uses for its software drivers.
const VENDOR_ID: u32 = 0x10005;

const GIB: u64 = 1024 * 1024 * 1024;
const MIB: u64 = 1024 * 1024;

#[derive(Debug)]
pub(crate) struct Profile {
    pub(crate) vendor_id: u32,
    pub(crate) device_id: u32,
    pub(crate) name: &'static str,
    pub(crate) adapter_type: AdapterType,
    pub(crate) node_count: u8,
    pub(crate) local_budget: u64,
    pub(crate) host_budget: u64,
}

impl Profile {
    /// Stable across enumerations and processes.
    pub(crate) const fn key(&self) -> u64 {
        ((self.vendor_id as u64) << 32) | self.device_id as u64
    }
}

pub(crate) static PROFILES: [Profile; 2] = [
    Profile {
        vendor_id: VENDOR_ID,
        device_id: 0x0001,
        name: "llri software adapter",
        adapter_type: AdapterType::Discrete,
        node_count: 1,
        local_budget: 2 * GIB,
        host_budget: 512 * MIB,
    },
    Profile {
        vendor_id: VENDOR_ID,
        device_id: 0x0002,
        name: "llri software adapter (linked, 2 nodes)",
        adapter_type: AdapterType::Discrete,
        node_count: 2,
        local_budget: 2 * GIB,
        host_budget: 512 * MIB,
    },
];

pub(crate) const fn queue_count(ty: QueueType) -> u8 {
    match ty {
        QueueType::Graphics => 16,
        QueueType::Compute => 8,
        QueueType::Transfer => 2,
    }
}

const MULTISAMPLE: [u32; 6] = [1, 1, 1, 1, 0, 0];
const SINGLE_SAMPLE: [u32; 6] = [1, 0, 0, 0, 0, 0];

pub(crate) fn format_support(format: Format) -> FormatSupport {
    use Format::*;
    match format {
        Undefined => FormatSupport::default(),
        D16UNorm | D24UNormS8UInt | D32Float | D32FloatS8X24UInt => FormatSupport {
            transfer: true,
            sample: true,
            storage: false,
            render_target: false,
            depth_stencil: true,
            texture_1d: true,
            texture_2d: true,
            texture_3d: false,
            quality_levels: MULTISAMPLE,
        },
        //three-component formats are sample-only, as on most hardware
        RGB32UInt | RGB32Int | RGB32Float => FormatSupport {
            transfer: true,
            sample: true,
            storage: false,
            render_target: false,
            depth_stencil: false,
            texture_1d: true,
            texture_2d: true,
            texture_3d: true,
            quality_levels: SINGLE_SAMPLE,
        },
        _ => FormatSupport {
            transfer: true,
            sample: true,
            storage: !format.is_srgb(),
            render_target: true,
            depth_stencil: false,
            texture_1d: true,
            texture_2d: true,
            texture_3d: true,
            quality_levels: MULTISAMPLE,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_distinct() {
        assert_ne!(PROFILES[0].key(), PROFILES[1].key());
        assert_eq!(PROFILES[1].node_count, 2);
    }

    #[test]
    fn rgba8_is_fully_capable() {
        let s = format_support(Format::RGBA8UNorm);
        assert!(s.transfer && s.sample && s.storage && s.render_target);
        assert!(s.texture_1d && s.texture_2d && s.texture_3d);
        assert!(!format_support(Format::Undefined).is_supported());
        assert!(!format_support(Format::D32Float).texture_3d);
    }
}
