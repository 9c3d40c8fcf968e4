// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;

use crate::adapter::{AdapterExtension, AdapterInfo, AdapterType};
use crate::callback::{MessageSeverity, Messenger};
use crate::format::Format;
use crate::imp::wgpu::Error;
use crate::imp::wgpu::device::Device;
use crate::imp::wgpu::format;
use crate::imp::wgpu::surface::{self, Surface};
use crate::imp::{DeviceConfig, FormatSupport, InstanceConfig};
use crate::instance::InstanceExtension;
use crate::queue::QueueType;
use crate::surface::SurfaceDescExt;
use crate::swapchain::SurfaceCapabilitiesExt;

#[derive(Debug)]
pub(crate) struct Instance {
    instance: wgpu::Instance,
    messenger: Arc<Messenger>,
}

impl Instance {
    pub(crate) fn new(config: &InstanceConfig<'_>, messenger: Arc<Messenger>) -> Result<Self, Error> {
        let mut descriptor = wgpu::InstanceDescriptor::from_env_or_default();
        if config.enabled(InstanceExtension::DriverValidation) {
            descriptor.flags |= wgpu::InstanceFlags::VALIDATION | wgpu::InstanceFlags::DEBUG;
        }
        if config.enabled(InstanceExtension::GpuValidation) {
            descriptor.flags |= wgpu::InstanceFlags::GPU_BASED_VALIDATION;
        }
        logwise::info_sync!(
            "wgpu instance for {app}, backends {backends}, flags {flags}",
            app = logwise::privacy::LogIt(&config.application_name.unwrap_or("unnamed")),
            backends = logwise::privacy::LogIt(&descriptor.backends),
            flags = logwise::privacy::LogIt(&descriptor.flags)
        );
        let instance = wgpu::Instance::new(&descriptor);
        Ok(Instance {
            instance,
            messenger,
        })
    }

    pub(crate) fn enumerate_adapters(&self) -> Result<Vec<Adapter>, Error> {
        let _interval = logwise::perfwarn_begin!("wgpu enumerate_adapters");
        Ok(self
            .instance
            .enumerate_adapters(wgpu::Backends::all())
            .into_iter()
            .map(|adapter| {
                let info = adapter.get_info();
                Adapter(Arc::new(AdapterCore { adapter, info }))
            })
            .collect())
    }

    pub(crate) fn create_surface(&self, desc: &SurfaceDescExt) -> Result<Surface, Error> {
        let surface = surface::create(&self.instance, desc)?;
        self.messenger.push(
            MessageSeverity::Verbose,
            format!("created {} surface", desc.platform()),
        );
        Ok(surface)
    }
}

#[derive(Debug)]
struct AdapterCore {
    adapter: wgpu::Adapter,
    info: wgpu::AdapterInfo,
}

#[derive(Debug, Clone)]
pub(crate) struct Adapter(Arc<AdapterCore>);

/// wgpu multiplexes every llri queue onto its single queue, so these are soft caps.
const fn queue_cap(ty: QueueType) -> u8 {
    match ty {
        QueueType::Graphics => 16,
        QueueType::Compute => 8,
        QueueType::Transfer => 2,
    }
}

fn adapter_type(device_type: wgpu::DeviceType) -> AdapterType {
    match device_type {
        wgpu::DeviceType::IntegratedGpu => AdapterType::Integrated,
        wgpu::DeviceType::DiscreteGpu => AdapterType::Discrete,
        wgpu::DeviceType::VirtualGpu | wgpu::DeviceType::Cpu => AdapterType::Virtual,
        wgpu::DeviceType::Other => AdapterType::Other,
    }
}

impl Adapter {
    /// Stable across enumerations of the same physical adapter.
    pub(crate) fn key(&self) -> u64 {
        let info = &self.0.info;
        let mut hasher = DefaultHasher::new();
        info.backend.hash(&mut hasher);
        info.vendor.hash(&mut hasher);
        info.device.hash(&mut hasher);
        info.name.hash(&mut hasher);
        info.driver.hash(&mut hasher);
        hasher.finish()
    }

    pub(crate) fn info(&self) -> AdapterInfo {
        let info = &self.0.info;
        AdapterInfo {
            vendor_id: info.vendor,
            device_id: info.device,
            name: info.name.clone(),
            adapter_type: adapter_type(info.device_type),
        }
    }

    pub(crate) fn node_count(&self) -> u8 {
        1
    }

    pub(crate) fn queue_count(&self, ty: QueueType) -> u8 {
        queue_cap(ty)
    }

    pub(crate) fn extension_support(&self, extension: AdapterExtension) -> bool {
        match extension {
            AdapterExtension::Swapchain => true,
        }
    }

    pub(crate) fn format_support(&self, format: Format) -> FormatSupport {
        format::format_support(&self.0.adapter, format)
    }

    pub(crate) fn surface_present_support(
        &self,
        surface: &Surface,
        _ty: QueueType,
    ) -> Result<bool, Error> {
        Ok(self.0.adapter.is_surface_supported(surface.wgpu()))
    }

    pub(crate) fn surface_capabilities(
        &self,
        surface: &Surface,
    ) -> Result<SurfaceCapabilitiesExt, Error> {
        Ok(surface.capabilities(&self.0.adapter))
    }

    pub(crate) fn create_device(
        &self,
        config: &DeviceConfig<'_>,
        messenger: Arc<Messenger>,
    ) -> Result<Device, Error> {
        logwise::info_sync!(
            "wgpu device on {name} ({backend}) with {queues} queues",
            name = self.0.info.name.clone(),
            backend = logwise::privacy::LogIt(&self.0.info.backend),
            queues = config.queues.len()
        );
        Device::request(&self.0.adapter, messenger)
    }
}
