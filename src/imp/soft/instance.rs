// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use std::sync::Arc;

use crate::adapter::{AdapterExtension, AdapterInfo};
use crate::callback::{MessageSeverity, Messenger};
use crate::format::Format;
use crate::imp::soft::device::Device;
use crate::imp::soft::profile::{self, PROFILES, Profile};
use crate::imp::soft::resource::MemoryHeap;
use crate::imp::soft::surface::Surface;
use crate::imp::soft::Error;
use crate::imp::{DeviceConfig, FormatSupport, InstanceConfig};
use crate::instance::InstanceExtension;
use crate::queue::QueueType;
use crate::surface::SurfaceDescExt;
use crate::swapchain::SurfaceCapabilitiesExt;

#[derive(Debug)]
pub(crate) struct Instance {
    adapters: Vec<Adapter>,
    messenger: Arc<Messenger>,
}

impl Instance {
    pub(crate) fn new(config: &InstanceConfig<'_>, messenger: Arc<Messenger>) -> Result<Self, Error> {
        let validate = config.enabled(InstanceExtension::DriverValidation);
        logwise::info_sync!(
            "software instance for {app}, driver validation {validate}",
            app = logwise::privacy::LogIt(&config.application_name.unwrap_or("unnamed")),
            validate = logwise::privacy::LogIt(&validate)
        );
        if config.enabled(InstanceExtension::GpuValidation) {
            messenger.push(
                MessageSeverity::Info,
                "GPU-based validation has no effect on the software backend",
            );
        }
        let adapters = PROFILES
            .iter()
            .map(|profile| {
                Adapter(Arc::new(AdapterCore {
                    profile,
                    validate,
                    local: MemoryHeap::new("local", profile.local_budget),
                    host: MemoryHeap::new("host", profile.host_budget),
                }))
            })
            .collect();
        Ok(Instance {
            adapters,
            messenger,
        })
    }

    pub(crate) fn enumerate_adapters(&self) -> Result<Vec<Adapter>, Error> {
        Ok(self.adapters.clone())
    }

    pub(crate) fn create_surface(&self, desc: &SurfaceDescExt) -> Result<Surface, Error> {
        self.messenger.push(
            MessageSeverity::Verbose,
            format!("created {} surface", desc.platform()),
        );
        Ok(Surface::new(desc))
    }
}

#[derive(Debug)]
struct AdapterCore {
    profile: &'static Profile,
    validate: bool,
    local: Arc<MemoryHeap>,
    host: Arc<MemoryHeap>,
}

#[derive(Debug, Clone)]
pub(crate) struct Adapter(Arc<AdapterCore>);

impl Adapter {
    pub(crate) fn key(&self) -> u64 {
        self.0.profile.key()
    }

    pub(crate) fn info(&self) -> AdapterInfo {
        let profile = self.0.profile;
        AdapterInfo {
            vendor_id: profile.vendor_id,
            device_id: profile.device_id,
            name: profile.name.to_string(),
            adapter_type: profile.adapter_type,
        }
    }

    pub(crate) fn node_count(&self) -> u8 {
        self.0.profile.node_count
    }

    pub(crate) fn queue_count(&self, ty: QueueType) -> u8 {
        profile::queue_count(ty)
    }

    pub(crate) fn extension_support(&self, _extension: AdapterExtension) -> bool {
        true
    }

    pub(crate) fn format_support(&self, format: Format) -> FormatSupport {
        profile::format_support(format)
    }

    pub(crate) fn surface_present_support(
        &self,
        surface: &Surface,
        ty: QueueType,
    ) -> Result<bool, Error> {
        Ok(surface.present_support(ty))
    }

    pub(crate) fn surface_capabilities(
        &self,
        surface: &Surface,
    ) -> Result<SurfaceCapabilitiesExt, Error> {
        Ok(surface.capabilities())
    }

    pub(crate) fn create_device(
        &self,
        config: &DeviceConfig<'_>,
        messenger: Arc<Messenger>,
    ) -> Result<Device, Error> {
        logwise::info_sync!(
            "software device on {name} with {queues} queues",
            name = logwise::privacy::LogIt(&self.0.profile.name),
            queues = config.queues.len()
        );
        Ok(Device::new(
            self.0.validate,
            self.0.local.clone(),
            self.0.host.clone(),
            messenger,
        ))
    }
}
