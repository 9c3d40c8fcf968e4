// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Adapters: physical GPUs, or groups of linked GPUs.

Adapters are owned by their [crate::Instance] and handed out by
[crate::Instance::enumerate_adapters].  An [Adapter] value is a cheap handle; clones compare
equal, and successive enumerations return handles equal to the earlier ones.

When an enumeration no longer finds an adapter, its handle is *lost*: queries that need the
backend report [Error::DeviceLost] (or `false` / `0` for the infallible ones), and devices can
no longer be created on it.  A later enumeration that finds it again revives the same handle.
*/

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use wasm_safe_mutex::Mutex;

use crate::format::Format;
use crate::imp::{self, FormatSupport};
use crate::instance::InstanceShared;
use crate::queue::QueueType;
use crate::resource::{ResourceType, ResourceUsageFlagBits, ResourceUsageFlags, SampleCount};
use crate::surface::SurfaceExt;
use crate::swapchain::SurfaceCapabilitiesExt;
use crate::validation;
use crate::{Error, Result};

closed_enum! {
    /// Informational classification of an adapter.
    pub enum AdapterType {
        Other = 0,
        /// Shares memory with the host.
        Integrated = 1,
        Discrete = 2,
        /// A virtualized or software adapter.
        Virtual = 3,
    }
}

closed_enum! {
    /// Optional device functionality.
    pub enum AdapterExtension {
        /// Presentation through [crate::SwapchainExt].
        Swapchain = 0,
    }
}

/// Identifying information about an adapter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AdapterInfo {
    pub vendor_id: u32,
    pub device_id: u32,
    pub name: String,
    pub adapter_type: AdapterType,
}

/// Optional features an adapter supports.  Reserved; no features are defined yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AdapterFeatures {}

/// Numeric limits of an adapter.  Reserved; no limits are defined yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AdapterLimits {}

/// What a format can be used for on an adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatProperties {
    /// False when the format can't be used for any resource.
    pub supported: bool,
    /// Which resource types may use the format.  Has a row for every [ResourceType].
    pub types: BTreeMap<ResourceType, bool>,
    /// The usage flags a resource of this format may be created with.
    pub usage: ResourceUsageFlags,
    /// Which sample counts the format supports.  Has a row for every [SampleCount].
    pub sample_counts: BTreeMap<SampleCount, bool>,
}

impl FormatProperties {
    pub(crate) fn project(format: Format, support: &FormatSupport) -> Self {
        let mut usage = ResourceUsageFlags::empty();
        if support.transfer {
            usage |= ResourceUsageFlagBits::TransferSrc | ResourceUsageFlagBits::TransferDst;
        }
        if support.sample {
            usage |= ResourceUsageFlagBits::Sampled;
        }
        if support.storage {
            usage |= ResourceUsageFlagBits::ShaderWrite;
        }
        if support.render_target {
            usage |= ResourceUsageFlagBits::ColorAttachment;
        }
        if support.depth_stencil {
            usage |= ResourceUsageFlagBits::DepthStencilAttachment
                | ResourceUsageFlagBits::DenyShaderResource;
        }

        //the portability layer on macOS has no 1D or 3D depth textures
        let strip_depth_volumes = cfg!(target_os = "macos") && format.is_depth();
        let types = ResourceType::ALL
            .iter()
            .map(|ty| {
                let supported = match ty {
                    ResourceType::Buffer => false,
                    ResourceType::Texture1D => support.texture_1d && !strip_depth_volumes,
                    ResourceType::Texture2D => support.texture_2d,
                    ResourceType::Texture3D => support.texture_3d && !strip_depth_volumes,
                };
                (*ty, supported)
            })
            .collect();
        let sample_counts = SampleCount::ALL
            .iter()
            .map(|c| (*c, support.quality_levels(*c) > 0))
            .collect();
        FormatProperties {
            supported: support.is_supported(),
            types,
            usage,
            sample_counts,
        }
    }

    pub fn supports_type(&self, ty: ResourceType) -> bool {
        self.types.get(&ty).copied().unwrap_or(false)
    }

    pub fn supports_sample_count(&self, count: SampleCount) -> bool {
        self.sample_counts.get(&count).copied().unwrap_or(false)
    }
}

struct AdapterState {
    /// `None` once the adapter is lost.
    imp: Option<imp::Adapter>,
    info: AdapterInfo,
    node_count: u8,
}

pub(crate) struct AdapterShared {
    key: u64,
    instance: Arc<InstanceShared>,
    state: Mutex<AdapterState>,
    formats: OnceLock<BTreeMap<Format, FormatProperties>>,
}

/// A physical GPU or a group of linked GPUs.
#[derive(Clone)]
pub struct Adapter(Arc<AdapterShared>);

impl Adapter {
    pub(crate) fn new(instance: &Arc<InstanceShared>, imp: imp::Adapter) -> Self {
        Adapter(Arc::new(AdapterShared {
            key: imp.key(),
            instance: instance.clone(),
            state: Mutex::new(AdapterState {
                info: imp.info(),
                node_count: imp.node_count(),
                imp: Some(imp),
            }),
            formats: OnceLock::new(),
        }))
    }

    pub(crate) fn key(&self) -> u64 {
        self.0.key
    }

    pub(crate) fn instance_id(&self) -> u64 {
        self.0.instance.id
    }

    pub(crate) fn mark_lost(&self) {
        self.0.state.lock_sync().imp = None;
    }

    pub(crate) fn revive(&self, imp: imp::Adapter) {
        let mut state = self.0.state.lock_sync();
        state.node_count = imp.node_count();
        state.info = imp.info();
        state.imp = Some(imp);
    }

    pub(crate) fn is_lost(&self) -> bool {
        self.0.state.lock_sync().imp.is_none()
    }

    /// The backend adapter, or [Error::DeviceLost].
    pub(crate) fn imp(&self) -> Result<imp::Adapter> {
        self.0.state.lock_sync().imp.clone().ok_or(Error::DeviceLost)
    }

    pub fn query_info(&self) -> AdapterInfo {
        self.0.state.lock_sync().info.clone()
    }

    pub fn query_features(&self) -> AdapterFeatures {
        AdapterFeatures {}
    }

    pub fn query_limits(&self) -> AdapterLimits {
        AdapterLimits {}
    }

    /// The number of physical devices linked into this adapter.
    pub fn query_node_count(&self) -> u8 {
        self.0.state.lock_sync().node_count
    }

    /// `false` once the adapter is lost.
    pub fn query_extension_support(&self, extension: AdapterExtension) -> bool {
        match self.imp() {
            Ok(imp) => validation::dispatch(&self.0.instance.messenger, || {
                imp.extension_support(extension)
            }),
            Err(_) => false,
        }
    }

    /// The maximum number of queues of type `ty` a device on this adapter may have.
    /// `0` once the adapter is lost.
    pub fn query_queue_count(&self, ty: QueueType) -> u8 {
        match self.imp() {
            Ok(imp) => imp.queue_count(ty),
            Err(_) => 0,
        }
    }

    /// Capabilities of every format.  Computed on the first call and cached.
    pub fn query_format_properties(&self) -> Result<&BTreeMap<Format, FormatProperties>> {
        let imp = self.imp()?;
        if let Some(formats) = self.0.formats.get() {
            return Ok(formats);
        }
        let _interval = logwise::perfwarn_begin!("llri query_format_properties");
        let computed = validation::dispatch(&self.0.instance.messenger, || {
            Format::ALL
                .iter()
                .map(|f| (*f, FormatProperties::project(*f, &imp.format_support(*f))))
                .collect::<BTreeMap<_, _>>()
        });
        Ok(self.0.formats.get_or_init(|| computed))
    }

    /// Capabilities of one format.
    pub fn query_format_properties_of(&self, format: Format) -> Result<FormatProperties> {
        let formats = self.query_format_properties()?;
        formats.get(&format).cloned().ok_or(Error::InvalidFormat)
    }

    fn check_surface(&self, surface: &SurfaceExt) -> Result<()> {
        require!(
            self.0.instance.surface_extension_enabled(),
            Error::ExtensionNotEnabled,
            "no surface extension was enabled on the instance"
        );
        require!(
            surface.instance_id() == self.instance_id(),
            Error::InvalidUsage,
            "surface was created by a different instance than this adapter"
        );
        Ok(())
    }

    /// Whether queues of type `ty` can present to `surface`.
    pub fn query_surface_present_support_ext(
        &self,
        surface: &SurfaceExt,
        ty: QueueType,
    ) -> Result<bool> {
        self.check_surface(surface)?;
        let imp = self.imp()?;
        validation::dispatch(&self.0.instance.messenger, || {
            imp.surface_present_support(surface.imp(), ty)
        })
        .map_err(Error::from)
    }

    /// What swapchains on `surface` may look like.
    pub fn query_surface_capabilities_ext(
        &self,
        surface: &SurfaceExt,
    ) -> Result<SurfaceCapabilitiesExt> {
        self.check_surface(surface)?;
        let imp = self.imp()?;
        validation::dispatch(&self.0.instance.messenger, || {
            imp.surface_capabilities(surface.imp())
        })
        .map_err(Error::from)
    }
}

impl PartialEq for Adapter {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Adapter {}

impl std::fmt::Debug for Adapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.0.state.lock_sync();
        f.debug_struct("Adapter")
            .field("key", &self.0.key)
            .field("name", &state.info.name)
            .field("lost", &state.imp.is_none())
            .finish()
    }
}
