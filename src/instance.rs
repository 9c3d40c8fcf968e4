// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
The instance: root of the object tree.

At most one [Instance] exists at a time.  It initializes the backend, gates instance
extensions, caches adapters and creates devices and surfaces.
*/

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use wasm_safe_mutex::Mutex;

use crate::adapter::Adapter;
use crate::callback::Messenger;
use crate::device::{Device, DeviceDesc};
use crate::imp::{self, InstanceConfig};
use crate::owner::{Owner, OwnerRef};
use crate::queue::QueueType;
use crate::surface::{SurfaceDescExt, SurfaceExt};
use crate::validation;
use crate::{Error, Result};

closed_enum! {
    /// Optional instance functionality.
    pub enum InstanceExtension {
        /// The backend driver's own validation layer.  Its findings are reported through the
        /// message callback with [crate::MessageSource::Implementation].
        DriverValidation = 0,
        /// GPU-assisted validation.  Slow.
        GpuValidation = 1,
        /// Surfaces on Win32 windows.
        SurfaceWin32 = 2,
        /// Surfaces on Cocoa views.
        SurfaceCocoa = 3,
        /// Surfaces on Xlib windows.
        SurfaceXlib = 4,
        /// Surfaces on XCB windows.
        SurfaceXcb = 5,
    }
}

impl InstanceExtension {
    pub(crate) const fn is_surface(self) -> bool {
        matches!(
            self,
            InstanceExtension::SurfaceWin32
                | InstanceExtension::SurfaceCocoa
                | InstanceExtension::SurfaceXlib
                | InstanceExtension::SurfaceXcb
        )
    }
}

/// Describes an instance to create.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstanceDesc<'a> {
    /// Each extension at most once.
    pub extensions: &'a [InstanceExtension],
    /// Passed to the backend, which may show it in tooling.
    pub application_name: Option<&'a str>,
}

impl<'a> InstanceDesc<'a> {
    pub fn new(application_name: &'a str) -> Self {
        InstanceDesc {
            extensions: &[],
            application_name: Some(application_name),
        }
    }

    pub fn with_extensions(mut self, extensions: &'a [InstanceExtension]) -> Self {
        self.extensions = extensions;
        self
    }
}

/// Whether the linked backend supports `extension` in this environment.
pub fn query_instance_extension_support(extension: InstanceExtension) -> bool {
    imp::query_instance_extension_support(extension)
}

static INSTANCE_ALIVE: AtomicBool = AtomicBool::new(false);

pub(crate) struct InstanceShared {
    pub(crate) id: u64,
    pub(crate) extensions: Vec<InstanceExtension>,
    pub(crate) messenger: Arc<Messenger>,
    pub(crate) imp: imp::Instance,
    live_children: AtomicUsize,
}

impl InstanceShared {
    pub(crate) fn enabled(&self, extension: InstanceExtension) -> bool {
        self.extensions.contains(&extension)
    }

    pub(crate) fn surface_extension_enabled(&self) -> bool {
        self.extensions.iter().any(|e| e.is_surface())
    }
}

impl Drop for InstanceShared {
    fn drop(&mut self) {
        //the last device, surface or adapter handle is gone
        INSTANCE_ALIVE.store(false, Ordering::Release);
        logwise::trace_sync!("llri: backend instance released");
    }
}

impl Owner for InstanceShared {
    fn live_children(&self) -> &AtomicUsize {
        &self.live_children
    }
}

pub(crate) type InstanceRef = OwnerRef<InstanceShared>;

/// Checks an extension list for duplicates and unsupported entries.
pub(crate) fn check_extensions<E>(
    extensions: &[E],
    supported: impl Fn(E) -> bool,
) -> std::result::Result<(), (Error, String)>
where
    E: Copy + PartialEq + std::fmt::Display,
{
    for (i, extension) in extensions.iter().enumerate() {
        if extensions[..i].contains(extension) {
            return Err((
                Error::InvalidUsage,
                format!("desc.extensions[{i}] ({extension}) appears more than once in extensions"),
            ));
        }
        if !supported(*extension) {
            return Err((
                Error::ExtensionNotSupported,
                format!("desc.extensions[{i}] ({extension}) is not supported"),
            ));
        }
    }
    Ok(())
}

/// Creates the instance.
///
/// Fails with [Error::ExceededLimit] while another instance is alive.  An instance stays
/// alive after [destroy_instance] until its last device, surface and adapter are dropped.
pub fn create_instance(desc: &InstanceDesc<'_>) -> Result<Instance> {
    require!(
        desc.extensions.len() <= InstanceExtension::COUNT,
        Error::ExceededLimit,
        "desc.extensions has {} entries but only {} extensions exist",
        desc.extensions.len(),
        InstanceExtension::COUNT
    );
    if cfg!(not(feature = "disable_validation")) {
        if let Err((error, reason)) =
            check_extensions(desc.extensions, query_instance_extension_support)
        {
            return Err(validation::violation(function_name!(), error, &reason));
        }
    }
    require!(
        desc.application_name.is_none_or(|name| !name.contains('\0')),
        Error::InvalidUsage,
        "desc.application_name contains an interior NUL"
    );
    if INSTANCE_ALIVE.swap(true, Ordering::AcqRel) {
        return Err(validation::violation(
            function_name!(),
            Error::ExceededLimit,
            "another instance is still alive",
        ));
    }

    let messenger = Messenger::new();
    let config = InstanceConfig {
        extensions: desc.extensions,
        application_name: desc.application_name,
    };
    let imp = match validation::dispatch(&messenger, || imp::Instance::new(&config, messenger.clone())) {
        Ok(imp) => imp,
        Err(e) => {
            INSTANCE_ALIVE.store(false, Ordering::Release);
            logwise::error_sync!(
                "llri: backend initialization failed: {err}",
                err = logwise::privacy::LogIt(&e)
            );
            return Err(e.into());
        }
    };
    let shared = Arc::new(InstanceShared {
        id: crate::unique_id(),
        extensions: desc.extensions.to_vec(),
        messenger,
        imp,
        live_children: AtomicUsize::new(0),
    });
    logwise::info_sync!(
        "llri: created {implementation} instance with {count} extensions",
        implementation = logwise::privacy::LogIt(&imp::IMPLEMENTATION),
        count = desc.extensions.len()
    );
    Ok(Instance {
        shared,
        adapters: Mutex::new(BTreeMap::new()),
    })
}

/// Destroys the instance.  Same as dropping it.
pub fn destroy_instance(instance: Instance) {
    drop(instance);
}

/// The root object.
pub struct Instance {
    shared: Arc<InstanceShared>,
    /// Every adapter ever seen, by backend key.
    adapters: Mutex<BTreeMap<u64, Adapter>>,
}

impl Instance {
    /// Fills `adapters` with every adapter currently available.
    ///
    /// The vector is cleared first.  Adapters found by earlier calls come back as equal
    /// handles; adapters no longer found are marked lost.
    pub fn enumerate_adapters(&self, adapters: &mut Vec<Adapter>) -> Result<()> {
        adapters.clear();
        let found = validation::dispatch(&self.shared.messenger, || {
            self.shared.imp.enumerate_adapters()
        })?;
        let mut cache = self.adapters.lock_sync();
        for adapter in cache.values() {
            adapter.mark_lost();
        }
        for imp in found {
            let adapter = match cache.get(&imp.key()) {
                Some(cached) => {
                    cached.revive(imp);
                    cached.clone()
                }
                None => {
                    let adapter = Adapter::new(&self.shared, imp);
                    cache.insert(adapter.key(), adapter.clone());
                    adapter
                }
            };
            adapters.push(adapter);
        }
        logwise::trace_sync!("llri: enumerated {count} adapters", count = adapters.len());
        Ok(())
    }

    /// Creates a logical device on `desc.adapter`.
    pub fn create_device(&self, desc: &DeviceDesc<'_>) -> Result<Device> {
        require!(
            desc.adapter.instance_id() == self.shared.id,
            Error::InvalidUsage,
            "desc.adapter was enumerated by a different instance"
        );
        require!(
            !desc.adapter.is_lost(),
            Error::DeviceLost,
            "desc.adapter is lost; enumerate adapters again"
        );
        require!(
            desc.extensions.len() <= crate::AdapterExtension::COUNT,
            Error::ExceededLimit,
            "desc.extensions has {} entries but only {} extensions exist",
            desc.extensions.len(),
            crate::AdapterExtension::COUNT
        );
        if cfg!(not(feature = "disable_validation")) {
            if let Err((error, reason)) =
                check_extensions(desc.extensions, |e| desc.adapter.query_extension_support(e))
            {
                return Err(validation::violation(function_name!(), error, &reason));
            }
        }
        require!(
            !desc.queues.is_empty(),
            Error::InvalidUsage,
            "desc.queues is empty; a device needs at least one queue"
        );
        for ty in QueueType::ALL {
            let requested = desc.queues.iter().filter(|q| q.ty == ty).count();
            let available = desc.adapter.query_queue_count(ty) as usize;
            require!(
                requested <= available,
                Error::InvalidUsage,
                "desc.queues requests {requested} {ty} queues but the adapter supports {available}"
            );
        }
        Device::new(OwnerRef::new(&self.shared), desc)
    }

    /// Destroys a device created by this instance.
    ///
    /// Objects the device created keep its backend state alive until they are dropped; a
    /// warning is reported when any remain.
    pub fn destroy_device(&self, device: Device) -> Result<()> {
        require!(
            device.instance_id() == self.shared.id,
            Error::InvalidUsage,
            "device was created by a different instance"
        );
        drop(device);
        Ok(())
    }

    /// Wraps a platform window for presentation.
    ///
    /// Requires the matching `Surface*` instance extension.
    pub fn create_surface_ext(&self, desc: &SurfaceDescExt) -> Result<SurfaceExt> {
        let required = desc.platform().required_extension();
        require!(
            self.shared.enabled(required),
            Error::ExtensionNotEnabled,
            "a {} surface requires the {required} instance extension",
            desc.platform()
        );
        if cfg!(not(feature = "disable_validation")) {
            if let Err(reason) = desc.check_handles() {
                return Err(validation::violation(
                    function_name!(),
                    Error::InvalidUsage,
                    &reason,
                ));
            }
        }
        let imp = validation::dispatch(&self.shared.messenger, || {
            self.shared.imp.create_surface(desc)
        })?;
        Ok(SurfaceExt::new(OwnerRef::new(&self.shared), desc.platform(), imp))
    }

    /// Destroys a surface created by this instance.
    pub fn destroy_surface_ext(&self, surface: SurfaceExt) -> Result<()> {
        require!(
            surface.instance_id() == self.shared.id,
            Error::InvalidUsage,
            "surface was created by a different instance"
        );
        drop(surface);
        Ok(())
    }
}

impl Drop for Instance {
    fn drop(&mut self) {
        let live = self.shared.live_children.load(Ordering::Acquire);
        if live > 0 {
            validation::warning(
                function_name!(),
                &format!("the instance was destroyed while {live} of its devices or surfaces were alive"),
            );
        }
        validation::pump(&self.shared.messenger);
        logwise::info_sync!("llri: instance destroyed");
    }
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("id", &self.shared.id)
            .field("extensions", &self.shared.extensions)
            .finish_non_exhaustive()
    }
}
