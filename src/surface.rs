// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Presentation surfaces.

A [SurfaceExt] wraps a platform window so swapchains can present to it.  Each platform
needs its own instance extension; creating a surface for a platform whose extension was not
enabled fails with [crate::Error::ExtensionNotEnabled].

The window handles use the [raw_window_handle] types, so they can be taken straight from
any windowing crate.
*/

use raw_window_handle::{
    AppKitDisplayHandle, AppKitWindowHandle, RawDisplayHandle, RawWindowHandle,
    Win32WindowHandle, WindowsDisplayHandle, XcbDisplayHandle, XcbWindowHandle,
    XlibDisplayHandle, XlibWindowHandle,
};

use crate::imp;
use crate::instance::{InstanceExtension, InstanceRef};

closed_enum! {
    /// The windowing system a surface belongs to.
    pub enum SurfacePlatformExt {
        Win32 = 0,
        Cocoa = 1,
        Xlib = 2,
        Xcb = 3,
    }
}

impl SurfacePlatformExt {
    /// The instance extension surfaces of this platform require.
    pub const fn required_extension(self) -> InstanceExtension {
        match self {
            SurfacePlatformExt::Win32 => InstanceExtension::SurfaceWin32,
            SurfacePlatformExt::Cocoa => InstanceExtension::SurfaceCocoa,
            SurfacePlatformExt::Xlib => InstanceExtension::SurfaceXlib,
            SurfacePlatformExt::Xcb => InstanceExtension::SurfaceXcb,
        }
    }
}

/// The window to create a surface for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceDescExt {
    /// `window.hinstance` must be set.
    Win32 { window: Win32WindowHandle },
    /// The view the surface draws into.
    Cocoa { view: AppKitWindowHandle },
    /// `display.display` must be set and `window.window` nonzero.
    Xlib {
        display: XlibDisplayHandle,
        window: XlibWindowHandle,
    },
    /// `connection.connection` must be set.
    Xcb {
        connection: XcbDisplayHandle,
        window: XcbWindowHandle,
    },
}

impl SurfaceDescExt {
    pub fn platform(&self) -> SurfacePlatformExt {
        match self {
            SurfaceDescExt::Win32 { .. } => SurfacePlatformExt::Win32,
            SurfaceDescExt::Cocoa { .. } => SurfacePlatformExt::Cocoa,
            SurfaceDescExt::Xlib { .. } => SurfacePlatformExt::Xlib,
            SurfaceDescExt::Xcb { .. } => SurfacePlatformExt::Xcb,
        }
    }

    /// Reports the first handle that is missing.
    pub(crate) fn check_handles(&self) -> Result<(), String> {
        match self {
            SurfaceDescExt::Win32 { window } if window.hinstance.is_none() => {
                Err("desc.window.hinstance is not set".to_string())
            }
            SurfaceDescExt::Xlib { display, .. } if display.display.is_none() => {
                Err("desc.display.display is not set".to_string())
            }
            SurfaceDescExt::Xlib { window, .. } if window.window == 0 => {
                Err("desc.window.window is 0".to_string())
            }
            SurfaceDescExt::Xcb { connection, .. } if connection.connection.is_none() => {
                Err("desc.connection.connection is not set".to_string())
            }
            _ => Ok(()),
        }
    }

    /// The handle pair a backend creates its surface from.
    #[cfg_attr(not(feature = "backend_wgpu"), allow(dead_code))]
    pub(crate) fn raw_handles(&self) -> (RawDisplayHandle, RawWindowHandle) {
        match *self {
            SurfaceDescExt::Win32 { window } => (
                RawDisplayHandle::Windows(WindowsDisplayHandle::new()),
                RawWindowHandle::Win32(window),
            ),
            SurfaceDescExt::Cocoa { view } => (
                RawDisplayHandle::AppKit(AppKitDisplayHandle::new()),
                RawWindowHandle::AppKit(view),
            ),
            SurfaceDescExt::Xlib { display, window } => (
                RawDisplayHandle::Xlib(display),
                RawWindowHandle::Xlib(window),
            ),
            SurfaceDescExt::Xcb { connection, window } => (
                RawDisplayHandle::Xcb(connection),
                RawWindowHandle::Xcb(window),
            ),
        }
    }
}

/// A window wrapped for presentation.  Created by [crate::Instance::create_surface_ext].
pub struct SurfaceExt {
    instance: InstanceRef,
    platform: SurfacePlatformExt,
    imp: imp::Surface,
}

impl SurfaceExt {
    pub(crate) fn new(instance: InstanceRef, platform: SurfacePlatformExt, imp: imp::Surface) -> Self {
        SurfaceExt {
            instance,
            platform,
            imp,
        }
    }

    pub(crate) fn instance_id(&self) -> u64 {
        self.instance.id
    }

    pub(crate) fn imp(&self) -> &imp::Surface {
        &self.imp
    }

    pub fn get_platform(&self) -> SurfacePlatformExt {
        self.platform
    }
}

impl std::fmt::Debug for SurfaceExt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceExt")
            .field("platform", &self.platform)
            .finish_non_exhaustive()
    }
}
