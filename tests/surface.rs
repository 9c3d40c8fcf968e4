// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
#![cfg(not(any(feature = "backend_wgpu", feature = "disable_validation")))]

mod common;

use std::num::{NonZeroIsize, NonZeroU32};
use std::ptr::NonNull;

use llri::{
    Error, Extent2D, Format, InstanceExtension, PresentModeExt, QueueType,
    ResourceUsageFlagBits, SurfaceDescExt, SurfaceExt, SurfacePlatformExt, SwapchainDescExt,
};
use raw_window_handle::{
    Win32WindowHandle, XcbDisplayHandle, XcbWindowHandle, XlibDisplayHandle, XlibWindowHandle,
};

/// Handles the software backend accepts.  They name no real window.
fn xlib() -> SurfaceDescExt {
    SurfaceDescExt::Xlib {
        display: XlibDisplayHandle::new(Some(NonNull::dangling()), 0),
        window: XlibWindowHandle::new(1),
    }
}

fn swapchain_desc(surface: &SurfaceExt) -> SwapchainDescExt<'_> {
    SwapchainDescExt {
        surface,
        texture_count: 2,
        extent: Extent2D::new(640, 480),
        format: Format::BGRA8UNorm,
        present_mode: PresentModeExt::Fifo,
        usage: ResourceUsageFlagBits::ColorAttachment.into(),
    }
}

#[test]
fn surfaces_need_their_platform_extension() {
    let _serial = common::serial();
    let instance = common::instance_with(&[InstanceExtension::SurfaceWin32]);
    assert_eq!(
        instance.create_surface_ext(&xlib()).err(),
        Some(Error::ExtensionNotEnabled)
    );
}

#[test]
fn surfaces_need_their_handles() {
    let _serial = common::serial();
    let instance = common::instance_with(&[
        InstanceExtension::SurfaceWin32,
        InstanceExtension::SurfaceXlib,
        InstanceExtension::SurfaceXcb,
    ]);
    let no_hinstance = SurfaceDescExt::Win32 {
        window: Win32WindowHandle::new(NonZeroIsize::MIN),
    };
    let no_display = SurfaceDescExt::Xlib {
        display: XlibDisplayHandle::new(None, 0),
        window: XlibWindowHandle::new(1),
    };
    let no_window = SurfaceDescExt::Xlib {
        display: XlibDisplayHandle::new(Some(NonNull::dangling()), 0),
        window: XlibWindowHandle::new(0),
    };
    let no_connection = SurfaceDescExt::Xcb {
        connection: XcbDisplayHandle::new(None, 0),
        window: XcbWindowHandle::new(NonZeroU32::MIN),
    };
    for desc in [no_hinstance, no_display, no_window, no_connection] {
        assert_eq!(
            instance.create_surface_ext(&desc).err(),
            Some(Error::InvalidUsage),
            "{desc:?}"
        );
    }

    let mut window = Win32WindowHandle::new(NonZeroIsize::MIN);
    window.hinstance = NonZeroIsize::new(1);
    let surface = instance
        .create_surface_ext(&SurfaceDescExt::Win32 { window })
        .expect("win32 surface");
    assert_eq!(surface.get_platform(), SurfacePlatformExt::Win32);
    instance.destroy_surface_ext(surface).expect("destroy surface");
}

#[test]
fn capabilities_and_present_support() {
    let _serial = common::serial();
    let instance = common::instance_with(&[InstanceExtension::SurfaceXlib]);
    let adapter = common::adapter_with_nodes(&instance, 1);
    let surface = instance.create_surface_ext(&xlib()).expect("surface");

    let capabilities = adapter
        .query_surface_capabilities_ext(&surface)
        .expect("capabilities");
    assert!(capabilities.min_texture_count >= 1);
    assert!(capabilities.min_texture_count <= capabilities.max_texture_count);
    assert!(capabilities.present_modes.contains(&PresentModeExt::Fifo));
    assert!(!capabilities.formats.is_empty());
    assert!(
        capabilities
            .usage_bits
            .contains(ResourceUsageFlagBits::ColorAttachment)
    );

    assert_eq!(
        adapter.query_surface_present_support_ext(&surface, QueueType::Graphics),
        Ok(true)
    );
    assert_eq!(
        adapter.query_surface_present_support_ext(&surface, QueueType::Transfer),
        Ok(false)
    );
}

#[test]
fn swapchains_need_the_device_extension() {
    let _serial = common::serial();
    let instance = common::instance_with(&[InstanceExtension::SurfaceXlib]);
    let device = common::graphics_device(&instance);
    let surface = instance.create_surface_ext(&xlib()).expect("surface");
    assert_eq!(
        device.create_swapchain_ext(&swapchain_desc(&surface)).err(),
        Some(Error::ExtensionNotEnabled)
    );
}

#[test]
fn swapchains_keep_their_descriptor() {
    let _serial = common::serial();
    let instance = common::instance_with(&[InstanceExtension::SurfaceXlib]);
    let adapter = common::adapter_with_nodes(&instance, 1);
    let device = common::swapchain_device(&instance, &adapter);
    let surface = instance.create_surface_ext(&xlib()).expect("surface");
    let desc = swapchain_desc(&surface);
    let swapchain = device.create_swapchain_ext(&desc).expect("swapchain");
    assert_eq!(swapchain.get_desc(), desc.info());
    device
        .destroy_swapchain_ext(swapchain)
        .expect("destroy swapchain");
}

#[test]
fn swapchains_stay_within_capabilities() {
    let _serial = common::serial();
    let instance = common::instance_with(&[InstanceExtension::SurfaceXlib]);
    let adapter = common::adapter_with_nodes(&instance, 1);
    let device = common::swapchain_device(&instance, &adapter);
    let surface = instance.create_surface_ext(&xlib()).expect("surface");
    let capabilities = adapter
        .query_surface_capabilities_ext(&surface)
        .expect("capabilities");
    let valid = swapchain_desc(&surface);
    let cases = [
        SwapchainDescExt {
            texture_count: capabilities.max_texture_count + 1,
            ..valid
        },
        SwapchainDescExt {
            texture_count: capabilities.min_texture_count - 1,
            ..valid
        },
        SwapchainDescExt {
            extent: Extent2D::new(0, 480),
            ..valid
        },
        SwapchainDescExt {
            extent: Extent2D::new(capabilities.max_extent.width + 1, 480),
            ..valid
        },
        SwapchainDescExt {
            format: Format::R32Float,
            ..valid
        },
        SwapchainDescExt {
            usage: llri::ResourceUsageFlags::empty(),
            ..valid
        },
        SwapchainDescExt {
            usage: ResourceUsageFlagBits::ShaderWrite.into(),
            ..valid
        },
    ];
    for desc in cases {
        assert_eq!(
            device.create_swapchain_ext(&desc).err(),
            Some(Error::InvalidUsage),
            "{:?}",
            desc.info()
        );
    }
}

#[test]
fn surfaces_keep_their_instance_alive() {
    let _serial = common::serial();
    let instance = common::instance_with(&[InstanceExtension::SurfaceXlib]);
    let surface = instance.create_surface_ext(&xlib()).expect("surface");
    drop(instance);
    assert_eq!(
        llri::create_instance(&llri::InstanceDesc::default()).err(),
        Some(Error::ExceededLimit)
    );
    drop(surface);
    let next = common::instance_with(&[InstanceExtension::SurfaceXlib]);
    let adapter = common::adapter_with_nodes(&next, 1);
    let surface = next.create_surface_ext(&xlib()).expect("surface");
    assert!(adapter.query_surface_capabilities_ext(&surface).is_ok());
    next.destroy_surface_ext(surface).expect("destroy surface");
}
