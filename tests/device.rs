// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
#![cfg(not(any(feature = "backend_wgpu", feature = "disable_validation")))]

mod common;

use llri::{
    Error, FenceFlagBits, FenceFlags, Format, MemoryType, QueueType, ResourceDesc, ResourceState,
    ResourceUsageFlagBits, ResourceUsageFlags, SampleCount,
};

fn sampled_texture(width: u32, height: u32, mips: u16) -> ResourceDesc {
    ResourceDesc::texture_2d(
        Format::RGBA8UNorm,
        ResourceUsageFlagBits::TransferDst | ResourceUsageFlagBits::Sampled,
        ResourceState::TransferDst,
        width,
        height,
        1,
        mips,
    )
}

#[test]
fn resources_keep_their_descriptor() {
    let _serial = common::serial();
    let instance = common::instance();
    let device = common::graphics_device(&instance);
    let descs = [
        sampled_texture(256, 128, 4),
        ResourceDesc::buffer(
            ResourceUsageFlagBits::TransferSrc.into(),
            MemoryType::Upload,
            ResourceState::Upload,
            4096,
        ),
        ResourceDesc::buffer(
            ResourceUsageFlagBits::TransferDst.into(),
            MemoryType::Read,
            ResourceState::TransferDst,
            4096,
        ),
        ResourceDesc::texture_3d(
            Format::R32Float,
            ResourceUsageFlagBits::ShaderWrite.into(),
            ResourceState::ShaderReadWrite,
            64,
            64,
            64,
            1,
        ),
        ResourceDesc::texture_2d(
            Format::D24UNormS8UInt,
            ResourceUsageFlagBits::DepthStencilAttachment | ResourceUsageFlagBits::DenyShaderResource,
            ResourceState::DepthStencilAttachment,
            640,
            480,
            1,
            1,
        )
        .with_sample_count(SampleCount::Count4),
    ];
    for desc in descs {
        let resource = device.create_resource(&desc).expect("create resource");
        assert_eq!(resource.get_desc(), desc);
        device.destroy_resource(resource).expect("destroy resource");
    }
}

#[test]
fn resource_rules_reject_bad_descriptors() {
    let _serial = common::serial();
    let instance = common::instance();
    let device = common::graphics_device(&instance);
    let cases = [
        (
            "second node on a single-node device",
            sampled_texture(64, 64, 1).with_node_masks(0b10, 0b10),
            Error::InvalidNodeMask,
        ),
        (
            "visible mask missing the create node",
            sampled_texture(64, 64, 1).with_node_masks(0b01, 0b10),
            Error::InvalidNodeMask,
        ),
        (
            "buffers can't be sampled",
            ResourceDesc::buffer(
                ResourceUsageFlagBits::Sampled.into(),
                MemoryType::Local,
                ResourceState::General,
                64,
            ),
            Error::InvalidUsage,
        ),
        (
            "textures need local memory",
            sampled_texture(64, 64, 1).with_memory_type(MemoryType::Upload),
            Error::InvalidUsage,
        ),
        (
            "upload memory starts in Upload",
            ResourceDesc::buffer(
                ResourceUsageFlagBits::TransferSrc.into(),
                MemoryType::Upload,
                ResourceState::TransferSrc,
                64,
            ),
            Error::InvalidUsage,
        ),
        (
            "local memory never starts in Upload",
            ResourceDesc::buffer(
                ResourceUsageFlagBits::TransferSrc.into(),
                MemoryType::Local,
                ResourceState::Upload,
                64,
            ),
            Error::InvalidUsage,
        ),
        (
            "zero width",
            ResourceDesc::buffer(
                ResourceUsageFlags::empty(),
                MemoryType::Local,
                ResourceState::General,
                0,
            ),
            Error::InvalidUsage,
        ),
        (
            "initial state needs its usage",
            ResourceDesc {
                initial_state: ResourceState::ColorAttachment,
                ..sampled_texture(64, 64, 1)
            },
            Error::InvalidUsage,
        ),
        (
            "too wide",
            sampled_texture(16385, 1, 1),
            Error::InvalidUsage,
        ),
        (
            "mip chain longer than the width allows",
            sampled_texture(64, 64, 7),
            Error::InvalidUsage,
        ),
        (
            "multisampling without an attachment",
            sampled_texture(64, 64, 1).with_sample_count(SampleCount::Count4),
            Error::InvalidUsage,
        ),
        (
            "undefined texture format",
            ResourceDesc::texture_2d(
                Format::Undefined,
                ResourceUsageFlagBits::Sampled.into(),
                ResourceState::ShaderReadOnly,
                64,
                64,
                1,
                1,
            ),
            Error::InvalidFormat,
        ),
        (
            "three-component formats can't be render targets",
            ResourceDesc::texture_2d(
                Format::RGB32Float,
                ResourceUsageFlagBits::ColorAttachment.into(),
                ResourceState::ColorAttachment,
                64,
                64,
                1,
                1,
            ),
            Error::InvalidFormat,
        ),
    ];
    for (name, desc, expected) in cases {
        assert_eq!(
            device.create_resource(&desc).err(),
            Some(expected),
            "{name}: {desc:?}"
        );
    }
}

#[test]
fn linked_adapters_place_resources_on_any_node() {
    let _serial = common::serial();
    let instance = common::instance();
    let adapter = common::adapter_with_nodes(&instance, 2);
    let device = common::device(&instance, &adapter, &[common::GRAPHICS]);
    let desc = sampled_texture(64, 64, 1).with_node_masks(0b10, 0b11);
    let resource = device.create_resource(&desc).expect("create on node 1");
    assert_eq!(resource.get_desc().create_node_mask, 0b10);
    let out_of_range = sampled_texture(64, 64, 1).with_node_masks(0b100, 0b100);
    assert_eq!(
        device.create_resource(&out_of_range).err(),
        Some(Error::InvalidNodeMask)
    );
}

#[test]
fn fences_accept_only_defined_flags() {
    let _serial = common::serial();
    let instance = common::instance();
    let device = common::graphics_device(&instance);
    let plain = device.create_fence(FenceFlags::empty()).expect("fence");
    assert!(!plain.is_signaled());
    let signaled = device
        .create_fence(FenceFlagBits::Signaled.into())
        .expect("signaled fence");
    assert!(signaled.is_signaled());
    assert_eq!(signaled.get_flags(), FenceFlags::from(FenceFlagBits::Signaled));
    let undefined = FenceFlags::from_bits_retain(0b10);
    assert_eq!(device.create_fence(undefined).err(), Some(Error::InvalidUsage));
}

#[test]
fn command_groups_need_a_queue_of_their_type() {
    let _serial = common::serial();
    let instance = common::instance();
    let device = common::graphics_device(&instance);
    let group = device
        .create_command_group(QueueType::Graphics)
        .expect("graphics group");
    assert_eq!(group.get_type(), QueueType::Graphics);
    assert_eq!(
        device.create_command_group(QueueType::Compute).err(),
        Some(Error::InvalidUsage)
    );
    device.destroy_command_group(group).expect("destroy group");
}

#[test]
fn objects_must_be_destroyed_by_their_device() {
    let _serial = common::serial();
    let instance = common::instance();
    let first = common::graphics_device(&instance);
    let second = common::graphics_device(&instance);
    let fence = first.create_fence(FenceFlags::empty()).expect("fence");
    assert_eq!(second.destroy_fence(fence), Err(Error::InvalidUsage));
    let semaphore = first.create_semaphore().expect("semaphore");
    assert_eq!(second.destroy_semaphore(semaphore), Err(Error::InvalidUsage));
    let group = first
        .create_command_group(QueueType::Graphics)
        .expect("group");
    assert_eq!(second.destroy_command_group(group), Err(Error::InvalidUsage));
    let resource = first
        .create_resource(&sampled_texture(16, 16, 1))
        .expect("resource");
    assert_eq!(second.destroy_resource(resource), Err(Error::InvalidUsage));
}

#[test]
fn device_memory_runs_out() {
    let _serial = common::serial();
    let instance = common::instance();
    let device = common::graphics_device(&instance);
    let big = ResourceDesc::buffer(
        ResourceUsageFlagBits::TransferDst.into(),
        MemoryType::Read,
        ResourceState::TransferDst,
        u32::MAX,
    );
    let mut held = Vec::new();
    let error = loop {
        match device.create_resource(&big) {
            Ok(resource) => held.push(resource),
            Err(e) => break e,
        }
        assert!(held.len() < 64, "host memory should run out");
    };
    assert_eq!(error, Error::OutOfDeviceMemory);
}
