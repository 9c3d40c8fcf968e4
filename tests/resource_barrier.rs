// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
#![cfg(not(any(feature = "backend_wgpu", feature = "disable_validation")))]

mod common;

use common::Messages;
use llri::{
    CommandListAllocDesc, CommandListBeginDesc, Device, Error, FenceFlags, Format, MemoryType,
    QueueType, ResourceBarrier, ResourceBarrierType, ResourceDesc, ResourceState,
    ResourceUsageFlagBits, ResourceUsageFlags, SubmitDesc, TextureSubresourceRange,
};

const BEGIN: CommandListBeginDesc = CommandListBeginDesc {};

fn texture(usage: ResourceUsageFlags, mips: u16, layers: u16) -> ResourceDesc {
    ResourceDesc::texture_2d(
        Format::RGBA8UNorm,
        usage,
        ResourceState::TransferDst,
        1024,
        1024,
        layers,
        mips,
    )
}

/// Records `barriers` into a fresh list and reports the first failure.
fn record(device: &Device, barriers: &[ResourceBarrier<'_>]) -> llri::Result<()> {
    let group = device.create_command_group(QueueType::Graphics)?;
    let list = group.allocate(&CommandListAllocDesc::default())?;
    list.record(&BEGIN, |list| list.resource_barriers(barriers))
}

#[test]
fn transition_needs_usage_of_destination() {
    let _serial = common::serial();
    let instance = common::instance();
    let device = common::graphics_device(&instance);

    let transfer_only = device
        .create_resource(&texture(ResourceUsageFlagBits::TransferDst.into(), 1, 1))
        .expect("create texture");
    let barrier = ResourceBarrier::transition(
        &transfer_only,
        ResourceState::TransferDst,
        ResourceState::ShaderReadOnly,
    );
    assert_eq!(record(&device, &[barrier]), Err(Error::InvalidState));

    let sampled = device
        .create_resource(&texture(
            ResourceUsageFlagBits::TransferDst | ResourceUsageFlagBits::Sampled,
            1,
            1,
        ))
        .expect("create texture");
    let barrier = ResourceBarrier::transition(
        &sampled,
        ResourceState::TransferDst,
        ResourceState::ShaderReadOnly,
    );
    assert_eq!(barrier.barrier_type(), ResourceBarrierType::Transition);
    assert_eq!(record(&device, &[barrier]), Ok(()));
}

#[test]
fn partial_ranges_stay_in_bounds() {
    let _serial = common::serial();
    let instance = common::instance();
    let device = common::graphics_device(&instance);
    let resource = device
        .create_resource(&texture(
            ResourceUsageFlagBits::TransferDst | ResourceUsageFlagBits::Sampled,
            10,
            2,
        ))
        .expect("create texture");

    let past_the_end = ResourceBarrier::transition_range(
        &resource,
        ResourceState::TransferDst,
        ResourceState::ShaderReadOnly,
        TextureSubresourceRange::new(9, 5, 0, 1),
    );
    assert_eq!(record(&device, &[past_the_end]), Err(Error::InvalidUsage));

    let inside = ResourceBarrier::transition_range(
        &resource,
        ResourceState::TransferDst,
        ResourceState::ShaderReadOnly,
        TextureSubresourceRange::new(3, 2, 1, 1),
    );
    assert_eq!(record(&device, &[inside]), Ok(()));
}

#[test]
fn same_state_transition_is_invalid() {
    let _serial = common::serial();
    let instance = common::instance();
    let device = common::graphics_device(&instance);
    let resource = device
        .create_resource(&texture(ResourceUsageFlagBits::TransferDst.into(), 1, 1))
        .expect("create texture");
    let barrier = ResourceBarrier::transition(
        &resource,
        ResourceState::TransferDst,
        ResourceState::TransferDst,
    );
    assert_eq!(record(&device, &[barrier]), Err(Error::InvalidUsage));
}

#[test]
fn read_write_barriers_need_shader_write() {
    let _serial = common::serial();
    let instance = common::instance();
    let device = common::graphics_device(&instance);
    let plain = device
        .create_resource(&texture(ResourceUsageFlagBits::TransferDst.into(), 1, 1))
        .expect("create texture");
    assert_eq!(
        record(&device, &[ResourceBarrier::read_write(&plain)]),
        Err(Error::InvalidState)
    );

    let storage = device
        .create_resource(&ResourceDesc::buffer(
            ResourceUsageFlagBits::ShaderWrite.into(),
            MemoryType::Local,
            ResourceState::ShaderReadWrite,
            1024,
        ))
        .expect("create buffer");
    let barrier = ResourceBarrier::read_write(&storage);
    assert_eq!(barrier.barrier_type(), ResourceBarrierType::ReadWrite);
    assert_eq!(record(&device, &[barrier]), Ok(()));
}

#[test]
fn depth_states_are_for_2d_textures() {
    let _serial = common::serial();
    let instance = common::instance();
    let device = common::graphics_device(&instance);
    let buffer = device
        .create_resource(&ResourceDesc::buffer(
            ResourceUsageFlagBits::TransferDst.into(),
            MemoryType::Local,
            ResourceState::TransferDst,
            256,
        ))
        .expect("create buffer");
    let barrier = ResourceBarrier::transition(
        &buffer,
        ResourceState::TransferDst,
        ResourceState::DepthStencilAttachment,
    );
    assert_eq!(record(&device, &[barrier]), Err(Error::InvalidState));
}

#[test]
fn barriers_need_a_recording_list() {
    let _serial = common::serial();
    let instance = common::instance();
    let device = common::graphics_device(&instance);
    let resource = device
        .create_resource(&texture(ResourceUsageFlagBits::TransferDst.into(), 1, 1))
        .expect("create texture");
    let group = device.create_command_group(QueueType::Graphics).expect("group");
    let list = group
        .allocate(&CommandListAllocDesc::default())
        .expect("allocate");
    let barrier = ResourceBarrier::read_write(&resource);
    assert_eq!(list.resource_barrier(&barrier), Err(Error::InvalidState));
    list.begin(&BEGIN).expect("begin");
    assert_eq!(list.resource_barriers(&[]), Err(Error::InvalidUsage));
    list.end().expect("end");
}

#[test]
fn foreign_resources_are_rejected() {
    let _serial = common::serial();
    let instance = common::instance();
    let device = common::graphics_device(&instance);
    let other = common::graphics_device(&instance);
    let foreign = other
        .create_resource(&texture(
            ResourceUsageFlagBits::TransferDst | ResourceUsageFlagBits::Sampled,
            1,
            1,
        ))
        .expect("create texture");
    let barrier = ResourceBarrier::transition(
        &foreign,
        ResourceState::TransferDst,
        ResourceState::ShaderReadOnly,
    );
    assert_eq!(record(&device, &[barrier]), Err(Error::InvalidUsage));
}

#[test]
fn executed_transitions_match_tracked_layouts() {
    let _serial = common::serial();
    let messages = Messages::install();
    let instance = common::instance_with(&[llri::InstanceExtension::DriverValidation]);
    let device = common::graphics_device(&instance);
    let queue = device.get_queue(QueueType::Graphics, 0).expect("queue");
    let resource = device
        .create_resource(&texture(
            ResourceUsageFlagBits::TransferDst | ResourceUsageFlagBits::Sampled,
            4,
            1,
        ))
        .expect("create texture");

    let group = device.create_command_group(QueueType::Graphics).expect("group");
    let list = group
        .allocate(&CommandListAllocDesc::default())
        .expect("allocate");
    list.record(&BEGIN, |list| {
        list.resource_barrier(&ResourceBarrier::transition(
            &resource,
            ResourceState::TransferDst,
            ResourceState::ShaderReadOnly,
        ))
    })
    .expect("record");
    let fence = device.create_fence(FenceFlags::empty()).expect("fence");
    queue
        .submit(&SubmitDesc::new(&[&list]).with_fence(&fence))
        .expect("submit");
    device.wait_fence(&fence, llri::TIMEOUT_MAX).expect("wait");
    assert_eq!(messages.take_serious(), Vec::new());
}

#[cfg(not(feature = "disable_implementation_message_polling"))]
#[test]
fn stale_old_state_is_reported_by_driver_validation() {
    let _serial = common::serial();
    let messages = Messages::install();
    let instance = common::instance_with(&[llri::InstanceExtension::DriverValidation]);
    let device = common::graphics_device(&instance);
    let queue = device.get_queue(QueueType::Graphics, 0).expect("queue");
    let resource = device
        .create_resource(&texture(
            ResourceUsageFlagBits::TransferDst | ResourceUsageFlagBits::Sampled,
            1,
            1,
        ))
        .expect("create texture");

    let group = device.create_command_group(QueueType::Graphics).expect("group");
    let list = group
        .allocate(&CommandListAllocDesc::default())
        .expect("allocate");
    //the texture is still in TransferDst
    list.record(&BEGIN, |list| {
        list.resource_barrier(&ResourceBarrier::transition(
            &resource,
            ResourceState::ShaderReadOnly,
            ResourceState::TransferDst,
        ))
    })
    .expect("record");
    let fence = device.create_fence(FenceFlags::empty()).expect("fence");
    queue
        .submit(&SubmitDesc::new(&[&list]).with_fence(&fence))
        .expect("submit");
    device.wait_fence(&fence, llri::TIMEOUT_MAX).expect("wait");

    let reported = messages.take_serious();
    assert_eq!(reported.len(), 1, "{reported:?}");
    assert_eq!(reported[0].severity, llri::MessageSeverity::Error);
    assert_eq!(reported[0].source, llri::MessageSource::Implementation);
}
