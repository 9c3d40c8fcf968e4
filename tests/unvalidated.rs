// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
#![cfg(all(not(feature = "backend_wgpu"), feature = "disable_validation"))]

mod common;

use common::Messages;
use llri::{
    CommandListAllocDesc, CommandListBeginDesc, FenceFlags, Format, MessageSource, QueueType,
    ResourceBarrier, ResourceDesc, ResourceState, ResourceUsageFlagBits, SubmitDesc,
};

const BEGIN: CommandListBeginDesc = CommandListBeginDesc {};

#[test]
fn invalid_barriers_reach_the_backend_unreported() {
    let _serial = common::serial();
    let messages = Messages::install();
    let instance = common::instance_with(&[llri::InstanceExtension::DriverValidation]);
    let device = common::graphics_device(&instance);
    let queue = device.get_queue(QueueType::Graphics, 0).expect("queue");
    let transfer_only = device
        .create_resource(&ResourceDesc::texture_2d(
            Format::RGBA8UNorm,
            ResourceUsageFlagBits::TransferDst.into(),
            ResourceState::TransferDst,
            64,
            64,
            1,
            1,
        ))
        .expect("create texture");
    let group = device.create_command_group(QueueType::Graphics).expect("group");
    let fence = device.create_fence(FenceFlags::empty()).expect("fence");

    //ShaderReadOnly needs Sampled usage
    let first = group
        .allocate(&CommandListAllocDesc::default())
        .expect("allocate");
    assert_eq!(
        first.record(&BEGIN, |list| {
            list.resource_barrier(&ResourceBarrier::transition(
                &transfer_only,
                ResourceState::TransferDst,
                ResourceState::ShaderReadOnly,
            ))
        }),
        Ok(())
    );
    queue
        .submit(&SubmitDesc::new(&[&first]).with_fence(&fence))
        .expect("submit");
    device.wait_fence(&fence, llri::TIMEOUT_MAX).expect("wait");
    drop(first);

    //the backend executed the transition, so its layout tracking agrees with this one
    let second = group
        .allocate(&CommandListAllocDesc::default())
        .expect("allocate");
    second
        .record(&BEGIN, |list| {
            list.resource_barrier(&ResourceBarrier::transition(
                &transfer_only,
                ResourceState::ShaderReadOnly,
                ResourceState::TransferDst,
            ))
        })
        .expect("record");
    queue
        .submit(&SubmitDesc::new(&[&second]).with_fence(&fence))
        .expect("submit");
    device.wait_fence(&fence, llri::TIMEOUT_MAX).expect("wait");

    let reported = messages.take();
    assert!(
        reported.iter().all(|m| m.source != MessageSource::Api),
        "{reported:?}"
    );
    assert!(
        reported
            .iter()
            .all(|m| (m.severity as u8) < llri::MessageSeverity::Warning as u8),
        "{reported:?}"
    );
}
