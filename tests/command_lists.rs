// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
#![cfg(not(any(feature = "backend_wgpu", feature = "disable_validation")))]

mod common;

use llri::{
    CommandListAllocDesc, CommandListBeginDesc, CommandListState, CommandListUsage, Error,
    QueueType,
};

const BEGIN: CommandListBeginDesc = CommandListBeginDesc {};

#[test]
fn lifecycle() {
    let _serial = common::serial();
    let instance = common::instance();
    let device = common::graphics_device(&instance);
    let group = device.create_command_group(QueueType::Graphics).expect("group");
    let list = group
        .allocate(&CommandListAllocDesc::default())
        .expect("allocate");
    assert_eq!(list.query_state(), CommandListState::Empty);
    assert_eq!(list.get_desc(), CommandListAllocDesc::default());
    assert_eq!(list.end(), Err(Error::InvalidState));

    list.begin(&BEGIN).expect("begin");
    assert_eq!(list.query_state(), CommandListState::Recording);
    assert_eq!(list.begin(&BEGIN), Err(Error::InvalidState));
    list.end().expect("end");
    assert_eq!(list.query_state(), CommandListState::Ready);
    assert_eq!(list.end(), Err(Error::InvalidState));
    assert_eq!(list.begin(&BEGIN), Err(Error::InvalidState));

    group.reset().expect("reset");
    assert_eq!(list.query_state(), CommandListState::Empty);
    list.begin(&BEGIN).expect("begin after reset");
    list.end().expect("end");
}

#[test]
fn one_recording_list_per_group() {
    let _serial = common::serial();
    let instance = common::instance();
    let device = common::graphics_device(&instance);
    let group = device.create_command_group(QueueType::Graphics).expect("group");
    let mut lists = Vec::new();
    group
        .allocate_many(&CommandListAllocDesc::default(), 2, &mut lists)
        .expect("allocate");
    assert_eq!(lists.len(), 2);

    lists[0].begin(&BEGIN).expect("begin");
    assert_eq!(lists[1].begin(&BEGIN), Err(Error::Occupied));
    lists[0].end().expect("end");
    lists[1].begin(&BEGIN).expect("begin once the sibling ended");
    lists[1].end().expect("end");
}

#[test]
fn reset_while_recording_changes_nothing() {
    let _serial = common::serial();
    let instance = common::instance();
    let device = common::graphics_device(&instance);
    let group = device.create_command_group(QueueType::Graphics).expect("group");
    let ready = group
        .allocate(&CommandListAllocDesc::default())
        .expect("allocate");
    let recording = group
        .allocate(&CommandListAllocDesc::default())
        .expect("allocate");
    ready.record(&BEGIN, |_| Ok(())).expect("record");
    recording.begin(&BEGIN).expect("begin");

    assert_eq!(group.reset(), Err(Error::InvalidState));
    assert_eq!(ready.query_state(), CommandListState::Ready);
    assert_eq!(recording.query_state(), CommandListState::Recording);

    recording.end().expect("end");
    group.reset().expect("reset");
    assert_eq!(ready.query_state(), CommandListState::Empty);
    assert_eq!(recording.query_state(), CommandListState::Empty);
}

#[test]
fn record_ends_even_when_commands_fail() {
    let _serial = common::serial();
    let instance = common::instance();
    let device = common::graphics_device(&instance);
    let group = device.create_command_group(QueueType::Graphics).expect("group");
    let list = group
        .allocate(&CommandListAllocDesc::default())
        .expect("allocate");
    let result = list.record(&BEGIN, |_| Err(Error::OutOfHostMemory));
    assert_eq!(result, Err(Error::OutOfHostMemory));
    assert_eq!(list.query_state(), CommandListState::Ready);
}

#[test]
fn allocation_validates_node_masks() {
    let _serial = common::serial();
    let instance = common::instance();
    let device = common::graphics_device(&instance);
    let group = device.create_command_group(QueueType::Graphics).expect("group");
    let two_bits = CommandListAllocDesc {
        node_mask: 0b11,
        usage: CommandListUsage::Direct,
    };
    assert_eq!(group.allocate(&two_bits).err(), Some(Error::InvalidNodeMask));
    let missing_node = CommandListAllocDesc {
        node_mask: 0b10,
        usage: CommandListUsage::Direct,
    };
    assert_eq!(
        group.allocate(&missing_node).err(),
        Some(Error::InvalidNodeMask)
    );

    let mut lists = Vec::new();
    assert_eq!(
        group.allocate_many(&CommandListAllocDesc::default(), 0, &mut lists),
        Err(Error::InvalidUsage)
    );
    assert!(lists.is_empty());
}

#[test]
fn linked_adapters_allocate_per_node() {
    let _serial = common::serial();
    let instance = common::instance();
    let adapter = common::adapter_with_nodes(&instance, 2);
    let device = common::device(&instance, &adapter, &[common::GRAPHICS]);
    let group = device.create_command_group(QueueType::Graphics).expect("group");
    let second = CommandListAllocDesc {
        node_mask: 0b10,
        usage: CommandListUsage::Direct,
    };
    let list = group.allocate(&second).expect("allocate for node 1");
    assert_eq!(list.get_desc().node_mask, 0b10);
}

#[test]
fn free_checks_ownership_and_state() {
    let _serial = common::serial();
    let instance = common::instance();
    let device = common::graphics_device(&instance);
    let group = device.create_command_group(QueueType::Graphics).expect("group");
    let other = device.create_command_group(QueueType::Graphics).expect("group");

    let foreign = other
        .allocate(&CommandListAllocDesc::default())
        .expect("allocate");
    foreign.record(&BEGIN, |_| Ok(())).expect("record");
    let (error, foreign) = group.free(foreign).expect_err("foreign list");
    assert_eq!(error, Error::InvalidUsage);
    // still tracked by its own group, which resets it
    other.reset().expect("reset");
    assert_eq!(foreign.query_state(), CommandListState::Empty);
    other.free(foreign).expect("free through its own group");

    let mut lists = Vec::new();
    group
        .allocate_many(&CommandListAllocDesc::default(), 2, &mut lists)
        .expect("allocate");
    let sibling = lists.pop().expect("two lists");
    let recording = lists.pop().expect("two lists");
    recording.begin(&BEGIN).expect("begin");
    let (error, recording) = group.free(recording).expect_err("recording list");
    assert_eq!(error, Error::InvalidState);
    assert_eq!(recording.query_state(), CommandListState::Recording);
    assert_eq!(sibling.begin(&BEGIN), Err(Error::Occupied));
    assert_eq!(group.reset(), Err(Error::InvalidState));

    recording.end().expect("end");
    group.free(recording).expect("free");
    sibling.begin(&BEGIN).expect("begin once the slot is free");
    sibling.end().expect("end");
    group.free(sibling).expect("free");
}

#[test]
fn free_many_frees_all_or_nothing() {
    let _serial = common::serial();
    let instance = common::instance();
    let device = common::graphics_device(&instance);
    let group = device.create_command_group(QueueType::Graphics).expect("group");

    let (error, empty) = group.free_many(Vec::new()).expect_err("empty");
    assert_eq!(error, Error::InvalidUsage);
    assert!(empty.is_empty());

    let mut lists = Vec::new();
    group
        .allocate_many(&CommandListAllocDesc::default(), 3, &mut lists)
        .expect("allocate");
    lists[2].begin(&BEGIN).expect("begin");
    let (error, lists) = group.free_many(lists).expect_err("one list is recording");
    assert_eq!(error, Error::InvalidState);
    assert_eq!(lists.len(), 3);
    assert_eq!(lists[0].begin(&BEGIN), Err(Error::Occupied));

    lists[2].end().expect("end");
    group.free_many(lists).expect("free many");
    let list = group
        .allocate(&CommandListAllocDesc::default())
        .expect("allocate");
    list.begin(&BEGIN).expect("begin after freeing the group's lists");
    list.end().expect("end");
}

#[test]
fn lists_outliving_their_group_are_invalid() {
    let _serial = common::serial();
    let instance = common::instance();
    let device = common::graphics_device(&instance);
    let group = device.create_command_group(QueueType::Graphics).expect("group");
    let list = group
        .allocate(&CommandListAllocDesc::default())
        .expect("allocate");
    device.destroy_command_group(group).expect("destroy group");
    assert_eq!(list.begin(&BEGIN), Err(Error::InvalidState));
    assert_eq!(list.end(), Err(Error::InvalidState));
}
