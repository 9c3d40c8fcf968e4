// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Shared fixtures for the integration tests.
//!
//! Only one instance may be alive per process and the message callback is global, so every
//! test takes [serial] before touching either.
#![allow(dead_code)]

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use llri::{
    Adapter, AdapterExtension, Device, DeviceDesc, Instance, InstanceDesc, InstanceExtension,
    MessageSeverity, MessageSource, QueueDesc, QueuePriority, QueueType,
};

static SERIAL: Mutex<()> = Mutex::new(());

/// Serializes tests within one test binary.
pub fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A message delivered to the user callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub severity: MessageSeverity,
    pub source: MessageSource,
    pub text: String,
}

/// Records every callback message until dropped.
pub struct Messages(Arc<Mutex<Vec<Message>>>);

impl Messages {
    pub fn install() -> Self {
        let messages = Arc::new(Mutex::new(Vec::new()));
        let sink = messages.clone();
        llri::set_user_callback(move |severity, source, text| {
            sink.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(Message {
                    severity,
                    source,
                    text: text.to_string(),
                });
        });
        Messages(messages)
    }

    pub fn take(&self) -> Vec<Message> {
        std::mem::take(&mut *self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Messages at `Warning` or above.
    pub fn take_serious(&self) -> Vec<Message> {
        self.take()
            .into_iter()
            .filter(|m| m.severity as u8 >= MessageSeverity::Warning as u8)
            .collect()
    }
}

impl Drop for Messages {
    fn drop(&mut self) {
        llri::clear_user_callback();
    }
}

pub fn instance() -> Instance {
    llri::create_instance(&InstanceDesc::new("llri tests")).expect("create instance")
}

pub fn instance_with(extensions: &[InstanceExtension]) -> Instance {
    llri::create_instance(&InstanceDesc::new("llri tests").with_extensions(extensions))
        .expect("create instance")
}

pub fn adapters(instance: &Instance) -> Vec<Adapter> {
    let mut adapters = Vec::new();
    instance
        .enumerate_adapters(&mut adapters)
        .expect("enumerate adapters");
    assert!(!adapters.is_empty(), "the software backend always has adapters");
    adapters
}

/// The first adapter with `nodes` nodes.
pub fn adapter_with_nodes(instance: &Instance, nodes: u8) -> Adapter {
    adapters(instance)
        .into_iter()
        .find(|a| a.query_node_count() == nodes)
        .expect("adapter with the requested node count")
}

pub const GRAPHICS: QueueDesc = QueueDesc::new(QueueType::Graphics, QueuePriority::Normal);
pub const COMPUTE: QueueDesc = QueueDesc::new(QueueType::Compute, QueuePriority::High);
pub const TRANSFER: QueueDesc = QueueDesc::new(QueueType::Transfer, QueuePriority::Normal);

pub fn device(instance: &Instance, adapter: &Adapter, queues: &[QueueDesc]) -> Device {
    instance
        .create_device(&DeviceDesc::new(adapter, queues))
        .expect("create device")
}

pub fn swapchain_device(instance: &Instance, adapter: &Adapter) -> Device {
    instance
        .create_device(
            &DeviceDesc::new(adapter, &[GRAPHICS]).with_extensions(&[AdapterExtension::Swapchain]),
        )
        .expect("create device")
}

/// A device with one graphics queue on the first single-node adapter.
pub fn graphics_device(instance: &Instance) -> Device {
    let adapter = adapter_with_nodes(instance, 1);
    device(instance, &adapter, &[GRAPHICS])
}
