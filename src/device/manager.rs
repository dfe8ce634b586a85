// MIT License - Copyright (c) 2026 insteon-hub-bridge authors

//! Registry of configured devices, keyed by device ID.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::bus::{HubBus, ListenerId};
use crate::codec::DeviceId;

use super::Device;

struct Registered {
    device: Arc<Device>,
    listener: ListenerId,
}

/// Concurrency-safe registry of [`Device`]s. The single source of truth
/// for which device owns a device ID: adding a device at an occupied ID
/// detaches the superseded device from the bus before the new one is
/// registered, so no two devices ever receive events for the same ID.
pub struct DeviceManager {
    bus: HubBus,
    devices: Mutex<HashMap<DeviceId, Registered>>,
}

impl DeviceManager {
    pub fn new(bus: HubBus) -> Self {
        Self {
            bus,
            devices: Mutex::new(HashMap::new()),
        }
    }

    /// Register a device on the bus and in the registry, replacing and
    /// detaching any existing device at the same ID.
    pub fn add(&self, device: Arc<Device>) {
        let mut devices = self.devices.lock().expect("device map poisoned");
        let id = device.device_id();
        if let Some(existing) = devices.remove(&id) {
            self.bus.remove_listener(existing.listener);
        }
        let listener = self.bus.add_listener(device.clone());
        devices.insert(id, Registered { device, listener });
    }

    /// Detach and return the device at the given ID.
    pub fn remove(&self, device_id: DeviceId) -> Option<Arc<Device>> {
        let mut devices = self.devices.lock().expect("device map poisoned");
        let existing = devices.remove(&device_id)?;
        self.bus.remove_listener(existing.listener);
        Some(existing.device)
    }

    pub fn get(&self, device_id: DeviceId) -> Option<Arc<Device>> {
        let devices = self.devices.lock().expect("device map poisoned");
        devices.get(&device_id).map(|r| r.device.clone())
    }

    /// Detach every device.
    pub fn clear(&self) {
        let mut devices = self.devices.lock().expect("device map poisoned");
        for (_, existing) in devices.drain() {
            self.bus.remove_listener(existing.listener);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.devices.lock().expect("device map poisoned").is_empty()
    }

    /// Ask the hub for the current status of every registered device.
    pub fn request_all_statuses(&self) {
        let snapshot: Vec<Arc<Device>> = {
            let devices = self.devices.lock().expect("device map poisoned");
            devices.values().map(|r| r.device.clone()).collect()
        };
        for device in snapshot {
            device.request_status();
        }
    }
}
