// MIT License - Copyright (c) 2026 insteon-hub-bridge authors

//! Per-device-type logic translating automation commands into protocol
//! commands and protocol updates into automation state.

pub mod dimmer;
pub mod manager;
pub mod sensor;
pub mod switch;

pub use manager::DeviceManager;

use std::sync::Arc;

use tracing::debug;

use crate::bus::{BusEvent, BusListener, HubBus};
use crate::codec::DeviceId;
use crate::command::HubCommand;
use crate::types::{AutomationCommand, AutomationState};
use crate::update::HubUpdate;

/// The supported Insteon device types. `Dimmer` covers both dimming
/// in-wall and plug-in modules, `Switch` both on/off in-wall and plug-in
/// modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceType {
    Dimmer,
    Switch,
    OpenCloseSensor,
    LeakSensor,
    MotionSensor,
    SmokeBridge,
}

impl DeviceType {
    /// Parse a configuration string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "DIMMER" => Some(Self::Dimmer),
            "SWITCH" => Some(Self::Switch),
            "OPEN_CLOSE_SENSOR" => Some(Self::OpenCloseSensor),
            "LEAK_SENSOR" => Some(Self::LeakSensor),
            "MOTION_SENSOR" => Some(Self::MotionSensor),
            "SMOKE_BRIDGE" => Some(Self::SmokeBridge),
            _ => None,
        }
    }
}

/// Per-variant behavior table. Selected once at construction; adding a
/// device type means adding an enum case and a table.
pub(crate) struct DeviceLogic {
    pub handle_command: fn(&Device, &AutomationCommand),
    pub handle_update: fn(&Device, &HubUpdate),
    pub request_status: fn(&Device),
}

/// No-op status requester for broadcast-only sensors. The hub caches
/// sensor state but offers no way to query it over this API.
pub(crate) fn request_status_unsupported(_device: &Device) {}

/// A single configured Insteon device.
///
/// Listens on the bus for automation commands and hub updates carrying
/// its own device ID and ignores everything else. Registration on the bus
/// is handled by the [`DeviceManager`].
pub struct Device {
    device_id: DeviceId,
    device_type: DeviceType,
    bus: HubBus,
    logic: &'static DeviceLogic,
}

impl Device {
    pub fn new(device_id: DeviceId, device_type: DeviceType, bus: HubBus) -> Arc<Self> {
        let logic = match device_type {
            DeviceType::Dimmer => &dimmer::LOGIC,
            DeviceType::Switch => &switch::LOGIC,
            DeviceType::OpenCloseSensor => &sensor::OPEN_CLOSE_LOGIC,
            DeviceType::LeakSensor => &sensor::LEAK_LOGIC,
            DeviceType::MotionSensor | DeviceType::SmokeBridge => &sensor::DIGITAL_LOGIC,
        };
        Arc::new(Self {
            device_id,
            device_type,
            bus,
            logic,
        })
    }

    pub fn device_id(&self) -> DeviceId {
        self.device_id
    }

    pub fn device_type(&self) -> DeviceType {
        self.device_type
    }

    /// Ask the hub for this device's current status. A no-op for
    /// broadcast-only sensor types.
    pub fn request_status(&self) {
        (self.logic.request_status)(self);
    }

    pub(crate) fn post_update(&self, state: AutomationState) {
        self.bus.post_automation_update(self.device_id, state);
    }

    pub(crate) fn send_hub_command(&self, command: HubCommand) {
        self.bus.send_hub_command(self.device_id, command);
    }
}

impl BusListener for Device {
    fn on_event(&self, event: &BusEvent) {
        match event {
            BusEvent::AutomationCommand { device_id, command } if *device_id == self.device_id => {
                debug!("Processing {} = {}", self.device_id, command);
                (self.logic.handle_command)(self, command);
            }
            BusEvent::HubUpdate { device_id, update } if *device_id == self.device_id => {
                debug!("Processing {} = {:?}", self.device_id, update);
                (self.logic.handle_update)(self, update);
            }
            _ => {}
        }
    }
}
