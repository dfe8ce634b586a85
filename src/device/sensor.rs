// MIT License - Copyright (c) 2026 insteon-hub-bridge authors

//! Broadcast-only sensor logic: open/close contacts, leak sensors and
//! generic digital sensors (motion, smoke bridge).
//!
//! Insteon sensors broadcast state changes but do not answer status
//! requests, so all variants here are read-only with a no-op status
//! requester. Automation commands addressed to them are ignored.

use crate::constants;
use crate::types::{AutomationCommand, AutomationState};
use crate::update::HubUpdate;

use super::{request_status_unsupported, Device, DeviceLogic};

/// Open/close contact: On events mean OPEN, Off events mean CLOSED.
pub(crate) static OPEN_CLOSE_LOGIC: DeviceLogic = DeviceLogic {
    handle_command: read_only,
    handle_update: handle_open_close_update,
    request_status: request_status_unsupported,
};

/// Leak sensor: wet/dry is carried in cmd2 of an On broadcast.
pub(crate) static LEAK_LOGIC: DeviceLogic = DeviceLogic {
    handle_command: read_only,
    handle_update: handle_leak_update,
    request_status: request_status_unsupported,
};

/// Generic on/off digital sensor (motion sensor, smoke bridge).
pub(crate) static DIGITAL_LOGIC: DeviceLogic = DeviceLogic {
    handle_command: read_only,
    handle_update: handle_digital_update,
    request_status: request_status_unsupported,
};

fn read_only(_device: &Device, _command: &AutomationCommand) {}

fn handle_open_close_update(device: &Device, update: &HubUpdate) {
    let HubUpdate::Std(msg) = update;
    match msg.cmd1 {
        constants::CMD1_OFF | constants::CMD1_OFF_FAST => {
            device.post_update(AutomationState::Closed);
        }
        constants::CMD1_ON | constants::CMD1_ON_FAST => {
            device.post_update(AutomationState::Open);
        }
        _ => {}
    }
}

const LEAK_CMD2_DRY: u8 = 0x01;
const LEAK_CMD2_WET: u8 = 0x02;

fn handle_leak_update(device: &Device, update: &HubUpdate) {
    let HubUpdate::Std(msg) = update;
    if msg.cmd1 == constants::CMD1_ON {
        match msg.cmd2 {
            LEAK_CMD2_WET => device.post_update(AutomationState::On),
            LEAK_CMD2_DRY => device.post_update(AutomationState::Off),
            _ => {}
        }
    }
}

fn handle_digital_update(device: &Device, update: &HubUpdate) {
    let HubUpdate::Std(msg) = update;
    match msg.cmd1 {
        constants::CMD1_ON | constants::CMD1_ON_FAST => {
            device.post_update(AutomationState::On);
        }
        constants::CMD1_OFF | constants::CMD1_OFF_FAST => {
            device.post_update(AutomationState::Off);
        }
        _ => {}
    }
}
