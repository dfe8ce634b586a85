// MIT License - Copyright (c) 2026 insteon-hub-bridge authors

//! On/off switch module logic.

use tracing::debug;

use crate::command::HubCommand;
use crate::constants;
use crate::types::{AutomationCommand, AutomationState};
use crate::update::HubUpdate;

use super::{Device, DeviceLogic};

pub(crate) static LOGIC: DeviceLogic = DeviceLogic {
    handle_command,
    handle_update,
    request_status,
};

fn handle_command(device: &Device, command: &AutomationCommand) {
    match command {
        AutomationCommand::On => set_power(device, true),
        AutomationCommand::Off => set_power(device, false),
        other => debug!("Ignoring non-switch command '{other}'"),
    }
}

fn set_power(device: &Device, power: bool) {
    if power {
        device.send_hub_command(HubCommand::fast_on(device.device_id(), 0xFF));
    } else {
        device.send_hub_command(HubCommand::fast_off(device.device_id()));
    }
}

fn handle_update(device: &Device, update: &HubUpdate) {
    let HubUpdate::Std(msg) = update;
    if msg.flags.is_ack() {
        // level response; anything nonzero is on
        if msg.cmd2 == 0 {
            device.post_update(AutomationState::Off);
        } else {
            device.post_update(AutomationState::On);
        }
    } else {
        match msg.cmd1 {
            constants::CMD1_OFF | constants::CMD1_OFF_FAST => {
                device.post_update(AutomationState::Off);
            }
            constants::CMD1_ON | constants::CMD1_ON_FAST => {
                device.post_update(AutomationState::On);
            }
            _ => {}
        }
    }
}

fn request_status(device: &Device) {
    device.send_hub_command(HubCommand::status_request(device.device_id()));
}
