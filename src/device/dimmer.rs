// MIT License - Copyright (c) 2026 insteon-hub-bridge authors

//! Dimmer module logic. Responds to status checks with an analog level
//! 0-255 and supports on/off, up/down, stop, percent and raw numeric
//! commands. Increase/Decrease are not handled here; the ramp scheduler
//! coalesces them into Up/Down/Stop before they reach the device.

use tracing::debug;

use crate::command::{HubCommand, RampDirection};
use crate::constants;
use crate::types::{AutomationCommand, AutomationState};
use crate::update::HubUpdate;

use super::{Device, DeviceLogic};

pub(crate) static LOGIC: DeviceLogic = DeviceLogic {
    handle_command,
    handle_update,
    request_status,
};

const PCT_TO_LVL_MULTIPLIER: f32 = 255.0 / 100.0;

fn handle_command(device: &Device, command: &AutomationCommand) {
    match command {
        AutomationCommand::On => set_percent(device, 100),
        AutomationCommand::Off => set_percent(device, 0),
        AutomationCommand::Up => {
            device.send_hub_command(HubCommand::start_ramp(device.device_id(), RampDirection::Up));
        }
        AutomationCommand::Down => {
            device.send_hub_command(HubCommand::start_ramp(
                device.device_id(),
                RampDirection::Down,
            ));
        }
        AutomationCommand::Stop => {
            device.send_hub_command(HubCommand::stop_ramp(device.device_id()));
        }
        // coalesced upstream by the ramp scheduler into Up/Down/Stop
        AutomationCommand::Increase | AutomationCommand::Decrease => {}
        AutomationCommand::Percent(percent) => set_percent(device, *percent),
        AutomationCommand::Raw(text) => match text.trim().parse::<u8>() {
            Ok(percent) if percent <= 100 => set_percent(device, percent),
            _ => debug!("Ignoring unparseable dimmer command '{text}'"),
        },
    }
}

fn set_percent(device: &Device, percent: u8) {
    let level = (f32::from(percent) * PCT_TO_LVL_MULTIPLIER).round() as u8;
    if level == 0 {
        device.send_hub_command(HubCommand::off(device.device_id()));
    } else {
        device.send_hub_command(HubCommand::on(device.device_id(), level));
    }
}

fn handle_update(device: &Device, update: &HubUpdate) {
    let HubUpdate::Std(msg) = update;
    if msg.flags.is_ack() {
        // level response
        match msg.cmd2 {
            0 => device.post_update(AutomationState::Off),
            // yes, 254 is on purpose.
            // sometimes it ends up 254 when you press the switch
            254..=255 => device.post_update(AutomationState::On),
            level => device.post_update(AutomationState::Percent(level_to_percent(level))),
        }
    } else {
        match msg.cmd1 {
            constants::CMD1_STOP_DIM_BRT | constants::CMD1_BRT | constants::CMD1_DIM => {
                // a ramp ended or stepped; ask for the actual level
                request_status(device);
            }
            constants::CMD1_OFF | constants::CMD1_OFF_FAST => {
                device.post_update(AutomationState::Off);
            }
            constants::CMD1_ON | constants::CMD1_ON_FAST => {
                device.post_update(AutomationState::Percent(level_to_percent(msg.cmd2)));
            }
            _ => {}
        }
    }
}

/// Truncating, matching the hub's own rounding on status responses.
fn level_to_percent(level: u8) -> u8 {
    (100.0 * (f32::from(level) / 255.0)) as u8
}

fn request_status(device: &Device) {
    device.send_hub_command(HubCommand::status_request(device.device_id()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_to_level_boundaries() {
        // rounds half-up: 49% -> 125, 50% -> 128
        assert_eq!((49.0f32 * PCT_TO_LVL_MULTIPLIER).round() as u8, 125);
        assert_eq!((50.0f32 * PCT_TO_LVL_MULTIPLIER).round() as u8, 128);
        assert_eq!((100.0f32 * PCT_TO_LVL_MULTIPLIER).round() as u8, 255);
        assert_eq!((0.0f32 * PCT_TO_LVL_MULTIPLIER).round() as u8, 0);
    }

    #[test]
    fn test_level_to_percent_truncates() {
        assert_eq!(level_to_percent(127), 49);
        assert_eq!(level_to_percent(128), 50);
        assert_eq!(level_to_percent(253), 99);
        assert_eq!(level_to_percent(1), 0);
    }
}
