// MIT License - Copyright (c) 2026 insteon-hub-bridge authors

//! Protocol commands sent to the Insteon Hub.

use crate::codec::DeviceId;
use crate::constants::{self, STX};

/// Command types paired with their command-1 wire bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HubCommandType {
    On,
    FastOn,
    Off,
    FastOff,
    Bright,
    Dim,
    StartRamp,
    StopRamp,
    StatusRequest,
}

impl HubCommandType {
    pub fn wire_byte(self) -> u8 {
        match self {
            Self::On => constants::CMD1_ON,
            Self::FastOn => constants::CMD1_ON_FAST,
            Self::Off => constants::CMD1_OFF,
            Self::FastOff => constants::CMD1_OFF_FAST,
            Self::Bright => constants::CMD1_BRT,
            Self::Dim => constants::CMD1_DIM,
            Self::StartRamp => constants::CMD1_START_DIM_BRT,
            Self::StopRamp => constants::CMD1_STOP_DIM_BRT,
            Self::StatusRequest => constants::CMD1_STATUS_REQUEST,
        }
    }

    pub fn from_wire_byte(b: u8) -> Option<Self> {
        match b {
            constants::CMD1_ON => Some(Self::On),
            constants::CMD1_ON_FAST => Some(Self::FastOn),
            constants::CMD1_OFF => Some(Self::Off),
            constants::CMD1_OFF_FAST => Some(Self::FastOff),
            constants::CMD1_BRT => Some(Self::Bright),
            constants::CMD1_DIM => Some(Self::Dim),
            constants::CMD1_START_DIM_BRT => Some(Self::StartRamp),
            constants::CMD1_STOP_DIM_BRT => Some(Self::StopRamp),
            constants::CMD1_STATUS_REQUEST => Some(Self::StatusRequest),
            _ => None,
        }
    }
}

/// Ramp direction for [`HubCommand::start_ramp`]. The direction is
/// carried in the command-2 field (0 = dim, 1 = brighten).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RampDirection {
    Up,
    Down,
}

/// Flag byte used for every outgoing standard message.
const DEFAULT_FLAGS: u8 = 0x0F;

/// A command the proxy serializes and sends to the hub over the wire.
///
/// Immutable once constructed. Serializes to a fixed 8-byte frame:
/// `{STX, 0x62, device id (3), flags, cmd1, cmd2}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HubCommand {
    device_id: DeviceId,
    command_type: HubCommandType,
    cmd2: u8,
}

impl HubCommand {
    pub fn new(device_id: DeviceId, command_type: HubCommandType) -> Self {
        Self {
            device_id,
            command_type,
            cmd2: 0,
        }
    }

    /// On command with a 0-255 level in the command-2 field.
    pub fn on(device_id: DeviceId, level: u8) -> Self {
        Self {
            device_id,
            command_type: HubCommandType::On,
            cmd2: level,
        }
    }

    pub fn fast_on(device_id: DeviceId, level: u8) -> Self {
        Self {
            device_id,
            command_type: HubCommandType::FastOn,
            cmd2: level,
        }
    }

    pub fn off(device_id: DeviceId) -> Self {
        Self::new(device_id, HubCommandType::Off)
    }

    pub fn fast_off(device_id: DeviceId) -> Self {
        Self::new(device_id, HubCommandType::FastOff)
    }

    pub fn start_ramp(device_id: DeviceId, direction: RampDirection) -> Self {
        Self {
            device_id,
            command_type: HubCommandType::StartRamp,
            cmd2: match direction {
                RampDirection::Down => 0,
                RampDirection::Up => 1,
            },
        }
    }

    pub fn stop_ramp(device_id: DeviceId) -> Self {
        Self::new(device_id, HubCommandType::StopRamp)
    }

    pub fn status_request(device_id: DeviceId) -> Self {
        Self::new(device_id, HubCommandType::StatusRequest)
    }

    pub fn device_id(&self) -> DeviceId {
        self.device_id
    }

    pub fn command_type(&self) -> HubCommandType {
        self.command_type
    }

    pub fn cmd2(&self) -> u8 {
        self.cmd2
    }

    /// Serialize to the 8-byte wire frame.
    pub fn to_frame(&self) -> [u8; 8] {
        let id = self.device_id.to_bytes();
        [
            STX,
            constants::SND_STD_OR_EXT_MSG,
            id[0],
            id[1],
            id[2],
            DEFAULT_FLAGS,
            self.command_type.wire_byte(),
            self.cmd2,
        ]
    }

    /// Parse a send-frame header back into a command. Returns `None` if
    /// the buffer is not a well-formed 0x62 frame header.
    pub fn from_frame(frame: &[u8]) -> Option<Self> {
        if frame.len() < 8 || frame[0] != STX || frame[1] != constants::SND_STD_OR_EXT_MSG {
            return None;
        }
        let device_id = DeviceId::from_bytes([frame[2], frame[3], frame[4]]);
        let command_type = HubCommandType::from_wire_byte(frame[6])?;
        Some(Self {
            device_id,
            command_type,
            cmd2: frame[7],
        })
    }
}
