// MIT License - Copyright (c) 2026 insteon-hub-bridge authors

//! Protocol updates received from the Insteon Hub.

use bitflags::bitflags;

use crate::codec::DeviceId;
use crate::constants::{self, STX};

bitflags! {
    /// Flag byte of a received standard message (0x50).
    ///
    /// Bit positions are fixed by the protocol: 4 = extended,
    /// 5 = ack/nak of a direct message, 6 = group, 7 = broadcast or NAK.
    /// Bits 0-3 carry hop counts and are ignored here.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StdMsgFlags: u8 {
        const EXTENDED  = 1 << constants::STD_FLAG_BIT_EXT;
        const ACK       = 1 << constants::STD_FLAG_BIT_ACK;
        const GROUP     = 1 << constants::STD_FLAG_BIT_GROUP;
        const BROADCAST = 1 << constants::STD_FLAG_BIT_BC_OR_NAK;
    }
}

impl StdMsgFlags {
    /// Parse a raw flag byte, keeping only the defined bits.
    pub fn from_byte(b: u8) -> Self {
        Self::from_bits_truncate(b)
    }

    pub fn is_ack(self) -> bool {
        self.contains(Self::ACK)
    }

    pub fn is_broadcast(self) -> bool {
        self.contains(Self::BROADCAST)
    }

    pub fn is_extended(self) -> bool {
        self.contains(Self::EXTENDED)
    }

    pub fn is_group(self) -> bool {
        self.contains(Self::GROUP)
    }
}

/// A received standard message: device status and button events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StdUpdate {
    pub device_id: DeviceId,
    pub flags: StdMsgFlags,
    pub cmd1: u8,
    pub cmd2: u8,
}

/// A message received from the hub, keyed by its receive code.
///
/// Constructed by the frame parser, consumed exactly once by the matching
/// device, then discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubUpdate {
    /// Standard message, receive code 0x50.
    Std(StdUpdate),
}

impl HubUpdate {
    /// The receive code this update was parsed from.
    pub fn code(&self) -> u8 {
        match self {
            Self::Std(_) => constants::REC_STD_MSG,
        }
    }

    pub fn device_id(&self) -> DeviceId {
        match self {
            Self::Std(msg) => msg.device_id,
        }
    }

    /// Parse a complete received frame into an update.
    ///
    /// Standard-message frame layout:
    /// `{STX, 0x50, from id (3), to id (3), flags, cmd1, cmd2}`.
    /// The sender address is the reporting device. Returns `None` for
    /// receive codes with no update mapping; callers log and drop those.
    pub fn from_frame(frame: &[u8]) -> Option<Self> {
        if frame.len() < 2 || frame[0] != STX {
            return None;
        }
        match frame[1] {
            constants::REC_STD_MSG if frame.len() >= 11 => Some(Self::Std(StdUpdate {
                device_id: DeviceId::from_bytes([frame[2], frame[3], frame[4]]),
                flags: StdMsgFlags::from_byte(frame[8]),
                cmd1: frame[9],
                cmd2: frame[10],
            })),
            _ => None,
        }
    }
}
